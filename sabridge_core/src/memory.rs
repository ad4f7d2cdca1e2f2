//! In-memory reference engine.
//!
//! Implements the engine side of the bridge contract so the bridge can be
//! exercised without a real analytics SDK: events, timers, profile and
//! identity are all kept in process.

use crate::config::{Config, TimeUnit, TimerConfig};
use crate::convert::number_from_f64;
use crate::sink::{EventSink, JsonlSink};
use crate::{
    AnalyticsEngine, EngineError, EngineResult, EventKind, PropertyDocument, Result, TrackedEvent,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Event name used for screen views
pub const VIEW_SCREEN_EVENT: &str = "$AppViewScreen";

/// Event name used for manual crash reports
pub const APP_CRASH_EVENT: &str = "AppCrashed";

/// Property carrying the screen url
pub const URL_PROPERTY: &str = "$url";

/// Time source for event timestamps and timer durations
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for deterministic timers
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct EngineState {
    events: Vec<TrackedEvent>,
    timers: HashMap<String, DateTime<Utc>>,
    profile: PropertyDocument,
    login_id: Option<String>,
    installation_tracked: bool,
}

impl EngineState {
    fn distinct_id(&self, anonymous_id: &str) -> String {
        match &self.login_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => anonymous_id.to_string(),
        }
    }
}

/// Builder for [`MemoryEngine`]
#[derive(Default)]
pub struct MemoryEngineBuilder {
    anonymous_id: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    timer: TimerConfig,
    sink: Option<Box<dyn EventSink + Send>>,
}

impl MemoryEngineBuilder {
    pub fn anonymous_id(mut self, id: impl Into<String>) -> Self {
        self.anonymous_id = Some(id.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn timer_config(mut self, timer: TimerConfig) -> Self {
        self.timer = timer;
        self
    }

    pub fn sink(mut self, sink: impl EventSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn build(self) -> MemoryEngine {
        MemoryEngine {
            state: Mutex::new(EngineState::default()),
            anonymous_id: self
                .anonymous_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            timer: self.timer,
            sink: self.sink.map(Mutex::new),
        }
    }
}

/// Reference [`AnalyticsEngine`] keeping everything in memory
pub struct MemoryEngine {
    state: Mutex<EngineState>,
    anonymous_id: String,
    clock: Arc<dyn Clock>,
    timer: TimerConfig,
    sink: Option<Mutex<Box<dyn EventSink + Send>>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MemoryEngineBuilder {
        MemoryEngineBuilder::default()
    }

    /// Build from the `[timer]` and `[engine]` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::builder().timer_config(config.timer.clone());
        if let Some(id) = &config.engine.anonymous_id {
            builder = builder.anonymous_id(id.clone());
        }
        if let Some(path) = &config.engine.events_path {
            let sink = JsonlSink::new(path);
            tracing::info!("Recording events to {:?}", sink.path());
            builder = builder.sink(sink);
        }
        Ok(builder.build())
    }

    /// Snapshot of every recorded event, oldest first
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.lock_or_recover().events.clone()
    }

    /// Snapshot of the current profile
    pub fn profile(&self) -> PropertyDocument {
        self.lock_or_recover().profile.clone()
    }

    /// Names of timers started and not yet ended
    pub fn pending_timers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock_or_recover().timers.keys().cloned().collect();
        names.sort();
        names
    }

    fn state(&self) -> EngineResult<MutexGuard<'_, EngineState>> {
        self.state
            .lock()
            .map_err(|_| EngineError::Internal("engine state lock poisoned".into()))
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(
        &self,
        state: &mut EngineState,
        kind: EventKind,
        event: &str,
        properties: PropertyDocument,
    ) -> EngineResult<()> {
        let tracked = TrackedEvent {
            id: Uuid::new_v4(),
            kind,
            event: event.to_string(),
            distinct_id: state.distinct_id(&self.anonymous_id),
            login_id: state.login_id.clone(),
            properties,
            time: self.clock.now(),
        };

        if let Some(sink) = &self.sink {
            let mut sink = sink
                .lock()
                .map_err(|_| EngineError::Internal("event sink lock poisoned".into()))?;
            sink.append(&tracked)
                .map_err(|e| EngineError::Internal(format!("event sink failed: {}", e)))?;
        }

        tracing::debug!("Recorded {:?} event '{}'", kind, event);
        state.events.push(tracked);
        Ok(())
    }

    fn duration_value(&self, elapsed: Duration) -> EngineResult<Value> {
        let millis = elapsed.num_milliseconds().max(0);
        let value = match self.timer.unit {
            TimeUnit::Milliseconds => Value::from(millis),
            TimeUnit::Seconds => number_from_f64(millis as f64 / 1000.0)
                .map(Value::Number)
                .ok_or_else(|| EngineError::Internal("duration out of range".into()))?,
        };
        Ok(value)
    }
}

fn require_name(property: &str) -> EngineResult<()> {
    if property.is_empty() {
        return Err(EngineError::InvalidArgument(
            "property name must not be empty".into(),
        ));
    }
    Ok(())
}

impl AnalyticsEngine for MemoryEngine {
    fn track(&self, event_name: &str, properties: Option<PropertyDocument>) -> EngineResult<()> {
        let mut state = self.state()?;
        self.emit(
            &mut state,
            EventKind::Track,
            event_name,
            properties.unwrap_or_default(),
        )
    }

    fn track_timer_begin(&self, event_name: &str) -> EngineResult<()> {
        let now = self.clock.now();
        self.state()?.timers.insert(event_name.to_string(), now);
        Ok(())
    }

    fn track_timer_end(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        let mut state = self.state()?;
        let Some(started) = state.timers.get(event_name).copied() else {
            tracing::warn!("Timer '{}' ended without a pending begin, nothing emitted", event_name);
            return Ok(());
        };
        let mut properties = properties.unwrap_or_default();
        let duration = self.duration_value(self.clock.now() - started)?;
        properties.insert(self.timer.duration_key.clone(), duration);
        self.emit(&mut state, EventKind::TimerEnd, event_name, properties)?;
        // Only a recorded event consumes the start point
        state.timers.remove(event_name);
        Ok(())
    }

    fn clear_track_timer(&self) -> EngineResult<()> {
        self.state()?.timers.clear();
        Ok(())
    }

    fn login(&self, login_id: &str) -> EngineResult<()> {
        self.state()?.login_id = Some(login_id.to_string());
        Ok(())
    }

    fn logout(&self) -> EngineResult<()> {
        self.state()?.login_id = None;
        Ok(())
    }

    fn track_installation(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        let mut state = self.state()?;
        if state.installation_tracked {
            tracing::info!("Installation already tracked, ignoring '{}'", event_name);
            return Ok(());
        }
        self.emit(
            &mut state,
            EventKind::Installation,
            event_name,
            properties.unwrap_or_default(),
        )?;
        state.installation_tracked = true;
        Ok(())
    }

    fn track_view_screen(
        &self,
        url: Option<&str>,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        let mut state = self.state()?;
        let mut properties = properties.unwrap_or_default();
        if let Some(url) = url {
            properties.insert(URL_PROPERTY.to_string(), Value::from(url));
        }
        self.emit(&mut state, EventKind::ViewScreen, VIEW_SCREEN_EVENT, properties)
    }

    fn profile_set(&self, properties: Option<PropertyDocument>) -> EngineResult<()> {
        let mut state = self.state()?;
        for (key, value) in properties.unwrap_or_default() {
            state.profile.insert(key, value);
        }
        Ok(())
    }

    fn profile_set_once(&self, properties: Option<PropertyDocument>) -> EngineResult<()> {
        let mut state = self.state()?;
        for (key, value) in properties.unwrap_or_default() {
            state.profile.entry(key).or_insert(value);
        }
        Ok(())
    }

    fn profile_increment(&self, property: &str, amount: f64) -> EngineResult<()> {
        require_name(property)?;
        let mut state = self.state()?;
        let current = match state.profile.get(property) {
            None => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(other) => {
                return Err(EngineError::InvalidArgument(format!(
                    "profile property '{}' is not numeric: {}",
                    property, other
                )))
            }
        };
        let total = number_from_f64(current + amount).ok_or_else(|| {
            EngineError::InvalidArgument(format!("increment of '{}' is not finite", property))
        })?;
        state.profile.insert(property.to_string(), Value::Number(total));
        Ok(())
    }

    fn profile_append(&self, property: &str, value: &str) -> EngineResult<()> {
        require_name(property)?;
        let mut state = self.state()?;
        let slot = state
            .profile
            .entry(property.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(Value::from(value)),
            other => {
                return Err(EngineError::InvalidArgument(format!(
                    "profile property '{}' is not a list: {}",
                    property, other
                )))
            }
        }
        Ok(())
    }

    fn profile_unset(&self, property: &str) -> EngineResult<()> {
        self.state()?.profile.remove(property);
        Ok(())
    }

    fn profile_delete(&self) -> EngineResult<()> {
        self.state()?.profile.clear();
        Ok(())
    }

    fn login_id(&self) -> EngineResult<Option<String>> {
        Ok(self.state()?.login_id.clone())
    }

    fn anonymous_id(&self) -> EngineResult<String> {
        Ok(self.anonymous_id.clone())
    }

    fn track_app_crash(&self) -> EngineResult<()> {
        let mut state = self.state()?;
        self.emit(
            &mut state,
            EventKind::AppCrash,
            APP_CRASH_EVENT,
            PropertyDocument::new(),
        )
    }
}
