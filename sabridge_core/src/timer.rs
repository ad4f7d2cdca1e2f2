//! Timed events.
//!
//! Start points and durations are kept by the engine; the bridge only
//! forwards the three transitions.

use crate::logging::LOG_TAG;
use crate::{AnalyticsEngine, Bridge, DynamicMap, FailureBoundary};

impl<E: AnalyticsEngine> Bridge<E> {
    /// Start (or restart) the timer for `event_name`
    pub fn track_timer_begin(&self, event_name: &str) {
        FailureBoundary::new("trackTimerBegin").run(|| {
            tracing::debug!(target: LOG_TAG, event = event_name, "trackTimerBegin");
            self.engine.track_timer_begin(event_name)?;
            Ok(())
        });
    }

    /// Stop the timer and emit `event_name` with the elapsed duration
    pub fn track_timer_end(&self, event_name: &str, properties: Option<&DynamicMap>) {
        FailureBoundary::new("trackTimerEnd").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, event = event_name, "trackTimerEnd");
            self.engine.track_timer_end(event_name, doc)?;
            Ok(())
        });
    }

    /// Discard every pending timer without emitting anything
    pub fn clear_track_timer(&self) {
        FailureBoundary::new("clearTrackTimer").run(|| {
            tracing::debug!(target: LOG_TAG, "clearTrackTimer");
            self.engine.clear_track_timer()?;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::{Bridge, DynamicMap, EventKind, ManualClock, MemoryEngine};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<ManualClock>, Arc<MemoryEngine>, Bridge<Arc<MemoryEngine>>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let engine = Arc::new(MemoryEngine::builder().clock(clock.clone()).build());
        (clock, engine.clone(), Bridge::new(engine))
    }

    #[test]
    fn test_begin_end_emits_event_with_duration() {
        let (clock, engine, bridge) = setup();

        bridge.track_timer_begin("viewTimer");
        clock.advance(Duration::milliseconds(1500));
        bridge.track_timer_end("viewTimer", Some(&DynamicMap::new().with("ProductID", 123456)));

        let events = engine.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "viewTimer");
        assert_eq!(events[0].kind, EventKind::TimerEnd);
        assert_eq!(events[0].properties["ProductID"], json!(123456));
        assert_eq!(events[0].properties["event_duration"], json!(1500));
    }

    #[test]
    fn test_clear_suppresses_emission() {
        let (_clock, engine, bridge) = setup();

        bridge.track_timer_begin("viewTimer");
        bridge.clear_track_timer();
        bridge.track_timer_end("viewTimer", Some(&DynamicMap::new().with("ProductID", 123456)));

        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_second_begin_restarts_interval() {
        let (clock, engine, bridge) = setup();

        bridge.track_timer_begin("read");
        clock.advance(Duration::seconds(10));
        bridge.track_timer_begin("read");
        clock.advance(Duration::seconds(2));
        bridge.track_timer_end("read", None);

        let events = engine.events();
        assert_eq!(events[0].properties["event_duration"], json!(2000));
    }
}
