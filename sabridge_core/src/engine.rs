//! Capability interface of the analytics engine behind the bridge.
//!
//! The bridge keeps no state of its own. Timers, profile and identity all
//! live in the engine, which must therefore handle its own synchronisation.

use crate::{EngineResult, PropertyDocument};
use std::sync::Arc;

/// Outbound calls the bridge makes into the analytics engine
pub trait AnalyticsEngine: Send + Sync {
    fn track(&self, event_name: &str, properties: Option<PropertyDocument>) -> EngineResult<()>;

    fn track_timer_begin(&self, event_name: &str) -> EngineResult<()>;

    fn track_timer_end(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()>;

    fn clear_track_timer(&self) -> EngineResult<()>;

    fn login(&self, login_id: &str) -> EngineResult<()>;

    fn logout(&self) -> EngineResult<()>;

    fn track_installation(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()>;

    fn track_view_screen(
        &self,
        url: Option<&str>,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()>;

    fn profile_set(&self, properties: Option<PropertyDocument>) -> EngineResult<()>;

    fn profile_set_once(&self, properties: Option<PropertyDocument>) -> EngineResult<()>;

    fn profile_increment(&self, property: &str, amount: f64) -> EngineResult<()>;

    fn profile_append(&self, property: &str, value: &str) -> EngineResult<()>;

    fn profile_unset(&self, property: &str) -> EngineResult<()>;

    fn profile_delete(&self) -> EngineResult<()>;

    fn login_id(&self) -> EngineResult<Option<String>>;

    fn anonymous_id(&self) -> EngineResult<String>;

    fn track_app_crash(&self) -> EngineResult<()>;
}

impl<E: AnalyticsEngine + ?Sized> AnalyticsEngine for Arc<E> {
    fn track(&self, event_name: &str, properties: Option<PropertyDocument>) -> EngineResult<()> {
        (**self).track(event_name, properties)
    }

    fn track_timer_begin(&self, event_name: &str) -> EngineResult<()> {
        (**self).track_timer_begin(event_name)
    }

    fn track_timer_end(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        (**self).track_timer_end(event_name, properties)
    }

    fn clear_track_timer(&self) -> EngineResult<()> {
        (**self).clear_track_timer()
    }

    fn login(&self, login_id: &str) -> EngineResult<()> {
        (**self).login(login_id)
    }

    fn logout(&self) -> EngineResult<()> {
        (**self).logout()
    }

    fn track_installation(
        &self,
        event_name: &str,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        (**self).track_installation(event_name, properties)
    }

    fn track_view_screen(
        &self,
        url: Option<&str>,
        properties: Option<PropertyDocument>,
    ) -> EngineResult<()> {
        (**self).track_view_screen(url, properties)
    }

    fn profile_set(&self, properties: Option<PropertyDocument>) -> EngineResult<()> {
        (**self).profile_set(properties)
    }

    fn profile_set_once(&self, properties: Option<PropertyDocument>) -> EngineResult<()> {
        (**self).profile_set_once(properties)
    }

    fn profile_increment(&self, property: &str, amount: f64) -> EngineResult<()> {
        (**self).profile_increment(property, amount)
    }

    fn profile_append(&self, property: &str, value: &str) -> EngineResult<()> {
        (**self).profile_append(property, value)
    }

    fn profile_unset(&self, property: &str) -> EngineResult<()> {
        (**self).profile_unset(property)
    }

    fn profile_delete(&self) -> EngineResult<()> {
        (**self).profile_delete()
    }

    fn login_id(&self) -> EngineResult<Option<String>> {
        (**self).login_id()
    }

    fn anonymous_id(&self) -> EngineResult<String> {
        (**self).anonymous_id()
    }

    fn track_app_crash(&self) -> EngineResult<()> {
        (**self).track_app_crash()
    }
}
