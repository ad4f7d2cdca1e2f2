//! Event operations: plain track, screen views, installs and crashes.

use crate::logging::LOG_TAG;
use crate::{AnalyticsEngine, Bridge, DynamicMap, FailureBoundary};

impl<E: AnalyticsEngine> Bridge<E> {
    /// Record `event_name` with the converted properties
    pub fn track(&self, event_name: &str, properties: Option<&DynamicMap>) {
        FailureBoundary::new("track").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, event = event_name, "track");
            self.engine.track(event_name, doc)?;
            Ok(())
        });
    }

    /// Record a screen view
    ///
    /// `url` may be `None`. Page fields such as `$title` or `$screen_name`
    /// are the caller's to include in `properties`.
    pub fn track_view_screen(&self, url: Option<&str>, properties: Option<&DynamicMap>) {
        FailureBoundary::new("trackViewScreen").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, url, "trackViewScreen");
            self.engine.track_view_screen(url, doc)?;
            Ok(())
        });
    }

    /// Record an install/attribution event; once-per-device is the engine's job
    pub fn track_installation(&self, event_name: &str, properties: Option<&DynamicMap>) {
        FailureBoundary::new("trackInstallation").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, event = event_name, "trackInstallation");
            self.engine.track_installation(event_name, doc)?;
            Ok(())
        });
    }

    /// Manually trigger the engine's crash event
    pub fn track_crash(&self) {
        FailureBoundary::new("trackCrash").run(|| {
            tracing::debug!(target: LOG_TAG, "trackCrash");
            self.engine.track_app_crash()?;
            Ok(())
        });
    }
}
