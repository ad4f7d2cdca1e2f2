//! Login identity and distinct-id resolution.

use crate::logging::LOG_TAG;
use crate::{AnalyticsEngine, Bridge, FailureBoundary, Result};

impl<E: AnalyticsEngine> Bridge<E> {
    /// Bind `login_id` as the active identity
    pub fn login(&self, login_id: &str) {
        FailureBoundary::new("login").run(|| {
            tracing::debug!(target: LOG_TAG, login_id, "login");
            self.engine.login(login_id)?;
            Ok(())
        });
    }

    /// Return to anonymous tracking
    pub fn logout(&self) {
        FailureBoundary::new("logout").run(|| {
            tracing::debug!(target: LOG_TAG, "logout");
            self.engine.logout()?;
            Ok(())
        });
    }

    /// Resolve the distinct id and deliver it to exactly one callback
    ///
    /// A non-empty login id wins over the anonymous id. Both callbacks run
    /// synchronously before this returns. A panic inside a callback is
    /// contained and does not trigger the other one.
    pub fn get_distinct_id<S, F>(&self, on_success: S, on_error: F)
    where
        S: FnOnce(String),
        F: FnOnce(String),
    {
        match FailureBoundary::new("getDistinctId").capture(|| self.resolve_distinct_id()) {
            Ok(id) => FailureBoundary::new("getDistinctId.onSuccess").run(|| {
                on_success(id);
                Ok(())
            }),
            Err(e) => FailureBoundary::new("getDistinctId.onError").run(|| {
                on_error(e.to_string());
                Ok(())
            }),
        }
    }

    /// Distinct id as a plain result
    pub fn distinct_id(&self) -> Result<String> {
        FailureBoundary::new("getDistinctId").capture(|| self.resolve_distinct_id())
    }

    fn resolve_distinct_id(&self) -> Result<String> {
        match self.engine.login_id()? {
            Some(login_id) if !login_id.is_empty() => Ok(login_id),
            _ => Ok(self.engine.anonymous_id()?),
        }
    }
}
