//! Failure containment for bridge entry points.
//!
//! Every exposed operation runs its body through a [`FailureBoundary`]. An
//! `Err` or a panic inside the body is logged and stops the operation; it
//! never reaches the calling runtime.

use crate::logging::LOG_TAG;
use crate::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Boundary for a single named operation
#[derive(Clone, Copy, Debug)]
pub struct FailureBoundary {
    operation: &'static str,
}

impl FailureBoundary {
    pub fn new(operation: &'static str) -> Self {
        Self { operation }
    }

    /// Run a body whose failure is only logged
    pub fn run<F>(self, body: F)
    where
        F: FnOnce() -> Result<()>,
    {
        let _ = self.capture(body);
    }

    /// Run a body and hand back its outcome, logging any failure
    ///
    /// Panics are converted into [`Error::Panic`].
    pub fn capture<T, F>(self, body: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(body))
            .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload.as_ref()))));

        match outcome {
            Ok(value) => {
                tracing::trace!(target: LOG_TAG, operation = self.operation, "ok");
                Ok(value)
            }
            Err(e) => {
                tracing::error!(
                    target: LOG_TAG,
                    operation = self.operation,
                    error = %e,
                    "Bridge call failed"
                );
                Err(e)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
