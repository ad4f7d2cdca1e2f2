#![forbid(unsafe_code)]

//! Core of the analytics event bridge.
//!
//! This crate provides:
//! - Dynamic caller values and their conversion into property documents
//! - The failure boundary wrapped around every bridge operation
//! - Event, timer, profile and identity operations over an injected engine
//! - A method-name registry for hosts that route calls by name
//! - An in-memory reference engine with a JSONL event sink

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod convert;
pub mod boundary;
pub mod engine;
pub mod bridge;
pub mod dispatch;
pub mod timer;
pub mod profile;
pub mod identity;
pub mod call;
pub mod sink;
pub mod memory;

// Re-export commonly used types
pub use error::{EngineError, EngineResult, Error, Result};
pub use types::*;
pub use config::Config;
pub use convert::{convert, PropertyConverter};
pub use boundary::FailureBoundary;
pub use engine::AnalyticsEngine;
pub use bridge::{Bridge, MODULE_NAME, MODULE_VERSION};
pub use call::{BridgeCall, CallOutcome};
pub use sink::{read_events, EventSink, JsonlSink};
pub use memory::{Clock, ManualClock, MemoryEngine, SystemClock};
