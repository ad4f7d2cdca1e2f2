//! The bridge object a host runtime registers.
//!
//! Operations are spread across sibling modules by concern:
//! - `dispatch`: plain, screen, install and crash events
//! - `timer`: begin/end/clear of timed events
//! - `profile`: the profile mutations
//! - `identity`: login, logout and distinct-id lookup

use crate::config::BridgeConfig;
use crate::convert::PropertyConverter;
use crate::{AnalyticsEngine, DynamicMap, PropertyDocument};

/// Name the host runtime registers the bridge under
pub const MODULE_NAME: &str = "RNSensorsAnalytics";

/// Version reported to the host runtime
pub const MODULE_VERSION: &str = "1.0.1";

/// Translates dynamically-typed host calls into engine calls
///
/// Holds no mutable state; everything stateful lives in the engine.
pub struct Bridge<E> {
    pub(crate) engine: E,
    pub(crate) converter: PropertyConverter,
}

impl<E: AnalyticsEngine> Bridge<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            converter: PropertyConverter::default(),
        }
    }

    pub fn with_config(engine: E, config: &BridgeConfig) -> Self {
        Self {
            engine,
            converter: PropertyConverter::new(config.max_depth),
        }
    }

    /// Module name as seen by the host runtime
    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn convert(&self, raw: Option<&DynamicMap>) -> Option<PropertyDocument> {
        self.converter.convert(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryEngine;

    #[test]
    fn test_module_descriptor() {
        let bridge = Bridge::new(MemoryEngine::new());
        assert_eq!(bridge.name(), "RNSensorsAnalytics");
        assert_eq!(MODULE_VERSION, "1.0.1");
    }

    #[test]
    fn test_config_sets_converter_depth() {
        let config = BridgeConfig {
            max_depth: 3,
            ..BridgeConfig::default()
        };
        let bridge = Bridge::with_config(MemoryEngine::new(), &config);
        assert_eq!(bridge.converter.max_depth(), 3);
    }
}
