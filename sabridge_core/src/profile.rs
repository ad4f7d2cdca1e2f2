//! Profile mutations for the current identity.

use crate::logging::LOG_TAG;
use crate::{AnalyticsEngine, Bridge, DynamicMap, FailureBoundary};

impl<E: AnalyticsEngine> Bridge<E> {
    /// Overwrite each listed property
    pub fn profile_set(&self, properties: Option<&DynamicMap>) {
        FailureBoundary::new("profileSet").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, "profileSet");
            self.engine.profile_set(doc)?;
            Ok(())
        });
    }

    /// Set each listed property only where it is absent
    pub fn profile_set_once(&self, properties: Option<&DynamicMap>) {
        FailureBoundary::new("profileSetOnce").run(|| {
            let doc = self.convert(properties);
            tracing::debug!(target: LOG_TAG, "profileSetOnce");
            self.engine.profile_set_once(doc)?;
            Ok(())
        });
    }

    /// Add `amount` to a numeric property (absent counts as 0)
    pub fn profile_increment(&self, property: &str, amount: f64) {
        FailureBoundary::new("profileIncrement").run(|| {
            tracing::debug!(target: LOG_TAG, property, amount, "profileIncrement");
            self.engine.profile_increment(property, amount)?;
            Ok(())
        });
    }

    /// Append one element to a list property
    pub fn profile_append(&self, property: &str, value: &str) {
        FailureBoundary::new("profileAppend").run(|| {
            tracing::debug!(target: LOG_TAG, property, "profileAppend");
            self.engine.profile_append(property, value)?;
            Ok(())
        });
    }

    pub fn profile_unset(&self, property: &str) {
        FailureBoundary::new("profileUnset").run(|| {
            tracing::debug!(target: LOG_TAG, property, "profileUnset");
            self.engine.profile_unset(property)?;
            Ok(())
        });
    }

    /// Remove the whole profile
    pub fn profile_delete(&self) {
        FailureBoundary::new("profileDelete").run(|| {
            tracing::debug!(target: LOG_TAG, "profileDelete");
            self.engine.profile_delete()?;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::{Bridge, DynamicMap, MemoryEngine};
    use serde_json::json;
    use std::sync::Arc;

    fn bridge() -> (Arc<MemoryEngine>, Bridge<Arc<MemoryEngine>>) {
        let engine = Arc::new(MemoryEngine::new());
        (engine.clone(), Bridge::new(engine))
    }

    #[test]
    fn test_increment_from_absent() {
        let (engine, bridge) = bridge();

        bridge.profile_increment("money", 10.0);
        assert_eq!(engine.profile()["money"], json!(10));

        bridge.profile_increment("money", 5.0);
        assert_eq!(engine.profile()["money"], json!(15));
    }

    #[test]
    fn test_set_once_does_not_overwrite() {
        let (engine, bridge) = bridge();

        bridge.profile_set(Some(&DynamicMap::new().with("sex", "女")));
        bridge.profile_set_once(Some(&DynamicMap::new().with("sex", "男")));

        assert_eq!(engine.profile()["sex"], json!("女"));
    }

    #[test]
    fn test_set_overwrites() {
        let (engine, bridge) = bridge();

        bridge.profile_set(Some(&DynamicMap::new().with("sex", "男")));
        bridge.profile_set(Some(&DynamicMap::new().with("sex", "女")));

        assert_eq!(engine.profile()["sex"], json!("女"));
    }

    #[test]
    fn test_append_creates_then_extends_list() {
        let (engine, bridge) = bridge();

        bridge.profile_append("VIP", "Gold");
        bridge.profile_append("VIP", "Platinum");

        assert_eq!(engine.profile()["VIP"], json!(["Gold", "Platinum"]));
    }

    #[test]
    fn test_unset_and_delete() {
        let (engine, bridge) = bridge();

        bridge.profile_set(Some(&DynamicMap::new().with("a", 1).with("b", 2)));
        bridge.profile_unset("a");
        bridge.profile_unset("never-set");
        assert_eq!(engine.profile().len(), 1);
        assert!(engine.profile().contains_key("b"));

        bridge.profile_delete();
        assert!(engine.profile().is_empty());
    }
}
