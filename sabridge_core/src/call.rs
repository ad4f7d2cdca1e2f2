//! Method-name registry for inbound calls.
//!
//! Hosts that route calls by name send `{"method": ..., "args": [...]}`.
//! Arguments are positional; trailing arguments may be omitted and are then
//! treated as null.

use crate::{AnalyticsEngine, Bridge, DynamicMap, Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;

/// Every method the bridge exposes, with decoded arguments
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeCall {
    Track {
        event: String,
        properties: Option<DynamicMap>,
    },
    TrackTimerBegin {
        event: String,
    },
    TrackTimerEnd {
        event: String,
        properties: Option<DynamicMap>,
    },
    ClearTrackTimer,
    Login {
        login_id: String,
    },
    Logout,
    TrackInstallation {
        event: String,
        properties: Option<DynamicMap>,
    },
    TrackViewScreen {
        url: Option<String>,
        properties: Option<DynamicMap>,
    },
    ProfileSet {
        properties: Option<DynamicMap>,
    },
    ProfileSetOnce {
        properties: Option<DynamicMap>,
    },
    ProfileIncrement {
        property: String,
        amount: f64,
    },
    ProfileAppend {
        property: String,
        value: String,
    },
    ProfileUnset {
        property: String,
    },
    ProfileDelete,
    GetDistinctId,
    TrackCrash,
}

/// What an invoked call produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Completed,
    DistinctId(String),
    DistinctIdError(String),
}

#[derive(Debug, Deserialize)]
struct RawCall {
    method: String,
    #[serde(default)]
    args: Vec<Value>,
}

struct Args<'a> {
    method: &'a str,
    values: Vec<Value>,
}

impl<'a> Args<'a> {
    fn take(&mut self, index: usize) -> Value {
        self.values
            .get_mut(index)
            .map(Value::take)
            .unwrap_or(Value::Null)
    }

    fn string(&mut self, index: usize, name: &str) -> Result<String> {
        match self.take(index) {
            Value::String(s) => Ok(s),
            other => Err(Error::call(
                self.method,
                format!("argument {} ({}) must be a string, got {}", index, name, other),
            )),
        }
    }

    fn optional_string(&mut self, index: usize, name: &str) -> Result<Option<String>> {
        match self.take(index) {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(Error::call(
                self.method,
                format!("argument {} ({}) must be a string or null, got {}", index, name, other),
            )),
        }
    }

    fn number(&mut self, index: usize, name: &str) -> Result<f64> {
        match self.take(index) {
            Value::Number(n) => n.as_f64().ok_or_else(|| {
                Error::call(self.method, format!("argument {} ({}) out of range", index, name))
            }),
            other => Err(Error::call(
                self.method,
                format!("argument {} ({}) must be a number, got {}", index, name, other),
            )),
        }
    }

    fn map(&mut self, index: usize) -> Result<Option<DynamicMap>> {
        match self.take(index) {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(DynamicMap::from(map))),
            other => Err(Error::call(
                self.method,
                format!("argument {} (properties) must be an object or null, got {}", index, other),
            )),
        }
    }
}

impl BridgeCall {
    /// Decode one JSON call
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawCall = serde_json::from_str(json)?;
        Self::from_parts(&raw.method, raw.args)
    }

    /// Decode a method name plus positional arguments
    pub fn from_parts(method: &str, args: Vec<Value>) -> Result<Self> {
        let mut a = Args {
            method,
            values: args,
        };
        let call = match method {
            "track" => BridgeCall::Track {
                event: a.string(0, "eventName")?,
                properties: a.map(1)?,
            },
            "trackTimerBegin" => BridgeCall::TrackTimerBegin {
                event: a.string(0, "eventName")?,
            },
            "trackTimerEnd" => BridgeCall::TrackTimerEnd {
                event: a.string(0, "eventName")?,
                properties: a.map(1)?,
            },
            "clearTrackTimer" => BridgeCall::ClearTrackTimer,
            "login" => BridgeCall::Login {
                login_id: a.string(0, "loginId")?,
            },
            "logout" => BridgeCall::Logout,
            "trackInstallation" => BridgeCall::TrackInstallation {
                event: a.string(0, "eventName")?,
                properties: a.map(1)?,
            },
            "trackViewScreen" => BridgeCall::TrackViewScreen {
                url: a.optional_string(0, "url")?,
                properties: a.map(1)?,
            },
            "profileSet" => BridgeCall::ProfileSet {
                properties: a.map(0)?,
            },
            "profileSetOnce" => BridgeCall::ProfileSetOnce {
                properties: a.map(0)?,
            },
            "profileIncrement" => BridgeCall::ProfileIncrement {
                property: a.string(0, "property")?,
                amount: a.number(1, "value")?,
            },
            "profileAppend" => BridgeCall::ProfileAppend {
                property: a.string(0, "property")?,
                value: a.string(1, "value")?,
            },
            "profileUnset" => BridgeCall::ProfileUnset {
                property: a.string(0, "property")?,
            },
            "profileDelete" => BridgeCall::ProfileDelete,
            "getDistinctId" => BridgeCall::GetDistinctId,
            "trackCrash" => BridgeCall::TrackCrash,
            other => return Err(Error::call(other, "unknown method")),
        };
        Ok(call)
    }

    /// Host-facing method name
    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::Track { .. } => "track",
            BridgeCall::TrackTimerBegin { .. } => "trackTimerBegin",
            BridgeCall::TrackTimerEnd { .. } => "trackTimerEnd",
            BridgeCall::ClearTrackTimer => "clearTrackTimer",
            BridgeCall::Login { .. } => "login",
            BridgeCall::Logout => "logout",
            BridgeCall::TrackInstallation { .. } => "trackInstallation",
            BridgeCall::TrackViewScreen { .. } => "trackViewScreen",
            BridgeCall::ProfileSet { .. } => "profileSet",
            BridgeCall::ProfileSetOnce { .. } => "profileSetOnce",
            BridgeCall::ProfileIncrement { .. } => "profileIncrement",
            BridgeCall::ProfileAppend { .. } => "profileAppend",
            BridgeCall::ProfileUnset { .. } => "profileUnset",
            BridgeCall::ProfileDelete => "profileDelete",
            BridgeCall::GetDistinctId => "getDistinctId",
            BridgeCall::TrackCrash => "trackCrash",
        }
    }
}

impl<E: AnalyticsEngine> Bridge<E> {
    /// Route a decoded call to its operation
    pub fn invoke(&self, call: &BridgeCall) -> CallOutcome {
        match call {
            BridgeCall::Track { event, properties } => self.track(event, properties.as_ref()),
            BridgeCall::TrackTimerBegin { event } => self.track_timer_begin(event),
            BridgeCall::TrackTimerEnd { event, properties } => {
                self.track_timer_end(event, properties.as_ref())
            }
            BridgeCall::ClearTrackTimer => self.clear_track_timer(),
            BridgeCall::Login { login_id } => self.login(login_id),
            BridgeCall::Logout => self.logout(),
            BridgeCall::TrackInstallation { event, properties } => {
                self.track_installation(event, properties.as_ref())
            }
            BridgeCall::TrackViewScreen { url, properties } => {
                self.track_view_screen(url.as_deref(), properties.as_ref())
            }
            BridgeCall::ProfileSet { properties } => self.profile_set(properties.as_ref()),
            BridgeCall::ProfileSetOnce { properties } => self.profile_set_once(properties.as_ref()),
            BridgeCall::ProfileIncrement { property, amount } => {
                self.profile_increment(property, *amount)
            }
            BridgeCall::ProfileAppend { property, value } => self.profile_append(property, value),
            BridgeCall::ProfileUnset { property } => self.profile_unset(property),
            BridgeCall::ProfileDelete => self.profile_delete(),
            BridgeCall::GetDistinctId => {
                let outcome = RefCell::new(None);
                self.get_distinct_id(
                    |id| *outcome.borrow_mut() = Some(CallOutcome::DistinctId(id)),
                    |msg| *outcome.borrow_mut() = Some(CallOutcome::DistinctIdError(msg)),
                );
                return outcome.into_inner().unwrap_or_else(|| {
                    CallOutcome::DistinctIdError("no distinct id delivered".into())
                });
            }
            BridgeCall::TrackCrash => self.track_crash(),
        }
        CallOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryEngine;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_parse_track() {
        let call =
            BridgeCall::parse(r#"{"method":"track","args":["RN_AddToFav",{"ProductID":123456}]}"#)
                .unwrap();
        assert_eq!(
            call,
            BridgeCall::Track {
                event: "RN_AddToFav".into(),
                properties: Some(DynamicMap::new().with("ProductID", 123456)),
            }
        );
        assert_eq!(call.method(), "track");
    }

    #[test]
    fn test_missing_trailing_args_are_null() {
        let call = BridgeCall::parse(r#"{"method":"trackViewScreen"}"#).unwrap();
        assert_eq!(
            call,
            BridgeCall::TrackViewScreen {
                url: None,
                properties: None
            }
        );
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = BridgeCall::parse(r#"{"method":"flush","args":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Call { .. }));
    }

    #[test]
    fn test_wrong_argument_type_rejected() {
        let err = BridgeCall::from_parts("profileIncrement", vec![json!("money"), json!("ten")])
            .unwrap_err();
        assert!(err.to_string().contains("must be a number"));

        let err = BridgeCall::from_parts("track", vec![json!("e"), json!([1, 2])]).unwrap_err();
        assert!(err.to_string().contains("properties"));
    }

    #[test]
    fn test_invoke_routes_calls() {
        let engine = Arc::new(MemoryEngine::builder().anonymous_id("anon").build());
        let bridge = Bridge::new(engine.clone());

        let calls = [
            r#"{"method":"profileIncrement","args":["money",10]}"#,
            r#"{"method":"profileAppend","args":["VIP","Gold"]}"#,
            r#"{"method":"track","args":["buy",null]}"#,
            r#"{"method":"login","args":["user@x.com"]}"#,
        ];
        for line in calls {
            let call = BridgeCall::parse(line).unwrap();
            assert_eq!(bridge.invoke(&call), CallOutcome::Completed);
        }

        assert_eq!(engine.profile()["money"], json!(10));
        assert_eq!(engine.profile()["VIP"], json!(["Gold"]));
        assert_eq!(engine.events().len(), 1);
        assert_eq!(
            bridge.invoke(&BridgeCall::GetDistinctId),
            CallOutcome::DistinctId("user@x.com".into())
        );
    }
}
