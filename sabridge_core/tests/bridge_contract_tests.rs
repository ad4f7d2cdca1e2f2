//! End-to-end tests of the bridge against the in-memory engine.
//!
//! These tests verify:
//! - Property conversion as seen by the engine
//! - Timer begin/end/clear behaviour
//! - Profile mutation rules
//! - Distinct-id resolution
//! - Event persistence through the JSONL sink

use chrono::{Duration, TimeZone, Utc};
use sabridge_core::config::{Config, TimeUnit};
use sabridge_core::*;
use serde_json::json;
use std::cell::RefCell;
use std::sync::Arc;
use std::thread;

fn setup() -> (Arc<ManualClock>, Arc<MemoryEngine>, Bridge<Arc<MemoryEngine>>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
    ));
    let engine = Arc::new(
        MemoryEngine::builder()
            .anonymous_id("anon-device")
            .clock(clock.clone())
            .build(),
    );
    (clock, engine.clone(), Bridge::new(engine))
}

#[test]
fn test_track_stores_converted_properties() {
    let (_clock, engine, bridge) = setup();
    let raw = DynamicMap::from(
        json!({
            "ProductID": 123456,
            "UserLevel": "VIP",
            "Coupon": null,
            "Cart": {"items": ["a", null, "b"], "note": null}
        })
        .as_object()
        .unwrap()
        .clone(),
    );

    bridge.track("RN_AddToFav", Some(&raw));

    let events = engine.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "RN_AddToFav");
    assert_eq!(
        serde_json::Value::Object(events[0].properties.clone()),
        json!({
            "ProductID": 123456,
            "UserLevel": "VIP",
            "Cart": {"items": ["a", "b"]}
        })
    );
}

#[test]
fn test_view_timer_round_trip() {
    let (clock, engine, bridge) = setup();

    bridge.track_timer_begin("viewTimer");
    clock.advance(Duration::milliseconds(820));
    bridge.track_timer_end(
        "viewTimer",
        Some(&DynamicMap::new().with("ProductID", 123456)),
    );

    let events = engine.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "viewTimer");
    assert_eq!(events[0].properties["ProductID"], json!(123456));
    assert_eq!(events[0].properties["event_duration"], json!(820));
    assert!(engine.pending_timers().is_empty());
}

#[test]
fn test_clear_before_end_suppresses_timed_event() {
    let (_clock, engine, bridge) = setup();

    bridge.track_timer_begin("viewTimer");
    bridge.track_timer_begin("otherTimer");
    assert_eq!(engine.pending_timers().len(), 2);

    bridge.clear_track_timer();
    assert!(engine.pending_timers().is_empty());

    bridge.track_timer_end(
        "viewTimer",
        Some(&DynamicMap::new().with("ProductID", 123456)),
    );
    bridge.track_timer_end("otherTimer", None);
    assert!(engine.events().is_empty());

    // A fresh begin after the clear times normally again
    bridge.track_timer_begin("viewTimer");
    bridge.track_timer_end("viewTimer", None);
    assert_eq!(engine.events().len(), 1);
}

#[test]
fn test_profile_increment_and_set_once() {
    let (_clock, engine, bridge) = setup();

    bridge.profile_increment("money", 10.0);
    assert_eq!(engine.profile()["money"], json!(10));
    bridge.profile_increment("money", 5.0);
    assert_eq!(engine.profile()["money"], json!(15));

    bridge.profile_set(Some(&DynamicMap::new().with("sex", "女")));
    bridge.profile_set_once(Some(&DynamicMap::new().with("sex", "男").with("city", "上海")));
    assert_eq!(engine.profile()["sex"], json!("女"));
    assert_eq!(engine.profile()["city"], json!("上海"));
}

#[test]
fn test_profile_set_drops_null_values() {
    let (_clock, engine, bridge) = setup();

    bridge.profile_set(Some(&DynamicMap::new().with("age", 30).with("nickname", DynamicValue::Null)));

    assert_eq!(engine.profile().len(), 1);
    assert!(!engine.profile().contains_key("nickname"));
}

#[test]
fn test_distinct_id_callbacks() {
    let (_clock, _engine, bridge) = setup();
    let successes = RefCell::new(Vec::new());
    let errors = RefCell::new(Vec::new());

    bridge.get_distinct_id(
        |id| successes.borrow_mut().push(id),
        |msg| errors.borrow_mut().push(msg),
    );
    bridge.login("user@x.com");
    bridge.get_distinct_id(
        |id| successes.borrow_mut().push(id),
        |msg| errors.borrow_mut().push(msg),
    );

    assert_eq!(
        successes.into_inner(),
        vec!["anon-device".to_string(), "user@x.com".to_string()]
    );
    assert!(errors.into_inner().is_empty());
}

#[test]
fn test_events_attributed_to_current_identity() {
    let (_clock, engine, bridge) = setup();

    bridge.track("before", None);
    bridge.login("developer@sensorsdata.cn");
    bridge.track("during", None);
    bridge.logout();
    bridge.track("after", None);

    let ids: Vec<_> = engine.events().into_iter().map(|e| e.distinct_id).collect();
    assert_eq!(
        ids,
        vec!["anon-device", "developer@sensorsdata.cn", "anon-device"]
    );
}

#[test]
fn test_events_written_to_sink() {
    let temp_dir = tempfile::tempdir().unwrap();
    let events_path = temp_dir.path().join("out").join("events.jsonl");

    let mut config = Config::default();
    config.engine.events_path = Some(events_path.clone());
    config.timer.unit = TimeUnit::Seconds;
    let engine = Arc::new(MemoryEngine::from_config(&config).unwrap());
    let bridge = Bridge::with_config(engine.clone(), &config.bridge);

    bridge.track("RN_AddToFav", Some(&DynamicMap::new().with("ProductID", 123456)));
    bridge.track_view_screen(None, Some(&DynamicMap::new().with("$title", "RN主页")));
    bridge.track_crash();

    let stored = read_events(&events_path).unwrap();
    assert_eq!(stored, engine.events());
    let kinds: Vec<_> = stored.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Track, EventKind::ViewScreen, EventKind::AppCrash]
    );
}

#[test]
fn test_concurrent_tracking_from_many_threads() {
    let engine = Arc::new(MemoryEngine::new());
    let bridge = Arc::new(Bridge::new(engine.clone()));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                for i in 0..25 {
                    let props = DynamicMap::new().with("thread", t).with("seq", i);
                    bridge.track("tick", Some(&props));
                    bridge.profile_increment("ticks", 1.0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.events().len(), 100);
    assert_eq!(engine.profile()["ticks"], json!(100));
}
