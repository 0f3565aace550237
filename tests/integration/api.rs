//! API composition and init integration tests

use crate::helpers::*;
use nestgraph::prelude::*;
use nestgraph::{same_param, ApiDirective, LogLevel, Slot};
use std::sync::Arc;

#[test]
fn test_copy_replicates_child_api() {
    let fx = fixture();
    let voice = fx.build("voice", Value::Null);

    let params: Vec<&str> = voice.params().keys().map(String::as_str).collect();
    let consts: Vec<&str> = voice.consts().keys().map(String::as_str).collect();
    assert_eq!(params, vec!["amp.volume", "freq"]);
    assert_eq!(consts, vec!["wave"]);

    let osc1 = voice.slot(0).and_then(Slot::as_nested).expect("osc1");
    assert!(same_param(voice.param("freq").unwrap(), osc1.param("freq").unwrap()));
    assert!(Arc::ptr_eq(
        voice.constant("wave").unwrap(),
        osc1.constant("wave").unwrap()
    ));
}

#[test]
fn test_three_level_api_with_prefixes() {
    let fx = fixture();
    let poly = fx.build("poly", Value::Null);

    let params: Vec<&str> = poly.params().keys().map(String::as_str).collect();
    assert_eq!(
        params,
        vec!["a.amp.volume", "a.freq", "b.amp.volume", "b.freq", "rate"]
    );
    assert_eq!(poly.consts().len(), 2);
    assert!(poly.constant("a.wave").is_some());
    assert!(poly.constant("b.wave").is_some());

    let (param, constant) = poly.api_entry("rate");
    assert!(param.is_some() && constant.is_none());
    assert!(!same_param(poly.param("a.freq").unwrap(), poly.param("b.freq").unwrap()));
}

#[test]
fn test_expand_api_lists_consts_before_params() {
    let fx = fixture();
    let voice = fx.build("voice", Value::Null);

    let bindings = voice.expand_api(&[
        ApiDirective::copy(0, Some("x.")),
        ApiDirective::expose("gain", 1, "volume"),
    ]);
    let labels: Vec<(&str, usize, &str)> = bindings
        .iter()
        .map(|b| (b.label.as_str(), b.slot, b.inner.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![("x.wave", 0, "wave"), ("x.freq", 0, "freq"), ("gain", 1, "volume")]
    );
    assert_eq!(bindings[2].directive, 1);
}

#[test]
fn test_label_collision_last_entry_wins() {
    let fx = fixture_with(
        r#"{
            "clash": {
                "level": 1,
                "contents": ["Backend.Oscillator"],
                "output": 0,
                "api": [["x", 0, "frequency"], ["x", 0, "type"]]
            }
        }"#,
    );
    let node = fx.build("clash", Value::Null);

    assert!(node.is_ready());
    assert!(node.param("x").is_none());
    assert_eq!(node.constant("x").map(|c| c.value()), Some(json!("sine")));
    assert!(fx
        .sink
        .contains(LogLevel::Warn, "API label x registered again, later entry wins"));
}

#[test]
fn test_bad_api_entries_are_skipped() {
    let fx = fixture_with(
        r#"{
            "osc": {
                "level": 1,
                "contents": ["Backend.Oscillator"],
                "output": 0,
                "api": [["freq", 0, "frequency"]]
            },
            "noisy": {
                "level": 2,
                "contents": ["osc", "Backend.Gain"],
                "output": 1,
                "api": [
                    "junk",
                    ["ghost", 0, "missing"],
                    ["far", 7, "gain"],
                    {"copy": 1},
                    {"copy": 0, "prefix": 5},
                    ["volume", 1, "gain"]
                ]
            }
        }"#,
    );
    let node = fx.build("noisy", Value::Null);

    assert!(node.is_ready());
    let params: Vec<&str> = node.params().keys().map(String::as_str).collect();
    assert_eq!(params, vec!["volume"]);

    assert!(fx
        .sink
        .contains(LogLevel::Error, "should be [label, index, label] or {copy, prefix}"));
    assert!(fx.sink.contains(LogLevel::Error, "did not find missing inside osc"));
    assert!(fx.sink.contains(LogLevel::Error, "api slot 7 is not populated"));
    assert!(fx.sink.contains(LogLevel::Warn, "exposes nothing, it is not nested"));
    assert!(fx.sink.contains(LogLevel::Error, "prefix 5 is not a string"));
}

#[test]
fn test_init_overrides_params_and_consts() {
    let fx = fixture();
    let voice = fx.build(
        "voice",
        json!({"freq": 220, "wave": "square", "amp.volume": 0.25}),
    );
    assert!(fx.sink.errors().is_empty(), "errors: {:?}", error_lines(&fx.sink));

    let osc = voice
        .slot(0)
        .and_then(Slot::as_nested)
        .and_then(|n| n.output())
        .expect("oscillator");
    let osc = reference(osc);
    assert_eq!(osc.param("frequency").map(|p| p.value()), Some(220.0));
    assert_eq!(osc.constant("type"), Some(json!("square")));
    assert_eq!(voice.constant("wave").map(|c| c.value()), Some(json!("square")));

    let gain = reference(voice.output().expect("gain"));
    assert_eq!(gain.param("gain").map(|p| p.value()), Some(0.25));
}

#[test]
fn test_content_init_reaches_leaf_constructor() {
    let fx = fixture();
    let voice = fx.build("voice", Value::Null);

    let gain = reference(voice.output().expect("gain"));
    assert_eq!(gain.param("gain").map(|p| p.base_value()), Some(0.5));
}

#[test]
fn test_empty_init_shapes_are_noops() {
    let fx = fixture();
    for init in [Value::Null, json!({}), json!([])] {
        let node = fx.build("osc1", init);
        assert!(node.is_ready());
    }
    assert!(fx.sink.errors().is_empty(), "errors: {:?}", error_lines(&fx.sink));
}

#[test]
fn test_bad_init_is_logged_per_key() {
    let fx = fixture();
    let node = fx.build("osc1", json!({"nope": 1, "freq": "loud", "wave": "triangle"}));

    assert!(node.is_ready());
    assert!(fx.sink.contains(LogLevel::Error, "init of nope"));
    assert!(fx
        .sink
        .contains(LogLevel::Error, "value \"loud\" for param freq is not a number"));
    assert_eq!(node.constant("wave").map(|c| c.value()), Some(json!("triangle")));

    fx.sink.clear();
    let listed = fx.build("osc1", json!([1, 2]));
    assert!(listed.is_ready());
    assert!(fx.sink.contains(LogLevel::Error, "require an object instead"));
}

#[test]
fn test_set_values_after_construction() {
    let fx = fixture();
    let node = fx.build("osc1", Value::Null);
    let osc = reference(node.output().expect("oscillator"));

    fx.backend.clock().advance(2.0);
    assert!(node.set_param_value("freq", 330.0));
    assert_eq!(osc.param("frequency").map(|p| p.value()), Some(330.0));
    assert_eq!(osc.param("frequency").map(|p| p.value_at(1.0)), Some(440.0));

    assert!(node.set_const_value("wave", json!("sawtooth")));
    assert_eq!(osc.constant("type"), Some(json!("sawtooth")));

    assert!(!node.set_param_value("missing", 1.0));
    assert!(!node.set_const_value("wave", json!(12)));
    assert_eq!(osc.constant("type"), Some(json!("sawtooth")));
    assert!(fx.sink.contains(LogLevel::Error, "not found param missing"));
}
