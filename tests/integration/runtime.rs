//! Runtime integration tests
//!
//! Lifecycle propagation through nested trees and parameter operations.

use crate::helpers::*;
use approx::assert_relative_eq;
use nestgraph::prelude::*;
use nestgraph::{Lifecycle, LogLevel, Slot};

#[test]
fn test_start_and_stop_reach_every_level() {
    let fx = fixture();
    let poly = fx.build("poly", Value::Null);
    let leaves = collect_leaves(&poly);

    poly.start(&[json!(0.5)]);
    for leaf in &leaves {
        let leaf = reference(leaf);
        match leaf.spec().type_name.as_str() {
            "Oscillator" | "LFO" => {
                assert!(leaf.is_started(), "{} should be started", leaf.label());
                assert_eq!(leaf.last_args(Lifecycle::Start), Some(vec![json!(0.5)]));
            }
            _ => assert!(!leaf.is_started()),
        }
    }
    // Unsupported operations are skipped quietly.
    assert!(fx.sink.errors().is_empty(), "errors: {:?}", error_lines(&fx.sink));

    poly.stop(&[]);
    assert!(leaves.iter().all(|leaf| !reference(leaf).is_started()));
}

#[test]
fn test_dispose_three_level_tree() {
    let fx = fixture();
    let mut poly = fx.build("poly", Value::Null);
    let leaves = collect_leaves(&poly);
    assert_eq!(leaves.len(), 7);

    poly.dispose(&[]);

    let master = fx.backend.master();
    for leaf in &leaves {
        let leaf = reference(leaf);
        if leaf.id() == master.id() {
            assert!(!leaf.is_disposed(), "the reference master refuses dispose");
        } else {
            assert!(leaf.is_disposed(), "{} should be disposed", leaf.label());
        }
    }
    // Both voices handed their master slot to the backend.
    let refusals = fx
        .sink
        .at_level(LogLevel::Trace)
        .into_iter()
        .filter(|r| r.text.contains("dispose skipped for slot 2: Master does not support dispose"))
        .count();
    assert_eq!(refusals, 2);
    assert!(poly.contents().is_empty());
    assert!(poly.params().is_empty());
    assert!(poly.consts().is_empty());
    assert!(poly.node_type().is_none());
    assert!(matches!(poly.state(), NodeState::Reset));
    assert_eq!(poly.path(), "1");

    // A second dispose has nothing left to do.
    poly.dispose(&[]);
    assert!(fx.sink.errors().is_empty());
}

#[test]
fn test_dispose_after_partial_construction() {
    let fx = fixture_with(
        r#"{
            "half": {"level": 1, "contents": ["Backend.Oscillator", "Backend.Transport"]}
        }"#,
    );
    let mut node = fx.build("half", Value::Null);
    assert!(!node.is_ready());

    let osc = node.slot(0).and_then(Slot::as_leaf).cloned().expect("oscillator built");
    node.dispose(&[]);
    assert!(reference(&osc).is_disposed());
    assert!(node.contents().is_empty());
}

#[test]
fn test_update_param_operations() {
    let fx = fixture();
    let node = fx.build("osc1", Value::Null);
    let osc = reference(node.output().expect("oscillator"));
    let frequency = osc.param("frequency").expect("frequency").clone();

    assert!(node.update_param("freq", "linearRampToValueAtTime", &[json!(880), json!(1.0)]));
    assert_relative_eq!(frequency.value_at(0.5), 660.0);
    assert_relative_eq!(frequency.value_at(1.0), 880.0);

    assert!(node.update_param("freq", "setValueAtTime", &[json!(100), json!(3.0)]));
    assert_eq!(frequency.events().len(), 2);

    fx.backend.clock().advance(2.0);
    node.cancel_scheduled_values();
    assert_eq!(frequency.events().len(), 1);
    assert_relative_eq!(frequency.value(), 880.0);
}

#[test]
fn test_update_param_failures_are_logged() {
    let fx = fixture();
    let node = fx.build("osc1", Value::Null);

    assert!(!node.update_param("", "setValueAtTime", &[]));
    assert!(fx
        .sink
        .contains(LogLevel::Error, "should receive a label and an operation"));

    assert!(!node.update_param("nope", "setValueAtTime", &[json!(1), json!(0)]));
    assert!(fx.sink.contains(LogLevel::Error, "not found param nope"));

    assert!(!node.update_param("freq", "wobble", &[]));
    assert!(fx
        .sink
        .contains(LogLevel::Error, "found param freq, cannot call wobble"));

    assert!(!node.update_param("freq", "exponentialRampToValueAtTime", &[json!(0), json!(1)]));
    assert!(fx
        .sink
        .contains(LogLevel::Error, "backend threw error when moving param on freq"));
}

#[test]
fn test_ramp_to_from_current_value() {
    let fx = fixture();
    let node = fx.build("osc1", json!({"freq": 200}));
    let osc = reference(node.output().expect("oscillator"));
    let frequency = osc.param("frequency").expect("frequency").clone();

    fx.backend.clock().set(1.0);
    assert!(node.update_param("freq", "rampTo", &[json!(400), json!(2.0)]));
    assert_relative_eq!(frequency.value_at(2.0), 300.0);
    assert_relative_eq!(frequency.value_at(3.0), 400.0);
}
