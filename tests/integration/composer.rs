//! Composer integration tests
//!
//! Library loading, backend defaults and namespace configuration.

use crate::helpers::*;
use nestgraph::prelude::*;
use nestgraph::{ComposeError, LogLevel, Slot};
use std::sync::Arc;

#[test]
fn test_composer_with_default_backend() {
    let composer = Composer::builder()
        .library_json(SAMPLE_LIBRARY)
        .build()
        .expect("Failed to create composer");

    assert_eq!(composer.library().len(), 6);
    let voice = composer.build("voice", json!({"freq": 110}));
    assert!(voice.is_ready());
    assert_eq!(composer.backend().now(), 0.0);
}

#[test]
fn test_composer_shares_backend_and_sink() {
    let fx = fixture();
    let composer = fx.composer();

    let a = composer.build("osc1", Value::Null);
    let b = composer.build_at("osc1", Value::Null, "7");
    assert!(a.is_ready() && b.is_ready());
    assert_eq!(b.path(), "7");
    assert!(fx
        .sink
        .records()
        .iter()
        .any(|r| r.path.starts_with("7.1")));

    // Two oscillators from the same registry.
    let a_id = reference(a.output().unwrap()).id();
    let b_id = reference(b.output().unwrap()).id();
    assert_ne!(a_id, b_id);
}

#[test]
fn test_library_json_errors() {
    let broken = Composer::builder().library_json("{not json").build();
    assert!(matches!(broken, Err(Error::Json(_))));

    let listed = Composer::builder().library_json("[1, 2]").build();
    assert!(matches!(listed, Err(Error::Json(_))));
}

#[test]
fn test_invalid_config_rejected() {
    let config = ComposerConfig {
        namespace: String::new(),
        ..ComposerConfig::default()
    };
    let result = Composer::builder().config(config).build();
    assert!(matches!(
        result,
        Err(Error::Compose(ComposeError::InvalidConfig(_)))
    ));
}

#[test]
fn test_custom_namespace() {
    let sink = Arc::new(MemorySink::new());
    let composer = Composer::builder()
        .library_json(
            r#"{
                "tone_voice": {
                    "level": 1,
                    "contents": ["Tone.Oscillator", "Tone.Master"],
                    "connect": [[[0], [1]]],
                    "output": 0,
                    "api": [["freq", 0, "frequency"]]
                },
                "legacy": {"level": 1, "contents": ["Backend.Oscillator"]}
            }"#,
        )
        .namespace("Tone")
        .log_sink(sink.clone())
        .build()
        .expect("Failed to create composer");

    let voice = composer.build("tone_voice", Value::Null);
    assert!(voice.is_ready());
    assert_eq!(voice.slot(1).and_then(Slot::as_leaf).map(|l| l.type_name()), Some("Master"));
    assert_eq!(voice.connects().len(), 1);

    // Outside the namespace the name is looked up as a template.
    let legacy = composer.build("legacy", Value::Null);
    assert!(!legacy.is_ready());
    assert!(sink.contains(LogLevel::Error, "template Backend.Oscillator not found in library"));
}

#[test]
fn test_node_builder_falls_back_on_bad_config() {
    let fx = fixture();
    let config = ComposerConfig {
        root_path: String::new(),
        ..ComposerConfig::default()
    };
    let node = NestedNode::builder(fx.backend.clone())
        .library(&fx.library)
        .node_type("osc1")
        .config(config)
        .log_sink(fx.sink.clone())
        .build();

    assert!(node.is_ready());
    assert_eq!(node.path(), "1");
    assert!(fx.sink.contains(LogLevel::Warn, "using default config"));
}
