//! Built-in leaf types.

use crate::leaf::LeafSpec;
use crate::range::ParameterRange;
use crate::registry::LeafRegistry;
use serde_json::json;

const NYQUIST: f64 = 22050.0;

pub(crate) fn register_builtin_leaves(registry: &LeafRegistry) {
    // =========================================================================
    // Sources
    // =========================================================================

    registry.register_spec(
        LeafSpec::new("Oscillator")
            .param("frequency", ParameterRange::new(-NYQUIST, NYQUIST, 440.0))
            .param("detune", ParameterRange::new(-1200.0, 1200.0, 0.0))
            .constant("type", json!("sine"))
            .constant("phase", json!(0))
            .positional(&["frequency", "type"])
            .io(0, 1)
            .startable(true),
    );

    registry.register_spec(
        LeafSpec::new("LFO")
            .param("frequency", ParameterRange::positive(1000.0, 1.0))
            .param("amplitude", ParameterRange::positive(1.0, 1.0))
            .constant("type", json!("sine"))
            .constant("min", json!(0))
            .constant("max", json!(1))
            .positional(&["frequency", "min", "max"])
            .io(0, 1)
            .startable(true),
    );

    registry.register_spec(
        LeafSpec::new("Signal")
            .param("value", ParameterRange::unbounded(0.0))
            .constant("units", json!("number"))
            .positional(&["value", "units"]),
    );

    // =========================================================================
    // Processors
    // =========================================================================

    registry.register_spec(
        LeafSpec::new("Gain")
            .param("gain", ParameterRange::unbounded(1.0))
            .positional(&["gain"]),
    );

    registry.register_spec(
        LeafSpec::new("Filter")
            .param("frequency", ParameterRange::positive(NYQUIST, 350.0))
            .param("Q", ParameterRange::new(0.0001, 1000.0, 1.0))
            .param("gain", ParameterRange::new(-40.0, 40.0, 0.0))
            .constant("type", json!("lowpass"))
            .constant("rolloff", json!(-12))
            .positional(&["frequency", "type", "rolloff"]),
    );

    registry.register_spec(
        LeafSpec::new("Envelope")
            .constant("attack", json!(0.01))
            .constant("decay", json!(0.1))
            .constant("sustain", json!(0.5))
            .constant("release", json!(1))
            .positional(&["attack", "decay", "sustain", "release"])
            .io(0, 1),
    );
}

/// The shared output sink. Created once per backend, never registered.
pub(crate) fn master_spec() -> LeafSpec {
    LeafSpec::new("Master")
        .param("volume", ParameterRange::new(-100.0, 24.0, 0.0))
        .constant("mute", json!(false))
        .io(1, 0)
        .disposable(false)
}
