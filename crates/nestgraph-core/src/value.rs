//! Helpers over dynamic `serde_json::Value` payloads.

use serde_json::Value;

/// Compact JSON rendering used in log text.
pub(crate) fn display(value: &Value) -> String {
    value.to_string()
}

/// Non-negative whole number that can address a content slot. Floats such
/// as `1.0` count.
pub(crate) fn slot_index(value: &Value) -> Option<usize> {
    if let Some(idx) = value.as_u64() {
        return usize::try_from(idx).ok();
    }
    value
        .as_f64()
        .filter(|idx| idx.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(idx))
        .map(|idx| idx as usize)
}

/// Lists and mappings are passed whole as init payloads.
pub(crate) fn is_container(value: &Value) -> bool {
    value.is_array() || value.is_object()
}
