/// Valid range and default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    /// Clamped into `[min, max]`.
    pub default: f64,
}

impl ParameterRange {
    pub fn new(min: f64, max: f64, default: f64) -> Self {
        debug_assert!(max >= min, "max must not be less than min");
        Self {
            min,
            max,
            default: default.clamp(min, max),
        }
    }

    /// Any finite value.
    pub fn unbounded(default: f64) -> Self {
        Self::new(f64::MIN, f64::MAX, default)
    }

    /// `[0, max]`, for gains and rates.
    pub fn positive(max: f64, default: f64) -> Self {
        Self::new(0.0, max, default)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self::unbounded(0.0)
    }
}
