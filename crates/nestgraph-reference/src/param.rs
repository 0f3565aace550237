//! Schedulable parameter with an event timeline.
//!
//! Events are kept sorted by time. Events at the same time keep the order
//! they were scheduled in, so the later one wins when the timeline is read.
//!
//! # Example
//! ```
//! use nestgraph_reference::{ManualClock, ParameterRange, ReferenceParam};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new());
//! let gain = ReferenceParam::new("gain", "Gain#1", ParameterRange::positive(10.0, 1.0), clock);
//! gain.set_value_at_time(0.0, 0.0).unwrap();
//! gain.linear_ramp_to_value_at_time(1.0, 2.0).unwrap();
//! assert_eq!(gain.value_at(1.0), 0.5);
//! ```

use crate::clock::ManualClock;
use crate::lockfree::AtomicDouble;
use crate::range::ParameterRange;
use nestgraph_core::{BackendError, SchedulableParam};
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// How the value moves towards an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump at the event time.
    Step,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    pub time: f64,
    pub value: f64,
    pub ramp: Ramp,
}

#[derive(Debug)]
pub struct ReferenceParam {
    name: String,
    owner: String,
    range: ParameterRange,
    base: AtomicDouble,
    events: Mutex<Vec<ParamEvent>>,
    clock: Arc<ManualClock>,
}

impl ReferenceParam {
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        range: ParameterRange,
        clock: Arc<ManualClock>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            base: AtomicDouble::new(range.default),
            range,
            events: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Label of the owning leaf, e.g. `"Oscillator#3"`.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn range(&self) -> &ParameterRange {
        &self.range
    }

    /// Value before the first event.
    pub fn base_value(&self) -> f64 {
        self.base.get()
    }

    /// Replace the value before the first event, used for constructor args.
    pub fn set_base_value(&self, value: f64) -> Result<(), BackendError> {
        let value = self.checked(value)?;
        self.base.set(value);
        Ok(())
    }

    pub fn events(&self) -> Vec<ParamEvent> {
        self.events.lock().clone()
    }

    /// Value at the clock's current time.
    pub fn value(&self) -> f64 {
        self.value_at(self.clock.now())
    }

    pub fn value_at(&self, time: f64) -> f64 {
        let time = time.max(0.0);
        let events = self.events.lock();
        let mut prev_time = 0.0;
        let mut prev_value = self.base.get();
        for event in events.iter() {
            if event.time <= time {
                prev_time = event.time;
                prev_value = event.value;
                continue;
            }
            let progress = (time - prev_time) / (event.time - prev_time);
            return match event.ramp {
                Ramp::Step => prev_value,
                Ramp::Linear => prev_value + (event.value - prev_value) * progress,
                Ramp::Exponential if prev_value * event.value > 0.0 => {
                    prev_value * (event.value / prev_value).powf(progress)
                }
                Ramp::Exponential => prev_value,
            };
        }
        prev_value
    }

    pub fn set_value_at_time(&self, value: f64, time: f64) -> Result<(), BackendError> {
        self.insert(value, time, Ramp::Step)
    }

    pub fn linear_ramp_to_value_at_time(&self, value: f64, time: f64) -> Result<(), BackendError> {
        self.insert(value, time, Ramp::Linear)
    }

    pub fn exponential_ramp_to_value_at_time(
        &self,
        value: f64,
        time: f64,
    ) -> Result<(), BackendError> {
        if value == 0.0 {
            return Err(BackendError::InvalidArgument(format!(
                "{}: exponential ramp target must be non-zero",
                self.name
            )));
        }
        self.insert(value, time, Ramp::Exponential)
    }

    /// Remove every event at or after `time`.
    pub fn cancel_scheduled_values(&self, time: f64) {
        self.events.lock().retain(|event| event.time < time);
    }

    /// Ramp linearly from the current value to `value` over `duration`
    /// seconds, starting now.
    pub fn ramp_to(&self, value: f64, duration: f64) -> Result<(), BackendError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(BackendError::InvalidArgument(format!(
                "{}: ramp duration {duration} must be a non-negative number",
                self.name
            )));
        }
        let now = self.clock.now();
        self.set_value_at_time(self.value_at(now), now)?;
        self.linear_ramp_to_value_at_time(value, now + duration)
    }

    fn checked(&self, value: f64) -> Result<f64, BackendError> {
        if !value.is_finite() {
            return Err(BackendError::InvalidArgument(format!(
                "{}: value {value} is not finite",
                self.name
            )));
        }
        Ok(self.range.clamp(value))
    }

    fn insert(&self, value: f64, time: f64, ramp: Ramp) -> Result<(), BackendError> {
        let value = self.checked(value)?;
        if !time.is_finite() || time < 0.0 {
            return Err(BackendError::InvalidArgument(format!(
                "{}: time {time} must be a non-negative number",
                self.name
            )));
        }
        let mut events = self.events.lock();
        let at = events.partition_point(|event| event.time <= time);
        events.insert(at, ParamEvent { time, value, ramp });
        tracing::trace!(param = %self.name, owner = %self.owner, value, time, ?ramp, "Scheduled");
        Ok(())
    }
}

fn number(operation: &str, args: &[Value], idx: usize) -> Result<f64, BackendError> {
    args.get(idx).and_then(Value::as_f64).ok_or_else(|| {
        BackendError::InvalidArgument(format!(
            "{operation} expects a number at argument {idx}, got {}",
            args.get(idx).map(Value::to_string).unwrap_or_else(|| "nothing".to_string())
        ))
    })
}

impl SchedulableParam for ReferenceParam {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule_value_at_time(&self, value: f64, time: f64) -> Result<(), BackendError> {
        self.set_value_at_time(value, time)
    }

    fn cancel_scheduled_changes(&self) -> Result<(), BackendError> {
        let now = self.clock.now();
        self.events.lock().retain(|event| event.time <= now);
        Ok(())
    }

    fn call(&self, operation: &str, args: &[Value]) -> Result<(), BackendError> {
        match operation {
            "setValueAtTime" => {
                self.set_value_at_time(number(operation, args, 0)?, number(operation, args, 1)?)
            }
            "linearRampToValueAtTime" => self.linear_ramp_to_value_at_time(
                number(operation, args, 0)?,
                number(operation, args, 1)?,
            ),
            "exponentialRampToValueAtTime" => self.exponential_ramp_to_value_at_time(
                number(operation, args, 0)?,
                number(operation, args, 1)?,
            ),
            "cancelScheduledValues" => {
                self.cancel_scheduled_values(number(operation, args, 0)?);
                Ok(())
            }
            "rampTo" => self.ramp_to(number(operation, args, 0)?, number(operation, args, 1)?),
            other => Err(BackendError::UnknownOperation(other.to_string())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
