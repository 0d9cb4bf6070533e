//! Explicit time handle passed to time-dependent operators.

use sg_core::units::Time;
use sg_core::Real;

use crate::error::{FvmError, FvmResult};

/// Current time level.
///
/// `value` is the time at the *new* level, i.e. the level being solved for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeState {
    pub value: Real,
    pub delta_t: Real,
    pub index: usize,
}

impl TimeState {
    pub fn new(delta_t: Time) -> FvmResult<Self> {
        let dt = delta_t.value;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(FvmError::InvalidArg {
                what: "time step must be positive and finite",
            });
        }
        Ok(Self {
            value: dt,
            delta_t: dt,
            index: 1,
        })
    }

    /// Move to the next time level.
    pub fn advance(&mut self) {
        self.value += self.delta_t;
        self.index += 1;
    }
}
