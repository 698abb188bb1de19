//! Deterministic time for process sessions.
//!
//! Session clocks use Q32.32 fixed-point seconds so that identical tick
//! sequences produce identical elapsed values on every platform. Floats
//! never enter the state machine.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Elapsed process time, in fixed-point seconds.
pub type Seconds = Fixed64;

/// Convert an f64 to Seconds. Use only for initialization, never in the tick loop.
#[inline]
pub fn secs(v: f64) -> Seconds {
    Seconds::from_num(v)
}

// ---------------------------------------------------------------------------
// Processing phase
// ---------------------------------------------------------------------------

/// A session's position relative to its recipe's time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Elapsed time has not reached the window minimum.
    BeforeMin,
    /// Elapsed time is inside the window. Recipes without a window are
    /// always in this phase.
    InWindow,
    /// Elapsed time has passed the window maximum.
    AfterMax,
}

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// Errors raised when constructing a [`TimeWindow`].
#[derive(Debug, thiserror::Error)]
pub enum TimeWindowError {
    #[error("window minimum is negative: {0}")]
    NegativeMin(Seconds),

    #[error("window maximum {max} is below minimum {min}")]
    Inverted { min: Seconds, max: Seconds },
}

/// The `[min, max]` seconds a timed recipe is meant to run for.
///
/// Completion is reached at `min`; running past `max` puts the session in
/// [`Phase::AfterMax`] (over-processing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    min: Seconds,
    max: Seconds,
}

impl TimeWindow {
    /// Validated constructor. `min` must be non-negative and `max >= min`.
    pub fn new(min: Seconds, max: Seconds) -> Result<Self, TimeWindowError> {
        if min < 0 {
            return Err(TimeWindowError::NegativeMin(min));
        }
        if max < min {
            return Err(TimeWindowError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Seconds {
        self.min
    }

    pub fn max(&self) -> Seconds {
        self.max
    }

    pub fn before_min(&self, t: Seconds) -> bool {
        t < self.min
    }

    pub fn after_max(&self, t: Seconds) -> bool {
        t > self.max
    }

    pub fn in_window(&self, t: Seconds) -> bool {
        t >= self.min && t <= self.max
    }

    /// Phase of a session that has run for `t` seconds.
    pub fn phase(&self, t: Seconds) -> Phase {
        if self.before_min(t) {
            Phase::BeforeMin
        } else if self.after_max(t) {
            Phase::AfterMax
        } else {
            Phase::InWindow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_negative_min() {
        assert!(TimeWindow::new(secs(-1.0), secs(5.0)).is_err());
    }

    #[test]
    fn window_rejects_max_below_min() {
        let err = TimeWindow::new(secs(4.0), secs(2.0));
        assert!(matches!(err, Err(TimeWindowError::Inverted { .. })));
    }

    #[test]
    fn zero_length_window_is_valid() {
        let w = TimeWindow::new(secs(3.0), secs(3.0)).unwrap();
        assert_eq!(w.phase(secs(3.0)), Phase::InWindow);
        assert_eq!(w.phase(secs(3.5)), Phase::AfterMax);
    }

    #[test]
    fn phase_boundaries_are_inclusive() {
        let w = TimeWindow::new(secs(2.0), secs(6.0)).unwrap();
        assert_eq!(w.phase(secs(0.0)), Phase::BeforeMin);
        assert_eq!(w.phase(secs(2.0)), Phase::InWindow);
        assert_eq!(w.phase(secs(6.0)), Phase::InWindow);
        assert_eq!(w.phase(secs(6.0) + Seconds::DELTA), Phase::AfterMax);
    }

    #[test]
    fn fixed_point_accumulation_is_deterministic() {
        let step = secs(1.0) / 3;
        let mut a = secs(0.0);
        let mut b = secs(0.0);
        for _ in 0..30 {
            a += step;
            b += step;
        }
        assert_eq!(a, b);
    }
}
