//! Slew-rate limiting for motion output.
//!
//! Caps how fast the commanded output may change once the remaining error
//! drops inside a configured window, turning the final approach into a ramp
//! instead of a step. Outside the window, and whenever slew is disabled on
//! the motion request, the requested output passes through untouched.

use super::ConfigError;

/// Window and per-tick step bound for one motion kind.
#[derive(Clone, Copy, Debug)]
pub struct SlewConstants {
    /// Remaining distance/angle inside which the ramp applies.
    window:   f64,
    /// Maximum output change per control tick, in volts.
    max_step: f64,
}

impl SlewConstants {
    pub fn new(window: f64, max_step: f64) -> Result<Self, ConfigError> {
        if !(window > 0.0) || !window.is_finite() {
            return Err(ConfigError::BadSlewWindow(window));
        }
        if !(max_step > 0.0) || !max_step.is_finite() {
            return Err(ConfigError::BadSlewStep(max_step));
        }
        Ok(Self { window, max_step })
    }

    pub fn window(&self) -> f64 { self.window }

    pub fn max_step(&self) -> f64 { self.max_step }
}

/// Per-motion slew state.
///
/// Tracks the last shaped output so the next tick's change can be bounded.
/// Created fresh, seeded at zero output, for every motion request.
#[derive(Clone, Copy, Debug)]
pub struct Slew {
    constants: SlewConstants,
    enabled:   bool,
    last:      f64,
}

impl Slew {
    pub fn new(constants: SlewConstants, enabled: bool) -> Self {
        Self {
            constants,
            enabled,
            last: 0.0,
        }
    }

    /// Shapes `requested` given the remaining error to the target.
    ///
    /// The ramp only engages while `remaining` is inside the window; the
    /// tracked output still follows `requested` outside it so the ramp
    /// starts from the live command rather than a stale one.
    pub fn shape(&mut self, requested: f64, remaining: f64) -> f64 {
        if !self.enabled || remaining.abs() > self.constants.window {
            self.last = requested;
            return requested;
        }

        let step = (requested - self.last).clamp(-self.constants.max_step, self.constants.max_step);
        self.last += step;
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slew(enabled: bool) -> Slew {
        Slew::new(SlewConstants::new(3.0, 0.5).unwrap(), enabled)
    }

    #[test]
    fn passes_through_outside_window() {
        let mut s = slew(true);
        assert_eq!(s.shape(12.0, 24.0), 12.0);
        assert_eq!(s.shape(-8.0, 10.0), -8.0);
    }

    #[test]
    fn ramps_inside_window() {
        let mut s = slew(true);
        s.shape(6.0, 20.0);
        // Remaining error enters the 3-unit window; each tick may move the
        // output by at most 0.5.
        assert_eq!(s.shape(2.0, 2.5), 5.5);
        assert_eq!(s.shape(2.0, 2.0), 5.0);
        assert_eq!(s.shape(2.0, 1.5), 4.5);
    }

    #[test]
    fn small_changes_unaffected_inside_window() {
        let mut s = slew(true);
        s.shape(4.0, 10.0);
        assert_eq!(s.shape(4.2, 2.0), 4.2);
    }

    #[test]
    fn disabled_is_transparent() {
        let mut s = slew(false);
        assert_eq!(s.shape(12.0, 0.1), 12.0);
        assert_eq!(s.shape(-12.0, 0.1), -12.0);
    }

    #[test]
    fn rejects_bad_constants() {
        assert!(matches!(
            SlewConstants::new(0.0, 1.0),
            Err(ConfigError::BadSlewWindow(_))
        ));
        assert!(matches!(
            SlewConstants::new(3.0, -1.0),
            Err(ConfigError::BadSlewStep(_))
        ));
    }
}
