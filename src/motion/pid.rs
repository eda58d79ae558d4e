//! PID control core.
//!
//! This module provides the generic PID controller used by every motion kind
//! in the chassis executor. Each active motion owns its own [`Pid`] instance;
//! gains are copied out of the chassis configuration when the motion request
//! is created, so tuning changes never disturb a motion in flight.
//!
//! # Anti-windup
//!
//! The integral term accumulates only while `|error| < start_i`. Far from the
//! target the proportional term dominates anyway, and accumulating there
//! would wind the integrator up into a large overshoot once the robot
//! arrives. A `start_i` of zero disables the integral term entirely.

/// Gains for one PID controller.
///
/// One set of constants exists per motion kind (drive, heading-hold, turn,
/// swing, odom-angular, odom-boomerang) in the chassis configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidConstants {
    /// Proportional gain.
    ///
    /// Higher values increase response speed but may cause overshoot.
    /// Start tuning with this value.
    pub kp:      f64,
    /// Integral gain.
    ///
    /// Helps eliminate steady-state error. Usually set to 0 unless
    /// the robot consistently undershoots targets.
    pub ki:      f64,
    /// Derivative gain.
    ///
    /// Dampens oscillations and reduces overshoot. Add after Kp is tuned.
    pub kd:      f64,
    /// Error band inside which the integral is allowed to accumulate.
    ///
    /// Zero disables integration.
    pub start_i: f64,
}

impl PidConstants {
    pub fn new(kp: f64, ki: f64, kd: f64, start_i: f64) -> Self {
        Self { kp, ki, kd, start_i }
    }

    /// Constants for a PD controller (no integral term).
    pub fn pd(kp: f64, kd: f64) -> Self {
        Self {
            kp,
            ki: 0.0,
            kd,
            start_i: 0.0,
        }
    }
}

/// A single PID controller instance.
///
/// Owns its accumulated integral and previous error exclusively; instances
/// are never shared across motion kinds. Output is unclamped here — speed
/// limiting is the motion executor's job.
#[derive(Clone, Debug)]
pub struct Pid {
    constants:  PidConstants,
    integral:   f64,
    prev_error: f64,
    /// Seconds per control tick.
    dt:         f64,
}

impl Pid {
    pub fn new(constants: PidConstants, dt: f64) -> Self {
        Self {
            constants,
            integral: 0.0,
            prev_error: 0.0,
            dt,
        }
    }

    /// Computes the control output for the current error.
    ///
    /// Call once per control tick. The derivative is taken against the error
    /// from the previous call.
    pub fn update(&mut self, error: f64) -> f64 {
        if error.abs() < self.constants.start_i {
            self.integral += error * self.dt;
        }

        let derivative = (error - self.prev_error) / self.dt;
        self.prev_error = error;

        self.constants.kp * error +
            self.constants.ki * self.integral +
            self.constants.kd * derivative
    }

    /// Zeroes the integral and previous-error state, as if freshly created.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.005;

    #[test]
    fn proportional_only() {
        let mut pid = Pid::new(PidConstants::pd(2.0, 0.0), DT);
        assert_eq!(pid.update(3.0), 6.0);
        assert_eq!(pid.update(3.0), 6.0);
    }

    #[test]
    fn integral_held_outside_start_i_band() {
        let mut pid = Pid::new(PidConstants::new(0.0, 1.0, 0.0, 5.0), DT);
        // Error at or beyond start_i: the accumulator must not move.
        pid.update(5.0);
        pid.update(20.0);
        assert_eq!(pid.integral, 0.0);
        // Inside the band it accumulates.
        pid.update(4.0);
        assert!((pid.integral - 4.0 * DT).abs() < 1e-12);
    }

    #[test]
    fn derivative_tracks_error_change() {
        let mut pid = Pid::new(PidConstants::pd(0.0, 1.0), DT);
        pid.update(1.0);
        let out = pid.update(0.5);
        assert!((out - (-0.5 / DT)).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_state() {
        let mut pid = Pid::new(PidConstants::new(1.0, 1.0, 1.0, 10.0), DT);
        pid.update(2.0);
        pid.update(1.0);
        pid.reset();
        // After a reset the first update behaves like the first ever update.
        let out = pid.update(2.0);
        let expected = 2.0 + 1.0 * (2.0 * DT) + (2.0 / DT);
        assert!((out - expected).abs() < 1e-9);
    }
}
