//! Motion request and state types for the chassis executor.
//!
//! Each motion kind is a variant of [`MotionTarget`]; the [`MotionRequest`]
//! wrapping it carries its own PID instances, exit evaluator, and slew
//! limiter, all snapshotted from the chassis configuration when the request
//! is created. There is no shared controller state between consecutive
//! motions.

use crate::motion::{exit::ExitEvaluator, pid::Pid, slew::Slew};

/// Which side of the drivetrain a swing drives.
///
/// The named side moves; the opposite side is held at the still speed and
/// the robot pivots around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SwingSide {
    Left,
    Right,
}

/// Turn-direction tie-break policy for heading targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AngleBehavior {
    /// Take the shorter arc to the target heading.
    Shortest,
    /// Always turn clockwise.
    Clockwise,
    /// Always turn counterclockwise.
    CounterClockwise,
    /// Use the raw signed difference without wrapping.
    Raw,
}

/// Lifecycle of the active motion.
///
/// At most one non-idle motion exists per chassis at a time; drive, turn,
/// and swing are mutually exclusive on the drive axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionState {
    /// No motion has run, or the chassis was disabled.
    Idle,
    /// A motion is executing.
    Active,
    /// The error is inside an exit tier's tolerance and its settle timer is
    /// running.
    Settling,
    /// A quick-chain wait released the caller; the motion is still moving
    /// and the next `set` call replaces it without an intervening stop.
    Chained,
    /// The last motion settled or timed out and released the motors.
    Done,
}

/// What the motion is trying to reach.
#[derive(Clone, Copy, Debug)]
pub enum MotionTarget {
    /// Relative straight drive, inches. Holds the heading captured at
    /// request creation.
    Distance { inches: f64, hold_rotation: f64 },
    /// Absolute turn to a pre-resolved continuous rotation, degrees.
    Heading { rotation: f64 },
    /// Swing to a pre-resolved rotation, one side held still.
    Swing {
        rotation:    f64,
        side:        SwingSide,
        still_speed: f64,
    },
    /// Odometry-guided drive to a field point.
    Point { x: f64, y: f64, reverse: bool },
    /// Odometry-guided boomerang approach to a full pose, with the lead
    /// fraction and carrot cap snapshotted at request creation.
    Pose {
        x:               f64,
        y:               f64,
        heading:         f64,
        dlead:           f64,
        carrot_distance: f64,
    },
}

/// One in-flight motion: the target plus every controller it owns.
///
/// Created by a `set` call, consumed by the control loop, discarded on
/// completion or cancel-and-replace.
pub struct MotionRequest {
    pub target: MotionTarget,
    /// Primary controller: linear for drives, angular for turns/swings.
    pub pid: Pid,
    /// Secondary angular controller for two-axis motions (heading-hold on
    /// straight drives, odom-angular/boomerang on odometry motions).
    pub angular_pid: Option<Pid>,
    pub exit: ExitEvaluator,
    pub slew: Slew,
    /// Loose error threshold that releases a quick-chain wait.
    pub chain_tolerance: f64,
    /// Angular-over-linear weighting for odometry motions.
    pub turn_bias: f64,
    /// Latched once the error first drops inside `chain_tolerance`.
    pub chain_ready: bool,
    /// Left-side travel at request creation, inches.
    pub start_left: f64,
    /// Right-side travel at request creation, inches.
    pub start_right: f64,
    /// Continuous rotation at request creation, degrees.
    pub start_rotation: f64,
    /// Pose at request creation, for odometry progress reporting.
    pub start_x: f64,
    pub start_y: f64,
}

impl MotionRequest {
    /// Latches chain readiness once the error first enters the chain
    /// tolerance.
    ///
    /// Stays latched through later excursions, so a quick-chain wait issued
    /// after the robot overshot back out of tolerance still releases.
    pub fn note_error(&mut self, error: f64) {
        if error.abs() <= self.chain_tolerance {
            self.chain_ready = true;
        }
    }
}

/// Control-loop state shared between the executor task and the public API.
pub struct MotionControl {
    pub request:   Option<MotionRequest>,
    pub state:     MotionState,
    /// Max output voltage; mutable mid-motion via `set_max_speed`.
    pub max_speed: f64,
    /// Forces outputs to zero and the state machine to idle within a tick.
    pub disabled:  bool,
    /// Last computed motion error, native units.
    pub error:     f64,
    /// Signed progress since the request started (inches or degrees),
    /// consumed by `wait_until`.
    pub traveled:  f64,
}

impl MotionControl {
    pub fn new() -> Self {
        Self {
            request:   None,
            state:     MotionState::Idle,
            max_speed: 12.0,
            disabled:  false,
            error:     0.0,
            traveled:  0.0,
        }
    }
}

impl Default for MotionControl {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::motion::{
        exit::{ExitConditions, ExitStatus},
        pid::PidConstants,
        slew::SlewConstants,
    };

    fn request(chain_tolerance: f64) -> MotionRequest {
        MotionRequest {
            target: MotionTarget::Heading { rotation: 90.0 },
            pid: Pid::new(PidConstants::pd(1.0, 0.0), 0.005),
            angular_pid: None,
            exit: ExitEvaluator::new(
                ExitConditions::two_tier(
                    Duration::from_millis(90),
                    1.0,
                    Duration::from_millis(250),
                    3.0,
                    Duration::from_millis(500),
                )
                .unwrap(),
            ),
            slew: Slew::new(SlewConstants::new(3.0, 0.5).unwrap(), false),
            chain_tolerance,
            turn_bias: 0.9,
            chain_ready: false,
            start_left: 0.0,
            start_right: 0.0,
            start_rotation: 0.0,
            start_x: 0.0,
            start_y: 0.0,
        }
    }

    #[test]
    fn chain_readiness_latches() {
        let mut req = request(3.0);
        req.note_error(10.0);
        assert!(!req.chain_ready);
        req.note_error(2.0);
        assert!(req.chain_ready);
        // An excursion back out of tolerance does not unlatch it.
        req.note_error(10.0);
        assert!(req.chain_ready);
    }

    #[test]
    fn chain_releases_before_full_settle() {
        // Error parked just inside the chain tolerance but outside the tight
        // tier: a quick chain may release on the very first tick, while the
        // full-settle exit is still far from firing.
        let mut req = request(3.0);
        let status = req.exit.update(2.5, Duration::from_millis(5));
        req.note_error(2.5);
        assert!(req.chain_ready);
        assert_eq!(status, ExitStatus::Running);
    }
}
