//! The chassis motion executor.
//!
//! [`Chassis`] owns the drivetrain, the pose tracker, and the motion-kind
//! configuration, and runs the closed-loop control task that turns motion
//! requests into motor voltages. Exactly one motion is in flight at a time;
//! issuing a new one while another is active cancels and replaces it.
//!
//! # Lifecycle
//!
//! Every motion follows `Idle -> Active -> (Settling) -> Done`. A quick-chain
//! wait adds the side channel `Active -> Chained`, from which the next `set`
//! call goes straight back to `Active` without stopping the motors in
//! between.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::chassis::{Chassis, DriveConfig};
//!
//! let chassis = Chassis::new(drivetrain, DriveConfig::new(3.25, 36.0, 60.0, 12.0), odom);
//! chassis.init();
//!
//! // Drive out, turn, come back.
//! chassis.drive(24.0, 9.0, true).await;
//! chassis.wait().await;
//!
//! chassis.turn_to(90.0, 10.0).await;
//! chassis.wait_quick_chain().await;
//!
//! chassis.turn_to(0.0, 10.0).await;
//! chassis.wait().await;
//! ```

use std::{sync::Arc, time::Duration};

use log::warn;
use vexide::{sync::Mutex, task::spawn, time::sleep};

mod math;
mod motionloop;

/// Drivetrain geometry and per-motion-kind tuning.
pub mod config;

/// Motion request, target, and state types.
pub mod request;

pub use config::{ChassisConfig, DriveConfig};
pub use request::{AngleBehavior, MotionState, SwingSide};

use self::{
    motionloop::{motion_loop, DT_SECONDS, LOOPRATE},
    request::{MotionControl, MotionRequest, MotionTarget},
};
use crate::{
    drivetrain::Differential,
    motion::{
        exit::{ExitConditions, ExitEvaluator},
        odom::{devices::Pose, tracker::OdomTracker},
        pid::{Pid, PidConstants},
        slew::{Slew, SlewConstants},
        ConfigError,
    },
    to_mutex,
};

/// The closed-loop chassis motion controller.
///
/// Holds the drivetrain and pose tracker, and shares the active motion state
/// with the background control task. All speeds are motor voltages; the
/// valid range is 0.0 to 12.0 volts.
pub struct Chassis {
    drivetrain:   Differential,
    drive_config: DriveConfig,
    config:       Arc<Mutex<ChassisConfig>>,
    control:      Arc<Mutex<MotionControl>>,
    /// The pose tracker. Runs continuously once initialized, independent of
    /// motion activity.
    pub odom:     OdomTracker,
}

impl Chassis {
    /// Creates a chassis with the default tuning.
    pub fn new(drivetrain: Differential, drive_config: DriveConfig, odom: OdomTracker) -> Self {
        Self::with_config(drivetrain, drive_config, odom, ChassisConfig::default())
    }

    pub fn with_config(
        drivetrain: Differential,
        drive_config: DriveConfig,
        odom: OdomTracker,
        config: ChassisConfig,
    ) -> Self {
        Self {
            drivetrain,
            drive_config,
            config: to_mutex(config),
            control: to_mutex(MotionControl::new()),
            odom,
        }
    }

    /// Starts the motion-control and odometry tasks.
    ///
    /// Must be called once before any movement command. Both tasks run
    /// detached for the rest of the program.
    pub fn init(&self) {
        self.odom.init();

        let control = self.control.clone();
        let drivetrain = self.drivetrain.clone();
        let drive_config = self.drive_config;
        let pose = self.odom.global_pose.clone();
        let imu = self.odom.trackers.imu.clone();
        let mainloop = spawn(async move {
            motion_loop(&control, drivetrain, drive_config, pose, imu).await;
        });
        mainloop.detach();
    }

    /// Adjusts the chassis tuning.
    ///
    /// Expected to be called between motions; a motion already in flight
    /// keeps the constants it snapshotted when it started.
    ///
    /// # Example
    ///
    /// ```ignore
    /// chassis.configure(|cfg| {
    ///     cfg.turn_pid = PidConstants::new(0.3, 0.005, 2.0, 15.0);
    ///     cfg.set_turn_bias(0.9)?;
    ///     cfg.set_boomerang_dlead(0.625)
    /// }).await?;
    /// ```
    pub async fn configure<F>(&self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut ChassisConfig) -> Result<(), ConfigError>,
    {
        let mut config = self.config.lock().await;
        f(&mut config)
    }

    /// A copy of the current tuning.
    pub async fn config(&self) -> ChassisConfig { self.config.lock().await.clone() }

    // ---- Motion commands ------------------------------------------------

    /// Drives straight for a relative distance in inches, holding the
    /// heading captured at the start of the motion.
    pub async fn drive(&self, distance: f64, max_speed: f64, slew: bool) {
        let (pid, angular, exit, slew_constants, chain, bias) = {
            let cfg = self.config.lock().await;
            (
                cfg.drive_pid,
                Some(cfg.heading_pid),
                cfg.drive_exit.clone(),
                cfg.drive_slew,
                cfg.drive_chain_tolerance(),
                cfg.turn_bias(),
            )
        };
        let rotation = self.rotation().await;
        let target = MotionTarget::Distance {
            inches:        distance,
            hold_rotation: rotation,
        };
        self.submit(target, pid, angular, exit, slew_constants, slew, chain, bias, max_speed)
            .await;
    }

    /// Turns in place to an absolute heading in degrees, resolving the turn
    /// direction once, now, per the configured angle behavior.
    pub async fn turn_to(&self, heading: f64, max_speed: f64) {
        let behavior = self.config.lock().await.angle_behavior;
        self.turn_to_with(heading, max_speed, behavior).await;
    }

    /// Turns in place with an explicit direction policy.
    pub async fn turn_to_with(&self, heading: f64, max_speed: f64, behavior: AngleBehavior) {
        let (pid, exit, slew_constants, chain) = {
            let cfg = self.config.lock().await;
            (
                cfg.turn_pid,
                cfg.turn_exit.clone(),
                cfg.turn_slew,
                cfg.turn_chain_tolerance(),
            )
        };
        let rotation = self.rotation().await;
        let target = MotionTarget::Heading {
            rotation: math::resolve_turn(rotation, heading, behavior),
        };
        self.submit(target, pid, None, exit, slew_constants, true, chain, 0.0, max_speed)
            .await;
    }

    /// Swings to an absolute heading by driving one side of the drivetrain.
    ///
    /// The opposite side is commanded at `still_speed` volts (zero pivots in
    /// place around it; a small forward voltage widens the arc).
    pub async fn swing_to(
        &self,
        side: SwingSide,
        heading: f64,
        max_speed: f64,
        still_speed: f64,
    ) {
        let (pid, exit, slew_constants, chain, behavior) = {
            let cfg = self.config.lock().await;
            (
                cfg.swing_pid,
                cfg.swing_exit.clone(),
                cfg.swing_slew,
                cfg.swing_chain_tolerance(),
                cfg.angle_behavior,
            )
        };
        let rotation = self.rotation().await;
        let target = MotionTarget::Swing {
            rotation: math::resolve_turn(rotation, heading, behavior),
            side,
            still_speed,
        };
        self.submit(target, pid, None, exit, slew_constants, true, chain, 0.0, max_speed)
            .await;
    }

    /// Drives to a field point under odometry guidance, blending linear and
    /// angular correction by the configured turn bias.
    pub async fn drive_to_point(
        &self,
        x: f64,
        y: f64,
        reverse: bool,
        max_speed: f64,
        slew: bool,
    ) {
        let (pid, angular, exit, slew_constants, chain, bias) = {
            let cfg = self.config.lock().await;
            (
                cfg.drive_pid,
                Some(cfg.odom_angular_pid),
                cfg.odom_drive_exit.clone(),
                cfg.drive_slew,
                cfg.drive_chain_tolerance(),
                cfg.turn_bias(),
            )
        };
        let target = MotionTarget::Point { x, y, reverse };
        self.submit(target, pid, angular, exit, slew_constants, slew, chain, bias, max_speed)
            .await;
    }

    /// Turns in place to face a field point.
    pub async fn turn_to_point(&self, x: f64, y: f64, max_speed: f64) {
        let (pid, exit, slew_constants, chain, behavior) = {
            let cfg = self.config.lock().await;
            (
                cfg.odom_angular_pid,
                cfg.odom_turn_exit.clone(),
                cfg.turn_slew,
                cfg.turn_chain_tolerance(),
                cfg.angle_behavior,
            )
        };
        let pose = self.odom.pose().await;
        let rotation = self.rotation().await;
        let heading = math::heading_to(pose.x, pose.y, x, y);
        let target = MotionTarget::Heading {
            rotation: math::resolve_turn(rotation, heading, behavior),
        };
        self.submit(target, pid, None, exit, slew_constants, true, chain, 0.0, max_speed)
            .await;
    }

    /// Approaches a full pose along a boomerang curve.
    ///
    /// The controller chases a carrot point receding into the target along
    /// its final heading, so the robot arrives already facing the requested
    /// direction instead of driving straight in and spinning.
    pub async fn boomerang_to(&self, x: f64, y: f64, heading: f64, max_speed: f64, slew: bool) {
        let (pid, angular, exit, slew_constants, chain, bias, dlead, carrot_distance) = {
            let cfg = self.config.lock().await;
            (
                cfg.drive_pid,
                Some(cfg.boomerang_pid),
                cfg.odom_drive_exit.clone(),
                cfg.drive_slew,
                cfg.drive_chain_tolerance(),
                cfg.turn_bias(),
                cfg.boomerang_dlead(),
                cfg.boomerang_distance(),
            )
        };
        let target = MotionTarget::Pose {
            x,
            y,
            heading,
            dlead,
            carrot_distance,
        };
        self.submit(target, pid, angular, exit, slew_constants, slew, chain, bias, max_speed)
            .await;
    }

    // ---- Wait primitives ------------------------------------------------

    /// Waits until the active motion settles or times out.
    ///
    /// Cooperative: yields to the control loop between polls rather than
    /// blocking the task.
    pub async fn wait(&self) {
        loop {
            {
                let c = self.control.lock().await;
                if c.request.is_none() {
                    break;
                }
            }
            sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    /// Waits until the motion has progressed past `threshold` (inches for
    /// drives, degrees for turns and swings), or completed.
    ///
    /// Used to change speed mid-motion:
    ///
    /// ```ignore
    /// chassis.drive(24.0, 3.0, true).await;
    /// chassis.wait_until(6.0).await;
    /// chassis.set_max_speed(9.0).await;  // fast for the remaining 18"
    /// chassis.wait().await;
    /// ```
    pub async fn wait_until(&self, threshold: f64) {
        loop {
            {
                let c = self.control.lock().await;
                if c.request.is_none() {
                    break;
                }
                let crossed = if threshold >= 0.0 {
                    c.traveled >= threshold
                } else {
                    c.traveled <= threshold
                };
                if crossed {
                    break;
                }
            }
            sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    /// Waits only until the error first drops inside the chain tolerance,
    /// then marks the motion chained and returns.
    ///
    /// The robot is still moving when this returns; issuing the next motion
    /// immediately blends the two together. The final motion of a sequence
    /// should use [`wait`](Self::wait) instead.
    pub async fn wait_quick_chain(&self) {
        loop {
            {
                let mut c = self.control.lock().await;
                let ready = match c.request.as_ref() {
                    None => break,
                    Some(req) => req.chain_ready,
                };
                if ready {
                    c.state = MotionState::Chained;
                    break;
                }
            }
            sleep(Duration::from_millis(LOOPRATE)).await;
        }
    }

    // ---- Runtime control and telemetry ----------------------------------

    /// Changes the voltage cap of the active motion (and subsequent ones
    /// until their own `set` call overrides it).
    pub async fn set_max_speed(&self, max_speed: f64) {
        self.control.lock().await.max_speed = max_speed.abs();
    }

    /// Zeroes motor output and forces the state machine idle within one
    /// control tick. Motions issued while disabled are ignored.
    pub async fn disable(&self) {
        self.control.lock().await.disabled = true;
    }

    /// Re-enables motion after [`disable`](Self::disable).
    pub async fn enable(&self) {
        self.control.lock().await.disabled = false;
    }

    /// The current pose estimate.
    pub async fn pose(&self) -> Pose { self.odom.pose().await }

    /// Re-seeds the pose tracker, e.g. at the start of an autonomous run.
    pub async fn reset_pose(&self, pose: Pose) { self.odom.reset(pose).await; }

    /// The current motion lifecycle state.
    pub async fn motion_state(&self) -> MotionState { self.control.lock().await.state }

    /// The last computed motion error, in the motion's native unit.
    pub async fn error(&self) -> f64 { self.control.lock().await.error }

    // ---- Internals ------------------------------------------------------

    async fn rotation(&self) -> f64 {
        self.odom
            .trackers
            .imu
            .lock()
            .await
            .rotation()
            .map(|a| a.as_degrees())
            .unwrap_or_else(|e| {
                warn!("IMU Error: {}", e);
                0.0
            })
    }

    #[allow(clippy::too_many_arguments)]
    async fn submit(
        &self,
        target: MotionTarget,
        pid: PidConstants,
        angular: Option<PidConstants>,
        exit: ExitConditions,
        slew_constants: SlewConstants,
        slew_enabled: bool,
        chain_tolerance: f64,
        turn_bias: f64,
        max_speed: f64,
    ) {
        let inches = self.drive_config.inches_per_radian();
        let start_left = self.drivetrain.left_position().as_radians() * inches;
        let start_right = self.drivetrain.right_position().as_radians() * inches;
        let start_rotation = self.rotation().await;
        let pose = self.odom.pose().await;

        let request = MotionRequest {
            target,
            pid: Pid::new(pid, DT_SECONDS),
            angular_pid: angular.map(|c| Pid::new(c, DT_SECONDS)),
            exit: ExitEvaluator::new(exit),
            slew: Slew::new(slew_constants, slew_enabled),
            chain_tolerance,
            chain_ready: false,
            turn_bias,
            start_left,
            start_right,
            start_rotation,
            start_x: pose.x,
            start_y: pose.y,
        };

        let mut c = self.control.lock().await;
        if c.disabled {
            return;
        }
        // Cancel-and-replace: a prior active request is simply discarded. A
        // chained request hands over without the motors ever stopping.
        c.request = Some(request);
        c.state = MotionState::Active;
        c.max_speed = max_speed.abs();
        c.error = 0.0;
        c.traveled = 0.0;
    }
}
