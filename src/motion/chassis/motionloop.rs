use std::{sync::Arc, time::Duration};

use log::{info, warn};
use vexide::{
    math::Angle,
    prelude::InertialSensor,
    smart::motor::BrakeMode,
    sync::Mutex,
    time::sleep,
};

use super::{
    config::DriveConfig,
    math,
    request::{MotionControl, MotionRequest, MotionState, MotionTarget, SwingSide},
};
use crate::{
    drivetrain::Differential,
    motion::{exit::ExitStatus, odom::devices::Pose},
};

/// Loop rate for the motion control task in milliseconds.
pub(super) const LOOPRATE: u64 = 5;

/// Seconds per control tick, used by the PID derivative/integral terms.
pub(super) const DT_SECONDS: f64 = LOOPRATE as f64 / 1000.0;

const DT: Duration = Duration::from_millis(LOOPRATE);

/// One tick's worth of computed output.
struct TickOutput {
    left:     f64,
    right:    f64,
    error:    f64,
    traveled: f64,
}

pub(super) async fn motion_loop(
    control: &Arc<Mutex<MotionControl>>,
    drivetrain: Differential,
    drive_config: DriveConfig,
    global_pose: Arc<Mutex<Pose>>,
    imu: Arc<Mutex<InertialSensor>>,
) {
    info!("Motion Control Loop Started");
    drivetrain.set_brakemode(BrakeMode::Brake);

    loop {
        sleep(DT).await;

        // Sensor snapshot first; pose lock is never held together with the
        // control lock.
        let inches = drive_config.inches_per_radian();
        let left = drivetrain.left_position().as_radians() * inches;
        let right = drivetrain.right_position().as_radians() * inches;
        let rotation = imu_rotation(&imu).await.as_degrees();
        let pose = *global_pose.lock().await;

        let mut c = control.lock().await;

        if c.disabled {
            if c.state != MotionState::Idle {
                drivetrain.stop();
                c.state = MotionState::Idle;
                c.request = None;
            }
            continue;
        }

        let max_speed = c.max_speed;
        let Some(req) = c.request.as_mut() else {
            continue;
        };

        let tick = step(req, left, right, rotation, pose, max_speed);
        drivetrain.set_side_voltages(tick.left, tick.right);

        let status = req.exit.update(tick.error, DT);
        req.note_error(tick.error);
        let settling = req.exit.is_settling();

        c.error = tick.error;
        c.traveled = tick.traveled;
        match status {
            ExitStatus::Running => {
                // A chained state is sticky until the next set call.
                if c.state != MotionState::Chained {
                    c.state = if settling { MotionState::Settling } else { MotionState::Active };
                }
            }
            ExitStatus::Settled(tier) => {
                drivetrain.stop();
                info!("Motion settled on tier {} (error {:.2})", tier, tick.error);
                c.state = MotionState::Done;
                c.request = None;
            }
            ExitStatus::TimedOut => {
                drivetrain.stop();
                warn!("Motion timed out (error {:.2})", tick.error);
                c.state = MotionState::Done;
                c.request = None;
            }
        }
    }
}

/// Computes error and side voltages for the active request.
fn step(
    req: &mut MotionRequest,
    left_travel: f64,
    right_travel: f64,
    rotation: f64,
    pose: Pose,
    max_speed: f64,
) -> TickOutput {
    match req.target {
        MotionTarget::Distance { inches, hold_rotation } => {
            let traveled =
                ((left_travel - req.start_left) + (right_travel - req.start_right)) / 2.0;
            let error = inches - traveled;
            let mut u = req.pid.update(error);
            u = req.slew.shape(u, error);
            u = math::clamp_mag(u, max_speed);
            let hold = match req.angular_pid.as_mut() {
                Some(pid) => pid.update(hold_rotation - rotation),
                None => 0.0,
            };
            TickOutput {
                left: math::clamp_mag(u + hold, max_speed),
                right: math::clamp_mag(u - hold, max_speed),
                error,
                traveled,
            }
        }
        MotionTarget::Heading { rotation: target } => {
            let error = target - rotation;
            let mut u = req.pid.update(error);
            u = req.slew.shape(u, error);
            u = math::clamp_mag(u, max_speed);
            TickOutput {
                left: u,
                right: -u,
                error,
                traveled: rotation - req.start_rotation,
            }
        }
        MotionTarget::Swing { rotation: target, side, still_speed } => {
            let error = target - rotation;
            let mut u = req.pid.update(error);
            u = req.slew.shape(u, error);
            u = math::clamp_mag(u, max_speed);
            // The still side pivots the arc; the driven side does the work.
            let (left, right) = match side {
                SwingSide::Left => (u, still_speed),
                SwingSide::Right => (still_speed, -u),
            };
            TickOutput {
                left,
                right,
                error,
                traveled: rotation - req.start_rotation,
            }
        }
        MotionTarget::Point { x, y, reverse } => {
            let heading = pose.heading.as_degrees();
            let (linear_error, angular_error) =
                math::point_errors(pose.x, pose.y, heading, x, y, reverse);
            let mut linear = req.pid.update(linear_error);
            linear = req.slew.shape(linear, linear_error);
            let angular = match req.angular_pid.as_mut() {
                Some(pid) => pid.update(angular_error),
                None => 0.0,
            };
            let (left, right) = math::bias_speeds(linear, angular, req.turn_bias, max_speed);
            TickOutput {
                left,
                right,
                error: linear_error,
                traveled: pose_travel(req, pose),
            }
        }
        MotionTarget::Pose { x, y, heading: target_heading, dlead, carrot_distance } => {
            let heading = pose.heading.as_degrees();
            let (cx, cy) = math::carrot_point(
                pose.x,
                pose.y,
                x,
                y,
                target_heading,
                dlead,
                carrot_distance,
            );
            let (linear_error, angular_error) =
                math::point_errors(pose.x, pose.y, heading, cx, cy, false);
            let mut linear = req.pid.update(linear_error);
            linear = req.slew.shape(linear, linear_error);
            let angular = match req.angular_pid.as_mut() {
                Some(pid) => pid.update(angular_error),
                None => 0.0,
            };
            let (left, right) = math::bias_speeds(linear, angular, req.turn_bias, max_speed);
            TickOutput {
                left,
                right,
                // Exit against the final pose, not the receding carrot.
                error: pose.distance_to(x, y),
                traveled: pose_travel(req, pose),
            }
        }
    }
}

fn pose_travel(req: &MotionRequest, pose: Pose) -> f64 {
    ((pose.x - req.start_x).powi(2) + (pose.y - req.start_y).powi(2)).sqrt()
}

async fn imu_rotation(imu: &Arc<Mutex<InertialSensor>>) -> Angle {
    imu.lock().await.rotation().unwrap_or_else(|e| {
        warn!("IMU Error: {}", e);
        Angle::from_radians(0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{
        exit::{ExitConditions, ExitEvaluator},
        pid::{Pid, PidConstants},
        slew::{Slew, SlewConstants},
    };

    // P-only gains so outputs are predictable; slew off.
    fn request(target: MotionTarget) -> MotionRequest {
        MotionRequest {
            target,
            pid: Pid::new(PidConstants::pd(2.0, 0.0), DT_SECONDS),
            angular_pid: Some(Pid::new(PidConstants::pd(1.0, 0.0), DT_SECONDS)),
            exit: ExitEvaluator::new(
                ExitConditions::two_tier(DT, 1.0, DT, 3.0, Duration::from_millis(500)).unwrap(),
            ),
            slew: Slew::new(SlewConstants::new(3.0, 0.5).unwrap(), false),
            chain_tolerance: 3.0,
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
    fn drive_tick_measures_average_progress() {
        let mut req = request(MotionTarget::Distance { inches: 24.0, hold_rotation: 0.0 });
        let out = step(&mut req, 8.0, 4.0, 0.0, Pose::origin(), 12.0);
        assert_eq!(out.traveled, 6.0);
        assert_eq!(out.error, 18.0);
        // No drift, so the heading hold adds nothing.
        assert_eq!(out.left, out.right);
        assert!(out.left <= 12.0);
    }

    #[test]
    fn heading_hold_corrects_drift() {
        let mut req = request(MotionTarget::Distance { inches: 24.0, hold_rotation: 0.0 });
        // Drifted 5 degrees clockwise: the left side must back off.
        let out = step(&mut req, 8.0, 4.0, 5.0, Pose::origin(), 12.0);
        assert!(out.left < out.right);
    }

    #[test]
    fn turn_progress_is_rotation_delta() {
        let mut req = request(MotionTarget::Heading { rotation: 90.0 });
        let out = step(&mut req, 0.0, 0.0, 30.0, Pose::origin(), 12.0);
        assert_eq!(out.error, 60.0);
        assert_eq!(out.traveled, 30.0);
        assert_eq!(out.left, -out.right);
    }

    #[test]
    fn swing_drives_one_side_only() {
        let mut req = request(MotionTarget::Swing {
            rotation:    90.0,
            side:        SwingSide::Left,
            still_speed: 1.5,
        });
        let out = step(&mut req, 0.0, 0.0, 0.0, Pose::origin(), 12.0);
        assert_eq!(out.right, 1.5);
        assert!(out.left > 0.0);

        let mut req = request(MotionTarget::Swing {
            rotation:    90.0,
            side:        SwingSide::Right,
            still_speed: 1.5,
        });
        let out = step(&mut req, 0.0, 0.0, 0.0, Pose::origin(), 12.0);
        assert_eq!(out.left, 1.5);
        assert!(out.right < 0.0);
    }

    #[test]
    fn boomerang_error_targets_final_pose() {
        let mut req = request(MotionTarget::Pose {
            x:               0.0,
            y:               24.0,
            heading:         0.0,
            dlead:           0.625,
            carrot_distance: 16.0,
        });
        // The carrot sits short of the target, but the exit error must be
        // the distance to the target itself.
        let out = step(&mut req, 0.0, 0.0, 0.0, Pose::origin(), 12.0);
        assert_eq!(out.error, 24.0);
    }
}
