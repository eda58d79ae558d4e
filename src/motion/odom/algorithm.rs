use std::{f64::consts::TAU, sync::Arc, time::Duration};

use log::{info, warn};
use vexide::{math::Angle, prelude::InertialSensor, sync::Mutex, time::sleep};

use super::devices::{Pose, TrackerSet};

/// Loop rate for the odometry task in milliseconds.
const LOOPRATE: u64 = 5;

/// One sample of every present tracking wheel, in inches rolled.
#[derive(Clone, Copy, Default)]
struct WheelReadings {
    left:  Option<f64>,
    right: Option<f64>,
    front: Option<f64>,
    back:  Option<f64>,
}

impl WheelReadings {
    async fn read(trackers: &TrackerSet) -> Self {
        Self {
            left:  match &trackers.left {
                Some(w) => Some(w.travel().await),
                None => None,
            },
            right: match &trackers.right {
                Some(w) => Some(w.travel().await),
                None => None,
            },
            front: match &trackers.front {
                Some(w) => Some(w.travel().await),
                None => None,
            },
            back:  match &trackers.back {
                Some(w) => Some(w.travel().await),
                None => None,
            },
        }
    }
}

pub(super) async fn odomloop(trackers: &TrackerSet, global_pose: &Arc<Mutex<Pose>>) {
    info!("Odometry Loop Started");
    let mut prev_rotation = imu_rotation(&trackers.imu).await;
    let mut prev = WheelReadings::read(trackers).await;

    loop {
        sleep(Duration::from_millis(LOOPRATE)).await;

        let rotation = imu_rotation(&trackers.imu).await;
        let curr = WheelReadings::read(trackers).await;
        let delta_theta = (rotation - prev_rotation).as_radians();

        let offset = |w: &Option<super::devices::TrackingWheel>| w.as_ref().map(|w| w.offset);
        let forward = mean_present(&[
            correction(delta(curr.left, prev.left), offset(&trackers.left), delta_theta, true),
            correction(delta(curr.right, prev.right), offset(&trackers.right), delta_theta, true),
        ]);
        let lateral = mean_present(&[
            correction(delta(curr.front, prev.front), offset(&trackers.front), delta_theta, false),
            correction(delta(curr.back, prev.back), offset(&trackers.back), delta_theta, false),
        ]);

        let (local_x, local_y) = local_displacement(forward, lateral, delta_theta);

        {
            let mut pose = global_pose.lock().await;
            let heading = pose.heading.as_radians();
            // Treat the tick's motion as an arc: translate along the average
            // heading over the tick, not the final one.
            let (dx, dy) = rotate_local(local_x, local_y, heading + delta_theta / 2.0);
            pose.x += dx;
            pose.y += dy;
            pose.heading = Angle::from_radians(wrap(heading + delta_theta));
        }

        prev_rotation = rotation;
        prev = curr;
    }
}

async fn imu_rotation(imu: &Arc<Mutex<InertialSensor>>) -> Angle {
    imu.lock().await.rotation().unwrap_or_else(|e| {
        warn!("IMU Error: {}", e);
        Angle::from_radians(0.0)
    })
}

fn delta(curr: Option<f64>, prev: Option<f64>) -> Option<f64> {
    match (curr, prev) {
        (Some(c), Some(p)) => Some(c - p),
        _ => None,
    }
}

/// Removes the roll a wheel picks up purely from the robot rotating.
///
/// Parallel wheels use an offset signed positive-right, perpendicular wheels
/// positive-front; with a clockwise-positive heading delta the rotation
/// contribution has opposite sign between the two orientations.
fn correction(
    delta: Option<f64>,
    offset: Option<f64>,
    delta_theta: f64,
    parallel: bool,
) -> Option<f64> {
    match (delta, offset) {
        (Some(d), Some(o)) => {
            if parallel {
                Some(d + o * delta_theta)
            } else {
                Some(d - o * delta_theta)
            }
        }
        _ => None,
    }
}

/// Mean of the readings that exist; zero when none do.
///
/// This is the graceful-degradation point: a missing wheel simply
/// contributes no information for its axis.
fn mean_present(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

/// Converts a tick's corrected forward/lateral travel into a local chord
/// displacement.
///
/// When the heading changed during the tick, the motion is treated as a
/// circular arc segment and the traveled arc lengths are scaled down to the
/// chord (equation 6 of the Pilons tracking paper). Straight-line ticks pass
/// through unchanged.
fn local_displacement(forward: f64, lateral: f64, delta_theta: f64) -> (f64, f64) {
    if delta_theta.abs() < f64::EPSILON {
        (lateral, forward)
    } else {
        let chord_scale = 2.0 * (delta_theta / 2.0).sin() / delta_theta;
        (lateral * chord_scale, forward * chord_scale)
    }
}

/// Rotates a local (right, forward) displacement into field coordinates
/// given a clockwise-positive heading measured from +y.
fn rotate_local(local_x: f64, local_y: f64, heading: f64) -> (f64, f64) {
    let (sin, cos) = heading.sin_cos();
    (local_y * sin + local_x * cos, local_y * cos - local_x * sin)
}

/// Wraps radians to (-pi, pi].
fn wrap(theta: f64) -> f64 {
    let wrapped = theta - TAU * (theta / TAU).round();
    if wrapped <= -std::f64::consts::PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn rotate_local_cardinal_headings() {
        // Facing +y, driving forward.
        let (x, y) = rotate_local(0.0, 1.0, 0.0);
        assert!((x - 0.0).abs() < TOL && (y - 1.0).abs() < TOL);
        // Facing +x (90 degrees clockwise), driving forward.
        let (x, y) = rotate_local(0.0, 1.0, FRAC_PI_2);
        assert!((x - 1.0).abs() < TOL && (y - 0.0).abs() < TOL);
        // Facing +y, strafing right.
        let (x, y) = rotate_local(1.0, 0.0, 0.0);
        assert!((x - 1.0).abs() < TOL && (y - 0.0).abs() < TOL);
    }

    #[test]
    fn straight_tick_passes_through() {
        let (x, y) = local_displacement(2.0, 0.5, 0.0);
        assert_eq!((x, y), (0.5, 2.0));
    }

    #[test]
    fn arc_tick_scales_to_chord() {
        // A quarter-circle arc of length s has chord 2 sin(45 deg) * s / theta.
        let s = 3.0;
        let theta = FRAC_PI_2;
        let (_, y) = local_displacement(s, 0.0, theta);
        let expected = 2.0 * (theta / 2.0).sin() * s / theta;
        assert!((y - expected).abs() < TOL);
    }

    #[test]
    fn in_place_rotation_yields_zero_displacement() {
        // Quarter turn clockwise. A right-side parallel wheel at +5 in rolls
        // backward, a front perpendicular wheel at +4 in rolls right.
        let dtheta = FRAC_PI_2;
        let right = correction(Some(-5.0 * dtheta), Some(5.0), dtheta, true).unwrap();
        let front = correction(Some(4.0 * dtheta), Some(4.0), dtheta, false).unwrap();
        assert!(right.abs() < TOL);
        assert!(front.abs() < TOL);
    }

    #[test]
    fn missing_wheels_contribute_nothing() {
        assert_eq!(mean_present(&[None, None]), 0.0);
        assert_eq!(mean_present(&[Some(2.0), None]), 2.0);
        assert_eq!(mean_present(&[Some(2.0), Some(4.0)]), 3.0);
        // With zero sensors the pose delta is degenerate but valid.
        let (x, y) = local_displacement(0.0, 0.0, 0.1);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn wrap_stays_in_half_open_revolution() {
        assert!((wrap(3.0 * PI) - PI).abs() < TOL);
        assert!((wrap(-PI) - PI).abs() < TOL);
        assert!((wrap(0.3) - 0.3).abs() < TOL);
    }
}
