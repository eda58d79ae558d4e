//! Tracking devices and position types for odometry.
//!
//! This module provides the sensor abstractions and data types used by the
//! pose tracker:
//!
//! - **TrackingSensor**: an abstraction over the encoder types that can feed
//!   odometry.
//! - **TrackingWheel**: a sensor plus wheel geometry, normalized to inches
//!   traveled.
//! - **TrackerSet**: up to four optional tracking wheels and the inertial
//!   sensor.
//! - **Pose**: a 2D position with heading.
//!
//! Any subset of the four wheels may be absent; odometry degrades to fewer
//! degrees of freedom rather than failing (with no perpendicular wheel,
//! lateral drift is invisible; with no wheels at all, only heading updates).

use std::sync::Arc;

use log::warn;
use vexide::{
    adi::encoder::AdiOpticalEncoder,
    math::Angle,
    smart::{imu::InertialSensor, rotation::RotationSensor},
    sync::Mutex,
};

use crate::drivetrain::Differential;

/// An abstraction over the encoder types that can feed odometry.
///
/// # Variants
///
/// - `AdiOpticalEncoder`: a 3-wire optical shaft encoder.
/// - `RotationSensor`: a V5 rotation sensor (high resolution).
/// - `Differential`: the drivetrain motors' integrated encoders, averaged
///   per side.
#[derive(Clone)]
pub enum TrackingSensor {
    /// An ADI (3-wire) optical shaft encoder.
    AdiOpticalEncoder(Arc<Mutex<AdiOpticalEncoder>>),
    /// A V5 rotation sensor (high-resolution encoder).
    RotationSensor(Arc<Mutex<RotationSensor>>),
    /// The left motor group's integrated encoders.
    DriveLeft(Differential),
    /// The right motor group's integrated encoders.
    DriveRight(Differential),
}

impl TrackingSensor {
    pub fn from_adi_optical_encoder(encoder: AdiOpticalEncoder) -> Self {
        Self::AdiOpticalEncoder(Arc::new(Mutex::new(encoder)))
    }

    pub fn from_rotation_sensor(sensor: RotationSensor) -> Self {
        Self::RotationSensor(Arc::new(Mutex::new(sensor)))
    }

    /// Returns the current rotational position of the sensor.
    ///
    /// Returns zero if the device encounters an error (a warning is logged);
    /// a dropped sensor degrades precision rather than halting tracking.
    pub async fn position(&self) -> Angle {
        match self {
            TrackingSensor::AdiOpticalEncoder(encoder) => {
                encoder.lock().await.position().unwrap_or_else(|e| {
                    warn!("ADI Optical Encoder Position Error: {}", e);
                    Angle::from_radians(0.0)
                })
            }
            TrackingSensor::RotationSensor(encoder) => {
                encoder.lock().await.position().unwrap_or_else(|e| {
                    warn!("Rotation Sensor Position Error: {}", e);
                    Angle::from_radians(0.0)
                })
            }
            TrackingSensor::DriveLeft(dt) => dt.left_position(),
            TrackingSensor::DriveRight(dt) => dt.right_position(),
        }
    }
}

/// A tracking wheel: a sensor plus the geometry to turn its angle into
/// inches traveled.
///
/// # Offset sign convention
///
/// For parallel (left/right) wheels the offset is positive to the right of
/// the tracking center; for perpendicular (front/back) wheels it is positive
/// toward the front. The offset is used to subtract out the distance the
/// wheel rolls purely because the robot rotated.
#[derive(Clone)]
pub struct TrackingWheel {
    /// The sensor measuring wheel rotation.
    pub sensor:         TrackingSensor,
    /// The diameter of the tracking wheel in inches.
    pub wheel_diameter: f64,
    /// The number of teeth on the driven (wheel-side) gear.
    pub driven_gear:    f64,
    /// The number of teeth on the driving (encoder-side) gear.
    pub driving_gear:   f64,
    /// Signed distance from the tracking center in inches.
    pub offset:         f64,
}

impl TrackingWheel {
    pub fn new(
        sensor: TrackingSensor,
        wheel_diameter: f64,
        driven_gear: f64,
        driving_gear: f64,
        offset: f64,
    ) -> Self {
        Self {
            sensor,
            wheel_diameter,
            driven_gear,
            driving_gear,
            offset,
        }
    }

    /// A tracking wheel with no external gearing.
    pub fn direct(sensor: TrackingSensor, wheel_diameter: f64, offset: f64) -> Self {
        Self::new(sensor, wheel_diameter, 1.0, 1.0, offset)
    }

    /// Cumulative distance this wheel has rolled, in inches.
    pub async fn travel(&self) -> f64 {
        let angle = self.sensor.position().await;
        let gear_ratio = self.driving_gear / self.driven_gear;
        angle.as_radians() * gear_ratio * (self.wheel_diameter / 2.0)
    }
}

/// The complete sensor complement for odometry.
///
/// `left`/`right` are parallel wheels measuring forward travel; `front`/
/// `back` are perpendicular wheels measuring lateral travel. Every wheel is
/// optional.
#[derive(Clone)]
pub struct TrackerSet {
    /// Left parallel tracking wheel.
    pub left:  Option<TrackingWheel>,
    /// Right parallel tracking wheel.
    pub right: Option<TrackingWheel>,
    /// Front perpendicular tracking wheel.
    pub front: Option<TrackingWheel>,
    /// Back perpendicular tracking wheel.
    pub back:  Option<TrackingWheel>,
    /// The inertial sensor for heading measurement.
    pub imu:   Arc<Mutex<InertialSensor>>,
}

impl TrackerSet {
    pub fn new(
        left: Option<TrackingWheel>,
        right: Option<TrackingWheel>,
        front: Option<TrackingWheel>,
        back: Option<TrackingWheel>,
        imu: Arc<Mutex<InertialSensor>>,
    ) -> Self {
        Self {
            left,
            right,
            front,
            back,
            imu,
        }
    }

    /// Heading-only tracking: no wheels, just the inertial sensor.
    pub fn imu_only(imu: Arc<Mutex<InertialSensor>>) -> Self {
        Self::new(None, None, None, None, imu)
    }
}

/// A 2D position with heading.
///
/// Coordinates are in inches: x grows to the robot's starting right, y to
/// its starting front. Heading is clockwise-positive from the +y axis, the
/// same convention the inertial sensor reports.
#[derive(Clone, Copy, Debug)]
pub struct Pose {
    /// The x-coordinate in inches.
    pub x:       f64,
    /// The y-coordinate in inches.
    pub y:       f64,
    /// The heading angle, wrapped to one revolution.
    pub heading: Angle,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: Angle) -> Self { Self { x, y, heading } }

    /// The origin (0, 0) facing +y.
    pub fn origin() -> Self {
        Self {
            x:       0.0,
            y:       0.0,
            heading: Angle::from_radians(0.0),
        }
    }

    /// Straight-line distance to a field point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((x - self.x).powi(2) + (y - self.y).powi(2)).sqrt()
    }
}
