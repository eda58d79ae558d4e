//! Odometry tracking for robot pose estimation.
//!
//! This module estimates the robot's global position and heading by
//! integrating incremental readings from up to four optional tracking wheels
//! and an inertial sensor.
//!
//! # Module Structure
//!
//! - **[`devices`]**: sensor abstractions, tracking-wheel geometry, and the
//!   [`Pose`](devices::Pose) type.
//! - **[`tracker`]**: the continuously running tracking controller.
//!
//! # How It Works
//!
//! Each tick the tracker reads how far every present wheel has rolled and
//! how far the inertial sensor says the robot has rotated. Rotation-induced
//! roll is subtracted using each wheel's center offset, the remaining travel
//! is treated as a circular arc segment (straight line when the heading did
//! not change), and the resulting chord is rotated into field coordinates.
//!
//! # Graceful degradation
//!
//! Any subset of the four wheels may be absent. Without a perpendicular
//! wheel, sideways drift is invisible; with no wheels at all the pose
//! degenerates to heading-only tracking. Absence of a sensor is
//! configuration, not an error.

mod algorithm;

/// Tracking devices and position types.
pub mod devices;

/// The continuously scheduled tracking controller.
pub mod tracker;
