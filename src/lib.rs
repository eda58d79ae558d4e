//! # Talos
//!
//! Talos is a closed-loop chassis motion library built on top of
//! [Vexide](https://vexide.dev). It provides the autonomous-motion layer for
//! VEX V5 differential drive robots:
//!
//! - **Drivetrain Control**: Differential drivetrains with tank and arcade
//!   driver-control schemes, plus side-level voltage access for autonomous.
//! - **Motion Control**: PID-driven drives, turns, and swings with layered
//!   exit conditions, slew limiting, motion chaining, and odometry-guided
//!   point and boomerang motions.
//! - **Odometry**: Continuous pose tracking from up to four tracking wheels
//!   and an inertial sensor, degrading gracefully when wheels are absent.
//! - **Logging**: A file-based logger for debugging and telemetry.
//!
//! ## Quick Start
//!
//! ```ignore
//! use talos::{
//!     drivetrain::Differential,
//!     motion::{
//!         chassis::{Chassis, DriveConfig},
//!         odom::{devices::TrackerSet, tracker::OdomTracker},
//!     },
//!     to_mutex,
//! };
//! use vexide::prelude::*;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let drivetrain = Differential::new(
//!         [
//!             Motor::new(peripherals.port_1, Gearset::Blue, Direction::Forward),
//!             Motor::new(peripherals.port_2, Gearset::Blue, Direction::Forward),
//!         ],
//!         [
//!             Motor::new(peripherals.port_3, Gearset::Blue, Direction::Reverse),
//!             Motor::new(peripherals.port_4, Gearset::Blue, Direction::Reverse),
//!         ],
//!     );
//!
//!     let imu = to_mutex(InertialSensor::new(peripherals.port_5));
//!     let odom = OdomTracker::new(TrackerSet::imu_only(imu));
//!
//!     let chassis = Chassis::new(drivetrain, DriveConfig::new(3.25, 36.0, 60.0, 12.0), odom);
//!     chassis.init();
//!
//!     chassis.drive(24.0, 9.0, true).await;
//!     chassis.wait().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`drivetrain`]: Differential drivetrain control.
//! - [`motion`]: The motion executor, PID, exit conditions, slew, and
//!   odometry.
//! - [`fs`]: Filesystem utilities including logging.

use std::sync::Arc;

use vexide::sync::Mutex;

/// Differential drivetrain control module.
///
/// Provides the [`Differential`](drivetrain::Differential) struct for
/// controlling robots with left and right motor groups.
pub mod drivetrain;

/// Filesystem utilities module.
///
/// Contains logging functionality for recording robot telemetry and debug
/// information to files on the V5 Brain's SD card.
pub mod fs;

/// Autonomous motion control module.
///
/// Provides the closed-loop motion stack:
///
/// - **PID Control**: Proportional-Integral-Derivative controllers with
///   windup protection.
/// - **Exit Conditions**: Layered settle tiers plus a timeout backstop.
/// - **Odometry**: Position tracking from tracking wheels and an inertial
///   sensor.
/// - **Chassis**: The motion executor tying it all together.
pub mod motion;

/// Wraps a value in a shared async mutex.
///
/// Shorthand for the `Arc<Mutex<T>>` that device handles and shared state
/// travel in throughout the crate.
pub fn to_mutex<T>(value: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(value))
}
