//! Autonomous motion control.
//!
//! This module contains the closed-loop chassis motion engine:
//!
//! - **PID Control**: per-motion-kind proportional-integral-derivative
//!   controllers with an integral-windup guard.
//! - **Exit Conditions**: layered settle-time/tolerance tiers that decide
//!   when a motion is done, with a timeout guaranteeing termination.
//! - **Slew Limiting**: output ramping on the final approach to a target.
//! - **Odometry**: position tracking from optional tracking wheels and an
//!   inertial sensor.
//! - **Chassis Executor**: the motion state machine tying the above together
//!   behind blocking and chaining wait primitives.
//!
//! # Architecture
//!
//! The motion system is built around asynchronous control loops that run
//! independently from your autonomous routine. You initialize the chassis
//! once, then call movement methods that set targets and wait for
//! completion.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::chassis::Chassis;
//!
//! chassis.init();
//!
//! chassis.drive(24.0, 9.0, true).await;
//! chassis.wait().await;
//!
//! chassis.turn_to(90.0, 10.0).await;
//! chassis.wait().await;
//! ```

use thiserror::Error;

/// The chassis motion executor and its configuration surface.
pub mod chassis;

/// Exit-condition tiers and the per-motion settle evaluator.
pub mod exit;

/// Odometry tracking for position estimation.
pub mod odom;

/// The PID control core.
pub mod pid;

/// Slew-rate limiting of commanded output.
pub mod slew;

/// A physically inconsistent configuration value.
///
/// Returned by configuration constructors and setters; a motion never fails
/// at runtime because of these, they are rejected up front.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("exit tier settle time must be nonzero")]
    ZeroSettleTime,
    #[error("exit tier tolerance must be positive, got {0}")]
    BadTolerance(f64),
    #[error("exit tiers must not tighten tolerance as settle times grow")]
    TierOrder,
    #[error("exit timeout must be nonzero")]
    ZeroTimeout,
    #[error("slew window must be positive, got {0}")]
    BadSlewWindow(f64),
    #[error("slew step must be positive, got {0}")]
    BadSlewStep(f64),
    #[error("chain tolerance must be positive, got {0}")]
    BadChainTolerance(f64),
    #[error("odometry turn bias must be within 0.0..=1.0, got {0}")]
    BadTurnBias(f64),
    #[error("boomerang lead must be within 0.0..=1.0, got {0}")]
    BadBoomerangLead(f64),
    #[error("boomerang carrot distance must be positive, got {0}")]
    BadCarrotDistance(f64),
}
