//! Differential drivetrain control.
//!
//! This module provides the `Differential` struct for controlling robots with
//! separate left and right motor groups, commonly known as a "tank drive" or
//! "differential drive" configuration.
//!
//! Driver control reads a [`Controller`] directly (tank or arcade); the
//! motion executor drives the sides through [`set_side_voltages`] and reads
//! progress through the per-side encoder positions.
//!
//! [`set_side_voltages`]: Differential::set_side_voltages
//!
//! # Example
//!
//! ```ignore
//! use talos::drivetrain::Differential;
//! use vexide::prelude::*;
//!
//! let drivetrain = Differential::new(
//!     [
//!         Motor::new(peripherals.port_1, Gearset::Blue, Direction::Forward),
//!         Motor::new(peripherals.port_2, Gearset::Blue, Direction::Forward),
//!     ],
//!     [
//!         Motor::new(peripherals.port_3, Gearset::Blue, Direction::Reverse),
//!         Motor::new(peripherals.port_4, Gearset::Blue, Direction::Reverse),
//!     ],
//! );
//!
//! // In your control loop:
//! let controller = Controller::new(ControllerId::Primary);
//! drivetrain.tank(&controller);
//! ```

use std::{cell::RefCell, rc::Rc};

use log::warn;
use vexide::{
    controller::ControllerState,
    math::Angle,
    prelude::{Controller, Motor},
    smart::motor::BrakeMode,
};

/// A differential drivetrain controller.
///
/// This struct manages a robot with separate left and right motor groups.
/// It provides methods for driver control schemes as well as the side-level
/// voltage and encoder access the autonomous motion executor needs.
///
/// The motors are stored in reference-counted cells to allow shared ownership
/// with other systems (e.g., the motion control loop).
///
/// # Motor Configuration
///
/// Motors on opposite sides of the drivetrain typically need to spin in
/// opposite directions to move the robot forward. Configure motor directions
/// appropriately when creating the motors.
#[derive(Clone)]
pub struct Differential {
    /// The left motor group.
    ///
    /// Contains all motors on the left side of the drivetrain.
    /// These motors should be configured to spin in the same direction
    /// relative to each other.
    pub left: Rc<RefCell<dyn AsMut<[Motor]>>>,

    /// The right motor group.
    ///
    /// Contains all motors on the right side of the drivetrain.
    /// These motors should be configured to spin in the same direction
    /// relative to each other (typically opposite to the left side for
    /// forward movement).
    pub right: Rc<RefCell<dyn AsMut<[Motor]>>>,
}

impl Differential {
    /// Creates a new drivetrain with the provided left/right motors.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let motors = Differential::new(
    ///     [
    ///         Motor::new(peripherals.port_1, Gearset::Blue, Direction::Forward),
    ///         Motor::new(peripherals.port_2, Gearset::Blue, Direction::Forward),
    ///     ],
    ///     [
    ///         Motor::new(peripherals.port_3, Gearset::Blue, Direction::Reverse),
    ///         Motor::new(peripherals.port_4, Gearset::Blue, Direction::Reverse),
    ///     ],
    /// );
    /// ```
    pub fn new<L: AsMut<[Motor]> + 'static, R: AsMut<[Motor]> + 'static>(
        left: L,
        right: R,
    ) -> Self {
        Self {
            left:  Rc::new(RefCell::new(left)),
            right: Rc::new(RefCell::new(right)),
        }
    }

    /// Creates a new drivetrain with shared ownership of the left/right
    /// motors, for robots where another subsystem also borrows the drive
    /// motors.
    pub fn from_shared<L: AsMut<[Motor]> + 'static, R: AsMut<[Motor]> + 'static>(
        left: Rc<RefCell<L>>,
        right: Rc<RefCell<R>>,
    ) -> Self {
        Self { left, right }
    }

    /// Controls a tank-style drivetrain using the input from a controller.
    ///
    /// Each stick's Y axis drives its own side.
    pub fn tank(&self, controller: &Controller) {
        let state = controller.state().unwrap_or_else(|e| {
            warn!("Controller State Error: {}", e);
            ControllerState::default()
        });

        let left_voltage = state.left_stick.y() * 12.0;
        let right_voltage = state.right_stick.y() * 12.0;

        self.set_side_voltages(left_voltage, right_voltage);
    }

    /// Drive the robot using arcade controls.
    ///
    /// Forward/backward is read from the left stick Y axis, turning from the
    /// right stick X axis. Inputs are assumed to be in [-1.0, 1.0] and are
    /// scaled to volts. On controller read error, zeroed inputs are used and
    /// a warning is logged.
    pub fn arcade(&self, controller: &Controller) {
        let state = controller.state().unwrap_or_else(|e| {
            warn!("Controller State Error: {}", e);
            ControllerState::default()
        });

        let fwd = state.left_stick.y();
        let turn = state.right_stick.x();

        self.set_side_voltages(
            (fwd + turn) * 12.0,
            (fwd - turn) * 12.0,
        );
    }

    /// Commands each side of the drivetrain to a voltage.
    ///
    /// Voltages are clamped by the motors themselves; errors on individual
    /// motors are ignored so one unplugged motor does not stop its
    /// neighbors.
    pub fn set_side_voltages(&self, left: f64, right: f64) {
        if let Ok(mut motors) = self.left.try_borrow_mut() {
            for motor in motors.as_mut() {
                let _ = motor.set_voltage(left);
            }
        }
        if let Ok(mut motors) = self.right.try_borrow_mut() {
            for motor in motors.as_mut() {
                let _ = motor.set_voltage(right);
            }
        }
    }

    /// Zeroes both sides. The configured brake mode decides whether the
    /// robot coasts, brakes, or holds.
    pub fn stop(&self) {
        self.set_side_voltages(0.0, 0.0);
    }

    /// Sets the brake mode for all motors in the drivetrain.
    ///
    /// The brake mode determines how motors behave when no voltage is applied:
    ///
    /// - [`BrakeMode::Coast`]: Motors spin freely.
    /// - [`BrakeMode::Brake`]: Motors actively resist rotation.
    /// - [`BrakeMode::Hold`]: Motors actively hold their position.
    pub fn set_brakemode(&self, brakemode: BrakeMode) {
        let left = self.left.try_borrow_mut();
        let right = self.right.try_borrow_mut();

        if let Ok(mut motors) = left {
            for motor in motors.as_mut() {
                let _ = motor.brake(brakemode);
            }
        }
        if let Ok(mut motors) = right {
            for motor in motors.as_mut() {
                let _ = motor.brake(brakemode);
            }
        }
    }

    /// Average encoder position of the left side.
    ///
    /// Motors whose encoder read fails are excluded from the average and a
    /// warning is logged.
    pub fn left_position(&self) -> Angle {
        Self::side_position(&self.left)
    }

    /// Average encoder position of the right side.
    pub fn right_position(&self) -> Angle {
        Self::side_position(&self.right)
    }

    fn side_position(side: &Rc<RefCell<dyn AsMut<[Motor]>>>) -> Angle {
        let mut angle = Angle::from_radians(0.0);
        let mut denom: f64 = 0.0;
        match side.try_borrow_mut() {
            Ok(mut motors) => {
                for motor in motors.as_mut() {
                    angle += motor.position().unwrap_or_else(|e| {
                        warn!("Error Getting Motor Encoder Position: {}", e);
                        denom -= 1.0;
                        Angle::from_radians(0.0)
                    });
                    denom += 1.0;
                }
            }
            Err(e) => warn!("Error Borrowing Motors: {}", e),
        }
        if denom > 0.0 { angle / denom } else { Angle::from_radians(0.0) }
    }
}
