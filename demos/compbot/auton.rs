//! Autonomous routines.
//!
//! Each routine assumes the robot starts where the previous one left it
//! facing +y, so they can be run back to back while tuning.

use talos::motion::{
    chassis::{Chassis, SwingSide},
    odom::devices::Pose,
};

const DRIVE_SPEED: f64 = 10.0;
const TURN_SPEED: f64 = 8.5;
const SWING_SPEED: f64 = 10.0;

/// Which routine runs when the field goes live.
const SELECTED: &str = "combining movements";

pub async fn main_auton(chassis: &Chassis) {
    chassis.reset_pose(Pose::origin()).await;
    match SELECTED {
        "drive" => drive_example(chassis).await,
        "turn" => turn_example(chassis).await,
        "drive and turn" => drive_and_turn(chassis).await,
        "wait until" => wait_until_change_speed(chassis).await,
        "swing" => swing_example(chassis).await,
        "chain" => motion_chaining(chassis).await,
        "odom" => odom_example(chassis).await,
        _ => combining_movements(chassis).await,
    }
}

/// Drive forward and come back.
pub async fn drive_example(chassis: &Chassis) {
    chassis.drive(24.0, DRIVE_SPEED, true).await;
    chassis.wait().await;

    chassis.drive(-12.0, DRIVE_SPEED, false).await;
    chassis.wait().await;

    chassis.drive(-12.0, DRIVE_SPEED, false).await;
    chassis.wait().await;
}

/// Turn right 90, then 45 more, then back to 0.
pub async fn turn_example(chassis: &Chassis) {
    chassis.turn_to(90.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(45.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(0.0, TURN_SPEED).await;
    chassis.wait().await;
}

/// Drive out, turn around, drive back.
pub async fn drive_and_turn(chassis: &Chassis) {
    chassis.drive(24.0, DRIVE_SPEED, true).await;
    chassis.wait().await;

    chassis.turn_to(-45.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(-135.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(0.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.drive(-24.0, DRIVE_SPEED, true).await;
    chassis.wait().await;
}

/// Creep off the line, then speed up once clear of it.
pub async fn wait_until_change_speed(chassis: &Chassis) {
    chassis.drive(24.0, 3.0, true).await;
    chassis.wait_until(6.0).await;
    chassis.set_max_speed(DRIVE_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(45.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.turn_to(0.0, TURN_SPEED).await;
    chassis.wait().await;

    // Back up fast, then slow for the last stretch to park gently.
    chassis.drive(-24.0, DRIVE_SPEED, true).await;
    chassis.wait_until(-6.0).await;
    chassis.set_max_speed(3.0).await;
    chassis.wait().await;
}

/// Swing turns arc around the still side instead of pivoting in place.
pub async fn swing_example(chassis: &Chassis) {
    chassis.swing_to(SwingSide::Left, 45.0, SWING_SPEED, 0.0).await;
    chassis.wait().await;

    chassis.drive(24.0, DRIVE_SPEED, true).await;
    chassis.wait_until(12.0).await;

    chassis.swing_to(SwingSide::Right, 0.0, SWING_SPEED, 4.0).await;
    chassis.wait().await;
}

/// Quick chains release at the chain tolerance so consecutive motions blend
/// into one smooth arc instead of stopping between them.
pub async fn motion_chaining(chassis: &Chassis) {
    chassis.drive(24.0, DRIVE_SPEED, true).await;
    chassis.wait_quick_chain().await;

    chassis.turn_to(90.0, TURN_SPEED).await;
    chassis.wait_quick_chain().await;

    chassis.turn_to(180.0, TURN_SPEED).await;
    chassis.wait_quick_chain().await;

    chassis.turn_to(270.0, TURN_SPEED).await;
    chassis.wait().await;

    // The last motion of a chain gets a full settle.
    chassis.drive(-24.0, DRIVE_SPEED, true).await;
    chassis.wait().await;
}

/// Mixed routine touching everything at once.
pub async fn combining_movements(chassis: &Chassis) {
    chassis.drive(24.0, DRIVE_SPEED, true).await;
    chassis.wait_until(12.0).await;
    chassis.set_max_speed(6.0).await;
    chassis.wait().await;

    chassis.turn_to(45.0, TURN_SPEED).await;
    chassis.wait_quick_chain().await;

    chassis.swing_to(SwingSide::Right, 135.0, SWING_SPEED, 0.0).await;
    chassis.wait().await;

    chassis.turn_to(0.0, TURN_SPEED).await;
    chassis.wait().await;

    chassis.drive(-24.0, DRIVE_SPEED, true).await;
    chassis.wait().await;
}

/// Odometry-guided motions: points, a turn to face a point, and a boomerang
/// into a full pose.
pub async fn odom_example(chassis: &Chassis) {
    chassis.drive_to_point(0.0, 24.0, false, DRIVE_SPEED, true).await;
    chassis.wait().await;

    chassis.turn_to_point(24.0, 24.0, TURN_SPEED).await;
    chassis.wait_quick_chain().await;

    chassis.drive_to_point(24.0, 24.0, false, DRIVE_SPEED, true).await;
    chassis.wait().await;

    chassis.boomerang_to(0.0, 0.0, 180.0, DRIVE_SPEED, true).await;
    chassis.wait().await;

    // Reverse back onto the start tile.
    chassis.drive_to_point(0.0, 12.0, true, DRIVE_SPEED, false).await;
    chassis.wait().await;
}
