//! Chassis configuration: drivetrain geometry and per-motion-kind tuning.
//!
//! Everything here is applied before a motion starts; a `set` call snapshots
//! the relevant pieces into the new [`MotionRequest`](super::request::MotionRequest),
//! so changing configuration mid-motion affects the next motion, not the
//! current one. Values with physical invariants are validated on the way in
//! and rejected with a [`ConfigError`].

use std::time::Duration;

use crate::motion::{
    exit::ExitConditions,
    pid::PidConstants,
    slew::SlewConstants,
    ConfigError,
};

use super::request::AngleBehavior;

/// Physical geometry of the drivetrain.
#[derive(Clone, Copy, Debug)]
pub struct DriveConfig {
    /// Drive wheel diameter in inches. Common sizes: 2.75", 3.25", 4".
    pub wheel_diameter: f64,
    /// Teeth on the driving (motor-side) gear.
    pub driving_gear:   f64,
    /// Teeth on the driven (wheel-side) gear.
    pub driven_gear:    f64,
    /// Distance between the left and right wheels in inches.
    pub track_width:    f64,
}

impl DriveConfig {
    pub fn new(wheel_diameter: f64, driving_gear: f64, driven_gear: f64, track_width: f64) -> Self {
        Self {
            wheel_diameter,
            driving_gear,
            driven_gear,
            track_width,
        }
    }

    /// Inches of wheel travel per radian of motor rotation.
    pub fn inches_per_radian(&self) -> f64 {
        (self.driving_gear / self.driven_gear) * (self.wheel_diameter / 2.0)
    }
}

/// Tuning for every motion kind.
///
/// The defaults are a workable starting point for a mid-size robot on 3.25"
/// wheels; every competition robot retunes them.
#[derive(Clone, Debug)]
pub struct ChassisConfig {
    /// Straight-drive linear gains.
    pub drive_pid:      PidConstants,
    /// Heading-hold gains applied during straight drives.
    pub heading_pid:    PidConstants,
    /// In-place turn gains.
    pub turn_pid:       PidConstants,
    /// Swing-turn gains.
    pub swing_pid:      PidConstants,
    /// Angular gains for odometry point motions.
    pub odom_angular_pid: PidConstants,
    /// Angular gains for boomerang pose motions.
    pub boomerang_pid:  PidConstants,

    /// Exit tiers for straight drives, inches.
    pub drive_exit:      ExitConditions,
    /// Exit tiers for turns, degrees.
    pub turn_exit:       ExitConditions,
    /// Exit tiers for swings, degrees.
    pub swing_exit:      ExitConditions,
    /// Exit tiers for odometry drives, inches.
    pub odom_drive_exit: ExitConditions,
    /// Exit tiers for odometry turns, degrees.
    pub odom_turn_exit:  ExitConditions,

    /// Slew window/step for drives.
    pub drive_slew: SlewConstants,
    /// Slew window/step for turns.
    pub turn_slew:  SlewConstants,
    /// Slew window/step for swings.
    pub swing_slew: SlewConstants,

    /// Default turn-direction tie-break.
    pub angle_behavior: AngleBehavior,

    drive_chain_tolerance: f64,
    turn_chain_tolerance:  f64,
    swing_chain_tolerance: f64,
    turn_bias:             f64,
    boomerang_dlead:       f64,
    boomerang_distance:    f64,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        let ms = Duration::from_millis;
        Self {
            drive_pid:   PidConstants::pd(2.0, 9.5),
            heading_pid: PidConstants::pd(1.0, 2.0),
            turn_pid:    PidConstants::new(0.3, 0.005, 2.0, 15.0),
            swing_pid:   PidConstants::pd(0.6, 6.0),
            odom_angular_pid: PidConstants::pd(0.6, 5.0),
            boomerang_pid:    PidConstants::pd(0.55, 3.0),

            drive_exit: ExitConditions::two_tier(ms(90), 1.0, ms(250), 3.0, ms(500))
                .expect("default drive exit conditions"),
            turn_exit: ExitConditions::two_tier(ms(90), 3.0, ms(250), 7.0, ms(500))
                .expect("default turn exit conditions"),
            swing_exit: ExitConditions::two_tier(ms(90), 3.0, ms(250), 7.0, ms(500))
                .expect("default swing exit conditions"),
            odom_drive_exit: ExitConditions::two_tier(ms(90), 1.0, ms(250), 3.0, ms(750))
                .expect("default odom drive exit conditions"),
            odom_turn_exit: ExitConditions::two_tier(ms(90), 3.0, ms(250), 7.0, ms(750))
                .expect("default odom turn exit conditions"),

            drive_slew: SlewConstants::new(3.0, 0.5).expect("default drive slew"),
            turn_slew:  SlewConstants::new(3.0, 0.5).expect("default turn slew"),
            swing_slew: SlewConstants::new(3.0, 0.6).expect("default swing slew"),

            angle_behavior: AngleBehavior::Shortest,

            drive_chain_tolerance: 3.0,
            turn_chain_tolerance:  3.0,
            swing_chain_tolerance: 5.0,
            turn_bias:             0.9,
            boomerang_dlead:       0.625,
            boomerang_distance:    16.0,
        }
    }
}

impl ChassisConfig {
    pub fn drive_chain_tolerance(&self) -> f64 { self.drive_chain_tolerance }

    pub fn turn_chain_tolerance(&self) -> f64 { self.turn_chain_tolerance }

    pub fn swing_chain_tolerance(&self) -> f64 { self.swing_chain_tolerance }

    pub fn turn_bias(&self) -> f64 { self.turn_bias }

    pub fn boomerang_dlead(&self) -> f64 { self.boomerang_dlead }

    pub fn boomerang_distance(&self) -> f64 { self.boomerang_distance }

    /// Error threshold, inches, that releases a quick-chain wait on drives.
    pub fn set_drive_chain_tolerance(&mut self, tolerance: f64) -> Result<(), ConfigError> {
        self.drive_chain_tolerance = positive(tolerance, ConfigError::BadChainTolerance(tolerance))?;
        Ok(())
    }

    /// Error threshold, degrees, that releases a quick-chain wait on turns.
    pub fn set_turn_chain_tolerance(&mut self, tolerance: f64) -> Result<(), ConfigError> {
        self.turn_chain_tolerance = positive(tolerance, ConfigError::BadChainTolerance(tolerance))?;
        Ok(())
    }

    /// Error threshold, degrees, that releases a quick-chain wait on swings.
    pub fn set_swing_chain_tolerance(&mut self, tolerance: f64) -> Result<(), ConfigError> {
        self.swing_chain_tolerance = positive(tolerance, ConfigError::BadChainTolerance(tolerance))?;
        Ok(())
    }

    /// Weight of angular over linear correction during odometry motions,
    /// 0.0..=1.0. Robots with tracking wheels can afford values near 1.0.
    pub fn set_turn_bias(&mut self, bias: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(ConfigError::BadTurnBias(bias));
        }
        self.turn_bias = bias;
        Ok(())
    }

    /// Boomerang lead fraction, 0.0..=1.0. Higher values bend the approach
    /// harder into the final heading.
    pub fn set_boomerang_dlead(&mut self, dlead: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&dlead) {
            return Err(ConfigError::BadBoomerangLead(dlead));
        }
        self.boomerang_dlead = dlead;
        Ok(())
    }

    /// Maximum distance, inches, the carrot may trail behind the target
    /// pose.
    pub fn set_boomerang_distance(&mut self, distance: f64) -> Result<(), ConfigError> {
        self.boomerang_distance = positive(distance, ConfigError::BadCarrotDistance(distance))?;
        Ok(())
    }
}

fn positive(value: f64, err: ConfigError) -> Result<f64, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_valid() {
        let cfg = ChassisConfig::default();
        assert_eq!(cfg.angle_behavior, AngleBehavior::Shortest);
        assert!(cfg.turn_bias() <= 1.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = ChassisConfig::default();
        assert_eq!(cfg.set_turn_bias(1.5), Err(ConfigError::BadTurnBias(1.5)));
        assert_eq!(
            cfg.set_boomerang_dlead(-0.1),
            Err(ConfigError::BadBoomerangLead(-0.1))
        );
        assert_eq!(
            cfg.set_drive_chain_tolerance(0.0),
            Err(ConfigError::BadChainTolerance(0.0))
        );
        assert!(cfg.set_turn_bias(0.5).is_ok());
        assert_eq!(cfg.turn_bias(), 0.5);
    }

    #[test]
    fn drive_geometry_conversion() {
        // 600 rpm cartridge geared 60:36 onto 3.25" wheels is irrelevant
        // here; inches-per-radian only needs the external ratio and wheel.
        let cfg = DriveConfig::new(4.0, 1.0, 1.0, 12.0);
        assert!((cfg.inches_per_radian() - 2.0).abs() < 1e-12);
    }
}
