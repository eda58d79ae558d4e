//! A competition program for a six-motor drivetrain with an inertial sensor.

use log::{warn, LevelFilter};
use talos::{
    drivetrain::Differential,
    fs::logger,
    motion::{
        chassis::{Chassis, DriveConfig},
        odom::{devices::TrackerSet, tracker::OdomTracker},
    },
    to_mutex,
};
use vexide::prelude::*;

mod auton;

struct Robot {
    chassis:    Chassis,
    drivetrain: Differential,
    controller: Controller,
}

impl Compete for Robot {
    async fn autonomous(&mut self) { auton::main_auton(&self.chassis).await; }

    async fn driver(&mut self) {
        loop {
            self.drivetrain.arcade(&self.controller);
            sleep(Controller::UPDATE_INTERVAL).await;
        }
    }
}

#[vexide::main]
async fn main(peripherals: Peripherals) {
    let _ = logger::init(LevelFilter::Info);

    let drivetrain = Differential::new(
        [
            Motor::new(peripherals.port_1, Gearset::Blue, Direction::Forward),
            Motor::new(peripherals.port_2, Gearset::Blue, Direction::Forward),
            Motor::new(peripherals.port_3, Gearset::Blue, Direction::Forward),
        ],
        [
            Motor::new(peripherals.port_4, Gearset::Blue, Direction::Reverse),
            Motor::new(peripherals.port_5, Gearset::Blue, Direction::Reverse),
            Motor::new(peripherals.port_6, Gearset::Blue, Direction::Reverse),
        ],
    );

    let mut imu = InertialSensor::new(peripherals.port_10);
    if let Err(e) = imu.calibrate().await {
        warn!("IMU Calibration Error: {}", e);
    }

    let odom = OdomTracker::new(TrackerSet::imu_only(to_mutex(imu)));
    let chassis = Chassis::new(
        drivetrain.clone(),
        DriveConfig::new(3.25, 36.0, 60.0, 12.5),
        odom,
    );
    chassis.init();

    Robot {
        chassis,
        drivetrain,
        controller: peripherals.primary_controller,
    }
    .compete()
    .await;
}
