//! Odometry tracking controller.
//!
//! This module provides the [`OdomTracker`] struct which manages continuous
//! pose estimation from a [`TrackerSet`]. The tracking task runs regardless
//! of whether a motion is active, so telemetry reads always see a current
//! pose.
//!
//! # Example
//!
//! ```ignore
//! use talos::motion::odom::{devices::{Pose, TrackerSet}, tracker::OdomTracker};
//!
//! let odom = OdomTracker::new(trackers);
//! odom.init();
//!
//! // Seed the starting pose before the autonomous run.
//! odom.reset(Pose::origin()).await;
//!
//! let pose = odom.pose().await;
//! println!("Position: ({}, {})", pose.x, pose.y);
//! ```

use std::sync::Arc;

use vexide::{sync::Mutex, task::spawn};

use super::{algorithm::odomloop, devices::{Pose, TrackerSet}};
use crate::to_mutex;

/// Continuous pose tracker.
///
/// Spawns a background task that integrates tracking-wheel and inertial
/// readings into the shared global pose every tick.
#[derive(Clone)]
pub struct OdomTracker {
    /// The sensor complement feeding the tracker.
    pub trackers:    TrackerSet,
    /// The current global pose, updated by the tracking loop.
    pub global_pose: Arc<Mutex<Pose>>,
}

impl OdomTracker {
    /// Creates a tracker starting at the origin.
    pub fn new(trackers: TrackerSet) -> Self {
        Self {
            trackers,
            global_pose: to_mutex(Pose::origin()),
        }
    }

    /// Creates a tracker starting at a specific pose.
    pub fn from_pose(trackers: TrackerSet, pose: Pose) -> Self {
        Self {
            trackers,
            global_pose: to_mutex(pose),
        }
    }

    /// Starts the tracking loop.
    ///
    /// Must be called once before pose reads mean anything. The task runs
    /// for the rest of the program.
    pub fn init(&self) {
        let pose = self.global_pose.clone();
        let trackers = self.trackers.clone();
        let mainloop = spawn(async move {
            odomloop(&trackers, &pose).await;
        });
        mainloop.detach();
    }

    /// Re-seeds the pose, e.g. at the start of an autonomous run.
    ///
    /// Integration continues from the new pose on the next tick.
    pub async fn reset(&self, pose: Pose) {
        let mut gp = self.global_pose.lock().await;
        *gp = pose;
    }

    /// The current pose estimate.
    pub async fn pose(&self) -> Pose { *self.global_pose.lock().await }
}
