//! Exit-condition evaluation for motions.
//!
//! A motion does not end when its PID output happens to be small; it ends
//! when the error has *stayed* small for long enough, or when an absolute
//! timeout fires. This module provides the layered settle-time/tolerance
//! tiers that make that decision.
//!
//! # How the tiers work
//!
//! Each tier pairs a tolerance with a required settle time. A tight tolerance
//! with a short settle time exits quickly when the controller converges
//! cleanly; a loose tolerance with a long settle time still terminates a
//! motion that oscillates near the target. The timeout is the last resort
//! that guarantees an autonomous routine never hangs on an unreachable
//! target or a dropped sensor.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use talos::motion::exit::{ExitConditions, ExitTier};
//!
//! // 3 deg held for 90 ms, or 7 deg held for 250 ms, or 500 ms flat.
//! let exit = ExitConditions::new(
//!     vec![
//!         ExitTier::new(Duration::from_millis(90), 3.0),
//!         ExitTier::new(Duration::from_millis(250), 7.0),
//!     ],
//!     Duration::from_millis(500),
//! )?;
//! ```

use std::time::Duration;

use super::ConfigError;

/// One settle tier: an error tolerance and how long the error must hold
/// inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitTier {
    /// How long the error must stay within `tolerance`.
    pub settle:    Duration,
    /// Error magnitude bound, in the motion's native unit (inches or
    /// degrees).
    pub tolerance: f64,
}

impl ExitTier {
    pub fn new(settle: Duration, tolerance: f64) -> Self { Self { settle, tolerance } }
}

/// A validated, ordered set of exit tiers plus an absolute timeout.
///
/// Tiers are ordered tightest first. Validation rejects zero settle times,
/// non-positive tolerances, tolerances that tighten as settle times grow,
/// and a zero timeout.
#[derive(Clone, Debug)]
pub struct ExitConditions {
    tiers:   Vec<ExitTier>,
    timeout: Duration,
}

impl ExitConditions {
    pub fn new(tiers: Vec<ExitTier>, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        for tier in &tiers {
            if tier.settle.is_zero() {
                return Err(ConfigError::ZeroSettleTime);
            }
            if !(tier.tolerance > 0.0) || !tier.tolerance.is_finite() {
                return Err(ConfigError::BadTolerance(tier.tolerance));
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].settle < pair[0].settle || pair[1].tolerance < pair[0].tolerance {
                return Err(ConfigError::TierOrder);
            }
        }
        Ok(Self { tiers, timeout })
    }

    /// The common two-tier shape: a fast/tight tier and a slow/loose tier.
    pub fn two_tier(
        fast_settle: Duration,
        fast_tolerance: f64,
        slow_settle: Duration,
        slow_tolerance: f64,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        Self::new(
            vec![
                ExitTier::new(fast_settle, fast_tolerance),
                ExitTier::new(slow_settle, slow_tolerance),
            ],
            timeout,
        )
    }

    pub fn tiers(&self) -> &[ExitTier] { &self.tiers }

    pub fn timeout(&self) -> Duration { self.timeout }
}

/// Why an evaluator reported the motion finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExitStatus {
    /// No tier has held long enough and the timeout has not elapsed.
    Running,
    /// The tier at this index held its tolerance for its settle time.
    Settled(usize),
    /// The absolute timeout elapsed first.
    TimedOut,
}

impl ExitStatus {
    pub fn is_done(&self) -> bool { !matches!(self, ExitStatus::Running) }
}

/// Per-motion settle tracker.
///
/// Owns one elapsed-settle timer per tier plus the total elapsed time.
/// Created fresh for every motion request.
#[derive(Clone, Debug)]
pub struct ExitEvaluator {
    conditions: ExitConditions,
    in_tier:    Vec<Duration>,
    elapsed:    Duration,
}

impl ExitEvaluator {
    pub fn new(conditions: ExitConditions) -> Self {
        let in_tier = vec![Duration::ZERO; conditions.tiers.len()];
        Self {
            conditions,
            in_tier,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances all settle timers by one tick and reports the verdict.
    ///
    /// A tier's timer accumulates while the error magnitude is inside its
    /// tolerance and resets to zero the moment it leaves.
    pub fn update(&mut self, error: f64, dt: Duration) -> ExitStatus {
        self.elapsed += dt;

        for (i, tier) in self.conditions.tiers.iter().enumerate() {
            if error.abs() < tier.tolerance {
                self.in_tier[i] += dt;
                if self.in_tier[i] >= tier.settle {
                    return ExitStatus::Settled(i);
                }
            } else {
                self.in_tier[i] = Duration::ZERO;
            }
        }

        if self.elapsed >= self.conditions.timeout {
            return ExitStatus::TimedOut;
        }
        ExitStatus::Running
    }

    /// Whether any tier timer is currently accumulating.
    ///
    /// Used by the executor to report the `Settling` motion state.
    pub fn is_settling(&self) -> bool { self.in_tier.iter().any(|t| !t.is_zero()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(5);

    fn standard() -> ExitConditions {
        ExitConditions::two_tier(
            Duration::from_millis(90),
            3.0,
            Duration::from_millis(250),
            7.0,
            Duration::from_millis(500),
        )
        .unwrap()
    }

    fn run_constant(eval: &mut ExitEvaluator, error: f64, ticks: u32) -> ExitStatus {
        let mut status = ExitStatus::Running;
        for _ in 0..ticks {
            status = eval.update(error, DT);
            if status.is_done() {
                break;
            }
        }
        status
    }

    #[test]
    fn tight_tier_exits_fast() {
        let mut eval = ExitEvaluator::new(standard());
        let status = run_constant(&mut eval, 1.0, 1000);
        assert_eq!(status, ExitStatus::Settled(0));
        // 90 ms of settle at 5 ms per tick.
        assert_eq!(eval.elapsed, Duration::from_millis(90));
    }

    #[test]
    fn loose_tier_catches_oscillation() {
        // Error bounces between 4 and 6: never inside the 3-unit tier, always
        // inside the 7-unit tier.
        let mut eval = ExitEvaluator::new(standard());
        let mut status = ExitStatus::Running;
        for i in 0..1000 {
            status = eval.update(if i % 2 == 0 { 4.0 } else { 6.0 }, DT);
            if status.is_done() {
                break;
            }
        }
        assert_eq!(status, ExitStatus::Settled(1));
    }

    #[test]
    fn timeout_guarantees_termination() {
        let mut eval = ExitEvaluator::new(standard());
        let status = run_constant(&mut eval, 100.0, 10_000);
        assert_eq!(status, ExitStatus::TimedOut);
        assert_eq!(eval.elapsed, Duration::from_millis(500));
    }

    #[test]
    fn excursion_resets_settle_timer() {
        let mut eval = ExitEvaluator::new(standard());
        // 80 ms inside tolerance, then one tick outside, then back in. The
        // timer must start over, so settling takes another full 90 ms.
        assert_eq!(run_constant(&mut eval, 1.0, 16), ExitStatus::Running);
        assert_eq!(eval.update(10.0, DT), ExitStatus::Running);
        assert!(!eval.is_settling());
        assert_eq!(run_constant(&mut eval, 1.0, 17), ExitStatus::Running);
        assert_eq!(eval.update(1.0, DT), ExitStatus::Settled(0));
    }

    #[test]
    fn rejects_bad_configuration() {
        let t = Duration::from_millis(500);
        assert!(matches!(
            ExitConditions::new(vec![ExitTier::new(Duration::ZERO, 3.0)], t),
            Err(ConfigError::ZeroSettleTime)
        ));
        assert!(matches!(
            ExitConditions::new(vec![ExitTier::new(DT, -1.0)], t),
            Err(ConfigError::BadTolerance(_))
        ));
        // Looser tier paired with a shorter settle time than the tighter one.
        assert!(matches!(
            ExitConditions::two_tier(Duration::from_millis(250), 3.0, DT, 7.0, t),
            Err(ConfigError::TierOrder)
        ));
        assert!(matches!(
            ExitConditions::new(Vec::new(), Duration::ZERO),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn timeout_only_set_is_valid() {
        // No tiers at all: the timeout alone still terminates the motion.
        let mut eval =
            ExitEvaluator::new(ExitConditions::new(Vec::new(), Duration::from_millis(100)).unwrap());
        assert_eq!(run_constant(&mut eval, 0.0, 1000), ExitStatus::TimedOut);
    }
}
