use super::request::AngleBehavior;

/// Wraps degrees to [-180, 180).
pub(super) fn wrap_180(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Signed shortest rotation from one heading to another, in [-180, 180).
pub(super) fn shortest_delta(from: f64, to: f64) -> f64 { wrap_180(to - from) }

/// Resolves an absolute turn target from the current continuous rotation.
///
/// The direction tie-break happens here, once, when the motion request is
/// created. Recomputing it every tick would flip direction whenever noise
/// crosses the 180-degree boundary.
pub(super) fn resolve_turn(current_rotation: f64, target_heading: f64, behavior: AngleBehavior) -> f64 {
    let current_heading = wrap_180(current_rotation);
    let delta = match behavior {
        AngleBehavior::Shortest => shortest_delta(current_heading, target_heading),
        AngleBehavior::Clockwise => (target_heading - current_heading).rem_euclid(360.0),
        AngleBehavior::CounterClockwise => {
            (target_heading - current_heading).rem_euclid(360.0) - 360.0
        }
        AngleBehavior::Raw => target_heading - current_heading,
    };
    current_rotation + delta
}

/// Clamps a value to +/- cap.
pub(super) fn clamp_mag(value: f64, cap: f64) -> f64 {
    let cap = cap.abs();
    value.clamp(-cap, cap)
}

/// Heading from one field point toward another, clockwise-positive degrees
/// from +y.
pub(super) fn heading_to(x: f64, y: f64, tx: f64, ty: f64) -> f64 {
    (tx - x).atan2(ty - y).to_degrees()
}

/// Linear and angular error of a pose relative to a target point.
///
/// The linear error is the distance to the target projected onto the
/// robot's facing direction, so driving past the point flips its sign and
/// the controller backs up instead of orbiting.
pub(super) fn point_errors(
    x: f64,
    y: f64,
    heading: f64,
    tx: f64,
    ty: f64,
    reverse: bool,
) -> (f64, f64) {
    let mut target_heading = heading_to(x, y, tx, ty);
    if reverse {
        target_heading += 180.0;
    }
    let angular = shortest_delta(heading, target_heading);
    let distance = ((tx - x).powi(2) + (ty - y).powi(2)).sqrt();
    let direction = if reverse { -1.0 } else { 1.0 };
    (distance * angular.to_radians().cos() * direction, angular)
}

/// Carrot target for a boomerang motion.
///
/// The carrot sits behind the target pose along its final heading, pulled
/// back by `dlead` times the robot's current distance and never more than
/// `max_distance`. As the robot closes in, the carrot recedes into the
/// target, bending the approach into the final heading.
pub(super) fn carrot_point(
    x: f64,
    y: f64,
    tx: f64,
    ty: f64,
    target_heading: f64,
    dlead: f64,
    max_distance: f64,
) -> (f64, f64) {
    let distance = ((tx - x).powi(2) + (ty - y).powi(2)).sqrt();
    let lead = (distance * dlead).min(max_distance);
    let theta = target_heading.to_radians();
    (tx - theta.sin() * lead, ty - theta.cos() * lead)
}

/// Blends linear and angular outputs into side voltages under a max-speed
/// cap.
///
/// The turn bias (0.0..=1.0) decides how much of the budget the angular
/// correction may take from the linear term when both cannot fit: at 1.0
/// turning is fully prioritized, at 0.0 the linear command keeps the whole
/// budget and saturation rounds the arc off.
pub(super) fn bias_speeds(linear: f64, angular: f64, bias: f64, max_speed: f64) -> (f64, f64) {
    let angular = clamp_mag(angular, max_speed);
    let budget = (max_speed.abs() - bias * angular.abs()).max(0.0);
    let linear = clamp_mag(linear, budget);
    (
        clamp_mag(linear + angular, max_speed),
        clamp_mag(linear - angular, max_speed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn wrap_covers_both_edges() {
        assert_eq!(wrap_180(180.0), -180.0);
        assert_eq!(wrap_180(-180.0), -180.0);
        assert_eq!(wrap_180(540.0), -180.0);
        assert!((wrap_180(350.0) - (-10.0)).abs() < TOL);
    }

    #[test]
    fn shortest_takes_the_short_way_across_the_seam() {
        // 170 to -170 is 20 degrees clockwise, not 340 counterclockwise.
        assert!((shortest_delta(170.0, -170.0) - 20.0).abs() < TOL);
        assert!((shortest_delta(-170.0, 170.0) + 20.0).abs() < TOL);
    }

    #[test]
    fn resolve_turn_behaviors() {
        // Robot has rotated 530 degrees total; heading is 170.
        let rot = 530.0;
        let shortest = resolve_turn(rot, -170.0, AngleBehavior::Shortest);
        assert!((shortest - 550.0).abs() < TOL);

        let cw = resolve_turn(rot, 90.0, AngleBehavior::Clockwise);
        assert!((cw - (rot + 280.0)).abs() < TOL);

        let ccw = resolve_turn(rot, 90.0, AngleBehavior::CounterClockwise);
        assert!((ccw - (rot - 80.0)).abs() < TOL);
    }

    #[test]
    fn turn_round_trip_returns_home() {
        // turn_to(90), turn_to(-90), turn_to(0) with shortest resolution.
        let mut rot = 0.0;
        for target in [90.0, -90.0, 0.0] {
            rot = resolve_turn(rot, target, AngleBehavior::Shortest);
        }
        assert!(wrap_180(rot).abs() < TOL);
    }

    #[test]
    fn heading_to_cardinal_points() {
        assert!((heading_to(0.0, 0.0, 0.0, 10.0) - 0.0).abs() < TOL);
        assert!((heading_to(0.0, 0.0, 10.0, 0.0) - 90.0).abs() < TOL);
        assert!((heading_to(0.0, 0.0, 0.0, -10.0).abs() - 180.0).abs() < TOL);
    }

    #[test]
    fn point_errors_forward_and_reverse() {
        // Facing the target dead on.
        let (lin, ang) = point_errors(0.0, 0.0, 0.0, 0.0, 24.0, false);
        assert!((lin - 24.0).abs() < TOL);
        assert!(ang.abs() < TOL);

        // Target directly behind, driving in reverse: no angular error and a
        // negative linear error.
        let (lin, ang) = point_errors(0.0, 0.0, 0.0, 0.0, -24.0, true);
        assert!((lin + 24.0).abs() < TOL);
        assert!(ang.abs() < TOL);
    }

    #[test]
    fn carrot_recedes_with_distance() {
        // 20 in from target, lead 0.625: carrot trails by 12.5 in along the
        // final heading (0 degrees, so straight down the y axis).
        let (cx, cy) = carrot_point(0.0, 0.0, 0.0, 20.0, 0.0, 0.625, 16.0);
        assert!(cx.abs() < TOL);
        assert!((cy - 7.5).abs() < TOL);

        // Far away the lead saturates at the max carrot distance.
        let (_, cy) = carrot_point(0.0, 0.0, 0.0, 100.0, 0.0, 0.625, 16.0);
        assert!((cy - 84.0).abs() < TOL);
    }

    #[test]
    fn bias_trades_linear_for_angular() {
        // Full bias: angular gets everything it asks for, linear what's left.
        let (l, r) = bias_speeds(12.0, 8.0, 1.0, 12.0);
        assert!((l - 12.0).abs() < TOL);
        assert!((r - (-4.0)).abs() < TOL);

        // Zero bias: linear keeps the whole budget, sides saturate.
        let (l, r) = bias_speeds(12.0, 8.0, 0.0, 12.0);
        assert!((l - 12.0).abs() < TOL);
        assert!((r - 4.0).abs() < TOL);
    }
}
