//! Stopping-distance calculus
//!
//! Vehicles move Nagel-Schreckenberg style: each tick the position drops by
//! the new velocity. Braking with a constant deceleration `b` from velocity
//! `v` therefore covers `(v-b) + (v-2b) + ...` until the velocity hits zero.
//!
//! The safe-zone test and the able-to-stop test both go through
//! [`stopping_distance`] with the vehicle's own acceleration as its braking
//! capability, so a vehicle in the safe zone is always able to stop.

/// Distance covered while braking from `velocity` at `deceleration` per tick
///
/// `Some(0)` when already stopped, `None` when a moving vehicle cannot brake.
pub fn stopping_distance(velocity: i32, deceleration: i32) -> Option<i32> {
    if velocity <= 0 {
        return Some(0);
    }
    if deceleration <= 0 {
        return None;
    }
    let mut distance = 0;
    let mut current = velocity - deceleration;
    while current > 0 {
        distance += current;
        current -= deceleration;
    }
    Some(distance)
}

/// Whether braking at `braking` halts the vehicle strictly before the stop line
pub fn can_stop_before(velocity: i32, distance_to_line: i32, braking: i32) -> bool {
    if distance_to_line < 1 {
        return false;
    }
    stopping_distance(velocity, braking).is_some_and(|stop| stop < distance_to_line)
}

/// Smallest deceleration in `1..=braking` that still stops before the line
pub fn minimal_braking(velocity: i32, distance_to_line: i32, braking: i32) -> Option<i32> {
    (1..=braking).find(|&deceleration| can_stop_before(velocity, distance_to_line, deceleration))
}

/// Whether the vehicle can drive one more worst-case free-flow tick and
/// still be able to stop afterwards
pub fn in_safe_zone(
    velocity: i32,
    distance_to_line: i32,
    acceleration: i32,
    max_velocity: i32,
) -> bool {
    let next_velocity = (velocity + acceleration).min(max_velocity).max(velocity);
    can_stop_before(next_velocity, distance_to_line - next_velocity, acceleration)
}

