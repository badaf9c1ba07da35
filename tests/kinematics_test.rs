//! Stopping-distance calculus tests

use intersection_sim::simulation::{
    can_stop_before, in_safe_zone, minimal_braking, stopping_distance,
};
use proptest::prelude::*;

#[test]
fn test_stopping_distance() {
    assert_eq!(stopping_distance(0, 0), Some(0));
    assert_eq!(stopping_distance(3, 0), None);
    // 2 + 1
    assert_eq!(stopping_distance(3, 1), Some(3));
    // 3 + 1
    assert_eq!(stopping_distance(5, 2), Some(4));
    assert_eq!(stopping_distance(2, 5), Some(0));
}

#[test]
fn test_can_stop_before_needs_distance_left() {
    assert!(!can_stop_before(0, 0, 1));
    assert!(can_stop_before(0, 1, 1));
    assert!(can_stop_before(3, 4, 1));
    assert!(!can_stop_before(3, 3, 1));
}

#[test]
fn test_minimal_braking() {
    assert_eq!(minimal_braking(4, 7, 2), Some(1));
    assert_eq!(minimal_braking(4, 5, 2), Some(2));
    assert_eq!(minimal_braking(4, 2, 2), None);
}

#[test]
fn test_safe_zone() {
    // One more tick at full speed still leaves room to stop
    assert!(in_safe_zone(3, 10, 1, 3));
    // Distance 5 at velocity 3: after moving 3 only 2 remain, braking needs 3
    assert!(!in_safe_zone(3, 5, 1, 3));
    assert!(!in_safe_zone(0, 1, 1, 3));
}

proptest! {
    #[test]
    fn safe_zone_implies_able_to_stop(
        velocity in 0i32..6,
        distance in 1i32..40,
        acceleration in 1i32..4,
        headroom in 0i32..3,
    ) {
        let max_velocity = velocity + headroom;
        if in_safe_zone(velocity, distance, acceleration, max_velocity) {
            prop_assert!(can_stop_before(velocity, distance, acceleration));
        }
    }

    #[test]
    fn minimal_braking_never_crosses_the_line(
        velocity in 0i32..6,
        distance in 1i32..30,
        braking in 1i32..4,
    ) {
        prop_assume!(can_stop_before(velocity, distance, braking));

        let (mut velocity, mut position) = (velocity, distance);
        while velocity > 0 {
            let deceleration = minimal_braking(velocity, position, braking);
            prop_assert!(deceleration.is_some());
            velocity = (velocity - deceleration.unwrap_or(braking)).max(0);
            position -= velocity;
            prop_assert!(position >= 1, "crossed the line at velocity {}", velocity);
        }
    }
}
