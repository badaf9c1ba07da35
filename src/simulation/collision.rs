//! Collision detection inside the intersection box
//!
//! The box spans from the stop line (position 0) to `-street_width`. A
//! vehicle occupied it during a tick when its front is past the stop line now
//! and its rear had not yet cleared the far edge at the previous sample, which
//! also catches vehicles that swept through the box within one tick.

use super::types::{Approach, VehicleEntry};
use super::world_state::WorldState;

/// Whether the vehicle was inside the box between the two samples
pub fn occupied_box(previous_position: i32, current: &VehicleEntry, street_width: i32) -> bool {
    current.state.position < 0 && previous_position + current.config.length > -street_width
}

/// Number of (west-east, north-south) vehicle pairs that shared the box
pub fn detect_collisions(previous: &WorldState, current: &WorldState, street_width: i32) -> usize {
    let in_box = |approach: Approach| -> usize {
        current
            .vehicles_on(approach)
            .filter(|(id, entry)| {
                let previous_position = previous
                    .vehicle(*id)
                    .map_or(entry.state.position, |before| before.state.position);
                occupied_box(previous_position, entry, street_width)
            })
            .count()
    };

    in_box(Approach::WestEast) * in_box(Approach::NorthSouth)
}
