//! Versioned snapshot of the whole intersection
//!
//! The coordinator is the only writer. Once a snapshot has been handed out
//! to agents it is never changed; the next version is built on a copy.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use super::types::{
    Approach, LightColor, Lights, PerApproach, VehicleConfig, VehicleEntry, VehicleId,
    VehicleState,
};

/// Positions of the vehicles still in front of the stop line, per approach
///
/// This is what the light controller and the generator get to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surrounding {
    pub positions: PerApproach<Vec<i32>>,
}

impl Surrounding {
    pub fn new(ns: Vec<i32>, we: Vec<i32>) -> Self {
        Self {
            positions: PerApproach::new(ns, we),
        }
    }

    pub fn on(&self, approach: Approach) -> &[i32] {
        self.positions.get(approach)
    }

    /// Vehicles with `0 <= position < distance` on the approach
    pub fn waiting_within(&self, approach: Approach, distance: i32) -> usize {
        self.on(approach)
            .iter()
            .filter(|&&position| position >= 0 && position < distance)
            .count()
    }
}

/// Authoritative mapping from vehicles to their state plus the light colors
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    vehicles: BTreeMap<VehicleId, VehicleEntry>,
    lights: Lights,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// Empty world with the initial light phase
    pub fn new() -> Self {
        Self {
            vehicles: BTreeMap::new(),
            lights: Lights::initial(),
        }
    }

    /// Copy used as the starting point of the next version
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn lights(&self) -> Lights {
        self.lights
    }

    pub fn light_on(&self, approach: Approach) -> LightColor {
        *self.lights.get(approach)
    }

    pub fn set_lights(&mut self, lights: Lights) {
        debug_assert!(lights.is_exclusive(), "both approaches non-red: {lights:?}");
        self.lights = lights;
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains_key(&id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleEntry> {
        self.vehicles.get(&id)
    }

    pub fn vehicle_ids(&self) -> BTreeSet<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = (VehicleId, &VehicleEntry)> {
        self.vehicles.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn vehicles_on(
        &self,
        approach: Approach,
    ) -> impl Iterator<Item = (VehicleId, &VehicleEntry)> {
        self.vehicles()
            .filter(move |(_, entry)| entry.state.approach == approach)
    }

    /// Vehicles on the approach that have not reached the stop line yet
    pub fn before_intersection(&self, approach: Approach) -> BTreeSet<VehicleId> {
        self.vehicles_on(approach)
            .filter(|(_, entry)| entry.state.is_before_intersection())
            .map(|(id, _)| id)
            .collect()
    }

    /// Add a freshly generated vehicle
    pub fn insert_vehicle(&mut self, id: VehicleId, state: VehicleState, config: VehicleConfig) {
        self.vehicles.insert(id, VehicleEntry { state, config });
    }

    /// Apply a vehicle's reported move; returns false for unknown vehicles
    pub fn apply_vehicle_update(&mut self, id: VehicleId, position: i32, velocity: i32) -> bool {
        match self.vehicles.get_mut(&id) {
            Some(entry) => {
                entry.state.position = position;
                entry.state.velocity = velocity;
                true
            }
            None => false,
        }
    }

    /// Remove every vehicle more than `monitored_distance` past the stop line
    pub fn remove_departed(&mut self, monitored_distance: i32) -> Vec<VehicleId> {
        let departed: Vec<VehicleId> = self
            .vehicles()
            .filter(|(_, entry)| entry.state.position < -monitored_distance)
            .map(|(id, _)| id)
            .collect();
        for id in &departed {
            self.vehicles.remove(id);
        }
        departed
    }

    /// Vehicles on one approach ordered by position, front-most first
    fn lane(&self, approach: Approach) -> BTreeMap<(i32, VehicleId), i32> {
        self.vehicles_on(approach)
            .map(|(id, entry)| ((entry.state.position, id), entry.config.length))
            .collect()
    }

    /// Free space between the vehicle and the rear of the one ahead of it
    ///
    /// `None` means nothing is ahead on the same approach.
    pub fn lead_gap(&self, id: VehicleId) -> Option<i32> {
        let entry = self.vehicles.get(&id)?;
        let lane = self.lane(entry.state.approach);
        Self::gap_in_lane(&lane, id, entry.state.position)
    }

    /// Lead gaps for every vehicle, one lane pass per approach
    pub fn lead_gaps(&self) -> BTreeMap<VehicleId, Option<i32>> {
        let mut gaps = BTreeMap::new();
        for approach in Approach::ALL {
            let lane = self.lane(approach);
            for &(position, id) in lane.keys() {
                gaps.insert(id, Self::gap_in_lane(&lane, id, position));
            }
        }
        gaps
    }

    fn gap_in_lane(
        lane: &BTreeMap<(i32, VehicleId), i32>,
        id: VehicleId,
        position: i32,
    ) -> Option<i32> {
        lane.range((Bound::Unbounded, Bound::Excluded((position, id))))
            .next_back()
            .map(|((lead_position, _), lead_length)| {
                (position - (lead_position + lead_length)).max(0)
            })
    }

    /// Positions of vehicles not yet past the stop line, per approach
    pub fn surrounding(&self) -> Surrounding {
        let mut surrounding = Surrounding::default();
        for (_, entry) in self.vehicles() {
            if entry.state.position >= 0 {
                surrounding
                    .positions
                    .get_mut(entry.state.approach)
                    .push(entry.state.position);
            }
        }
        surrounding
    }
}
