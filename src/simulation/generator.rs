//! Stochastic vehicle generation at the far end of each approach

use log::debug;

use super::agent::Agent;
use super::config::{DriverConfig, WorldConfig};
use super::messages::{GenerationReport, GenerationRequest, Reply};
use super::random::RandomSource;
use super::types::{Approach, PerApproach, VehicleConfig, VehicleId, VehicleState};
use super::world_state::Surrounding;

/// A vehicle created by the generator, not yet known to the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewVehicle {
    pub id: VehicleId,
    pub state: VehicleState,
    pub config: VehicleConfig,
}

/// Spawns vehicles at the spawn point of each approach
pub struct VehicleGenerator {
    base: DriverConfig,
    spawn_distance: i32,
    spawn_clearance: i32,
    spawn_probability: PerApproach<f64>,
    next_id: u64,
    random: Box<dyn RandomSource>,
}

impl VehicleGenerator {
    pub fn new(driver: &DriverConfig, world: &WorldConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            base: driver.clone(),
            spawn_distance: world.spawn_distance,
            spawn_clearance: world.spawn_clearance,
            spawn_probability: world.spawn_probability,
            next_id: 0,
            random,
        }
    }

    /// Whether some vehicle is still too close to the spawn point
    pub fn is_spawn_blocked(&self, surrounding: &Surrounding, approach: Approach) -> bool {
        surrounding
            .on(approach)
            .iter()
            .any(|&position| self.spawn_distance - position < self.spawn_clearance)
    }

    /// Vehicles to add this tick
    ///
    /// The initial request spawns one vehicle per approach unconditionally.
    pub fn generate(&mut self, request: &GenerationRequest) -> Vec<NewVehicle> {
        let mut vehicles = Vec::new();
        for approach in Approach::ALL {
            let spawn = request.initial
                || (!self.is_spawn_blocked(&request.surrounding, approach)
                    && self.random.chance(*self.spawn_probability.get(approach)));
            if spawn {
                let vehicle = self.create(approach);
                debug!(
                    "Generating vehicle {} on {} with {:?}",
                    vehicle.id, approach, vehicle.config
                );
                vehicles.push(vehicle);
            }
        }
        vehicles
    }

    fn create(&mut self, approach: Approach) -> NewVehicle {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        NewVehicle {
            id,
            state: VehicleState::new(approach, self.spawn_distance, 0),
            config: self.jittered_config(),
        }
    }

    /// Base configuration with small symmetric jitter, clamped to legal values
    fn jittered_config(&mut self) -> VehicleConfig {
        let base = &self.base;
        let jitter = base.jitter;
        let probability_offset = if base.probability_jitter > 0.0 {
            (self.random.unit() * 2.0 - 1.0) * base.probability_jitter
        } else {
            0.0
        };
        VehicleConfig {
            max_velocity: (base.max_velocity + self.random.offset(jitter)).max(1),
            acceleration: (base.acceleration + self.random.offset(jitter)).max(1),
            length: (base.length + self.random.offset(jitter)).max(1),
            width: (base.width + self.random.offset(jitter)).max(1),
            yellow_go_probability: (base.yellow_go_probability + probability_offset).clamp(0.0, 1.0),
        }
    }
}

impl Agent for VehicleGenerator {
    type Input = GenerationRequest;

    fn act(&mut self, tick: u64, request: GenerationRequest) -> Reply {
        Reply::Generation(GenerationReport {
            tick,
            vehicles: self.generate(&request),
        })
    }
}
