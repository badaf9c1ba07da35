//! Messages exchanged between the coordinator and the agents

use super::generator::NewVehicle;
use super::types::{Lights, VehicleId};
use super::vehicle::Perception;
use super::world_state::Surrounding;

/// A vehicle's new kinematic state after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleUpdate {
    pub id: VehicleId,
    pub tick: u64,
    pub position: i32,
    pub velocity: i32,
}

/// The light controller's full color mapping after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightsUpdate {
    pub tick: u64,
    pub lights: Lights,
}

/// Vehicles created by the generator during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub tick: u64,
    pub vehicles: Vec<NewVehicle>,
}

/// Agent -> coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Vehicle(VehicleUpdate),
    Lights(LightsUpdate),
    Generation(GenerationReport),
}

impl Reply {
    pub fn tick(&self) -> u64 {
        match self {
            Reply::Vehicle(update) => update.tick,
            Reply::Lights(update) => update.tick,
            Reply::Generation(report) => report.tick,
        }
    }
}

/// Input of the generator for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub surrounding: Surrounding,
    /// Bootstrap request: spawn one vehicle per approach unconditionally
    pub initial: bool,
}

/// Coordinator -> runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start an agent for a vehicle that just joined the world
    Spawn(NewVehicle),
    Drive {
        id: VehicleId,
        tick: u64,
        perception: Perception,
    },
    Signal {
        tick: u64,
        surrounding: Surrounding,
    },
    Generate {
        tick: u64,
        request: GenerationRequest,
    },
    /// The vehicle left the monitored area; stop its agent
    Retire(VehicleId),
    /// The run is over; stop every agent
    Halt,
}
