//! Intersection simulation engine
//!
//! Vehicles, a traffic-light controller and a vehicle generator run as
//! independent agents. A coordinator advances the shared world state one
//! tick at a time, once every agent has replied for that tick.

mod agent;
mod collision;
mod config;
mod coordinator;
mod generator;
mod kinematics;
mod lights;
mod messages;
mod random;
mod runtime;
mod stats;
mod types;
mod vehicle;
mod world_state;

pub use agent::{spawn_agent, Agent, AgentHandle, Envelope};
pub use collision::{detect_collisions, occupied_box};
pub use config::{
    ConfigError, DriverConfig, LightPolicy, LightsConfig, SimulationConfig, WorldConfig,
};
pub use coordinator::{Coordinator, CoordinatorConfig, TickStatus};
pub use generator::{NewVehicle, VehicleGenerator};
pub use kinematics::{can_stop_before, in_safe_zone, minimal_braking, stopping_distance};
pub use lights::{DemandAdaptive, FixedTimer, Phase, SwitchPolicy, TrafficLightController};
pub use messages::{
    Command, GenerationReport, GenerationRequest, LightsUpdate, Reply, VehicleUpdate,
};
pub use random::{RandomSource, SeededRandom};
pub use runtime::Simulation;
pub use stats::{SimulationSummary, StatisticsCollector, StatisticsSink, TickReport, TickStats};
pub use types::{
    Approach, LightColor, Lights, PerApproach, VehicleConfig, VehicleEntry, VehicleId,
    VehicleState, RANDOM_SLOWDOWN_PROBABILITY,
};
pub use vehicle::{Manoeuvre, Perception, VehicleAgent};
pub use world_state::{Surrounding, WorldState};
