//! Shared fixtures for the integration tests

#![allow(dead_code)]

use intersection_sim::simulation::{
    Approach, NewVehicle, RandomSource, StatisticsSink, TickReport, VehicleConfig, VehicleId,
    VehicleState,
};

/// Random source that returns the same draw every time and never jitters
pub struct FixedRoll(pub f64);

impl RandomSource for FixedRoll {
    fn unit(&mut self) -> f64 {
        self.0
    }

    fn offset(&mut self, _spread: i32) -> i32 {
        0
    }
}

/// Draw that never triggers the random slowdown
pub fn no_dawdle() -> Box<dyn RandomSource> {
    Box::new(FixedRoll(0.99))
}

pub fn vehicle_config() -> VehicleConfig {
    VehicleConfig {
        max_velocity: 3,
        acceleration: 1,
        length: 2,
        width: 2,
        yellow_go_probability: 0.0,
    }
}

pub fn new_vehicle(id: u64, approach: Approach, position: i32) -> NewVehicle {
    NewVehicle {
        id: VehicleId(id),
        state: VehicleState::new(approach, position, 0),
        config: vehicle_config(),
    }
}

/// Sink that remembers what the coordinator reported
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// (tick, collisions, vehicles in the current snapshot)
    pub ticks: Vec<(u64, usize, usize)>,
    pub finished: Option<u64>,
}

impl StatisticsSink for RecordingSink {
    fn record_tick(&mut self, report: &TickReport<'_>) {
        self.ticks
            .push((report.tick, report.collisions, report.current.len()));
    }

    fn finish(&mut self, ticks: u64) {
        self.finished = Some(ticks);
    }
}
