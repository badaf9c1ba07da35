//! Vehicle generator tests

mod common;

use common::FixedRoll;
use intersection_sim::simulation::{
    Agent, Approach, DriverConfig, GenerationRequest, PerApproach, Reply, Surrounding,
    VehicleGenerator, VehicleId, WorldConfig,
};

fn world(ns: f64, we: f64) -> WorldConfig {
    WorldConfig {
        spawn_distance: 30,
        spawn_clearance: 4,
        spawn_probability: PerApproach::new(ns, we),
        ..WorldConfig::default()
    }
}

fn generator(world: &WorldConfig) -> VehicleGenerator {
    VehicleGenerator::new(&DriverConfig::default(), world, Box::new(FixedRoll(0.5)))
}

fn request(ns: Vec<i32>, we: Vec<i32>) -> GenerationRequest {
    GenerationRequest {
        surrounding: Surrounding::new(ns, we),
        initial: false,
    }
}

#[test]
fn test_initial_request_spawns_on_both_approaches() {
    let mut generator = generator(&world(0.0, 0.0));
    let vehicles = generator.generate(&GenerationRequest {
        surrounding: Surrounding::default(),
        initial: true,
    });

    assert_eq!(vehicles.len(), 2);
    assert_eq!(vehicles[0].state.approach, Approach::NorthSouth);
    assert_eq!(vehicles[1].state.approach, Approach::WestEast);
    assert_eq!(vehicles[0].id, VehicleId(0));
    assert_eq!(vehicles[1].id, VehicleId(1));
    for vehicle in &vehicles {
        assert_eq!(vehicle.state.position, 30);
        assert_eq!(vehicle.state.velocity, 0);
    }
}

#[test]
fn test_spawns_until_clearance_is_violated() {
    let mut generator = generator(&world(1.0, 0.0));
    let mut positions: Vec<i32> = Vec::new();
    let mut spawned_per_tick = Vec::new();

    for _ in 0..6 {
        let vehicles = generator.generate(&request(positions.clone(), Vec::new()));
        assert!(vehicles
            .iter()
            .all(|vehicle| vehicle.state.approach == Approach::NorthSouth));
        spawned_per_tick.push(vehicles.len());
        positions.extend(vehicles.iter().map(|vehicle| vehicle.state.position));
        // Everything already on the road creeps forward by one
        positions.iter_mut().for_each(|position| *position -= 1);
    }

    // Spawned at 30, blocked while within 4 of the spawn point
    assert_eq!(spawned_per_tick, vec![1, 0, 0, 0, 1, 0]);
}

#[test]
fn test_spawn_blocked_by_clearance() {
    let generator = generator(&world(1.0, 1.0));

    let blocked = Surrounding::new(vec![27], Vec::new());
    assert!(generator.is_spawn_blocked(&blocked, Approach::NorthSouth));
    assert!(!generator.is_spawn_blocked(&blocked, Approach::WestEast));

    let clear = Surrounding::new(vec![26], Vec::new());
    assert!(!generator.is_spawn_blocked(&clear, Approach::NorthSouth));
}

#[test]
fn test_zero_probability_never_spawns() {
    let mut generator = generator(&world(0.0, 0.0));
    for _ in 0..20 {
        assert!(generator.generate(&request(Vec::new(), Vec::new())).is_empty());
    }
}

#[test]
fn test_ids_are_unique() {
    let mut generator = generator(&world(1.0, 1.0));
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.extend(
            generator
                .generate(&request(Vec::new(), Vec::new()))
                .iter()
                .map(|vehicle| vehicle.id),
        );
    }
    assert_eq!(ids, (0..6).map(VehicleId).collect::<Vec<_>>());
}

#[test]
fn test_without_jitter_vehicles_use_base_config() {
    let driver = DriverConfig::default();
    let mut generator = generator(&world(1.0, 0.0));
    let vehicles = generator.generate(&request(Vec::new(), Vec::new()));

    let config = vehicles[0].config;
    assert_eq!(config.max_velocity, driver.max_velocity);
    assert_eq!(config.acceleration, driver.acceleration);
    assert_eq!(config.length, driver.length);
    assert_eq!(config.width, driver.width);
    assert!((config.yellow_go_probability - driver.yellow_go_probability).abs() < 1e-9);
}

#[test]
fn test_act_reports_generated_vehicles() {
    let mut generator = generator(&world(1.0, 1.0));
    let Reply::Generation(report) = generator.act(3, request(Vec::new(), vec![29])) else {
        panic!("generator must reply with a generation report");
    };

    assert_eq!(report.tick, 3);
    assert_eq!(report.vehicles.len(), 1);
    assert_eq!(report.vehicles[0].state.approach, Approach::NorthSouth);
}
