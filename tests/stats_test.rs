//! Statistics collector tests

mod common;

use common::vehicle_config;
use intersection_sim::simulation::{
    Approach, LightColor, Lights, PerApproach, StatisticsCollector, StatisticsSink, TickReport,
    TickStats, VehicleId, VehicleState, WorldState,
};

fn place(world: &mut WorldState, id: u64, approach: Approach, position: i32, velocity: i32) {
    world.insert_vehicle(
        VehicleId(id),
        VehicleState::new(approach, position, velocity),
        vehicle_config(),
    );
}

/// One vehicle crosses on north-south, one queues behind the red light
fn crossing_tick() -> (WorldState, WorldState) {
    let mut previous = WorldState::new();
    place(&mut previous, 0, Approach::NorthSouth, 1, 1);
    place(&mut previous, 1, Approach::WestEast, 5, 0);

    let mut current = WorldState::new();
    place(&mut current, 0, Approach::NorthSouth, -1, 2);
    place(&mut current, 1, Approach::WestEast, 4, 1);
    place(&mut current, 2, Approach::NorthSouth, 8, 0);
    (previous, current)
}

fn with_lights(lights: Lights) -> WorldState {
    let mut world = WorldState::new();
    world.set_lights(lights);
    world
}

#[test]
fn test_tick_stats() {
    let (previous, current) = crossing_tick();
    let stats = TickStats::from_report(&TickReport {
        tick: 1,
        collisions: 0,
        previous: &previous,
        current: &current,
    });

    assert_eq!(stats.cars_per_approach, PerApproach::new(2, 1));
    assert_eq!(stats.cars_before_intersection, PerApproach::new(1, 1));
    assert_eq!(stats.crossed_intersection, 1);
    // North-south is red at the start
    assert_eq!(stats.waiting_on_red_or_yellow, 1);
    assert_eq!(stats.average_velocity, PerApproach::new(1.0, 1.0));
    assert_eq!(stats.average_velocity_before_intersection, PerApproach::new(0.0, 1.0));
    assert_eq!(stats.total_cars(), 3);
}

#[test]
fn test_summary() {
    let (previous, current) = crossing_tick();
    let mut collector = StatisticsCollector::new();
    assert!(collector.summary().is_none());

    for (tick, collisions) in [(1, 1), (2, 0)] {
        collector.record_tick(&TickReport {
            tick,
            collisions,
            previous: &previous,
            current: &current,
        });
    }
    collector.finish(2);

    let summary = collector.summary().expect("finished");
    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.total_collisions, 1);
    assert_eq!(summary.vehicles_generated, 3);
    assert_eq!(summary.average_velocity, 1.0);
    assert_eq!(summary.average_crossings_per_tick, 1.0);
    assert_eq!(summary.average_waiting_on_red_or_yellow, 1.0);
    assert_eq!(collector.tick_stats().len(), 2);
}

#[test]
fn test_empty_summary() {
    let mut collector = StatisticsCollector::new();
    collector.finish(0);

    let summary = collector.summary().expect("finished");
    assert_eq!(summary.average_velocity, 0.0);
    assert_eq!(summary.average_crossings_per_tick, 0.0);
    assert_eq!(summary.average_green_duration, PerApproach::new(0.0, 0.0));
}

#[test]
fn test_green_durations() {
    let we_green = with_lights(Lights::initial());
    let we_yellow = with_lights(PerApproach::new(LightColor::Red, LightColor::Yellow));
    let ns_green = with_lights(PerApproach::new(LightColor::Green, LightColor::Red));

    let sequence = [
        &we_green, &we_green, &we_green, &we_yellow, &we_yellow, &ns_green, &ns_green,
    ];
    let mut collector = StatisticsCollector::new();
    for (tick, pair) in sequence.windows(2).enumerate() {
        collector.record_tick(&TickReport {
            tick: tick as u64 + 1,
            collisions: 0,
            previous: pair[0],
            current: pair[1],
        });
    }
    collector.finish(sequence.len() as u64 - 1);

    assert_eq!(collector.green_durations(Approach::WestEast), &[2]);
    assert!(collector.green_durations(Approach::NorthSouth).is_empty());
    let summary = collector.summary().expect("finished");
    assert_eq!(summary.average_green_duration.we, 2.0);
}

#[test]
fn test_summary_serializes() {
    let mut collector = StatisticsCollector::new();
    collector.finish(0);

    let json = serde_json::to_value(collector.summary()).expect("serializable");
    assert_eq!(json["ticks"], 0);
    assert_eq!(json["total_collisions"], 0);
    assert!(json["average_green_duration"]["ns"].is_number());
}
