//! Driver decision tests

mod common;

use common::{no_dawdle, vehicle_config, FixedRoll};
use intersection_sim::simulation::{
    Agent, Approach, LightColor, Manoeuvre, Perception, Reply, VehicleAgent, VehicleConfig,
    VehicleId, VehicleState, VehicleUpdate,
};

fn perception(light: LightColor, previous_light: LightColor) -> Perception {
    Perception {
        lead_gap: None,
        light,
        previous_light,
    }
}

fn vehicle(position: i32, velocity: i32, config: VehicleConfig) -> VehicleAgent {
    VehicleAgent::new(
        VehicleId(1),
        config,
        VehicleState::new(Approach::WestEast, position, velocity),
        no_dawdle(),
    )
}

#[test]
fn test_accelerates_on_green() {
    let mut car = vehicle(15, 0, vehicle_config());
    let green = perception(LightColor::Green, LightColor::Green);

    let mut trace = Vec::new();
    for _ in 0..3 {
        assert_eq!(car.step(&green), Manoeuvre::Green);
        trace.push((car.state().velocity, car.state().position));
    }

    assert_eq!(trace, vec![(1, 14), (2, 12), (3, 9)]);
}

#[test]
fn test_stops_before_line_on_red() {
    let mut car = vehicle(5, 3, vehicle_config());
    let red = perception(LightColor::Red, LightColor::Red);

    assert_eq!(car.step(&red), Manoeuvre::Braking);
    assert!(car.is_slowing_down());

    for _ in 0..10 {
        car.step(&red);
        assert!(car.state().position >= 0);
    }
    assert_eq!(car.state().velocity, 0);
    assert!(car.state().position > 0);
}

#[test]
fn test_drives_on_in_safe_zone() {
    let mut car = vehicle(20, 0, vehicle_config());
    let red = perception(LightColor::Red, LightColor::Red);

    assert_eq!(car.step(&red), Manoeuvre::SafeZone);
    assert_eq!(car.state().velocity, 1);
    assert!(!car.is_slowing_down());
}

#[test]
fn test_green_cancels_braking() {
    let mut car = vehicle(5, 3, vehicle_config());
    car.step(&perception(LightColor::Red, LightColor::Red));
    assert!(car.is_slowing_down());

    assert_eq!(
        car.step(&perception(LightColor::Green, LightColor::Red)),
        Manoeuvre::Green
    );
    assert!(!car.is_slowing_down());
}

#[test]
fn test_runs_yellow_when_it_decides_to() {
    let config = VehicleConfig {
        yellow_go_probability: 1.0,
        ..vehicle_config()
    };
    let mut car = vehicle(4, 3, config);

    let manoeuvre = car.step(&perception(LightColor::Yellow, LightColor::Green));
    assert_eq!(manoeuvre, Manoeuvre::YellowGo);
    assert!(car.is_running_yellow());
    assert_eq!(car.state().position, 1);

    // The decision sticks while the light stays yellow
    let manoeuvre = car.step(&perception(LightColor::Yellow, LightColor::Yellow));
    assert_eq!(manoeuvre, Manoeuvre::YellowGo);
    assert!(car.state().position < 1);
}

#[test]
fn test_proceeds_when_too_close_to_stop() {
    let mut car = vehicle(3, 3, vehicle_config());

    let manoeuvre = car.step(&perception(LightColor::Yellow, LightColor::Green));
    assert_eq!(manoeuvre, Manoeuvre::CannotStop);
    assert!(!car.is_running_yellow());
    assert_eq!(car.state().position, 0);
}

#[test]
fn test_ignores_light_past_stop_line() {
    let mut car = vehicle(0, 2, vehicle_config());

    let manoeuvre = car.step(&perception(LightColor::Red, LightColor::Red));
    assert_eq!(manoeuvre, Manoeuvre::PastStopLine);
    assert_eq!(car.state().velocity, 3);
    assert_eq!(car.state().position, -3);
}

#[test]
fn test_keeps_distance_to_lead_vehicle() {
    let mut car = vehicle(15, 2, vehicle_config());
    let blocked = Perception {
        lead_gap: Some(1),
        light: LightColor::Green,
        previous_light: LightColor::Green,
    };

    car.step(&blocked);
    assert_eq!(car.state().velocity, 1);
    assert_eq!(car.state().position, 14);

    car.step(&Perception {
        lead_gap: Some(0),
        ..blocked
    });
    assert_eq!(car.state().velocity, 0);
    assert_eq!(car.state().position, 14);
}

#[test]
fn test_random_slowdown() {
    let mut car = VehicleAgent::new(
        VehicleId(1),
        vehicle_config(),
        VehicleState::new(Approach::NorthSouth, 15, 2),
        Box::new(FixedRoll(0.0)),
    );

    car.step(&perception(LightColor::Green, LightColor::Green));
    assert_eq!(car.state().velocity, 2);
}

#[test]
fn test_act_reports_new_state() {
    let mut car = vehicle(15, 0, vehicle_config());
    let reply = car.act(7, perception(LightColor::Green, LightColor::Green));

    assert_eq!(
        reply,
        Reply::Vehicle(VehicleUpdate {
            id: VehicleId(1),
            tick: 7,
            position: 14,
            velocity: 1,
        })
    );
}
