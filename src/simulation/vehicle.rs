//! Driver decision logic
//!
//! Each tick a vehicle receives what it can perceive (the gap to the vehicle
//! ahead and its signal head) and picks a new velocity. The rules are checked
//! top to bottom and the first match wins; everything that is not an active
//! braking decision drives by the free-flow rule.

use log::debug;

use super::agent::Agent;
use super::kinematics::{can_stop_before, in_safe_zone, minimal_braking};
use super::messages::{Reply, VehicleUpdate};
use super::random::RandomSource;
use super::types::{
    LightColor, VehicleConfig, VehicleId, VehicleState, RANDOM_SLOWDOWN_PROBABILITY,
};

/// What a vehicle sees at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perception {
    /// Free space to the rear of the vehicle ahead, `None` when the road ahead is empty
    pub lead_gap: Option<i32>,
    pub light: LightColor,
    /// Color of the same signal head one tick earlier
    pub previous_light: LightColor,
}

impl Perception {
    fn light_just_turned_yellow(&self) -> bool {
        self.light == LightColor::Yellow && self.previous_light != LightColor::Yellow
    }
}

/// Why a vehicle picked its velocity this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manoeuvre {
    /// At or past the stop line, the light no longer matters
    PastStopLine,
    Green,
    /// Committed to stopping before the line
    Braking,
    /// Far enough away to keep driving for now
    SafeZone,
    /// Decided to run a yellow light
    YellowGo,
    /// Too close and too fast to stop, has to proceed
    CannotStop,
}

impl Manoeuvre {
    pub fn is_braking(self) -> bool {
        self == Manoeuvre::Braking
    }
}

/// A single driver with its own kinematic state and commitments
pub struct VehicleAgent {
    id: VehicleId,
    config: VehicleConfig,
    state: VehicleState,
    decided_to_slow: bool,
    running_yellow: bool,
    random: Box<dyn RandomSource>,
}

impl VehicleAgent {
    pub fn new(
        id: VehicleId,
        config: VehicleConfig,
        state: VehicleState,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            id,
            config,
            state,
            decided_to_slow: false,
            running_yellow: false,
            random,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn config(&self) -> VehicleConfig {
        self.config
    }

    pub fn is_slowing_down(&self) -> bool {
        self.decided_to_slow
    }

    pub fn is_running_yellow(&self) -> bool {
        self.running_yellow
    }

    /// Decide, move and return the reason for the chosen velocity
    pub fn step(&mut self, perception: &Perception) -> Manoeuvre {
        let manoeuvre = self.choose_manoeuvre(perception);
        let velocity = if manoeuvre.is_braking() {
            self.brake(perception.lead_gap)
        } else {
            self.free_flow(perception.lead_gap)
        };

        debug_assert!(
            (0..=self.config.max_velocity).contains(&velocity),
            "vehicle {} velocity {} outside [0, {}]",
            self.id,
            velocity,
            self.config.max_velocity
        );

        self.state.velocity = velocity;
        self.state.position -= velocity;
        debug!(
            "Vehicle {} on {}: {:?}, position={}, velocity={}",
            self.id, self.state.approach, manoeuvre, self.state.position, self.state.velocity
        );
        manoeuvre
    }

    fn choose_manoeuvre(&mut self, perception: &Perception) -> Manoeuvre {
        let VehicleState {
            position, velocity, ..
        } = self.state;

        if position < 1 {
            return Manoeuvre::PastStopLine;
        }

        if perception.light == LightColor::Green {
            self.decided_to_slow = false;
            self.running_yellow = false;
            return Manoeuvre::Green;
        }

        if self.decided_to_slow {
            return Manoeuvre::Braking;
        }

        if in_safe_zone(
            velocity,
            position,
            self.config.acceleration,
            self.config.max_velocity,
        ) {
            return Manoeuvre::SafeZone;
        }

        if !self.running_yellow
            && perception.light_just_turned_yellow()
            && self.random.chance(self.config.yellow_go_probability)
        {
            self.running_yellow = true;
        }
        if self.running_yellow {
            return Manoeuvre::YellowGo;
        }

        if can_stop_before(velocity, position, self.config.acceleration) {
            self.decided_to_slow = true;
            return Manoeuvre::Braking;
        }

        Manoeuvre::CannotStop
    }

    /// Car-following velocity when no braking decision is active
    fn free_flow(&mut self, lead_gap: Option<i32>) -> i32 {
        let mut velocity = (self.state.velocity + self.config.acceleration).min(self.config.max_velocity);
        if let Some(gap) = lead_gap {
            velocity = velocity.min(gap);
        }
        if velocity > 0 && self.random.chance(RANDOM_SLOWDOWN_PROBABILITY) {
            velocity -= 1;
        }
        velocity.max(0)
    }

    /// Slow down by the least deceleration that still stops before the line
    fn brake(&self, lead_gap: Option<i32>) -> i32 {
        let braking = self.config.acceleration;
        let deceleration =
            minimal_braking(self.state.velocity, self.state.position, braking).unwrap_or(braking);
        let mut velocity = (self.state.velocity - deceleration).max(0);
        if let Some(gap) = lead_gap {
            velocity = velocity.min(gap);
        }
        velocity.max(0)
    }
}

impl Agent for VehicleAgent {
    type Input = Perception;

    fn act(&mut self, tick: u64, perception: Perception) -> Reply {
        self.step(&perception);
        Reply::Vehicle(VehicleUpdate {
            id: self.id,
            tick,
            position: self.state.position,
            velocity: self.state.velocity,
        })
    }
}
