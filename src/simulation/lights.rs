//! Traffic light controller
//!
//! Both policies share one state machine: the green approach turns yellow,
//! yellow holds for the configured duration, then the crossing approach
//! turns green. Policies only decide when green should end.

use log::{debug, info};

use super::agent::Agent;
use super::config::{LightPolicy, LightsConfig};
use super::messages::{LightsUpdate, Reply};
use super::types::{Approach, LightColor, Lights, PerApproach};
use super::world_state::Surrounding;

/// Which approach holds the right of way; the other one is red
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green(Approach),
    Yellow(Approach),
}

impl Phase {
    pub fn lights(self) -> Lights {
        let (approach, color) = match self {
            Phase::Green(approach) => (approach, LightColor::Green),
            Phase::Yellow(approach) => (approach, LightColor::Yellow),
        };
        let mut lights = PerApproach::new(LightColor::Red, LightColor::Red);
        *lights.get_mut(approach) = color;
        lights
    }

    /// The approach currently held at red
    pub fn red_approach(self) -> Approach {
        match self {
            Phase::Green(approach) | Phase::Yellow(approach) => approach.other(),
        }
    }
}

/// Decides when a green phase should end
pub trait SwitchPolicy: Send {
    /// Called once per tick before any switching decision
    fn observe(&mut self, _phase: Phase, _surrounding: &Surrounding) {}

    /// Called when `approach` turns green
    fn on_green(&mut self, _approach: Approach) {}

    /// Whether the green on `green` should turn yellow now
    fn should_end_green(
        &mut self,
        green: Approach,
        green_since: u32,
        surrounding: &Surrounding,
    ) -> bool;
}

/// Ends green after a fixed per-approach duration, ignoring traffic
pub struct FixedTimer {
    green_duration: PerApproach<u32>,
}

impl FixedTimer {
    pub fn new(green_duration: PerApproach<u32>) -> Self {
        Self { green_duration }
    }
}

impl SwitchPolicy for FixedTimer {
    fn should_end_green(&mut self, green: Approach, green_since: u32, _: &Surrounding) -> bool {
        green_since >= *self.green_duration.get(green)
    }
}

/// Self-organizing policy driven by queue lengths near the stop line
pub struct DemandAdaptive {
    counter_limit: u32,
    long_distance: i32,
    short_distance: i32,
    short_max_cars: usize,
    minimum_green_time: u32,
    /// Accumulated waiting vehicles per approach while it is red
    counters: PerApproach<u32>,
}

impl DemandAdaptive {
    pub fn new(config: &LightsConfig) -> Self {
        Self {
            counter_limit: config.counter_limit,
            long_distance: config.long_supervised_distance,
            short_distance: config.short_supervised_distance,
            short_max_cars: config.short_supervised_max_cars,
            minimum_green_time: config.minimum_green_time,
            counters: PerApproach::default(),
        }
    }

    pub fn counter(&self, approach: Approach) -> u32 {
        *self.counters.get(approach)
    }

    /// A small remaining platoon close to the line gets to clear first
    fn few_cars_left(&self, surrounding: &Surrounding, green: Approach) -> bool {
        let near = surrounding.waiting_within(green, self.short_distance);
        near > 0 && near < self.short_max_cars
    }
}

impl SwitchPolicy for DemandAdaptive {
    fn observe(&mut self, phase: Phase, surrounding: &Surrounding) {
        let red = phase.red_approach();
        let waiting = surrounding.waiting_within(red, self.long_distance) as u32;
        let counter = self.counters.get_mut(red);
        *counter = counter.saturating_add(waiting);
    }

    fn on_green(&mut self, approach: Approach) {
        *self.counters.get_mut(approach) = 0;
    }

    fn should_end_green(
        &mut self,
        green: Approach,
        green_since: u32,
        surrounding: &Surrounding,
    ) -> bool {
        if green_since < self.minimum_green_time {
            debug!("Minimum green time not reached on {green}");
            return false;
        }
        if self.few_cars_left(surrounding, green) {
            debug!("Few cars left in short distance on {green}");
            return false;
        }

        let red = green.other();
        let waiting_on_green = surrounding.waiting_within(green, self.long_distance);
        let waiting_on_red = surrounding.waiting_within(red, self.long_distance);
        if waiting_on_green == 0 && waiting_on_red > 0 {
            debug!("No one waiting on {green}, {waiting_on_red} waiting on {red}");
            return true;
        }
        if self.counter(red) > self.counter_limit {
            debug!("Red light counter exceeded on {red}");
            return true;
        }
        false
    }
}

/// Owns the signal phase of both approaches
pub struct TrafficLightController {
    phase: Phase,
    green_since: u32,
    yellow_since: u32,
    yellow_duration: u32,
    policy: Box<dyn SwitchPolicy>,
}

impl TrafficLightController {
    /// Starts with west-east green and north-south red
    pub fn new(yellow_duration: u32, policy: Box<dyn SwitchPolicy>) -> Self {
        Self {
            phase: Phase::Green(Approach::WestEast),
            green_since: 0,
            yellow_since: 0,
            yellow_duration,
            policy,
        }
    }

    /// Build the controller for the configured policy
    pub fn from_config(policy: LightPolicy, config: &LightsConfig) -> Self {
        let policy: Box<dyn SwitchPolicy> = match policy {
            LightPolicy::FixedTimer => Box::new(FixedTimer::new(config.green_duration)),
            LightPolicy::DemandAdaptive => Box::new(DemandAdaptive::new(config)),
        };
        Self::new(config.yellow_duration, policy)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lights(&self) -> Lights {
        self.phase.lights()
    }

    /// Advance one tick and return the resulting colors
    pub fn step(&mut self, surrounding: &Surrounding) -> Lights {
        self.policy.observe(self.phase, surrounding);

        match self.phase {
            Phase::Yellow(approach) => {
                if self.yellow_since < self.yellow_duration {
                    self.yellow_since += 1;
                } else {
                    let next = approach.other();
                    info!("Switching light to green on {next}");
                    self.phase = Phase::Green(next);
                    self.yellow_since = 0;
                    self.policy.on_green(next);
                }
            }
            Phase::Green(approach) => {
                self.green_since += 1;
                if self
                    .policy
                    .should_end_green(approach, self.green_since, surrounding)
                {
                    info!(
                        "Switching green light to yellow on {approach} after {} ticks",
                        self.green_since
                    );
                    self.phase = Phase::Yellow(approach);
                    self.yellow_since = 1;
                    self.green_since = 0;
                }
            }
        }

        let lights = self.lights();
        debug_assert!(lights.is_exclusive());
        lights
    }
}

impl Agent for TrafficLightController {
    type Input = Surrounding;

    fn act(&mut self, tick: u64, surrounding: Surrounding) -> Reply {
        let lights = self.step(&surrounding);
        Reply::Lights(LightsUpdate { tick, lights })
    }
}
