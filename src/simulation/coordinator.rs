//! Tick barrier
//!
//! The coordinator broadcasts the current snapshot, folds every agent's reply
//! into the next version, and advances exactly once per tick: only when every
//! expected vehicle, the light controller and the generator have replied.
//! It never blocks; the runtime feeds it replies one at a time and executes
//! the commands it hands back.

use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::collision::detect_collisions;
use super::config::WorldConfig;
use super::messages::{
    Command, GenerationReport, GenerationRequest, LightsUpdate, Reply, VehicleUpdate,
};
use super::stats::{StatisticsSink, TickReport};
use super::types::{Lights, VehicleId};
use super::vehicle::Perception;
use super::world_state::WorldState;

/// Bookkeeping for the tick in progress, reset at the start of every tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStatus {
    pub tick_number: u64,
    pub expected_vehicle_replies: usize,
    pub vehicle_replies_received: usize,
    pub light_reply_received: bool,
    pub generator_reply_received: bool,
    pub collisions_this_tick: usize,
    replied: BTreeSet<VehicleId>,
}

impl TickStatus {
    fn start(&mut self, tick_number: u64, expected_vehicle_replies: usize) {
        *self = TickStatus {
            tick_number,
            expected_vehicle_replies,
            ..TickStatus::default()
        };
    }

    pub fn is_complete(&self) -> bool {
        self.vehicle_replies_received == self.expected_vehicle_replies
            && self.light_reply_received
            && self.generator_reply_received
    }
}

/// Geometry and run length the coordinator needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub ticks: u64,
    pub monitored_distance: i32,
    pub street_width: i32,
}

impl From<&WorldConfig> for CoordinatorConfig {
    fn from(world: &WorldConfig) -> Self {
        Self {
            ticks: world.ticks,
            monitored_distance: world.monitored_distance,
            street_width: world.street_width,
        }
    }
}

/// Root of the simulation: owns the two live snapshots and the barrier
pub struct Coordinator<S> {
    config: CoordinatorConfig,
    previous: WorldState,
    current: WorldState,
    status: TickStatus,
    sink: S,
    finished: bool,
}

impl<S: StatisticsSink> Coordinator<S> {
    pub fn new(config: CoordinatorConfig, sink: S) -> Self {
        let previous = WorldState::new();
        let current = previous.snapshot();
        Self {
            config,
            previous,
            current,
            status: TickStatus::default(),
            sink,
            finished: false,
        }
    }

    pub fn previous(&self) -> &WorldState {
        &self.previous
    }

    pub fn current(&self) -> &WorldState {
        &self.current
    }

    pub fn status(&self) -> &TickStatus {
        &self.status
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bootstrap: ask the generator for the initial vehicles
    ///
    /// Tick 0 waits for the generator only; its vehicles are first driven on tick 1.
    pub fn start(&mut self) -> Vec<Command> {
        self.status.start(0, 0);
        self.status.light_reply_received = true;
        vec![Command::Generate {
            tick: 0,
            request: GenerationRequest {
                surrounding: self.current.surrounding(),
                initial: true,
            },
        }]
    }

    /// Fold one reply into the tick in progress
    pub fn handle(&mut self, reply: Reply) -> Vec<Command> {
        if self.finished {
            warn!("Ignoring reply after the simulation finished: {reply:?}");
            return Vec::new();
        }
        if reply.tick() != self.status.tick_number {
            warn!(
                "Ignoring reply for tick {} during tick {}",
                reply.tick(),
                self.status.tick_number
            );
            return Vec::new();
        }

        let mut commands = Vec::new();
        match reply {
            Reply::Vehicle(update) => self.apply_vehicle(update),
            Reply::Lights(update) => self.apply_lights(update),
            Reply::Generation(report) => self.apply_generation(report, &mut commands),
        }

        if self.status.is_complete() {
            self.complete_tick(&mut commands);
        }
        commands
    }

    fn apply_vehicle(&mut self, update: VehicleUpdate) {
        if !self.current.contains(update.id) {
            warn!("Ignoring update from unknown vehicle {}", update.id);
            return;
        }
        if !self.status.replied.insert(update.id) {
            warn!("Ignoring duplicate update from vehicle {}", update.id);
            return;
        }
        self.current
            .apply_vehicle_update(update.id, update.position, update.velocity);
        self.status.vehicle_replies_received += 1;
    }

    fn apply_lights(&mut self, update: LightsUpdate) {
        if self.status.light_reply_received {
            warn!("Ignoring duplicate lights update for tick {}", update.tick);
            return;
        }
        self.current.set_lights(update.lights);
        self.status.light_reply_received = true;
    }

    fn apply_generation(&mut self, report: GenerationReport, commands: &mut Vec<Command>) {
        if self.status.generator_reply_received {
            warn!("Ignoring duplicate generation report for tick {}", report.tick);
            return;
        }
        for vehicle in report.vehicles {
            if self.current.contains(vehicle.id) {
                warn!("Ignoring generated vehicle {} that already exists", vehicle.id);
                continue;
            }
            self.current
                .insert_vehicle(vehicle.id, vehicle.state, vehicle.config);
            commands.push(Command::Spawn(vehicle));
        }
        self.status.generator_reply_received = true;
    }

    fn complete_tick(&mut self, commands: &mut Vec<Command>) {
        let tick = self.status.tick_number;

        if tick > 0 {
            let collisions =
                detect_collisions(&self.previous, &self.current, self.config.street_width);
            self.status.collisions_this_tick = collisions;
            if collisions > 0 {
                info!("Collision detected in tick {tick} ({collisions} pairs)");
            }
            self.sink.record_tick(&TickReport {
                tick,
                collisions,
                previous: &self.previous,
                current: &self.current,
            });

            for id in self.current.remove_departed(self.config.monitored_distance) {
                debug!("Vehicle {id} left the monitored area");
                commands.push(Command::Retire(id));
            }
        }
        debug!("Tick {tick} complete with {} vehicles", self.current.len());

        if tick >= self.config.ticks {
            self.sink.finish(tick);
            self.finished = true;
            commands.push(Command::Halt);
            return;
        }

        let lights_before = self.previous.lights();
        self.previous = std::mem::take(&mut self.current);
        self.current = self.previous.snapshot();
        self.broadcast(tick + 1, lights_before, commands);
    }

    /// Hand the published snapshot to every agent for the next tick
    ///
    /// `lights_before` are the colors one tick before the published snapshot.
    fn broadcast(&mut self, tick: u64, lights_before: Lights, commands: &mut Vec<Command>) {
        self.status.start(tick, self.previous.len());
        let published = &self.previous;

        for (id, gap) in published.lead_gaps() {
            let Some(entry) = published.vehicle(id) else {
                continue;
            };
            let approach = entry.state.approach;
            commands.push(Command::Drive {
                id,
                tick,
                perception: Perception {
                    lead_gap: gap,
                    light: published.light_on(approach),
                    previous_light: *lights_before.get(approach),
                },
            });
        }

        let surrounding = published.surrounding();
        commands.push(Command::Signal {
            tick,
            surrounding: surrounding.clone(),
        });
        commands.push(Command::Generate {
            tick,
            request: GenerationRequest {
                surrounding,
                initial: false,
            },
        });
    }
}
