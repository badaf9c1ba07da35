//! Runs a whole simulation with one thread per agent
//!
//! The runtime owns the agent handles and the shared reply channel. It feeds
//! replies to the coordinator one at a time and carries out the commands it
//! gets back, so the coordinator is the only place where world state changes.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info};

use super::agent::{spawn_agent, AgentHandle};
use super::config::SimulationConfig;
use super::coordinator::{Coordinator, CoordinatorConfig};
use super::generator::{NewVehicle, VehicleGenerator};
use super::lights::TrafficLightController;
use super::messages::{Command, GenerationRequest, Reply};
use super::random::SeededRandom;
use super::stats::StatisticsSink;
use super::types::VehicleId;
use super::vehicle::{Perception, VehicleAgent};
use super::world_state::Surrounding;

/// A configured simulation run
pub struct Simulation {
    config: SimulationConfig,
    seed: u64,
}

impl Simulation {
    /// Validates the configuration; uses the configured seed or a random one
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate().context("Invalid simulation configuration")?;
        let seed = config.world.seed.unwrap_or_else(rand::random);
        Ok(Self { config, seed })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every tick to completion and return the sink
    pub fn run<S: StatisticsSink>(self, sink: S) -> Result<S> {
        info!(
            "Starting simulation: seed={}, policy={:?}, ticks={}",
            self.seed, self.config.world.light_policy, self.config.world.ticks
        );

        let (reply_tx, reply_rx) = unbounded::<Reply>();
        let mut agents = Agents::start(&self.config, self.seed, reply_tx)?;
        let mut coordinator = Coordinator::new(CoordinatorConfig::from(&self.config.world), sink);
        let timeout = Duration::from_millis(self.config.world.reply_timeout_ms);

        let result = drive(&mut coordinator, &mut agents, &reply_rx, timeout);
        let shutdown = agents.shutdown();
        result?;
        shutdown?;

        Ok(coordinator.into_sink())
    }
}

fn drive<S: StatisticsSink>(
    coordinator: &mut Coordinator<S>,
    agents: &mut Agents,
    replies: &Receiver<Reply>,
    timeout: Duration,
) -> Result<()> {
    let mut commands = coordinator.start();
    loop {
        for command in commands.drain(..) {
            agents.execute(command)?;
        }
        if coordinator.is_finished() {
            return Ok(());
        }

        let reply = match replies.recv_timeout(timeout) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => {
                let status = coordinator.status();
                bail!(
                    "No reply within {:?} during tick {} ({}/{} vehicles, lights={}, generator={})",
                    timeout,
                    status.tick_number,
                    status.vehicle_replies_received,
                    status.expected_vehicle_replies,
                    status.light_reply_received,
                    status.generator_reply_received
                );
            }
            Err(RecvTimeoutError::Disconnected) => bail!("Every agent stopped replying"),
        };
        commands = coordinator.handle(reply);
    }
}

/// Handles of every running agent
struct Agents {
    seed: u64,
    replies: Sender<Reply>,
    lights: Option<AgentHandle<Surrounding>>,
    generator: Option<AgentHandle<GenerationRequest>>,
    vehicles: HashMap<VehicleId, AgentHandle<Perception>>,
}

impl Agents {
    fn start(config: &SimulationConfig, seed: u64, replies: Sender<Reply>) -> Result<Self> {
        let controller =
            TrafficLightController::from_config(config.world.light_policy, &config.lights);
        let lights = spawn_agent("traffic-lights".to_string(), controller, replies.clone())?;

        let generator = VehicleGenerator::new(
            &config.driver,
            &config.world,
            Box::new(SeededRandom::new(seed)),
        );
        let generator = spawn_agent("vehicle-generator".to_string(), generator, replies.clone())?;

        Ok(Self {
            seed,
            replies,
            lights: Some(lights),
            generator: Some(generator),
            vehicles: HashMap::new(),
        })
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Spawn(vehicle) => self.spawn_vehicle(vehicle),
            Command::Drive {
                id,
                tick,
                perception,
            } => self
                .vehicles
                .get(&id)
                .with_context(|| format!("No agent for vehicle {id}"))?
                .send(tick, perception),
            Command::Signal { tick, surrounding } => self
                .lights
                .as_ref()
                .context("Traffic lights already stopped")?
                .send(tick, surrounding),
            Command::Generate { tick, request } => self
                .generator
                .as_ref()
                .context("Vehicle generator already stopped")?
                .send(tick, request),
            Command::Retire(id) => match self.vehicles.remove(&id) {
                Some(handle) => handle.stop(),
                None => Ok(()),
            },
            Command::Halt => Ok(()),
        }
    }

    fn spawn_vehicle(&mut self, vehicle: NewVehicle) -> Result<()> {
        let agent = VehicleAgent::new(
            vehicle.id,
            vehicle.config,
            vehicle.state,
            Box::new(SeededRandom::for_vehicle(self.seed, vehicle.id)),
        );
        let handle = spawn_agent(format!("vehicle-{}", vehicle.id.0), agent, self.replies.clone())?;
        debug!("Spawned agent {}", handle.name());
        self.vehicles.insert(vehicle.id, handle);
        Ok(())
    }

    /// Stop every agent and wait for its thread
    fn shutdown(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        let mut stopped: Vec<Result<()>> = self.vehicles.drain().map(|(_, handle)| handle.stop()).collect();
        if let Some(lights) = self.lights.take() {
            stopped.push(lights.stop());
        }
        if let Some(generator) = self.generator.take() {
            stopped.push(generator.stop());
        }
        for result in stopped {
            if let Err(err) = result {
                failures.push(err.to_string());
            }
        }
        if !failures.is_empty() {
            bail!("Failed to stop agents: {}", failures.join(", "));
        }
        Ok(())
    }
}
