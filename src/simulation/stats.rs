//! Per-tick statistics and the end-of-run summary

use std::collections::BTreeSet;

use log::info;
use serde::Serialize;

use super::types::{Approach, LightColor, PerApproach, VehicleId};
use super::world_state::WorldState;

/// Everything the coordinator publishes once a tick is complete
#[derive(Debug, Clone, Copy)]
pub struct TickReport<'a> {
    pub tick: u64,
    pub collisions: usize,
    pub previous: &'a WorldState,
    pub current: &'a WorldState,
}

/// Consumer of the per-tick snapshot pairs
pub trait StatisticsSink {
    fn record_tick(&mut self, report: &TickReport<'_>);

    /// Terminal signal, sent once after the last tick
    fn finish(&mut self, ticks: u64);
}

/// Figures derived from a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickStats {
    pub cars_per_approach: PerApproach<usize>,
    pub cars_before_intersection: PerApproach<usize>,
    pub collisions: usize,
    pub crossed_intersection: usize,
    pub waiting_on_red_or_yellow: usize,
    pub average_velocity: PerApproach<f32>,
    pub average_velocity_before_intersection: PerApproach<f32>,
}

impl TickStats {
    pub fn from_report(report: &TickReport<'_>) -> Self {
        let current = report.current;
        let mut stats = TickStats {
            collisions: report.collisions,
            crossed_intersection: crossed_intersection(report.previous, current),
            ..TickStats::default()
        };

        for approach in Approach::ALL {
            let velocities: Vec<i32> = current
                .vehicles_on(approach)
                .map(|(_, entry)| entry.state.velocity)
                .collect();
            let before: Vec<i32> = current
                .vehicles_on(approach)
                .filter(|(_, entry)| entry.state.is_before_intersection())
                .map(|(_, entry)| entry.state.velocity)
                .collect();

            *stats.cars_per_approach.get_mut(approach) = velocities.len();
            *stats.cars_before_intersection.get_mut(approach) = before.len();
            *stats.average_velocity.get_mut(approach) = mean(&velocities);
            *stats.average_velocity_before_intersection.get_mut(approach) = mean(&before);
            if current.light_on(approach) != LightColor::Green {
                stats.waiting_on_red_or_yellow += before.len();
            }
        }
        stats
    }

    pub fn total_cars(&self) -> usize {
        self.cars_per_approach.ns + self.cars_per_approach.we
    }
}

/// Vehicles in front of the line before the tick and not any more after it
fn crossed_intersection(previous: &WorldState, current: &WorldState) -> usize {
    Approach::ALL
        .into_iter()
        .flat_map(|approach| previous.before_intersection(approach))
        .filter(|id| {
            current
                .vehicle(*id)
                .is_some_and(|entry| !entry.state.is_before_intersection())
        })
        .count()
}

fn mean(values: &[i32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<i32>() as f32 / values.len() as f32
    }
}

/// Aggregates over a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub average_velocity: f32,
    pub total_collisions: usize,
    pub average_crossings_per_tick: f32,
    pub average_waiting_on_red_or_yellow: f32,
    pub average_green_duration: PerApproach<f32>,
    pub vehicles_generated: usize,
}

impl SimulationSummary {
    /// Write the summary to the log
    pub fn log(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        info!("Vehicles generated: {}", self.vehicles_generated);
        info!("Average velocity: {:.3}", self.average_velocity);
        info!("Total collisions: {}", self.total_collisions);
        info!("Average crossings per tick: {:.3}", self.average_crossings_per_tick);
        info!(
            "Average waiting on red or yellow: {:.3}",
            self.average_waiting_on_red_or_yellow
        );
        info!(
            "Average green duration north-south: {:.2}",
            self.average_green_duration.ns
        );
        info!(
            "Average green duration west-east: {:.2}",
            self.average_green_duration.we
        );
    }
}

/// Default sink: keeps per-tick stats and computes the summary at the end
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    ticks: Vec<TickStats>,
    green_durations: PerApproach<Vec<u32>>,
    green_since: u32,
    seen_vehicles: BTreeSet<VehicleId>,
    summary: Option<SimulationSummary>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_stats(&self) -> &[TickStats] {
        &self.ticks
    }

    pub fn green_durations(&self, approach: Approach) -> &[u32] {
        self.green_durations.get(approach)
    }

    /// Available once `finish` has been called
    pub fn summary(&self) -> Option<&SimulationSummary> {
        self.summary.as_ref()
    }

    fn track_green_light(&mut self, previous: &WorldState, current: &WorldState) {
        let was_green = previous.lights().green_approach();
        let now_green = current.lights().green_approach();
        match (was_green, now_green) {
            (Some(approach), None) if current.lights().any(LightColor::Yellow) => {
                self.green_durations.get_mut(approach).push(self.green_since);
                self.green_since = 0;
            }
            (None, Some(_)) => self.green_since = 1,
            (_, Some(_)) => self.green_since += 1,
            _ => {}
        }
    }

    fn compute_summary(&self, ticks: u64) -> SimulationSummary {
        let tick_count = self.ticks.len() as f32;
        let per_tick = |total: usize| {
            if self.ticks.is_empty() {
                0.0
            } else {
                total as f32 / tick_count
            }
        };

        let mut velocity_total = 0.0f32;
        let mut vehicle_ticks = 0usize;
        for stats in &self.ticks {
            for approach in Approach::ALL {
                let cars = *stats.cars_per_approach.get(approach);
                velocity_total += stats.average_velocity.get(approach) * cars as f32;
                vehicle_ticks += cars;
            }
        }

        let average_green = |approach: Approach| {
            let durations = self.green_durations.get(approach);
            if durations.is_empty() {
                0.0
            } else {
                durations.iter().sum::<u32>() as f32 / durations.len() as f32
            }
        };

        SimulationSummary {
            ticks,
            average_velocity: if vehicle_ticks == 0 {
                0.0
            } else {
                velocity_total / vehicle_ticks as f32
            },
            total_collisions: self.ticks.iter().map(|stats| stats.collisions).sum(),
            average_crossings_per_tick: per_tick(
                self.ticks.iter().map(|stats| stats.crossed_intersection).sum(),
            ),
            average_waiting_on_red_or_yellow: per_tick(
                self.ticks.iter().map(|stats| stats.waiting_on_red_or_yellow).sum(),
            ),
            average_green_duration: PerApproach::new(
                average_green(Approach::NorthSouth),
                average_green(Approach::WestEast),
            ),
            vehicles_generated: self.seen_vehicles.len(),
        }
    }
}

impl StatisticsSink for StatisticsCollector {
    fn record_tick(&mut self, report: &TickReport<'_>) {
        self.ticks.push(TickStats::from_report(report));
        self.seen_vehicles.extend(report.current.vehicle_ids());
        self.track_green_light(report.previous, report.current);
    }

    fn finish(&mut self, ticks: u64) {
        self.summary = Some(self.compute_summary(ticks));
    }
}
