//! Intersection Traffic Simulation Library
//!
//! Simulates a single four-way intersection as independently behaving agents
//! advancing in lock-step ticks.

pub mod simulation;
