//! Core types for the intersection simulation
//!
//! Plain data shared by every agent and by the coordinator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Probability that a free-flowing driver drops one unit of velocity
/// (Nagel-Schreckenberg random slowdown)
pub const RANDOM_SLOWDOWN_PROBABILITY: f64 = 0.1;

/// One of the two orthogonal traffic directions crossing the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Approach {
    #[serde(rename = "ns")]
    NorthSouth,
    #[serde(rename = "we")]
    WestEast,
}

impl Approach {
    pub const ALL: [Approach; 2] = [Approach::NorthSouth, Approach::WestEast];

    /// The crossing approach
    pub fn other(self) -> Approach {
        match self {
            Approach::NorthSouth => Approach::WestEast,
            Approach::WestEast => Approach::NorthSouth,
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approach::NorthSouth => write!(f, "north-south"),
            Approach::WestEast => write!(f, "west-east"),
        }
    }
}

/// Color of the signal head facing one approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

/// A value kept once per approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerApproach<T> {
    pub ns: T,
    pub we: T,
}

impl<T> PerApproach<T> {
    pub fn new(ns: T, we: T) -> Self {
        Self { ns, we }
    }

    pub fn get(&self, approach: Approach) -> &T {
        match approach {
            Approach::NorthSouth => &self.ns,
            Approach::WestEast => &self.we,
        }
    }

    pub fn get_mut(&mut self, approach: Approach) -> &mut T {
        match approach {
            Approach::NorthSouth => &mut self.ns,
            Approach::WestEast => &mut self.we,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Approach, &T)> {
        Approach::ALL.into_iter().map(move |approach| (approach, self.get(approach)))
    }
}

/// Full two-approach color mapping
pub type Lights = PerApproach<LightColor>;

impl Lights {
    /// West-east green, north-south red
    pub fn initial() -> Self {
        Self::new(LightColor::Red, LightColor::Green)
    }

    /// At most one approach may be non-red at any instant
    pub fn is_exclusive(&self) -> bool {
        self.ns == LightColor::Red || self.we == LightColor::Red
    }

    /// The approach currently showing green, if any
    pub fn green_approach(&self) -> Option<Approach> {
        self.iter()
            .find(|(_, color)| **color == LightColor::Green)
            .map(|(approach, _)| approach)
    }

    pub fn any(&self, color: LightColor) -> bool {
        self.ns == color || self.we == color
    }
}

/// A unique identifier for a vehicle agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinematic state of one vehicle
///
/// `position` is the distance to the stop line; it decreases as the vehicle
/// advances and goes negative once the vehicle is past the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleState {
    pub approach: Approach,
    pub position: i32,
    pub velocity: i32,
}

impl VehicleState {
    pub fn new(approach: Approach, position: i32, velocity: i32) -> Self {
        Self {
            approach,
            position,
            velocity,
        }
    }

    /// Still in front of the stop line
    pub fn is_before_intersection(&self) -> bool {
        self.position > 0
    }
}

/// Immutable per-vehicle parameters, drawn once at spawn time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleConfig {
    pub max_velocity: i32,
    pub acceleration: i32,
    pub length: i32,
    pub width: i32,
    pub yellow_go_probability: f64,
}

/// What the world knows about a single vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleEntry {
    pub state: VehicleState,
    pub config: VehicleConfig,
}
