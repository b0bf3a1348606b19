//! Type definitions shared across the environment.

use serde::{Deserialize, Serialize};

/// Represents a 3D Cartesian position, in meters.
pub type Position = [f64; 3];
/// Represents a 3D Cartesian velocity, in meters per second.
pub type Velocity = [f64; 3];
/// Represents an (agonist, antagonist) pressure pair for a single degree of freedom.
pub type PressurePair = (f64, f64);

/// A single point of a ball trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub position: Position,
    pub velocity: Velocity,
}

impl State {
    pub fn new(position: Position, velocity: Velocity) -> Self {
        Self { position, velocity }
    }
}

/// A joint-space robot posture. Positions and velocities are indexed
/// by degree of freedom and must have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Posture {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
}

impl Posture {
    pub fn new(positions: Vec<f64>, velocities: Vec<f64>) -> Self {
        Self { positions, velocities }
    }

    /// Number of degrees of freedom.
    pub fn nb_dofs(&self) -> usize {
        self.positions.len()
    }
}

/// State of the pressure-controlled robot, as read from the pressure channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    pub pressures_ago: Vec<f64>,
    pub pressures_antago: Vec<f64>,
    pub joint_positions: Vec<f64>,
    pub joint_velocities: Vec<f64>,
}

/// Snapshot returned to the caller once per [`reset`](crate::HysrOneBall::reset)
/// or [`step`](crate::HysrOneBall::step). Immutable once constructed.
///
/// The joint and pressure fields reflect the robot state read *before* the
/// action was applied, while the ball fields reflect the state *after* the
/// burst window — a one-step lag that is part of the environment contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub joint_positions: Vec<f64>,
    pub joint_velocities: Vec<f64>,
    /// Flat interleaved `[ago1, antago1, ago2, antago2, ...]` pressures.
    pub pressures: Vec<f64>,
    pub ball_position: Position,
    pub ball_velocity: Velocity,
}
