//! Consumed communication interfaces.
//!
//! The environment does not reimplement real-time transport or physics; it
//! drives external backends through these traits. Each trait mirrors the
//! contract of one endpoint of the robot/simulation setup: the pressure
//! channel of the pseudo-real robot, the simulated ball, the mirroring
//! channel of the simulated robot, scene markers, the ball/racket contact
//! sensor and the trajectory source. Any failure propagates as
//! [`HysrError`] with no retry.

use crate::error::HysrError;
use crate::types::{Position, PressurePair, RobotState, State, Velocity};

/// Identifier binding a channel handle to a specific backend endpoint.
///
/// Endpoints used to be module-level globals; they are now explicit
/// configuration so multiple independent environment instances can coexist
/// (e.g. in tests). Concrete backends use the id to label their logs and
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The full set of endpoints one environment instance binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIds {
    pub ball: SegmentId,
    pub goal: SegmentId,
    pub hit_point: SegmentId,
    pub contact_robot: SegmentId,
    pub robot_mirror: SegmentId,
    pub pseudo_real_robot: SegmentId,
}

impl Default for SegmentIds {
    fn default() -> Self {
        Self {
            ball: SegmentId::new("ball"),
            goal: SegmentId::new("goal"),
            hit_point: SegmentId::new("hit_point"),
            contact_robot: SegmentId::new("contact_robot"),
            robot_mirror: SegmentId::new("mirroring"),
            pseudo_real_robot: SegmentId::new("robot"),
        }
    }
}

/// Ball/racket contact report for the current burst window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInformation {
    /// Whether the ball touched the racket during (or before) this window.
    pub contact_occured: bool,
    /// Contact point, meaningful only when `contact_occured` is true.
    pub position: Position,
    /// Minimal ball/racket distance observed so far.
    pub minimal_distance: f64,
}

impl ContactInformation {
    /// A "no contact" report with the given running minimal distance.
    pub fn no_contact(minimal_distance: f64) -> Self {
        Self {
            contact_occured: false,
            position: [0.0; 3],
            minimal_distance,
        }
    }
}

/// Pressure channel of the real (or pseudo-real) robot.
pub trait PressureChannel {
    /// Submits per-DOF (agonist, antagonist) pressure targets. With
    /// `duration_ms`, the backend ramps toward them over that duration;
    /// without, they apply on the next backend iteration. The command is
    /// fire-and-forget unless the channel is subsequently bursted.
    fn set(&mut self, pressures: &[PressurePair], duration_ms: Option<u64>)
        -> Result<(), HysrError>;

    /// Runs `nb_bursts` backend iterations, blocking until complete. Only
    /// meaningful when the backend runs in accelerated time.
    fn burst(&mut self, nb_bursts: usize) -> Result<(), HysrError>;

    /// Reads pressures and joint state. With `desired`, the currently
    /// commanded pressures are returned instead of the observed ones.
    fn read(&mut self, desired: bool) -> Result<RobotState, HysrError>;

    /// Backend iteration counter.
    fn get_iteration(&mut self) -> Result<u64, HysrError>;
}

/// Simulated ball control and state.
pub trait BallChannel {
    /// Teleports the ball.
    fn set(&mut self, position: Position, velocity: Velocity) -> Result<(), HysrError>;

    /// Current ball position and velocity.
    fn get(&mut self) -> Result<(Position, Velocity), HysrError>;

    /// Starts autonomous playback: the ball advances through `points` over
    /// subsequent simulation bursts.
    fn play_trajectory(&mut self, points: &[State]) -> Result<(), HysrError>;

    /// Backend iteration counter.
    fn get_iteration(&mut self) -> Result<u64, HysrError>;
}

/// Mirroring channel of the simulated robot. Bursting this channel advances
/// the whole simulated world (robot and ball physics).
pub trait MirroringChannel {
    /// Commands the simulated robot to the given joint state, optionally
    /// interpolated over `nb_iterations` backend iterations.
    fn set(
        &mut self,
        positions: &[f64],
        velocities: &[f64],
        nb_iterations: Option<usize>,
    ) -> Result<(), HysrError>;

    /// Current joint positions and velocities of the simulated robot.
    fn get(&mut self) -> Result<(Vec<f64>, Vec<f64>), HysrError>;

    /// Runs `nb_bursts` simulation iterations, blocking until complete.
    fn burst(&mut self, nb_bursts: usize) -> Result<(), HysrError>;
}

/// A movable scene marker (goal zone, hit point).
pub trait Marker {
    fn set(&mut self, position: Position, velocity: Velocity) -> Result<(), HysrError>;
}

/// Ball/racket contact sensor.
pub trait ContactSensor {
    /// Clears any recorded contact.
    fn reset(&mut self) -> Result<(), HysrError>;

    /// Contact report for the current burst window.
    fn get(&mut self) -> Result<ContactInformation, HysrError>;
}

/// Source of pre-recorded ball trajectories.
pub trait TrajectorySource {
    /// Samples a trajectory, returning its index and points.
    fn random_trajectory(&mut self) -> Result<(usize, Vec<State>), HysrError>;

    /// Trajectory at a fixed index.
    fn get_trajectory(&self, index: usize) -> Result<Vec<State>, HysrError>;
}

/// The full bundle of channel handles one environment instance drives.
pub struct Channels {
    pub pressures: Box<dyn PressureChannel>,
    pub ball: Box<dyn BallChannel>,
    pub mirroring: Box<dyn MirroringChannel>,
    pub goal: Box<dyn Marker>,
    pub hit_point: Box<dyn Marker>,
    pub contact: Box<dyn ContactSensor>,
    pub trajectories: Box<dyn TrajectorySource>,
}
