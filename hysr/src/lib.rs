//! HYSR one-ball table-tennis reinforcement-learning environment.
//!
//! Couples a pneumatic-artificial-muscle robot arm backend ("pseudo-real
//! robot") to a physics-simulated mirror of that robot and a simulated
//! table-tennis ball, exposing the step/reset surface policy-learning
//! algorithms train against. The robot and simulation backends run as
//! external processes reached through the channel traits of
//! [`channels`]; this crate contains the episode protocol, the reward
//! shaping, and an in-process [`playback`] backend for tests and demos.

pub mod alignment;
pub mod ball_status;
pub mod channels;
pub mod constant;
pub mod error;
pub mod hysr_one_ball;
pub mod playback;
pub mod pressures;
pub mod reward;
pub mod trajectories;
pub mod types;

pub use ball_status::{BallStatus, RacketContact};
pub use channels::{Channels, ContactInformation, SegmentId, SegmentIds};
pub use error::HysrError;
pub use hysr_one_ball::{HysrConfig, HysrOneBall, PostureConfig};
pub use reward::TaskKind;
pub use trajectories::BallTrajectories;
pub use types::{Observation, Position, Posture, State, Velocity};
