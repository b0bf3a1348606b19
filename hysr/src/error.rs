//! Error type propagated by the environment.
//!
//! The environment performs no local recovery: any failure from a channel
//! or malformed input surfaces immediately to the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HysrError {
    /// A flat pressure vector must interleave (agonist, antagonist) values.
    #[error("pressure vector has odd length {0}, expected interleaved (agonist, antagonist) pairs")]
    OddPressureVector(usize),

    /// Agonist and antagonist pressure lists must be aligned per degree of freedom.
    #[error("agonist/antagonist pressure lists differ in length: {ago} vs {antago}")]
    PressureLengthMismatch { ago: usize, antago: usize },

    /// Position and velocity vectors of a posture must be aligned.
    #[error("posture has {positions} positions but {velocities} velocities")]
    PostureLengthMismatch { positions: usize, velocities: usize },

    /// A fixed trajectory index pointed outside the trajectory database.
    #[error("no trajectory with index {index} (database holds {available})")]
    UnknownTrajectory { index: usize, available: usize },

    /// The trajectory database holds nothing to sample from.
    #[error("trajectory database is empty")]
    EmptyTrajectoryDatabase,

    /// A trajectory without points cannot be played.
    #[error("trajectory {0} has no points")]
    EmptyTrajectory(usize),

    /// A communication channel failed.
    #[error("channel `{segment_id}` failed: {reason}")]
    Channel { segment_id: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A recorded trajectory file could not be parsed.
    #[error("could not parse trajectory file {path}")]
    TrajectoryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HysrError {
    /// Shorthand for a channel failure bound to a specific endpoint.
    pub fn channel(segment_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Channel {
            segment_id: segment_id.into(),
            reason: reason.into(),
        }
    }
}
