//! Contains definitions of needed constants.

use crate::types::Position;

/// Z-level below which the episode is considered over (the ball fell
/// below the table).
pub const EPISODE_OVER_Z_LEVEL: f64 = -0.5;

/// Position of the synthetic final trajectory point, appended to every
/// played trajectory. It sits far below [`EPISODE_OVER_Z_LEVEL`] so end of
/// episode detection always eventually fires, even if no real low-table
/// event occurs.
pub const TRAJECTORY_TAIL_POSITION: Position = [0.0, 0.0, -10.0];

/// Resting position of the hit-point marker, below the table surface.
/// The marker is parked here at reset and relocated to the post-contact
/// minimal ball/target position during the episode.
pub const HIT_POINT_REST_POSITION: Position = [0.0, 0.0, -0.62];

/// Number of simulation bursts performed after teleporting the ball to the
/// first trajectory point, letting the mirrored scene settle before playback.
pub const SETTLE_BURSTS: usize = 5;

/// Settling delay after clearing the contact sensor during reset.
pub const CONTACT_RESET_SETTLE_S: f64 = 0.1;

/// Default lower clamp applied to the task rewards. Guards against an
/// unbounded negative reward from the power-law distance term.
pub const DEFAULT_RTT_CAP: f64 = -0.2;

/// Default per-iteration increment of the posture alignment routine.
pub const DEFAULT_ALIGNMENT_INCREMENT: f64 = 0.01;

/// Exponent applied to the ball/target distance in the task rewards.
pub(crate) const REWARD_DISTANCE_EXPONENT: f64 = 0.75;
