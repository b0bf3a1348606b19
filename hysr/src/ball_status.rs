//! Running ball/contact statistics accumulated over an episode.
//!
//! The tracker is reset at the start of every episode, updated exactly once
//! per step with the newest ball state and the contact sensor's report, and
//! read once at episode end to compute the reward.

use crate::channels::ContactInformation;
use crate::types::{Position, Velocity};

/// Whether the ball has touched the racket during the current episode, with
/// the statistics relevant to each phase.
///
/// Before the first contact only the ball/racket distance matters; after it,
/// only the ball's behavior relative to the target does. Making the phase a
/// tagged value keeps the reward dispatch from ever reading statistics that
/// were not accumulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RacketContact {
    /// The ball has not touched the racket yet.
    NotHit {
        /// Minimum ball/racket distance reported by the contact sensor so
        /// far. `None` until the first update after a reset.
        min_distance_ball_racket: Option<f64>,
    },
    /// The ball touched the racket; post-contact statistics.
    Hit {
        /// Minimum distance between the ball and the target position.
        min_distance_ball_target: f64,
        /// Ball position at which the minimum target distance occurred.
        min_position_ball_target: Position,
        /// Maximum ball speed observed post-contact.
        max_ball_velocity: f64,
    },
}

/// Tracks the ball state and the episode statistics the reward is computed
/// from.
#[derive(Debug, Clone)]
pub struct BallStatus {
    target_position: Position,
    pub ball_position: Position,
    pub ball_velocity: Velocity,
    contact: RacketContact,
}

fn distance(a: &Position, b: &Position) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn norm(v: &Velocity) -> f64 {
    v.iter().map(|x| x.powi(2)).sum::<f64>().sqrt()
}

impl BallStatus {
    pub fn new(target_position: Position) -> Self {
        Self {
            target_position,
            ball_position: [0.0; 3],
            ball_velocity: [0.0; 3],
            contact: RacketContact::NotHit {
                min_distance_ball_racket: None,
            },
        }
    }

    /// Clears all accumulated statistics. Called at the start of every episode.
    pub fn reset(&mut self) {
        self.ball_position = [0.0; 3];
        self.ball_velocity = [0.0; 3];
        self.contact = RacketContact::NotHit {
            min_distance_ball_racket: None,
        };
    }

    /// Overwrites the current ball state without touching the statistics.
    /// Used when the ball is teleported to the start of a trajectory.
    pub fn set_ball_state(&mut self, position: Position, velocity: Velocity) {
        self.ball_position = position;
        self.ball_velocity = velocity;
    }

    /// Folds one step's ball state and contact report into the statistics.
    pub fn update(
        &mut self,
        position: Position,
        velocity: Velocity,
        contact_information: &ContactInformation,
    ) {
        self.ball_position = position;
        self.ball_velocity = velocity;

        self.contact = match self.contact {
            RacketContact::NotHit { .. } if contact_information.contact_occured => {
                // The sample establishing the contact also seeds the
                // post-contact statistics.
                RacketContact::Hit {
                    min_distance_ball_target: distance(&position, &self.target_position),
                    min_position_ball_target: position,
                    max_ball_velocity: norm(&velocity),
                }
            }
            RacketContact::NotHit {
                min_distance_ball_racket,
            } => {
                let reported = contact_information.minimal_distance;
                RacketContact::NotHit {
                    min_distance_ball_racket: Some(
                        min_distance_ball_racket.map_or(reported, |d| d.min(reported)),
                    ),
                }
            }
            RacketContact::Hit {
                min_distance_ball_target,
                min_position_ball_target,
                max_ball_velocity,
            } => {
                let target_distance = distance(&position, &self.target_position);
                let (min_distance, min_position) = if target_distance < min_distance_ball_target {
                    (target_distance, position)
                } else {
                    (min_distance_ball_target, min_position_ball_target)
                };
                RacketContact::Hit {
                    min_distance_ball_target: min_distance,
                    min_position_ball_target: min_position,
                    max_ball_velocity: max_ball_velocity.max(norm(&velocity)),
                }
            }
        };
    }

    /// Contact phase and its accumulated statistics.
    #[inline]
    pub fn contact(&self) -> &RacketContact {
        &self.contact
    }

    /// Minimum ball/racket distance, defined only while no contact occurred.
    #[inline]
    pub fn min_distance_ball_racket(&self) -> Option<f64> {
        match self.contact {
            RacketContact::NotHit {
                min_distance_ball_racket,
            } => min_distance_ball_racket,
            RacketContact::Hit { .. } => None,
        }
    }

    /// Ball position of the post-contact minimal target distance, if any.
    #[inline]
    pub fn min_position_ball_target(&self) -> Option<Position> {
        match self.contact {
            RacketContact::NotHit { .. } => None,
            RacketContact::Hit {
                min_position_ball_target,
                ..
            } => Some(min_position_ball_target),
        }
    }
}
