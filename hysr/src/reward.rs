//! Terminal reward computation.
//!
//! Pure functions of the statistics accumulated by
//! [`BallStatus`](crate::BallStatus) over an episode.

use crate::ball_status::RacketContact;
use crate::constant::REWARD_DISTANCE_EXPONENT;

/// Enumerates the two task variants the environment can score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Return the ball close to the target.
    Return,
    /// Smash the ball: target proximity scaled by the ball's peak speed.
    Smash,
}

/// Reward when the ball never touched the racket: the closer the racket got,
/// the less negative the reward.
pub fn no_hit_reward(min_distance_ball_racket: f64) -> f64 {
    -min_distance_ball_racket
}

/// Reward of the return task, clamped from below by `rtt_cap`.
pub fn return_task_reward(min_distance_ball_target: f64, c: f64, rtt_cap: f64) -> f64 {
    let reward = 1.0 - c * min_distance_ball_target.powf(REWARD_DISTANCE_EXPONENT);
    reward.max(rtt_cap)
}

/// Reward of the smash task: the return-task term scaled by the maximal
/// post-contact ball speed, clamped from below by `rtt_cap`.
pub fn smash_task_reward(
    min_distance_ball_target: f64,
    max_ball_velocity: f64,
    c: f64,
    rtt_cap: f64,
) -> f64 {
    let reward = 1.0 - c * min_distance_ball_target.powf(REWARD_DISTANCE_EXPONENT);
    (reward * max_ball_velocity).max(rtt_cap)
}

/// Terminal reward dispatch.
///
/// A ball that never reached the racket is scored by [`no_hit_reward`]
/// regardless of the task kind. Otherwise the post-contact statistics are
/// scored by the task's reward function. A `NotHit` phase that was never
/// updated scores as a zero-distance no-hit.
pub fn compute(task: TaskKind, contact: &RacketContact, c: f64, rtt_cap: f64) -> f64 {
    match *contact {
        RacketContact::NotHit {
            min_distance_ball_racket,
        } => no_hit_reward(min_distance_ball_racket.unwrap_or(0.0)),
        RacketContact::Hit {
            min_distance_ball_target,
            max_ball_velocity,
            ..
        } => match task {
            TaskKind::Return => return_task_reward(min_distance_ball_target, c, rtt_cap),
            TaskKind::Smash => {
                smash_task_reward(min_distance_ball_target, max_ball_velocity, c, rtt_cap)
            }
        },
    }
}
