//! Runs a few episodes with random pressure commands over the in-process
//! playback backend, bursting through the backends in accelerated time.

use rand::Rng;

use hysr::playback::{PlaybackConfig, PlaybackSession};
use hysr::{BallTrajectories, HysrConfig, HysrError, HysrOneBall, State, TaskKind};

const PRESSURE_MIN: f64 = 6000.0;
const PRESSURE_MAX: f64 = 22000.0;
const PRESSURE_MAX_DIFF: i32 = 300;
const NB_DOFS: usize = 4;
const NB_EPISODES: usize = 4;

/// Ballistic arc launched toward the robot, sampled at the simulation rate.
fn arc_trajectory(launch_vy: f64, launch_vz: f64) -> Vec<State> {
    let dt = 0.01;
    let gravity = -9.81;
    let mut position = [0.8, 3.2, 0.9];
    let mut velocity = [0.0, launch_vy, launch_vz];
    let mut points = Vec::new();
    while position[2] > -0.7 {
        points.push(State::new(position, velocity));
        position[1] += velocity[1] * dt;
        position[2] += velocity[2] * dt;
        velocity[2] += gravity * dt;
    }
    points
}

fn main() -> Result<(), HysrError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut rng = rand::rng();
    let trajectories = BallTrajectories::new(
        (0..5)
            .map(|i| arc_trajectory(-2.0 - 0.2 * i as f64, 1.5))
            .collect(),
    );

    let session = PlaybackSession::new(PlaybackConfig {
        racket_position: [0.8, 0.6, 0.2],
        contact_radius: 0.1,
        ..PlaybackConfig::default()
    });
    let channels = session.channels(trajectories);

    let mut config = HysrConfig::new([1.0, 4.0, -0.44], TaskKind::Smash);
    config.accelerated_time = true;
    config.o80_time_step = 0.002;
    config.mujoco_time_step = 0.002;
    config.algo_time_step = 0.01;
    let mut env = HysrOneBall::new(config, channels)?;

    let mut pressures: Vec<f64> = (0..2 * NB_DOFS)
        .map(|_| rng.random_range(PRESSURE_MIN as i32..PRESSURE_MAX as i32) as f64)
        .collect();

    for episode in 0..NB_EPISODES {
        env.reset()?;
        let mut steps = 0usize;
        loop {
            for pressure in &mut pressures {
                let diff = rng.random_range(-PRESSURE_MAX_DIFF..=PRESSURE_MAX_DIFF);
                *pressure = (*pressure + diff as f64).clamp(PRESSURE_MIN, PRESSURE_MAX);
            }

            let (_observation, reward, episode_over) = env.step(&pressures)?;
            steps += 1;
            if episode_over {
                println!(
                    "episode {episode}: {steps} steps, reward {:.3}",
                    reward.unwrap_or_default()
                );
                break;
            }
        }
    }

    env.close();
    Ok(())
}
