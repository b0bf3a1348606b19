//! End-to-end episode scenarios over the in-process playback backend.

use approx::assert_relative_eq;

use hysr::playback::{PlaybackConfig, PlaybackSession};
use hysr::{
    BallTrajectories, HysrConfig, HysrOneBall, PostureConfig, Posture, State, TaskKind,
};

const ACTION: [f64; 8] = [
    12000.0, 13000.0, 14000.0, 15000.0, 16000.0, 17000.0, 18000.0, 19000.0,
];

/// Vertical drop along the z axis; no x/y motion so ball/racket and
/// ball/target distances are plain |z| differences.
fn drop_trajectory() -> Vec<State> {
    vec![
        State::new([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]),
        State::new([0.0, 0.0, 0.5], [0.0, 0.0, -2.0]),
        State::new([0.0, 0.0, 0.2], [0.0, 0.0, -3.0]),
        State::new([0.0, 0.0, -0.6], [0.0, 0.0, -0.5]),
    ]
}

fn fixed_trajectory_config(target: [f64; 3]) -> HysrConfig {
    let mut config = HysrConfig::new(target, TaskKind::Return);
    config.accelerated_time = true;
    // One simulation burst and one robot burst per algorithm step.
    config.o80_time_step = 0.01;
    config.mujoco_time_step = 0.01;
    config.algo_time_step = 0.01;
    config.trajectory_index = Some(0);
    config
}

fn no_contact_session() -> PlaybackSession {
    PlaybackSession::new(PlaybackConfig {
        // Racket far out of the ball's path.
        racket_position: [0.0, 0.0, 0.8],
        contact_radius: 0.0,
        ..PlaybackConfig::default()
    })
}

fn run_to_termination(env: &mut HysrOneBall) -> (f64, usize) {
    for step in 1..100 {
        let (_, reward, episode_over) = env.step(&ACTION).unwrap();
        assert_eq!(reward.is_some(), episode_over);
        if episode_over {
            return (reward.unwrap(), step);
        }
    }
    panic!("episode never terminated");
}

#[test]
fn reset_returns_first_trajectory_point() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();

    let observation = env.reset().unwrap();
    assert_eq!(observation.ball_position, [0.0, 0.0, 1.0]);
    assert_eq!(observation.ball_velocity, [0.0, 0.0, -1.0]);

    let (_, reward, episode_over) = env.step(&ACTION).unwrap();
    assert!(!episode_over);
    assert!(reward.is_none());
}

#[test]
fn no_contact_episode_scores_no_hit_reward() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();
    env.reset().unwrap();

    // The ball replays one point per step and is observed with a one-step
    // lag: z = 1.0, 1.0, 0.5, 0.2, -0.6. Termination on the step observing
    // the crossing, and never before.
    let (reward, steps) = run_to_termination(&mut env);
    assert_eq!(steps, 5);
    // Closest approach to the racket at [0, 0, 0.8] was the ball at
    // z = 1.0, a distance of 0.2; no_hit_reward negates it.
    assert_relative_eq!(reward, -0.2, max_relative = 1e-12);
    env.close();
}

#[test]
fn contact_episode_scores_task_reward() {
    // Racket directly on the ball's path: contact latches when the ball
    // passes z = 0.5. The target at z = 0.2 is then met exactly by the
    // third trajectory point, so the post-contact minimum distance is 0.
    let make_session = || {
        PlaybackSession::new(PlaybackConfig {
            racket_position: [0.0, 0.0, 0.5],
            contact_radius: 0.05,
            ..PlaybackConfig::default()
        })
    };

    let session = make_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.2]), channels).unwrap();
    env.reset().unwrap();
    let (reward, _) = run_to_termination(&mut env);
    // Post-contact minimum ball/target distance is 0 (ball observed at
    // z = 0.2, target at z = 0.2), so the return task scores its maximum.
    assert_relative_eq!(reward, 1.0);
    // Hit point marker relocated to the argmin position.
    assert_eq!(session.world().hit_point_position, [0.0, 0.0, 0.2]);

    // Same geometry scored as a smash: scaled by the maximal post-contact
    // ball speed (3.0 at the third trajectory point).
    let session = make_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut config = fixed_trajectory_config([0.0, 0.0, 0.2]);
    config.task = TaskKind::Smash;
    let mut env = HysrOneBall::new(config, channels).unwrap();
    env.reset().unwrap();
    let (reward, _) = run_to_termination(&mut env);
    assert_relative_eq!(reward, 3.0);
}

#[test]
fn reset_twice_leaks_nothing() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();

    env.reset().unwrap();
    let (first_reward, first_steps) = run_to_termination(&mut env);

    // Back-to-back resets with no intervening step must fully reinitialize
    // the episode statistics.
    env.reset().unwrap();
    let observation = env.reset().unwrap();
    assert_eq!(observation.ball_position, [0.0, 0.0, 1.0]);

    let (second_reward, second_steps) = run_to_termination(&mut env);
    assert_relative_eq!(first_reward, second_reward);
    assert_eq!(first_steps, second_steps);
}

#[test]
fn bursts_advance_iteration_counters() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut config = fixed_trajectory_config([0.0, 0.0, 0.0]);
    // 5 simulation bursts and 2 robot bursts per algorithm step.
    config.algo_time_step = 0.01;
    config.mujoco_time_step = 0.002;
    config.o80_time_step = 0.005;
    let mut env = HysrOneBall::new(config, channels).unwrap();
    env.reset().unwrap();

    let ball_before = env.get_ball_iteration().unwrap();
    let robot_before = env.get_robot_iteration().unwrap();
    env.step(&ACTION).unwrap();
    assert_eq!(env.get_ball_iteration().unwrap(), ball_before + 5);
    assert_eq!(env.get_robot_iteration().unwrap(), robot_before + 2);
}

#[test]
fn desired_pressures_reflect_last_action() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();
    env.reset().unwrap();
    env.step(&ACTION).unwrap();

    let (ago, antago) = env.get_current_desired_pressures().unwrap();
    assert_eq!(ago, vec![12000.0, 14000.0, 16000.0, 18000.0]);
    assert_eq!(antago, vec![13000.0, 15000.0, 17000.0, 19000.0]);
}

#[test]
fn odd_action_vector_is_rejected() {
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();
    env.reset().unwrap();
    assert!(env.step(&ACTION[..7]).is_err());
}

#[test]
fn construction_aligns_mirror_with_robot() {
    let robot_posture = Posture::new(vec![0.3, -0.2, 0.1, 0.0], vec![0.0; 4]);
    let session = PlaybackSession::new(PlaybackConfig {
        robot_posture: robot_posture.clone(),
        mirror_posture: Posture::new(vec![0.0; 4], vec![0.0; 4]),
        ..PlaybackConfig::default()
    });
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let _env = HysrOneBall::new(fixed_trajectory_config([0.0, 0.0, 0.0]), channels).unwrap();
    assert_eq!(session.world().mirror_posture(), &robot_posture);
}

#[test]
fn reset_drives_reference_posture() {
    let reference = Posture::new(vec![0.05, 0.05, 0.05, 0.05], vec![0.0; 4]);
    let session = no_contact_session();
    let channels = session.channels(BallTrajectories::new(vec![drop_trajectory()]));
    let mut config = fixed_trajectory_config([0.0, 0.0, 0.0]);
    config.reference_posture = Some(PostureConfig::new(reference.clone()));
    let mut env = HysrOneBall::new(config, channels).unwrap();
    env.reset().unwrap();
    assert_eq!(session.world().mirror_posture(), &reference);
}
