//! HYSR one-ball episode controller.
//!
//! Couples the pseudo-real robot backend to the simulated mirror/ball world:
//! per step it commands pressures, advances both backends by their burst
//! counts, folds the contact report into the episode statistics and decides
//! episode continuation. Per episode it re-arms the ball trajectory and
//! realigns the robots.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::alignment::align_mirror;
use crate::ball_status::BallStatus;
use crate::channels::{Channels, SegmentIds};
use crate::constant::{
    CONTACT_RESET_SETTLE_S, DEFAULT_ALIGNMENT_INCREMENT, DEFAULT_RTT_CAP, EPISODE_OVER_Z_LEVEL,
    HIT_POINT_REST_POSITION, SETTLE_BURSTS, TRAJECTORY_TAIL_POSITION,
};
use crate::error::HysrError;
use crate::pressures::{pack, unpack};
use crate::reward::{self, TaskKind};
use crate::types::{Observation, Position, Posture, State};

/// Reference posture the robot realigns to between episodes, with the
/// interpolation increment driving it there.
#[derive(Debug, Clone)]
pub struct PostureConfig {
    pub posture: Posture,
    pub increment: f64,
}

impl PostureConfig {
    pub fn new(posture: Posture) -> Self {
        Self {
            posture,
            increment: DEFAULT_ALIGNMENT_INCREMENT,
        }
    }
}

/// Construction-time configuration of [`HysrOneBall`]. Immutable once the
/// environment is built.
#[derive(Debug, Clone)]
pub struct HysrConfig {
    /// Whether the pseudo-real robot backend runs in accelerated time. If
    /// so, pressure commands are bursted synchronously; otherwise they run
    /// in the background at real-time rate.
    pub accelerated_time: bool,
    /// Communication tick of the pseudo-real robot backend, in seconds.
    pub o80_time_step: f64,
    /// Physics tick of the simulated world, in seconds.
    pub mujoco_time_step: f64,
    /// Decision tick of the learning algorithm, in seconds.
    pub algo_time_step: f64,
    /// Posture to drive toward at every reset, if any.
    pub reference_posture: Option<PostureConfig>,
    /// Center of the scoring zone.
    pub target_position: Position,
    /// Reward normalization constant `c`.
    pub reward_normalization_constant: f64,
    pub task: TaskKind,
    /// Lower clamp of the task rewards.
    pub rtt_cap: f64,
    /// Fixed trajectory to replay every episode; `None` samples a random
    /// trajectory per episode.
    pub trajectory_index: Option<usize>,
    /// Endpoints this instance is bound to. Used to label logs and errors.
    pub segment_ids: SegmentIds,
}

impl HysrConfig {
    /// Configuration with the conventional defaults for the given target.
    pub fn new(target_position: Position, task: TaskKind) -> Self {
        Self {
            accelerated_time: false,
            o80_time_step: 0.002,
            mujoco_time_step: 0.002,
            algo_time_step: 0.01,
            reference_posture: None,
            target_position,
            reward_normalization_constant: 1.0,
            task,
            rtt_cap: DEFAULT_RTT_CAP,
            trajectory_index: None,
            segment_ids: SegmentIds::default(),
        }
    }
}

/// The episode controller. See the module documentation.
pub struct HysrOneBall {
    /* Configuration */
    accelerated_time: bool,
    /// Pseudo-real robot backend iterations per algorithm step.
    nb_robot_bursts: usize,
    /// Simulated world iterations per algorithm step.
    nb_sim_bursts: usize,
    reference_posture: Option<PostureConfig>,
    trajectory_index: Option<usize>,
    c: f64,
    task: TaskKind,
    rtt_cap: f64,
    segment_ids: SegmentIds,

    /* Collaborators */
    channels: Channels,

    /* Episode state */
    ball_status: BallStatus,
    first_step: bool,
}

impl HysrOneBall {
    /// Builds the environment: moves the goal marker to the target position,
    /// derives the burst counts and aligns the simulated mirror with the
    /// pseudo-real robot's current posture.
    pub fn new(config: HysrConfig, mut channels: Channels) -> Result<Self, HysrError> {
        channels.goal.set(config.target_position, [0.0; 3])?;

        let nb_robot_bursts = (config.algo_time_step / config.o80_time_step) as usize;
        let nb_sim_bursts = (config.algo_time_step / config.mujoco_time_step) as usize;

        // Eliminate any initial mismatch between the real and mirrored
        // robot state.
        let robot_state = channels.pressures.read(false)?;
        align_mirror(
            channels.mirroring.as_mut(),
            &Posture::new(robot_state.joint_positions, robot_state.joint_velocities),
            DEFAULT_ALIGNMENT_INCREMENT,
        )?;

        info!(
            robot = %config.segment_ids.pseudo_real_robot,
            mirror = %config.segment_ids.robot_mirror,
            accelerated_time = config.accelerated_time,
            nb_robot_bursts,
            nb_sim_bursts,
            "hysr environment ready"
        );

        Ok(Self {
            accelerated_time: config.accelerated_time,
            nb_robot_bursts,
            nb_sim_bursts,
            reference_posture: config.reference_posture,
            trajectory_index: config.trajectory_index,
            c: config.reward_normalization_constant,
            task: config.task,
            rtt_cap: config.rtt_cap,
            segment_ids: config.segment_ids,
            channels,
            ball_status: BallStatus::new(config.target_position),
            first_step: true,
        })
    }

    /// Iteration counter of the pseudo-real robot backend.
    #[inline]
    pub fn get_robot_iteration(&mut self) -> Result<u64, HysrError> {
        self.channels.pressures.get_iteration()
    }

    /// Iteration counter of the ball backend.
    #[inline]
    pub fn get_ball_iteration(&mut self) -> Result<u64, HysrError> {
        self.channels.ball.get_iteration()
    }

    /// Currently commanded (desired) agonist/antagonist pressures.
    pub fn get_current_desired_pressures(&mut self) -> Result<(Vec<f64>, Vec<f64>), HysrError> {
        let state = self.channels.pressures.read(true)?;
        Ok((state.pressures_ago, state.pressures_antago))
    }

    /// Observation of the current robot state and tracked ball state.
    fn create_observation(&mut self) -> Result<Observation, HysrError> {
        let robot_state = self.channels.pressures.read(false)?;
        Ok(Observation {
            pressures: unpack(&robot_state.pressures_ago, &robot_state.pressures_antago)?,
            joint_positions: robot_state.joint_positions,
            joint_velocities: robot_state.joint_velocities,
            ball_position: self.ball_status.ball_position,
            ball_velocity: self.ball_status.ball_velocity,
        })
    }

    /// Starts a new episode and returns the initial observation.
    pub fn reset(&mut self) -> Result<Observation, HysrError> {
        self.first_step = true;

        // Park the hit point marker below the table.
        self.channels
            .hit_point
            .set(HIT_POINT_REST_POSITION, [0.0; 3])?;

        // Clear episode statistics and contact sensor state.
        self.ball_status.reset();
        self.channels.contact.reset()?;
        thread::sleep(Duration::from_secs_f64(CONTACT_RESET_SETTLE_S));

        // Drive the simulated robot toward the reference posture,
        // mirroring every intermediate waypoint.
        if let Some(reference) = &self.reference_posture {
            align_mirror(
                self.channels.mirroring.as_mut(),
                &reference.posture,
                reference.increment,
            )?;
        }

        // New trajectory, with the synthetic below-table tail point that
        // guarantees end of episode detection fires.
        let (index, mut points) = match self.trajectory_index {
            Some(index) => (index, self.channels.trajectories.get_trajectory(index)?),
            None => self.channels.trajectories.random_trajectory()?,
        };
        if points.is_empty() {
            return Err(HysrError::EmptyTrajectory(index));
        }
        points.push(State::new(TRAJECTORY_TAIL_POSITION, [0.0; 3]));
        debug!(
            ball = %self.segment_ids.ball,
            trajectory = index,
            points = points.len(),
            "episode reset"
        );

        // Teleport the ball to the trajectory start and let the mirrored
        // scene settle before playback.
        let first = points[0];
        self.channels.ball.set(first.position, first.velocity)?;
        self.ball_status
            .set_ball_state(first.position, first.velocity);
        self.channels.mirroring.burst(SETTLE_BURSTS)?;

        // Shoot the ball.
        self.channels.ball.play_trajectory(&points)?;

        self.create_observation()
    }

    /// Applies one action and advances both backends by one algorithm step.
    ///
    /// `action` is the flat interleaved `[ago1, antago1, ...]` pressure
    /// vector, two entries per degree of freedom. Returns the observation,
    /// the reward and the episode-over flag; the reward is `None` on every
    /// non-terminal step and `Some` exactly once, on the terminal one.
    pub fn step(
        &mut self,
        action: &[f64],
    ) -> Result<(Observation, Option<f64>, bool), HysrError> {
        if self.first_step {
            trace!(robot = %self.segment_ids.pseudo_real_robot, "first step of episode");
        }

        // Pre-action robot state: mirrored to the simulation below and
        // reported in the returned observation (one-step lag).
        let robot_state = self.channels.pressures.read(false)?;
        let (ball_position, ball_velocity) = self.channels.ball.get()?;

        // Command the pressures. In accelerated time the backend bursts
        // through the algorithm step synchronously; otherwise it acts in
        // the background at its own pace.
        let pressure_pairs = pack(action)?;
        self.channels.pressures.set(&pressure_pairs, None)?;
        if self.accelerated_time {
            self.channels.pressures.burst(self.nb_robot_bursts)?;
        }

        // Mirror the robot state and advance the simulated world.
        self.channels.mirroring.set(
            &robot_state.joint_positions,
            &robot_state.joint_velocities,
            None,
        )?;
        self.channels.mirroring.burst(self.nb_sim_bursts)?;

        // Fold this step's ball state and contact report into the episode
        // statistics.
        let contact_information = self.channels.contact.get()?;
        self.ball_status
            .update(ball_position, ball_velocity, &contact_information);

        // Relocate the hit point marker to the minimal observed ball/target
        // position (diagnostic side effect only).
        if let Some(position) = self.ball_status.min_position_ball_target() {
            self.channels.hit_point.set(position, [0.0; 3])?;
        }

        let observation = Observation {
            pressures: unpack(&robot_state.pressures_ago, &robot_state.pressures_antago)?,
            joint_positions: robot_state.joint_positions,
            joint_velocities: robot_state.joint_velocities,
            ball_position: self.ball_status.ball_position,
            ball_velocity: self.ball_status.ball_velocity,
        };

        let episode_over = self.ball_status.ball_position[2] < EPISODE_OVER_Z_LEVEL;
        let reward = if episode_over {
            let reward = reward::compute(self.task, self.ball_status.contact(), self.c, self.rtt_cap);
            info!(reward, "episode over");
            Some(reward)
        } else {
            None
        };

        self.first_step = false;
        Ok((observation, reward, episode_over))
    }

    /// Terminal shutdown hook. The channels shut down with their backends;
    /// nothing to release here.
    pub fn close(&mut self) {}
}
