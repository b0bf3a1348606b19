//! In-process scripted backend.
//!
//! Implements every channel trait over a single shared world so the
//! environment can run without the real robot/simulation processes: the
//! ball replays its trajectory one point per simulation burst, the robot
//! echoes commanded pressures back, and contact is detected geometrically
//! against a fixed racket position. This is the backend the demo and the
//! integration tests drive.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::channels::{
    BallChannel, Channels, ContactInformation, ContactSensor, Marker, MirroringChannel,
    PressureChannel, SegmentIds,
};
use crate::error::HysrError;
use crate::trajectories::BallTrajectories;
use crate::types::{Position, Posture, PressurePair, RobotState, State, Velocity};

/// Parameters of a [`PlaybackSession`].
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub segment_ids: SegmentIds,
    /// Initial posture of the pseudo-real robot.
    pub robot_posture: Posture,
    /// Initial posture of the simulated mirror.
    pub mirror_posture: Posture,
    /// Racket position used for geometric contact detection.
    pub racket_position: Position,
    /// Ball/racket distance below which a contact is latched. Zero disables
    /// contact detection entirely.
    pub contact_radius: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            segment_ids: SegmentIds::default(),
            robot_posture: Posture::new(vec![0.0; 4], vec![0.0; 4]),
            mirror_posture: Posture::new(vec![0.0; 4], vec![0.0; 4]),
            racket_position: [0.55, 0.0, -0.44],
            contact_radius: 0.0,
        }
    }
}

fn distance(a: &Position, b: &Position) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Scripted world state shared by all channel handles of one session.
#[derive(Debug)]
pub struct PlaybackWorld {
    config: PlaybackConfig,

    /* Pseudo-real robot */
    desired_pressures: Vec<PressurePair>,
    observed_pressures: Vec<PressurePair>,
    robot_posture: Posture,
    robot_iteration: u64,

    /* Simulated world */
    mirror_posture: Posture,
    ball_position: Position,
    ball_velocity: Velocity,
    pending_points: VecDeque<State>,
    sim_iteration: u64,

    /* Contact sensor */
    contact_occured: bool,
    contact_position: Position,
    minimal_distance: f64,

    /* Markers */
    pub goal_position: Position,
    pub hit_point_position: Position,
}

impl PlaybackWorld {
    fn new(config: PlaybackConfig) -> Self {
        let nb_dofs = config.robot_posture.nb_dofs();
        Self {
            robot_posture: config.robot_posture.clone(),
            mirror_posture: config.mirror_posture.clone(),
            config,
            desired_pressures: vec![(0.0, 0.0); nb_dofs],
            observed_pressures: vec![(0.0, 0.0); nb_dofs],
            robot_iteration: 0,
            ball_position: [0.0; 3],
            ball_velocity: [0.0; 3],
            pending_points: VecDeque::new(),
            sim_iteration: 0,
            contact_occured: false,
            contact_position: [0.0; 3],
            minimal_distance: f64::INFINITY,
            goal_position: [0.0; 3],
            hit_point_position: [0.0; 3],
        }
    }

    /// Advances the simulated world by `nb_bursts` iterations: the ball
    /// consumes one trajectory point per iteration and the contact sensor
    /// folds in the new ball/racket distance.
    fn sim_burst(&mut self, nb_bursts: usize) {
        for _ in 0..nb_bursts {
            self.sim_iteration += 1;
            if let Some(point) = self.pending_points.pop_front() {
                self.ball_position = point.position;
                self.ball_velocity = point.velocity;
            }
            let d = distance(&self.ball_position, &self.config.racket_position);
            self.minimal_distance = self.minimal_distance.min(d);
            if self.config.contact_radius > 0.0 && d <= self.config.contact_radius {
                if !self.contact_occured {
                    trace!(iteration = self.sim_iteration, "playback contact latched");
                }
                self.contact_occured = true;
                self.contact_position = self.ball_position;
            }
        }
    }

    pub fn ball_state(&self) -> (Position, Velocity) {
        (self.ball_position, self.ball_velocity)
    }

    pub fn mirror_posture(&self) -> &Posture {
        &self.mirror_posture
    }

    /// Number of trajectory points not consumed yet.
    pub fn pending_points(&self) -> usize {
        self.pending_points.len()
    }
}

/// Owns a [`PlaybackWorld`] and hands out channel bundles over it.
pub struct PlaybackSession {
    world: Rc<RefCell<PlaybackWorld>>,
}

impl PlaybackSession {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            world: Rc::new(RefCell::new(PlaybackWorld::new(config))),
        }
    }

    /// Builds the channel bundle driving this session's world. The
    /// trajectory source is independent of the world and passed in directly.
    pub fn channels(&self, trajectories: BallTrajectories) -> Channels {
        Channels {
            pressures: Box::new(PlaybackPressures {
                world: self.world.clone(),
            }),
            ball: Box::new(PlaybackBall {
                world: self.world.clone(),
            }),
            mirroring: Box::new(PlaybackMirroring {
                world: self.world.clone(),
            }),
            goal: Box::new(PlaybackMarker {
                world: self.world.clone(),
                goal: true,
            }),
            hit_point: Box::new(PlaybackMarker {
                world: self.world.clone(),
                goal: false,
            }),
            contact: Box::new(PlaybackContact {
                world: self.world.clone(),
            }),
            trajectories: Box::new(trajectories),
        }
    }

    /// Read access to the world, for inspection from tests and demos.
    pub fn world(&self) -> Ref<'_, PlaybackWorld> {
        self.world.borrow()
    }
}

struct PlaybackPressures {
    world: Rc<RefCell<PlaybackWorld>>,
}

impl PressureChannel for PlaybackPressures {
    fn set(
        &mut self,
        pressures: &[PressurePair],
        _duration_ms: Option<u64>,
    ) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        let nb_dofs = world.robot_posture.nb_dofs();
        if pressures.len() != nb_dofs {
            let segment_id = world.config.segment_ids.pseudo_real_robot.clone();
            return Err(HysrError::channel(
                segment_id.as_str(),
                format!("expected {nb_dofs} pressure pairs, got {}", pressures.len()),
            ));
        }
        world.desired_pressures = pressures.to_vec();
        Ok(())
    }

    fn burst(&mut self, nb_bursts: usize) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        world.robot_iteration += nb_bursts as u64;
        // The scripted robot reaches the commanded pressures within a burst.
        world.observed_pressures = world.desired_pressures.clone();
        Ok(())
    }

    fn read(&mut self, desired: bool) -> Result<RobotState, HysrError> {
        let world = self.world.borrow();
        let pressures = if desired {
            &world.desired_pressures
        } else {
            &world.observed_pressures
        };
        Ok(RobotState {
            pressures_ago: pressures.iter().map(|p| p.0).collect(),
            pressures_antago: pressures.iter().map(|p| p.1).collect(),
            joint_positions: world.robot_posture.positions.clone(),
            joint_velocities: world.robot_posture.velocities.clone(),
        })
    }

    fn get_iteration(&mut self) -> Result<u64, HysrError> {
        Ok(self.world.borrow().robot_iteration)
    }
}

struct PlaybackBall {
    world: Rc<RefCell<PlaybackWorld>>,
}

impl BallChannel for PlaybackBall {
    fn set(&mut self, position: Position, velocity: Velocity) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        // Teleporting cancels any playback still in flight.
        world.pending_points.clear();
        world.ball_position = position;
        world.ball_velocity = velocity;
        Ok(())
    }

    fn get(&mut self) -> Result<(Position, Velocity), HysrError> {
        Ok(self.world.borrow().ball_state())
    }

    fn play_trajectory(&mut self, points: &[State]) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        world.pending_points = points.iter().copied().collect();
        debug!(points = points.len(), "playback trajectory armed");
        Ok(())
    }

    fn get_iteration(&mut self) -> Result<u64, HysrError> {
        Ok(self.world.borrow().sim_iteration)
    }
}

struct PlaybackMirroring {
    world: Rc<RefCell<PlaybackWorld>>,
}

impl MirroringChannel for PlaybackMirroring {
    fn set(
        &mut self,
        positions: &[f64],
        velocities: &[f64],
        _nb_iterations: Option<usize>,
    ) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        world.mirror_posture = Posture::new(positions.to_vec(), velocities.to_vec());
        Ok(())
    }

    fn get(&mut self) -> Result<(Vec<f64>, Vec<f64>), HysrError> {
        let world = self.world.borrow();
        Ok((
            world.mirror_posture.positions.clone(),
            world.mirror_posture.velocities.clone(),
        ))
    }

    fn burst(&mut self, nb_bursts: usize) -> Result<(), HysrError> {
        self.world.borrow_mut().sim_burst(nb_bursts);
        Ok(())
    }
}

struct PlaybackMarker {
    world: Rc<RefCell<PlaybackWorld>>,
    goal: bool,
}

impl Marker for PlaybackMarker {
    fn set(&mut self, position: Position, _velocity: Velocity) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        if self.goal {
            world.goal_position = position;
        } else {
            world.hit_point_position = position;
        }
        Ok(())
    }
}

struct PlaybackContact {
    world: Rc<RefCell<PlaybackWorld>>,
}

impl ContactSensor for PlaybackContact {
    fn reset(&mut self) -> Result<(), HysrError> {
        let mut world = self.world.borrow_mut();
        world.contact_occured = false;
        world.contact_position = [0.0; 3];
        world.minimal_distance = f64::INFINITY;
        Ok(())
    }

    fn get(&mut self) -> Result<ContactInformation, HysrError> {
        let world = self.world.borrow();
        Ok(ContactInformation {
            contact_occured: world.contact_occured,
            position: world.contact_position,
            minimal_distance: world.minimal_distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling_trajectory() -> Vec<State> {
        (0..4)
            .map(|i| State::new([0.5, 0.0, 1.0 - 0.1 * i as f64], [0.0, 0.0, -1.0]))
            .collect()
    }

    #[test]
    fn bursts_consume_one_point_each() {
        let session = PlaybackSession::new(PlaybackConfig::default());
        let mut channels = session.channels(BallTrajectories::default());

        channels.ball.play_trajectory(&falling_trajectory()).unwrap();
        channels.mirroring.burst(2).unwrap();
        let (position, _) = channels.ball.get().unwrap();
        assert_eq!(position[2], 0.9);
        assert_eq!(session.world().pending_points(), 2);
        assert_eq!(channels.ball.get_iteration().unwrap(), 2);

        // Exhausted trajectory leaves the ball on its last point.
        channels.mirroring.burst(10).unwrap();
        let (position, _) = channels.ball.get().unwrap();
        assert_eq!(position[2], 0.7);
    }

    #[test]
    fn contact_latches_within_radius() {
        let config = PlaybackConfig {
            racket_position: [0.5, 0.0, 0.8],
            contact_radius: 0.05,
            ..PlaybackConfig::default()
        };
        let session = PlaybackSession::new(config);
        let mut channels = session.channels(BallTrajectories::default());

        channels.ball.play_trajectory(&falling_trajectory()).unwrap();
        // Ball at z = 1.0 then 0.9: still outside the 0.05 radius.
        channels.mirroring.burst(2).unwrap();
        let report = channels.contact.get().unwrap();
        assert!(!report.contact_occured);

        // Ball reaches the racket at z = 0.8.
        channels.mirroring.burst(1).unwrap();
        let report = channels.contact.get().unwrap();
        assert!(report.contact_occured);
        assert_eq!(report.position, [0.5, 0.0, 0.8]);

        // Latched until explicitly reset.
        channels.mirroring.burst(1).unwrap();
        assert!(channels.contact.get().unwrap().contact_occured);
        channels.contact.reset().unwrap();
        assert!(!channels.contact.get().unwrap().contact_occured);
    }

    #[test]
    fn pressure_echo_after_burst() {
        let session = PlaybackSession::new(PlaybackConfig::default());
        let mut channels = session.channels(BallTrajectories::default());

        let pairs = vec![(12000.0, 13000.0); 4];
        channels.pressures.set(&pairs, None).unwrap();
        let state = channels.pressures.read(true).unwrap();
        assert_eq!(state.pressures_ago, vec![12000.0; 4]);
        let state = channels.pressures.read(false).unwrap();
        assert_eq!(state.pressures_ago, vec![0.0; 4]);

        channels.pressures.burst(3).unwrap();
        let state = channels.pressures.read(false).unwrap();
        assert_eq!(state.pressures_antago, vec![13000.0; 4]);
        assert_eq!(channels.pressures.get_iteration().unwrap(), 3);
    }

    #[test]
    fn rejects_wrong_dof_count() {
        let session = PlaybackSession::new(PlaybackConfig::default());
        let mut channels = session.channels(BallTrajectories::default());
        let result = channels.pressures.set(&[(1.0, 2.0)], None);
        assert!(matches!(result, Err(HysrError::Channel { .. })));
    }
}
