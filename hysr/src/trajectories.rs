//! Database of pre-recorded ball trajectories.
//!
//! Trajectories are ordered sequences of ball states, either selected by a
//! fixed index or sampled at random once per episode. Recorded databases are
//! stored as JSON files (one array of `{position, velocity}` points per
//! trajectory).

use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::debug;

use crate::channels::TrajectorySource;
use crate::error::HysrError;
use crate::types::State;

/// In-memory trajectory database.
#[derive(Debug, Clone, Default)]
pub struct BallTrajectories {
    trajectories: Vec<Vec<State>>,
}

impl BallTrajectories {
    /// Builds a database from already-loaded trajectories.
    pub fn new(trajectories: Vec<Vec<State>>) -> Self {
        Self { trajectories }
    }

    /// Loads every `.json` trajectory file found in `dir`, in lexicographic
    /// file-name order so indices are stable across runs.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, HysrError> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut trajectories = Vec::with_capacity(paths.len());
        for path in paths {
            let contents = fs::read_to_string(&path)?;
            let points: Vec<State> =
                serde_json::from_str(&contents).map_err(|source| HysrError::TrajectoryParse {
                    path: path.clone(),
                    source,
                })?;
            trajectories.push(points);
        }
        debug!(dir = %dir.display(), count = trajectories.len(), "loaded trajectory database");
        Ok(Self { trajectories })
    }

    /// Number of trajectories held.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}

impl TrajectorySource for BallTrajectories {
    fn random_trajectory(&mut self) -> Result<(usize, Vec<State>), HysrError> {
        if self.trajectories.is_empty() {
            return Err(HysrError::EmptyTrajectoryDatabase);
        }
        let index = rand::rng().random_range(0..self.trajectories.len());
        Ok((index, self.trajectories[index].clone()))
    }

    fn get_trajectory(&self, index: usize) -> Result<Vec<State>, HysrError> {
        self.trajectories
            .get(index)
            .cloned()
            .ok_or(HysrError::UnknownTrajectory {
                index,
                available: self.trajectories.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trajectory(x: f64) -> Vec<State> {
        vec![
            State::new([x, 0.0, 1.0], [1.0, 0.0, 0.0]),
            State::new([x + 0.1, 0.0, 0.9], [1.0, 0.0, -0.5]),
        ]
    }

    #[test]
    fn fixed_index_lookup() {
        let db = BallTrajectories::new(vec![sample_trajectory(0.0), sample_trajectory(1.0)]);
        assert_eq!(db.get_trajectory(1).unwrap()[0].position[0], 1.0);
        assert!(matches!(
            db.get_trajectory(2),
            Err(HysrError::UnknownTrajectory {
                index: 2,
                available: 2
            })
        ));
    }

    #[test]
    fn random_selection_stays_in_range() {
        let mut db =
            BallTrajectories::new(vec![sample_trajectory(0.0), sample_trajectory(1.0)]);
        for _ in 0..20 {
            let (index, points) = db.random_trajectory().unwrap();
            assert!(index < 2);
            assert_eq!(points, db.get_trajectory(index).unwrap());
        }
    }

    #[test]
    fn empty_database_errors() {
        let mut db = BallTrajectories::default();
        assert!(matches!(
            db.random_trajectory(),
            Err(HysrError::EmptyTrajectoryDatabase)
        ));
    }

    #[test]
    fn state_json_round_trip() {
        let point = State::new([0.5, 1.5, -0.44], [2.0, 0.0, -1.0]);
        let json = serde_json::to_string(&point).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
