//! Incremental posture interpolation.
//!
//! Drives the simulated robot's posture toward a target in fixed-size
//! increments, one waypoint per iteration. Used once at environment
//! construction to eliminate the initial mismatch between the pseudo-real
//! robot and its simulated mirror, and again at reset when a reference
//! posture is configured.

use crate::channels::MirroringChannel;
use crate::error::HysrError;
use crate::types::Posture;

/// Steps `value` toward `target` by `increment`, snapping exactly onto the
/// target once the remaining gap falls below the increment.
fn step_toward(value: f64, target: f64, increment: f64) -> f64 {
    let gap = target - value;
    if gap.abs() < increment {
        target
    } else {
        value + increment.copysign(gap)
    }
}

/// Restartable cursor producing successive postures between a start and a
/// target posture.
///
/// Every joint's position and velocity steps toward its target by the
/// configured increment per [`advance`](Self::advance) call; a value that
/// has arrived snaps onto the target and ceases moving while the remaining
/// ones keep stepping in lock-step.
#[derive(Debug, Clone)]
pub struct PostureInterpolation {
    current: Posture,
    target: Posture,
    increment: f64,
}

impl PostureInterpolation {
    pub fn new(current: Posture, target: Posture, increment: f64) -> Result<Self, HysrError> {
        for posture in [&current, &target] {
            if posture.positions.len() != posture.velocities.len() {
                return Err(HysrError::PostureLengthMismatch {
                    positions: posture.positions.len(),
                    velocities: posture.velocities.len(),
                });
            }
        }
        if current.nb_dofs() != target.nb_dofs() {
            return Err(HysrError::PostureLengthMismatch {
                positions: current.nb_dofs(),
                velocities: target.nb_dofs(),
            });
        }
        debug_assert!(increment > 0.0, "interpolation increment must be positive");
        Ok(Self {
            current,
            target,
            increment,
        })
    }

    /// Completion predicate: every position and velocity has arrived.
    pub fn done(&self) -> bool {
        self.current == self.target
    }

    /// Computes the next intermediate posture, or `None` once every value
    /// has arrived.
    pub fn advance(&mut self) -> Option<&Posture> {
        if self.done() {
            return None;
        }
        for (value, target) in self
            .current
            .positions
            .iter_mut()
            .zip(&self.target.positions)
        {
            *value = step_toward(*value, *target, self.increment);
        }
        for (value, target) in self
            .current
            .velocities
            .iter_mut()
            .zip(&self.target.velocities)
        {
            *value = step_toward(*value, *target, self.increment);
        }
        Some(&self.current)
    }
}

/// Publishes every intermediate posture between the mirror's current state
/// and `target` to the mirroring channel, bursting one iteration per
/// waypoint so the simulated robot follows along.
pub fn align_mirror(
    mirroring: &mut dyn MirroringChannel,
    target: &Posture,
    increment: f64,
) -> Result<(), HysrError> {
    let (positions, velocities) = mirroring.get()?;
    let mut interpolation =
        PostureInterpolation::new(Posture::new(positions, velocities), target.clone(), increment)?;
    while let Some(waypoint) = interpolation.advance() {
        mirroring.set(&waypoint.positions, &waypoint.velocities, None)?;
        mirroring.burst(1)?;
    }
    Ok(())
}
