//! Conversions between the flat interleaved pressure representation used by
//! actions/observations and the per-DOF pair representation used by the
//! pressure channel.

use crate::error::HysrError;
use crate::types::PressurePair;

/// Converts a flat `[ago1, antago1, ago2, antago2, ...]` list into
/// `[(ago1, antago1), (ago2, antago2), ...]` pairs. DOF ordering is preserved.
pub fn pack(pressures: &[f64]) -> Result<Vec<PressurePair>, HysrError> {
    if pressures.len() % 2 != 0 {
        return Err(HysrError::OddPressureVector(pressures.len()));
    }
    Ok(pressures.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

/// Inverse of [`pack`] given aligned agonist/antagonist lists: produces the
/// flat interleaved `[ago1, antago1, ago2, antago2, ...]` representation.
pub fn unpack(pressures_ago: &[f64], pressures_antago: &[f64]) -> Result<Vec<f64>, HysrError> {
    if pressures_ago.len() != pressures_antago.len() {
        return Err(HysrError::PressureLengthMismatch {
            ago: pressures_ago.len(),
            antago: pressures_antago.len(),
        });
    }
    Ok(pressures_ago
        .iter()
        .zip(pressures_antago)
        .flat_map(|(&ago, &antago)| [ago, antago])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_preserves_dof_order() {
        let pairs = pack(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(pairs, vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
    }

    #[test]
    fn pack_rejects_odd_length() {
        assert!(matches!(
            pack(&[1.0, 2.0, 3.0]),
            Err(HysrError::OddPressureVector(3))
        ));
    }

    #[test]
    fn unpack_rejects_mismatched_lengths() {
        assert!(matches!(
            unpack(&[1.0, 2.0], &[3.0]),
            Err(HysrError::PressureLengthMismatch { ago: 2, antago: 1 })
        ));
    }

    #[test]
    fn unpack_inverts_pack() {
        let flat = [12000.0, 13000.0, 14000.0, 15000.0, 16000.0, 17000.0, 18000.0, 19000.0];
        let pairs = pack(&flat).unwrap();
        let ago: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let antago: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        assert_eq!(unpack(&ago, &antago).unwrap(), flat);
    }

    #[test]
    fn empty_is_valid() {
        assert!(pack(&[]).unwrap().is_empty());
        assert!(unpack(&[], &[]).unwrap().is_empty());
    }
}
