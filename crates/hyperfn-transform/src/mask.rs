//! The supplied-arguments bitmask, as seen from both sides of the call.

use crate::error::{TransformError, TransformResult};

/// Name of the synthesized trailing parameter.
pub const MASK_PARAM: &str = "__SUPPLIED_PARAMS";

/// Type of the synthesized trailing parameter.
pub const MASK_TYPE: &str = "u64";

/// Largest parameter count a rewritable function may declare.
pub const MAX_PARAMS: usize = 63;

const MASK_BITS: usize = u64::BITS as usize;

/// Build the mask a host passes: bit `i` is set iff argument `i` was supplied.
pub fn supplied_mask(supplied: &[bool]) -> TransformResult<u64> {
    if supplied.len() > MASK_BITS {
        return Err(TransformError::MaskIndexOutOfRange {
            index: supplied.len() - 1,
        });
    }
    Ok(supplied
        .iter()
        .enumerate()
        .filter(|(_, &present)| present)
        .fold(0u64, |mask, (i, _)| mask | (1u64 << i)))
}

/// Whether argument `index` is marked as supplied in `mask`.
pub fn is_supplied(mask: u64, index: usize) -> TransformResult<bool> {
    if index >= MASK_BITS {
        return Err(TransformError::MaskIndexOutOfRange { index });
    }
    Ok((mask >> index) & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_sets_one_bit_per_supplied_argument() {
        assert_eq!(supplied_mask(&[]).unwrap(), 0);
        assert_eq!(supplied_mask(&[false, true, false]).unwrap(), 0b010);
        assert_eq!(supplied_mask(&[true, true, true]).unwrap(), 0b111);
        assert_eq!(supplied_mask(&[true; 64]).unwrap(), u64::MAX);
    }

    #[test]
    fn supplied_bits_are_independent() {
        let mask = 0b101;
        assert!(is_supplied(mask, 0).unwrap());
        assert!(!is_supplied(mask, 1).unwrap());
        assert!(is_supplied(mask, 2).unwrap());
        assert!(is_supplied(u64::MAX, 63).unwrap());
    }

    #[test]
    fn indices_past_bit_63_are_rejected() {
        assert_eq!(
            is_supplied(0, 64),
            Err(TransformError::MaskIndexOutOfRange { index: 64 })
        );
        assert!(supplied_mask(&[false; 65]).is_err());
    }
}
