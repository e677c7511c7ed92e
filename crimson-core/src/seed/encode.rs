//! Nucleotide encoding helpers shared by the sketcher and callers

use crate::error::{CoreError, Result};

/// Encode a nucleotide to its 2-bit code (A=0, C=1, G=2, T=3).
///
/// Lowercase bases are accepted; anything else is `None`.
pub fn encode_base(nucleotide: u8) -> Option<u32> {
    match nucleotide.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Complement of a 2-bit code.
#[inline]
pub fn complement_code(code: u32) -> u32 {
    3 - code
}

/// Uppercase a sequence in place, rejecting anything outside ACGT.
///
/// The buffer is left untouched when an invalid base is found.
pub fn normalize(sequence: &mut [u8]) -> Result<()> {
    if let Some((position, base)) = find_invalid_base(sequence) {
        return Err(CoreError::invalid_base(base, position));
    }
    sequence.make_ascii_uppercase();
    Ok(())
}

/// Position of the first byte outside ACGT (either case), if any.
pub fn find_invalid_base(sequence: &[u8]) -> Option<(usize, u8)> {
    sequence
        .iter()
        .position(|&b| encode_base(b).is_none())
        .map(|position| (position, sequence[position]))
}

/// Generate reverse complement of a sequence
pub fn reverse_complement(sequence: &[u8]) -> Result<Vec<u8>> {
    sequence
        .iter()
        .enumerate()
        .rev()
        .map(|(position, &nucleotide)| {
            complement_nucleotide(nucleotide).ok_or_else(|| CoreError::invalid_base(nucleotide, position))
        })
        .collect()
}

/// Get complement of a single nucleotide
pub fn complement_nucleotide(nucleotide: u8) -> Option<u8> {
    match nucleotide.to_ascii_uppercase() {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'C' => Some(b'G'),
        b'G' => Some(b'C'),
        _ => None,
    }
}
