//! Crimson Core Library
//!
//! Pairwise alignment, minimizer sketching, reference indexing and chaining
//! for mapping DNA fragments against a reference genome. Everything in here
//! operates on in-memory byte slices; file parsing and output formatting are
//! left to the caller.
//!
//! Sketches default to [`StrandModel::ReverseComplement`] canonical k-mers.
//! Indexes built with [`StrandModel::Complement`] select a different set of
//! minimizers, so anchor counts from [`map`] depend on the model chosen in
//! [`SketchParams::with_strand_model`].

pub mod types;
pub mod error;
pub mod seed;
pub mod index;
pub mod chain;
pub mod align;
pub mod mapper;

// Re-export commonly used types and functions
pub use types::{Anchor, Minimizer, Occurrence, Strand};
pub use error::{CoreError, Result};
pub use seed::{sketch, SketchParams, StrandModel};
pub use index::ReferenceIndex;
pub use chain::{map, map_sketch, Chain};
pub use align::{align, AlignmentMode, AlignmentResult, Cigar, CigarOp, ScoreParams};
pub use mapper::{Mapper, MapperOptions, Mapping};

/// Version information for the crimson core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
