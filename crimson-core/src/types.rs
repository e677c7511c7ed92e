use serde::{Deserialize, Serialize};
use std::fmt;

/// 0-based coordinate into a sequence held by the index.
pub type SeqPos = u32;

/// Position of a reference sequence in the order it was indexed.
pub type ReferenceId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn is_forward(self) -> bool {
        matches!(self, Strand::Forward)
    }
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for bool {
    fn from(strand: Strand) -> Self {
        strand.is_forward()
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// A canonical k-mer selected as the representative of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minimizer {
    /// 2-bit packed canonical k-mer value
    pub kmer: u32,
    /// Start of the k-mer on the forward strand
    pub position: SeqPos,
    /// Which encoding supplied the canonical value
    pub strand: Strand,
}

impl Minimizer {
    pub fn new(kmer: u32, position: SeqPos, strand: Strand) -> Self {
        Self {
            kmer,
            position,
            strand,
        }
    }
}

/// One indexed occurrence of a minimizer in a reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub reference_id: ReferenceId,
    pub position: SeqPos,
    pub strand: Strand,
}

/// A single shared minimizer between a query and one reference occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub kmer: u32,
    pub reference_id: ReferenceId,
    pub query_pos: SeqPos,
    pub reference_pos: SeqPos,
    pub query_strand: Strand,
    pub reference_strand: Strand,
}

impl Anchor {
    pub fn new(query: &Minimizer, occurrence: &Occurrence) -> Self {
        Self {
            kmer: query.kmer,
            reference_id: occurrence.reference_id,
            query_pos: query.position,
            reference_pos: occurrence.position,
            query_strand: query.strand,
            reference_strand: occurrence.strand,
        }
    }

    /// Chain ordering for k-mers of length `k`.
    ///
    /// `self` precedes `other` when the two k-mers are disjoint and collinear
    /// on both axes, or when they lie on the same diagonal with `other`
    /// strictly downstream.
    pub fn precedes(&self, other: &Anchor, k: u32) -> bool {
        let k = u64::from(k);
        let disjoint = u64::from(self.query_pos) + k <= u64::from(other.query_pos)
            && u64::from(self.reference_pos) + k <= u64::from(other.reference_pos);
        if disjoint {
            return true;
        }

        self.query_pos < other.query_pos
            && self.reference_pos < other.reference_pos
            && other.reference_pos - self.reference_pos == other.query_pos - self.query_pos
    }

    /// Offset between reference and query coordinates.
    pub fn diagonal(&self) -> i64 {
        i64::from(self.reference_pos) - i64::from(self.query_pos)
    }
}
