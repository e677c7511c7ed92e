//! Minimizer sketching
//!
//! Reduces a sequence to the canonical k-mers that win their sliding window
//! of `w` consecutive k-mers. Sketches of a reference and of a query built
//! with the same [`SketchParams`] share minimizers wherever the sequences
//! share windows, which is what the index and chainer rely on.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};

use crate::error::{CoreError, Result};
use crate::types::{Minimizer, Strand};

pub mod encode;

pub use encode::{encode_base, reverse_complement};

/// Largest k-mer that packs into a `u32`.
pub const MAX_KMER_LEN: u32 = 16;

/// Which second encoding is compared against the forward k-mer when
/// choosing the canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrandModel {
    /// Reverse complement of the k-mer. A sequence and its reverse
    /// complement select the same canonical values.
    #[default]
    ReverseComplement,
    /// Per-base complement read left to right, without reversing. Anchor
    /// counts differ from the default: a self-map of `GTCATGCACGTTCAC` with
    /// k=3, w=3 yields 4 anchors here and 5 under `ReverseComplement`.
    Complement,
}

/// Parameters for minimizer sketching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SketchParams {
    k: u32,
    w: u32,
    strand_model: StrandModel,
}

impl SketchParams {
    /// Validate and build parameters for k-mer length `k` and window `w`.
    pub fn new(k: u32, w: u32) -> Result<Self> {
        if !(1..=MAX_KMER_LEN).contains(&k) {
            return Err(CoreError::invalid_parameter(
                "k",
                k,
                format!("k-mer length must be in 1..={}", MAX_KMER_LEN),
            ));
        }
        if w == 0 {
            return Err(CoreError::invalid_parameter("w", w, "window length must be at least 1"));
        }
        Ok(Self {
            k,
            w,
            strand_model: StrandModel::default(),
        })
    }

    pub fn with_strand_model(mut self, strand_model: StrandModel) -> Self {
        self.strand_model = strand_model;
        self
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn w(&self) -> u32 {
        self.w
    }

    pub fn strand_model(&self) -> StrandModel {
        self.strand_model
    }

    fn mask(&self) -> u32 {
        if self.k == MAX_KMER_LEN {
            u32::MAX
        } else {
            (1u32 << (2 * self.k)) - 1
        }
    }
}

/// Window ranking: smaller k-mer first, then the later position, then
/// reverse before forward.
pub fn window_order(a: &Minimizer, b: &Minimizer) -> Ordering {
    a.kmer
        .cmp(&b.kmer)
        .then_with(|| b.position.cmp(&a.position))
        .then_with(|| a.strand.is_forward().cmp(&b.strand.is_forward()))
}

/// BTreeSet key ordered by [`window_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowEntry(Minimizer);

impl Ord for WindowEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        window_order(&self.0, &other.0)
    }
}

impl PartialOrd for WindowEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rolling forward/second-strand codes for the k-mer ending at the last base.
struct KmerRoller {
    forward: u32,
    other: u32,
    mask: u32,
    top_shift: u32,
    model: StrandModel,
}

impl KmerRoller {
    fn new(params: &SketchParams) -> Self {
        Self {
            forward: 0,
            other: 0,
            mask: params.mask(),
            top_shift: 2 * (params.k - 1),
            model: params.strand_model,
        }
    }

    fn push(&mut self, code: u32) {
        let complement = encode::complement_code(code);
        self.forward = ((self.forward << 2) | code) & self.mask;
        self.other = match self.model {
            StrandModel::ReverseComplement => (self.other >> 2) | (complement << self.top_shift),
            StrandModel::Complement => ((self.other << 2) | complement) & self.mask,
        };
    }

    /// Canonical value; a tie goes to the second strand.
    fn canonical(&self) -> (u32, Strand) {
        if self.forward < self.other {
            (self.forward, Strand::Forward)
        } else {
            (self.other, Strand::Reverse)
        }
    }
}

/// Sketch `sequence` into its ordered minimizers.
///
/// A sequence too short to fill one window of `w` k-mers yields an empty
/// sketch. Any byte outside ACGT (either case) fails the whole call.
pub fn sketch(sequence: &[u8], params: &SketchParams) -> Result<Vec<Minimizer>> {
    if sequence.len() > u32::MAX as usize {
        return Err(CoreError::invalid_parameter(
            "sequence length",
            sequence.len(),
            "sequences longer than u32::MAX bases cannot be sketched",
        ));
    }

    let k = params.k as usize;
    let w = params.w as usize;
    let mut roller = KmerRoller::new(params);
    let mut window: BTreeSet<WindowEntry> = BTreeSet::new();
    let mut arrivals: VecDeque<Minimizer> = VecDeque::with_capacity(w + 1);
    let mut last: Option<Minimizer> = None;
    let mut minimizers = Vec::new();

    for (i, &base) in sequence.iter().enumerate() {
        let code = encode_base(base).ok_or_else(|| CoreError::invalid_base(base, i))?;
        roller.push(code);

        if i + 1 < k {
            continue;
        }

        let position = (i + 1 - k) as u32;
        let (kmer, strand) = roller.canonical();
        let record = Minimizer::new(kmer, position, strand);
        window.insert(WindowEntry(record));
        arrivals.push_back(record);

        if arrivals.len() < w {
            continue;
        }

        let Some(&WindowEntry(current)) = window.first() else {
            continue;
        };

        // The first full window always emits; later windows emit only when
        // the minimum changed or the previous one has left the window.
        let emit = match last {
            None => true,
            Some(previous) => {
                position - previous.position >= params.w
                    || current.kmer != previous.kmer
                    || current.strand != previous.strand
            }
        };
        if emit {
            minimizers.push(current);
            last = Some(current);
        }

        if let Some(oldest) = arrivals.pop_front() {
            window.remove(&WindowEntry(oldest));
        }
    }

    Ok(minimizers)
}
