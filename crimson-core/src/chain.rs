//! Chaining module for crimson
//!
//! Turns the minimizers a query shares with the reference index into
//! anchors and keeps, per reference, a longest-increasing-subsequence
//! structure under [`Anchor::precedes`]. The longest chain over all
//! references is the mapping candidate.

use std::ops::Range;

use crate::error::{CoreError, Result};
use crate::index::ReferenceIndex;
use crate::seed::{self, SketchParams};
use crate::types::{Anchor, Minimizer, ReferenceId, SeqPos};

/// Mutually compatible anchors on one reference, ordered by query position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chain {
    anchors: Vec<Anchor>,
    kmer_len: u32,
}

impl Chain {
    fn new(anchors: Vec<Anchor>, kmer_len: u32) -> Self {
        Self { anchors, kmer_len }
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn into_anchors(self) -> Vec<Anchor> {
        self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// An empty chain means the query did not map.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn kmer_len(&self) -> u32 {
        self.kmer_len
    }

    pub fn reference_id(&self) -> Option<ReferenceId> {
        self.anchors.first().map(|a| a.reference_id)
    }

    /// Query interval covered from the first anchor to the end of the last k-mer.
    pub fn query_span(&self) -> Option<Range<SeqPos>> {
        let first = self.anchors.first()?;
        let last = self.anchors.last()?;
        Some(first.query_pos..last.query_pos + self.kmer_len)
    }

    /// Reference interval covered from the first anchor to the end of the last k-mer.
    pub fn reference_span(&self) -> Option<Range<SeqPos>> {
        let first = self.anchors.first()?;
        let last = self.anchors.last()?;
        Some(first.reference_pos..last.reference_pos + self.kmer_len)
    }

    /// Whether every consecutive pair satisfies the chain ordering.
    pub fn is_consistent(&self) -> bool {
        self.anchors
            .windows(2)
            .all(|pair| pair[0].precedes(&pair[1], self.kmer_len))
    }
}

/// Patience-sorting state for the anchors of one reference.
#[derive(Debug, Default)]
struct ChainLane {
    anchors: Vec<Anchor>,
    predecessors: Vec<Option<usize>>,
    /// Best tail anchor for each chain length
    tails: Vec<Anchor>,
    /// Index into `anchors` of each tail
    tail_ids: Vec<usize>,
}

impl ChainLane {
    fn push(&mut self, anchor: Anchor, k: u32) {
        let slot = lower_bound(&self.tails, |tail| tail.precedes(&anchor, k));
        let id = self.anchors.len();

        self.predecessors.push(slot.checked_sub(1).map(|s| self.tail_ids[s]));
        self.anchors.push(anchor);

        if slot == self.tails.len() {
            self.tails.push(anchor);
            self.tail_ids.push(id);
        } else {
            self.tails[slot] = anchor;
            self.tail_ids[slot] = id;
        }
    }

    fn chain_len(&self) -> usize {
        self.tails.len()
    }

    fn longest(&self) -> Vec<Anchor> {
        let mut chain = Vec::with_capacity(self.chain_len());
        let mut current = self.tail_ids.last().copied();
        while let Some(id) = current {
            chain.push(self.anchors[id]);
            current = self.predecessors[id];
        }
        chain.reverse();
        chain
    }
}

/// First slot whose element does not satisfy `precedes`.
///
/// Halves the range exactly like a classic lower bound. The chain relation is
/// not a strict weak order, so the search sequence is part of the result and
/// `precedes` is not required to partition `items`.
fn lower_bound<T>(items: &[T], mut precedes: impl FnMut(&T) -> bool) -> usize {
    let mut first = 0usize;
    let mut count = items.len();
    while count > 0 {
        let step = count / 2;
        let mid = first + step;
        if precedes(&items[mid]) {
            first = mid + 1;
            count -= step + 1;
        } else {
            count = step;
        }
    }
    first
}

/// Map `query` against `index`, sketching it with the index's parameters.
///
/// The canonical encoding comes from the index's [`StrandModel`], so chain
/// lengths depend on it. Build with [`StrandModel::Complement`] to reproduce
/// complement-only anchor counts; the default `ReverseComplement` selects
/// more minimizers on the same input (5 anchors rather than 4 for a k=3, w=3
/// self-map of `GTCATGCACGTTCAC`, and 3 rather than 2 after `filter(0.5)`).
///
/// [`StrandModel`]: crate::seed::StrandModel
/// [`StrandModel::Complement`]: crate::seed::StrandModel::Complement
pub fn map(index: &ReferenceIndex, query: &[u8]) -> Result<Chain> {
    let params = index.params().ok_or(CoreError::IndexNotBuilt)?;
    let minimizers = seed::sketch(query, &params)?;
    map_sketch(index, &minimizers, &params)
}

/// Chain an already sketched query. `params` must be the ones the index was
/// built with.
pub fn map_sketch(index: &ReferenceIndex, minimizers: &[Minimizer], params: &SketchParams) -> Result<Chain> {
    let indexed = index.params().ok_or(CoreError::IndexNotBuilt)?;
    if indexed != *params {
        return Err(CoreError::ParameterMismatch {
            index_k: indexed.k(),
            index_w: indexed.w(),
            query_k: params.k(),
            query_w: params.w(),
        });
    }

    let k = params.k();
    let mut lanes: Vec<ChainLane> = Vec::new();
    lanes.resize_with(index.reference_count(), ChainLane::default);

    let mut anchor_count = 0usize;
    for minimizer in minimizers {
        for occurrence in index.lookup(minimizer.kmer) {
            let Some(lane) = lanes.get_mut(occurrence.reference_id as usize) else {
                continue;
            };
            lane.push(Anchor::new(minimizer, occurrence), k);
            anchor_count += 1;
        }
    }

    let mut best: Option<&ChainLane> = None;
    for lane in &lanes {
        if lane.chain_len() > best.map_or(0, ChainLane::chain_len) {
            best = Some(lane);
        }
    }

    let chain = Chain::new(best.map(ChainLane::longest).unwrap_or_default(), k);
    log::trace!(
        "Chained {} of {} anchors from {} query minimizers",
        chain.len(),
        anchor_count,
        minimizers.len()
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::StrandModel;
    use crate::types::Strand;

    const REF: &[u8] = b"GTCATGCACGTTCAC";

    fn params(k: u32, w: u32) -> SketchParams {
        SketchParams::new(k, w).unwrap()
    }

    fn legacy(k: u32, w: u32) -> SketchParams {
        params(k, w).with_strand_model(StrandModel::Complement)
    }

    fn chain_len(references: &[&[u8]], p: SketchParams, fraction: f64, query: &[u8]) -> usize {
        let mut index = ReferenceIndex::from_references(references, p).unwrap();
        index.filter(fraction).unwrap();
        let chain = map(&index, query).unwrap();
        assert!(chain.is_consistent());
        chain.len()
    }

    #[test]
    fn test_self_map_complement_model() {
        assert_eq!(chain_len(&[REF], legacy(3, 3), 0.0, REF), 4);
        assert_eq!(chain_len(&[REF], legacy(3, 3), 0.5, REF), 2);
    }

    #[test]
    fn test_multi_reference_complement_model() {
        assert_eq!(
            chain_len(&[b"AAAAATATACG", b"GCATTGAC"], legacy(3, 3), 0.0, b"AAATGCTATACGA"),
            3
        );
        assert_eq!(
            chain_len(&[b"AAAAAAACCCCCCCC", b"CCCCAAAAAAAAAAA"], legacy(3, 3), 0.0, b"AAAAAATAAAAA"),
            2
        );
        assert_eq!(
            chain_len(&[b"AAAAAAATTTTTTTT", b"TTTTAAAAAAAAAAA"], legacy(3, 3), 0.0, b"AAAAAAAAAAAA"),
            3
        );
        assert_eq!(
            chain_len(
                &[b"AAAAAAATTTTTTTTTTTTTTTTTTT", b"TTTTAAAAAAAAAAA"],
                legacy(3, 3),
                0.0,
                b"AAAAAAAAAAAAAAAAAAAAAA"
            ),
            6
        );
    }

    #[test]
    fn test_self_map_follows_main_diagonal() {
        let index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        let chain = map(&index, REF).unwrap();
        assert_eq!(chain.len(), 5);
        assert!(chain.anchors().iter().all(|a| a.query_pos == a.reference_pos));
        assert_eq!(chain.reference_id(), Some(0));
        assert_eq!(chain.query_span(), Some(2..15));
        assert_eq!(chain.reference_span(), Some(2..15));
    }

    #[test]
    fn test_self_map_after_filter() {
        assert_eq!(chain_len(&[REF], params(3, 3), 0.5, REF), 3);
    }

    #[test]
    fn test_no_anchors_is_empty_chain() {
        let index = ReferenceIndex::from_references([&b"AAAAAAAAAA"[..]], params(3, 3)).unwrap();
        let chain = map(&index, b"CGCGCGCGCG").unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.reference_id(), None);
        assert_eq!(chain.query_span(), None);

        let chain = map(&index, b"").unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_unbuilt_index() {
        let index = ReferenceIndex::new();
        assert_eq!(map(&index, REF), Err(CoreError::IndexNotBuilt));
    }

    #[test]
    fn test_parameter_mismatch() {
        let index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        let other = params(4, 3);
        let sketch = seed::sketch(REF, &other).unwrap();
        let err = map_sketch(&index, &sketch, &other).unwrap_err();
        assert!(matches!(err, CoreError::ParameterMismatch { index_k: 3, query_k: 4, .. }));

        let model = params(3, 3).with_strand_model(StrandModel::Complement);
        assert!(map_sketch(&index, &[], &model).is_err());
    }

    #[test]
    fn test_invalid_query_base() {
        let index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        assert!(matches!(map(&index, b"GTCANTGC"), Err(CoreError::InvalidBase { .. })));
    }

    #[test]
    fn test_best_reference_ties_keep_first() {
        let index = ReferenceIndex::from_references([REF, REF], params(3, 3)).unwrap();
        let chain = map(&index, REF).unwrap();
        assert_eq!(chain.reference_id(), Some(0));
    }

    #[test]
    fn test_longer_match_wins() {
        let references: [&[u8]; 2] = [b"AAAAAAAAAA", REF];
        let index = ReferenceIndex::from_references(references, params(3, 3)).unwrap();
        let chain = map(&index, REF).unwrap();
        assert_eq!(chain.reference_id(), Some(1));
        assert_eq!(chain.len(), 5);
        assert!(chain.anchors().iter().all(|a| a.diagonal() == 0));
    }

    #[test]
    fn test_lower_bound_search_order() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(lower_bound(&items, |&x| x < 3), 2);
        assert_eq!(lower_bound(&items, |_| true), 5);
        assert_eq!(lower_bound(&items, |_| false), 0);
        assert_eq!(lower_bound::<i32>(&[], |_| true), 0);
    }

    #[test]
    fn test_lane_back_pointers() {
        let anchor = |q: u32, r: u32| Anchor {
            kmer: 0,
            reference_id: 0,
            query_pos: q,
            reference_pos: r,
            query_strand: Strand::Forward,
            reference_strand: Strand::Forward,
        };
        let mut lane = ChainLane::default();
        for (q, r) in [(1, 1), (4, 7), (4, 4), (7, 7), (7, 4), (10, 10)] {
            lane.push(anchor(q, r), 3);
        }
        assert_eq!(lane.chain_len(), 4);
        let chain: Vec<(u32, u32)> = lane.longest().iter().map(|a| (a.query_pos, a.reference_pos)).collect();
        assert_eq!(chain, vec![(1, 1), (4, 4), (7, 7), (10, 10)]);
    }
}
