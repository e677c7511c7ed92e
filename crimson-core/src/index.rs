//! Reference minimizer index
//!
//! Inverted index from canonical k-mer to every place it was selected as a
//! minimizer across the reference sequences. The sketch parameters are fixed
//! when the index is built and every query must be sketched with the same
//! ones; [`ReferenceIndex::reset`] is the only way to change them.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::seed::{self, SketchParams};
use crate::types::{Occurrence, ReferenceId};

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    params: Option<SketchParams>,
    reference_count: usize,
    table: HashMap<u32, Vec<Occurrence>>,
}

impl ReferenceIndex {
    /// Create an empty, unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index over `references`.
    pub fn from_references<I, S>(references: I, params: SketchParams) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut index = Self::new();
        index.build(references, params)?;
        Ok(index)
    }

    /// Sketch every reference and record its minimizers.
    ///
    /// Within one reference, occurrences are appended in descending position
    /// order. A failure leaves the index exactly as it was.
    pub fn build<I, S>(&mut self, references: I, params: SketchParams) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        if self.is_built() {
            return Err(CoreError::IndexAlreadyBuilt);
        }

        let mut table: HashMap<u32, Vec<Occurrence>> = HashMap::new();
        let mut reference_count = 0usize;

        for (id, reference) in references.into_iter().enumerate() {
            let reference_id = ReferenceId::try_from(id).map_err(|_| {
                CoreError::invalid_parameter("reference count", id, "at most u32::MAX references can be indexed")
            })?;
            let minimizers = seed::sketch(reference.as_ref(), &params)?;
            for minimizer in minimizers.iter().rev() {
                table.entry(minimizer.kmer).or_default().push(Occurrence {
                    reference_id,
                    position: minimizer.position,
                    strand: minimizer.strand,
                });
            }
            reference_count += 1;
        }

        log::debug!(
            "Indexed {} references: {} distinct minimizers, {} occurrences (k={}, w={})",
            reference_count,
            table.len(),
            table.values().map(Vec::len).sum::<usize>(),
            params.k(),
            params.w()
        );

        self.params = Some(params);
        self.reference_count = reference_count;
        self.table = table;
        Ok(())
    }

    /// Drop the most frequent `top_fraction` of distinct k-mers.
    ///
    /// K-mers are ranked by occurrence count, larger k-mer value first on
    /// ties, and the first `floor(top_fraction * len)` are removed. Returns
    /// the number of k-mers removed.
    pub fn filter(&mut self, top_fraction: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&top_fraction) {
            return Err(CoreError::invalid_parameter(
                "top_fraction",
                top_fraction,
                "fraction must be within [0, 1]",
            ));
        }

        let distinct = self.table.len();
        let remove = ((top_fraction * distinct as f64).floor() as usize).min(distinct);
        if remove == 0 {
            return Ok(0);
        }

        let mut ranked: Vec<(usize, u32)> = self
            .table
            .iter()
            .map(|(&kmer, occurrences)| (occurrences.len(), kmer))
            .collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));

        for &(_, kmer) in &ranked[..remove] {
            self.table.remove(&kmer);
        }

        log::debug!(
            "Filtered {} of {} distinct minimizers (top fraction {})",
            remove,
            distinct,
            top_fraction
        );
        Ok(remove)
    }

    /// Clear the index so it can be rebuilt, possibly with new parameters.
    pub fn reset(&mut self) {
        self.params = None;
        self.reference_count = 0;
        self.table.clear();
    }

    /// Occurrences of `kmer`, empty when it is absent or was filtered.
    pub fn lookup(&self, kmer: u32) -> &[Occurrence] {
        self.table.get(&kmer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn params(&self) -> Option<SketchParams> {
        self.params
    }

    pub fn k(&self) -> Option<u32> {
        self.params.map(|p| p.k())
    }

    pub fn w(&self) -> Option<u32> {
        self.params.map(|p| p.w())
    }

    pub fn is_built(&self) -> bool {
        self.params.is_some()
    }

    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    /// Number of distinct k-mers in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Total occurrences across all k-mers.
    pub fn occurrence_count(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }
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

    #[test]
    fn test_build_records_occurrences_in_reverse_order() {
        let index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        assert!(index.is_built());
        assert_eq!(index.reference_count(), 1);
        assert_eq!(index.len(), 4);
        assert_eq!(index.occurrence_count(), 7);

        let positions: Vec<u32> = index.lookup(17).iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![12, 6]);
        let sixes = index.lookup(6);
        assert_eq!(sixes[0].strand, Strand::Reverse);
        assert_eq!(sixes[1].strand, Strand::Forward);
        assert!(index.lookup(63).is_empty());
    }

    #[test]
    fn test_reference_ids_follow_input_order() {
        let index = ReferenceIndex::from_references([&b"AAAAAA"[..], &b"AAAAAA"[..]], params(3, 1)).unwrap();
        assert_eq!(index.reference_count(), 2);
        let ids: Vec<u32> = index.lookup(0).iter().map(|o| o.reference_id).collect();
        assert_eq!(ids, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_filter_fractions() {
        let mut index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        assert_eq!(index.filter(0.0).unwrap(), 0);
        assert_eq!(index.len(), 4);

        // counts: 17 -> 2, 14 -> 2, 6 -> 2, 1 -> 1; ties drop larger k-mers first
        assert_eq!(index.filter(0.5).unwrap(), 2);
        assert!(index.lookup(17).is_empty());
        assert!(index.lookup(14).is_empty());
        assert_eq!(index.lookup(6).len(), 2);
        assert_eq!(index.lookup(1).len(), 1);

        assert_eq!(index.filter(1.0).unwrap(), 2);
        assert!(index.is_empty());
        assert!(index.is_built());
    }

    #[test]
    fn test_filter_complement_model() {
        let p = params(3, 3).with_strand_model(StrandModel::Complement);
        let mut index = ReferenceIndex::from_references([REF], p).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.filter(0.5).unwrap(), 1);
        assert!(index.lookup(6).is_empty());
    }

    #[test]
    fn test_filter_rejects_bad_fraction() {
        let mut index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        assert!(index.filter(-0.1).is_err());
        assert!(index.filter(1.5).is_err());
        assert!(index.filter(f64::NAN).is_err());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_failed_build_keeps_state() {
        let mut index = ReferenceIndex::new();
        let err = index.build([&b"ACGTACGT"[..], &b"ACGNNACG"[..]], params(3, 2)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidBase { base: b'N', position: 3 }));
        assert!(!index.is_built());
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebuild_requires_reset() {
        let mut index = ReferenceIndex::from_references([REF], params(3, 3)).unwrap();
        assert_eq!(index.build([REF], params(4, 2)), Err(CoreError::IndexAlreadyBuilt));
        assert_eq!(index.k(), Some(3));

        index.reset();
        assert!(!index.is_built());
        assert_eq!(index.reference_count(), 0);
        index.build([REF], params(4, 2)).unwrap();
        assert_eq!(index.k(), Some(4));
        assert_eq!(index.w(), Some(2));
    }

    #[test]
    fn test_empty_references() {
        let index = ReferenceIndex::from_references(Vec::<Vec<u8>>::new(), params(3, 3)).unwrap();
        assert!(index.is_built());
        assert_eq!(index.reference_count(), 0);
        assert!(index.is_empty());
    }
}
