//! Fragment mapper
//!
//! Couples a [`ReferenceIndex`] with the reference sequences it was built
//! from. A fragment is chained against the index, the chain's bounding box
//! is optionally aligned, and the outcome is reported as a [`Mapping`].

use serde::{Deserialize, Serialize};

use crate::align::{self, AlignmentMode, Cigar, ScoreParams};
use crate::chain;
use crate::error::{CoreError, Result};
use crate::index::ReferenceIndex;
use crate::seed::SketchParams;
use crate::types::{Anchor, ReferenceId, SeqPos, Strand};

/// Quality reported for every mapping; no quality model is computed.
pub const UNKNOWN_MAPPING_QUALITY: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperOptions {
    /// Align the chained region and report a CIGAR
    pub align: bool,
    pub mode: AlignmentMode,
    pub score: ScoreParams,
    /// Largest DP grid (cells) that will be aligned
    pub max_align_cells: u64,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            align: false,
            mode: AlignmentMode::Global,
            score: ScoreParams::default(),
            max_align_cells: 100_000_000,
        }
    }
}

/// Where a fragment landed, in PAF terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub reference_id: ReferenceId,
    pub query_len: usize,
    pub query_begin: SeqPos,
    pub query_end: SeqPos,
    pub reference_len: usize,
    pub reference_begin: SeqPos,
    pub reference_end: SeqPos,
    pub strand: Strand,
    pub residue_matches: usize,
    pub block_length: usize,
    pub mapping_quality: u8,
    /// Alignment score when the region was aligned
    pub score: Option<i32>,
    pub cigar: Option<Cigar>,
    #[serde(skip)]
    pub anchors: Vec<Anchor>,
}

impl Mapping {
    pub fn is_aligned(&self) -> bool {
        self.cigar.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Mapper {
    index: ReferenceIndex,
    references: Vec<Vec<u8>>,
    options: MapperOptions,
}

impl Mapper {
    /// Index `references`, prune the top `filter_fraction` of k-mers and
    /// wrap the result.
    pub fn build(
        references: Vec<Vec<u8>>,
        params: SketchParams,
        filter_fraction: f64,
        options: MapperOptions,
    ) -> Result<Self> {
        let mut index = ReferenceIndex::from_references(&references, params)?;
        index.filter(filter_fraction)?;
        Self::from_index(index, references, options)
    }

    /// Wrap an index already built over `references`.
    pub fn from_index(index: ReferenceIndex, references: Vec<Vec<u8>>, options: MapperOptions) -> Result<Self> {
        if !index.is_built() {
            return Err(CoreError::IndexNotBuilt);
        }
        if index.reference_count() != references.len() {
            return Err(CoreError::invalid_parameter(
                "references",
                references.len(),
                format!("index was built over {} references", index.reference_count()),
            ));
        }
        Ok(Self {
            index,
            references,
            options,
        })
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn references(&self) -> &[Vec<u8>] {
        &self.references
    }

    /// Map one fragment. `Ok(None)` means no anchor was shared with any
    /// reference.
    pub fn map_fragment(&self, query: &[u8]) -> Result<Option<Mapping>> {
        let chain = chain::map(&self.index, query)?;
        let (Some(reference_id), Some(query_span), Some(reference_span)) =
            (chain.reference_id(), chain.query_span(), chain.reference_span())
        else {
            log::debug!("Fragment of {} bases is unmapped", query.len());
            return Ok(None);
        };

        let reference = self
            .references
            .get(reference_id as usize)
            .ok_or_else(|| CoreError::invalid_parameter("reference_id", reference_id, "no such reference"))?;

        let query_region = &query[query_span.start as usize..query_span.end as usize];
        let reference_region = &reference[reference_span.start as usize..reference_span.end as usize];
        let query_region_len = query_region.len();
        let reference_region_len = reference_region.len();

        let mut score = None;
        let mut cigar = None;
        if self.options.align {
            let cells = (query_region_len as u64 + 1).saturating_mul(reference_region_len as u64 + 1);
            if cells > self.options.max_align_cells {
                log::warn!(
                    "Skipping alignment of {}x{} region: {} cells exceeds limit of {}",
                    query_region_len,
                    reference_region_len,
                    cells,
                    self.options.max_align_cells
                );
            } else {
                let result = align::align(
                    query_region,
                    reference_region,
                    self.options.mode,
                    &self.options.score,
                    true,
                );
                score = Some(result.score);
                cigar = result.cigar;
            }
        }

        let (residue_matches, block_length) = match &cigar {
            Some(cigar) => (cigar.matched_len(), cigar.alignment_len()),
            None => {
                let shorter = query_region_len.min(reference_region_len);
                (shorter / 2, query_region_len + reference_region_len - shorter / 2)
            }
        };

        log::debug!(
            "Mapped {} bases to reference {} at {}..{} with {} anchors",
            query.len(),
            reference_id,
            reference_span.start,
            reference_span.end,
            chain.len()
        );

        Ok(Some(Mapping {
            reference_id,
            query_len: query.len(),
            query_begin: query_span.start,
            query_end: query_span.end,
            reference_len: reference.len(),
            reference_begin: reference_span.start,
            reference_end: reference_span.end,
            strand: Strand::Forward,
            residue_matches,
            block_length,
            mapping_quality: UNKNOWN_MAPPING_QUALITY,
            score,
            cigar,
            anchors: chain.into_anchors(),
        }))
    }
}
