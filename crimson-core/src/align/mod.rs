//! Pairwise alignment module for crimson
//!
//! Full dynamic-programming alignment of a query against a target in
//! global, local or semiglobal mode, with linear or affine gap scoring and
//! optional traceback into a [`Cigar`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

pub mod cigar;

pub use cigar::{Cigar, CigarOp, CigarRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// End to end on both sequences
    #[default]
    Global,
    /// Best scoring pair of substrings
    Local,
    /// End to end on the target, free leading target gaps
    Semiglobal,
}

impl AlignmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlignmentMode::Global => "global",
            AlignmentMode::Local => "local",
            AlignmentMode::Semiglobal => "semiglobal",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignmentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "0" => Ok(AlignmentMode::Global),
            "local" | "1" => Ok(AlignmentMode::Local),
            "semiglobal" | "2" => Ok(AlignmentMode::Semiglobal),
            _ => Err(CoreError::invalid_parameter(
                "alignment mode",
                s,
                "expected one of global, local, semiglobal",
            )),
        }
    }
}

/// Scoring scheme
///
/// Gaps are affine only when both `gap_open` and `gap_extend` are nonzero;
/// otherwise every gap column costs `gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreParams {
    #[serde(rename = "match")]
    pub match_score: i32,
    pub mismatch: i32,
    pub gap: i32,
    #[serde(default)]
    pub gap_open: i32,
    #[serde(default)]
    pub gap_extend: i32,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self::linear(3, -5, -4)
    }
}

impl ScoreParams {
    pub fn linear(match_score: i32, mismatch: i32, gap: i32) -> Self {
        Self {
            match_score,
            mismatch,
            gap,
            gap_open: 0,
            gap_extend: 0,
        }
    }

    pub fn with_affine(mut self, gap_open: i32, gap_extend: i32) -> Self {
        self.gap_open = gap_open;
        self.gap_extend = gap_extend;
        self
    }

    pub fn is_affine(&self) -> bool {
        self.gap_open != 0 && self.gap_extend != 0
    }

    fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    pub score: i32,
    /// Present when a traceback was requested
    pub cigar: Option<Cigar>,
    /// Target offset where the aligned region starts
    pub target_begin: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TracebackOp {
    #[default]
    Match,
    Insertion,
    Deletion,
}

/// Score matrices for one call, row-major with `cols = target.len() + 1`.
struct DpMatrix {
    cols: usize,
    best: Vec<i32>,
    insertion: Vec<i32>,
    deletion: Vec<i32>,
    trace: Vec<TracebackOp>,
}

impl DpMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        let cells = rows * cols;
        Self {
            cols,
            best: vec![0; cells],
            insertion: vec![0; cells],
            deletion: vec![0; cells],
            trace: vec![TracebackOp::default(); cells],
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }
}

/// Align `query` against `target`.
///
/// Bases are compared as raw bytes. Every interior cell is floored at zero
/// in all three modes; only the gap boundaries can go negative. The DP needs
/// `(query.len() + 1) * (target.len() + 1)` cells of memory, which callers
/// should bound.
pub fn align(
    query: &[u8],
    target: &[u8],
    mode: AlignmentMode,
    params: &ScoreParams,
    want_cigar: bool,
) -> AlignmentResult {
    let rows = query.len() + 1;
    let cols = target.len() + 1;
    let affine = params.is_affine();
    let mut dp = DpMatrix::new(rows, cols);

    if mode != AlignmentMode::Local {
        for i in 1..rows {
            let (cell, above) = (dp.at(i, 0), dp.at(i - 1, 0));
            dp.best[cell] = dp.best[above].saturating_add(params.gap);
        }
    }
    if mode == AlignmentMode::Global {
        for j in 1..cols {
            dp.best[j] = dp.best[j - 1].saturating_add(params.gap);
        }
    }

    let mut max_score = 0;
    let (mut max_i, mut max_j) = (0, 0);

    for i in 1..rows {
        for j in 1..cols {
            let cell = dp.at(i, j);
            let diag = dp.at(i - 1, j - 1);
            let up = dp.at(i - 1, j);
            let left = cell - 1;

            let substitution = dp.best[diag].saturating_add(params.substitution(query[i - 1], target[j - 1]));
            let (insertion, deletion) = if affine {
                (
                    dp.best[up]
                        .saturating_add(params.gap_open)
                        .max(dp.insertion[up])
                        .saturating_add(params.gap_extend),
                    dp.best[left]
                        .saturating_add(params.gap_open)
                        .max(dp.deletion[left])
                        .saturating_add(params.gap_extend),
                )
            } else {
                (
                    dp.best[up].saturating_add(params.gap),
                    dp.best[left].saturating_add(params.gap),
                )
            };
            dp.insertion[cell] = insertion;
            dp.deletion[cell] = deletion;

            let (best, op) = if substitution >= insertion && substitution >= deletion {
                (substitution, TracebackOp::Match)
            } else if insertion >= deletion {
                (insertion, TracebackOp::Insertion)
            } else {
                (deletion, TracebackOp::Deletion)
            };
            let score = best.max(0);
            dp.best[cell] = score;
            dp.trace[cell] = op;

            if score > max_score {
                max_score = score;
                max_i = i;
                max_j = j;
            }
        }
    }

    let (end_i, end_j, score) = match mode {
        AlignmentMode::Local => (max_i, max_j, max_score),
        AlignmentMode::Global | AlignmentMode::Semiglobal => {
            (query.len(), target.len(), dp.best[dp.at(query.len(), target.len())])
        }
    };

    if !want_cigar {
        return AlignmentResult {
            score,
            cigar: None,
            target_begin: None,
        };
    }

    let (cigar, target_begin) = traceback(&dp, mode, end_i, end_j);
    AlignmentResult {
        score,
        cigar: Some(cigar),
        target_begin: Some(target_begin),
    }
}

fn traceback(dp: &DpMatrix, mode: AlignmentMode, mut i: usize, mut j: usize) -> (Cigar, usize) {
    let mut ops: Vec<CigarOp> = Vec::with_capacity(i + j);

    loop {
        let done = match mode {
            AlignmentMode::Local => dp.best[dp.at(i, j)] <= 0,
            AlignmentMode::Global | AlignmentMode::Semiglobal => i + j == 0,
        };
        if done {
            break;
        }

        let op = if i == 0 {
            TracebackOp::Deletion
        } else if j == 0 {
            TracebackOp::Insertion
        } else {
            dp.trace[dp.at(i, j)]
        };

        match op {
            TracebackOp::Match => {
                i -= 1;
                j -= 1;
                ops.push(CigarOp::Match);
            }
            TracebackOp::Insertion => {
                i -= 1;
                ops.push(CigarOp::Insertion);
            }
            TracebackOp::Deletion => {
                j -= 1;
                ops.push(CigarOp::Deletion);
            }
        }
    }

    ops.reverse();
    (Cigar::from_ops(ops), j)
}
