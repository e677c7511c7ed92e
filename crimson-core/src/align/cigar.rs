//! Run-length encoded alignment operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// Aligned pair of bases, equal or not
    Match,
    /// Base present in the query only
    Insertion,
    /// Base present in the target only
    Deletion,
}

impl CigarOp {
    pub fn code(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Insertion => 'I',
            CigarOp::Deletion => 'D',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'M' => Some(CigarOp::Match),
            'I' => Some(CigarOp::Insertion),
            'D' => Some(CigarOp::Deletion),
            _ => None,
        }
    }

    pub fn consumes_query(self) -> bool {
        matches!(self, CigarOp::Match | CigarOp::Insertion)
    }

    pub fn consumes_target(self) -> bool {
        matches!(self, CigarOp::Match | CigarOp::Deletion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarRun {
    pub len: u32,
    pub op: CigarOp,
}

impl fmt::Display for CigarRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.op.code())
    }
}

/// Alignment path as runs of identical operations, no two adjacent runs
/// sharing an op and no run of length zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cigar(Vec<CigarRun>);

impl Cigar {
    /// Collapse a per-column operation sequence into runs.
    pub fn from_ops<I: IntoIterator<Item = CigarOp>>(ops: I) -> Self {
        let mut runs: Vec<CigarRun> = Vec::new();
        for op in ops {
            match runs.last_mut() {
                Some(run) if run.op == op => run.len += 1,
                _ => runs.push(CigarRun { len: 1, op }),
            }
        }
        Cigar(runs)
    }

    pub fn runs(&self) -> &[CigarRun] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query bases consumed (M + I).
    pub fn query_span(&self) -> usize {
        self.sum_where(CigarOp::consumes_query)
    }

    /// Target bases consumed (M + D).
    pub fn target_span(&self) -> usize {
        self.sum_where(CigarOp::consumes_target)
    }

    pub fn matched_len(&self) -> usize {
        self.sum_where(|op| op == CigarOp::Match)
    }

    /// Total number of alignment columns.
    pub fn alignment_len(&self) -> usize {
        self.sum_where(|_| true)
    }

    fn sum_where(&self, keep: impl Fn(CigarOp) -> bool) -> usize {
        self.0
            .iter()
            .filter(|run| keep(run.op))
            .map(|run| run.len as usize)
            .sum()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.0 {
            write!(f, "{}", run)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut runs: Vec<CigarRun> = Vec::new();
        let mut digits = String::new();

        for c in s.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let op = CigarOp::from_code(c)
                .ok_or_else(|| CoreError::invalid_cigar(format!("unknown operation '{}' in \"{}\"", c, s)))?;
            if digits.is_empty() {
                return Err(CoreError::invalid_cigar(format!("operation '{}' has no length in \"{}\"", c, s)));
            }
            let len: u32 = digits
                .parse()
                .map_err(|_| CoreError::invalid_cigar(format!("run length {} out of range", digits)))?;
            if len == 0 {
                return Err(CoreError::invalid_cigar(format!("zero-length run in \"{}\"", s)));
            }
            digits.clear();

            match runs.last_mut() {
                Some(run) if run.op == op => run.len += len,
                _ => runs.push(CigarRun { len, op }),
            }
        }

        if !digits.is_empty() {
            return Err(CoreError::invalid_cigar(format!("trailing length without operation in \"{}\"", s)));
        }
        Ok(Cigar(runs))
    }
}

impl From<Cigar> for String {
    fn from(cigar: Cigar) -> Self {
        cigar.to_string()
    }
}

impl TryFrom<String> for Cigar {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
