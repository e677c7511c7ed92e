//! Input statistics printed before mapping

use std::io::{self, Write};

use crate::fasta::SequenceRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct LengthStats {
    pub count: usize,
    pub total: u64,
    pub average: f64,
    pub n50: usize,
    pub min: usize,
    pub max: usize,
}

impl LengthStats {
    /// `None` for an empty set of lengths.
    pub fn from_lengths(lengths: &[usize]) -> Option<Self> {
        let min = *lengths.iter().min()?;
        let max = *lengths.iter().max()?;
        let total: u64 = lengths.iter().map(|&l| l as u64).sum();

        let mut sorted = lengths.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let half = total.div_ceil(2);
        let mut cumulative = 0u64;
        let mut n50 = 0;
        for &len in &sorted {
            cumulative += len as u64;
            if cumulative >= half {
                n50 = len;
                break;
            }
        }

        Some(Self {
            count: lengths.len(),
            total,
            average: total as f64 / lengths.len() as f64,
            n50,
            min,
            max,
        })
    }

    pub fn from_records(records: &[SequenceRecord]) -> Option<Self> {
        let lengths: Vec<usize> = records.iter().map(SequenceRecord::len).collect();
        Self::from_lengths(&lengths)
    }
}

/// Write the reference and fragment summary blocks.
pub fn write_report<W: Write>(out: &mut W, references: &[SequenceRecord], fragments: &[SequenceRecord]) -> io::Result<()> {
    writeln!(out, "Reference genome statistics")?;
    for reference in references {
        writeln!(out, "Name: {}", reference.id)?;
        writeln!(out, "Length: {}", reference.len())?;
    }
    writeln!(out)?;

    writeln!(out, "Fragment statistics")?;
    match LengthStats::from_records(fragments) {
        Some(stats) => {
            writeln!(out, "Number of fragments: {}", stats.count)?;
            writeln!(out, "Total length: {}", stats.total)?;
            writeln!(out, "Average length: {:.6}", stats.average)?;
            writeln!(out, "N50 length: {}", stats.n50)?;
            writeln!(out, "Minimal length: {}", stats.min)?;
            writeln!(out, "Maximal length: {}", stats.max)?;
        }
        None => writeln!(out, "Number of fragments: 0")?,
    }
    writeln!(out)
}
