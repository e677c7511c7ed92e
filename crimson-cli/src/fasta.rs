//! FASTA/FASTQ loading
//!
//! Reads every record of a sequence file through needletail (plain or
//! gzip-compressed, FASTA or FASTQ) and normalizes bases to uppercase ACGT.

use std::path::Path;

use needletail::parse_fastx_file;

use crimson_core::seed::encode;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First whitespace-delimited token of the header
    pub id: String,
    pub seq: Vec<u8>,
}

impl SequenceRecord {
    pub fn len(&self) -> usize {
        self.seq.len()
    }
}

/// Fragments that passed normalization, plus how many were dropped.
#[derive(Debug, Default)]
pub struct FragmentSet {
    pub records: Vec<SequenceRecord>,
    pub skipped: usize,
}

/// Read all records of `path` without touching the bases.
pub fn read_records(path: &Path) -> CliResult<Vec<SequenceRecord>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }

    let file = path.display().to_string();
    let mut reader = parse_fastx_file(path).map_err(|e| CliError::parse(file.as_str(), e.to_string()))?;

    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| CliError::parse(file.as_str(), e.to_string()))?;
        let header = String::from_utf8_lossy(record.id());
        let id = header.split_whitespace().next().unwrap_or_default().to_string();
        records.push(SequenceRecord {
            id,
            seq: record.seq().into_owned(),
        });
    }

    if records.is_empty() {
        return Err(CliError::empty_input(path.to_path_buf()));
    }
    Ok(records)
}

/// Load reference sequences. Any base outside ACGT is an error.
pub fn load_references(path: &Path) -> CliResult<Vec<SequenceRecord>> {
    let mut records = read_records(path)?;
    for record in &mut records {
        encode::normalize(&mut record.seq).map_err(|e| CliError::invalid_reference(record.id.as_str(), e))?;
    }
    log::info!("Loaded {} reference sequences from {}", records.len(), path.display());
    Ok(records)
}

/// Load fragments from every file, skipping records with bases outside ACGT.
pub fn load_fragments<P: AsRef<Path>>(paths: &[P]) -> CliResult<FragmentSet> {
    let mut set = FragmentSet::default();
    for path in paths {
        let path = path.as_ref();
        for mut record in read_records(path)? {
            match encode::normalize(&mut record.seq) {
                Ok(()) => set.records.push(record),
                Err(err) => {
                    log::warn!("Skipping fragment {}: {}", record.id, err);
                    set.skipped += 1;
                }
            }
        }
    }
    log::info!(
        "Loaded {} fragments from {} files ({} skipped)",
        set.records.len(),
        paths.len(),
        set.skipped
    );
    Ok(set)
}
