//! PAF output for mapped fragments

use serde::Serialize;
use std::io::{self, Write};

use crimson_core::{Mapping, Strand};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PafRecord {
    pub query_name: String,
    pub query_len: usize,
    pub query_start: u32,
    pub query_end: u32,
    pub strand: Strand,
    pub target_name: String,
    pub target_len: usize,
    pub target_start: u32,
    pub target_end: u32,
    pub residue_matches: usize,
    pub alignment_len: usize,
    pub mapping_quality: u8,
    /// Optional SAM-style tags as (tag, type, value)
    pub tags: Vec<(String, char, String)>,
}

impl PafRecord {
    pub fn from_mapping(query_name: &str, target_name: &str, mapping: &Mapping) -> Self {
        let mut tags = Vec::new();
        if let Some(cigar) = &mapping.cigar {
            tags.push(("cg".to_string(), 'Z', cigar.to_string()));
        }
        if let Some(score) = mapping.score {
            tags.push(("AS".to_string(), 'i', score.to_string()));
        }

        Self {
            query_name: query_name.to_string(),
            query_len: mapping.query_len,
            query_start: mapping.query_begin,
            query_end: mapping.query_end,
            strand: mapping.strand,
            target_name: target_name.to_string(),
            target_len: mapping.reference_len,
            target_start: mapping.reference_begin,
            target_end: mapping.reference_end,
            residue_matches: mapping.residue_matches,
            alignment_len: mapping.block_length,
            mapping_quality: mapping.mapping_quality,
            tags,
        }
    }

    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_name,
            self.query_len,
            self.query_start,
            self.query_end,
            char::from(self.strand),
            self.target_name,
            self.target_len,
            self.target_start,
            self.target_end,
            self.residue_matches,
            self.alignment_len,
            self.mapping_quality
        );

        for (tag, tag_type, value) in &self.tags {
            line.push_str(&format!("\t{}:{}:{}", tag, tag_type, value));
        }

        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Paf,
    /// One JSON object per line
    JsonLines,
}

pub struct RecordWriter<W: Write> {
    writer: W,
    format: RecordFormat,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W, format: RecordFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    pub fn write_record(&mut self, record: &PafRecord) -> io::Result<()> {
        match self.format {
            RecordFormat::Paf => writeln!(self.writer, "{}", record.to_line())?,
            RecordFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, record)?;
                writeln!(self.writer)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PafRecord {
        PafRecord {
            query_name: "read1".to_string(),
            query_len: 100,
            query_start: 3,
            query_end: 98,
            strand: Strand::Forward,
            target_name: "chr1".to_string(),
            target_len: 5000,
            target_start: 1203,
            target_end: 1298,
            residue_matches: 47,
            alignment_len: 143,
            mapping_quality: 255,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_to_line() {
        assert_eq!(
            record().to_line(),
            "read1\t100\t3\t98\t+\tchr1\t5000\t1203\t1298\t47\t143\t255"
        );
    }

    #[test]
    fn test_to_line_with_tags() {
        let mut record = record();
        record.tags.push(("cg".to_string(), 'Z', "95M".to_string()));
        record.tags.push(("AS".to_string(), 'i', "285".to_string()));
        assert!(record.to_line().ends_with("\t255\tcg:Z:95M\tAS:i:285"));
    }

    #[test]
    fn test_writer_formats() {
        let mut writer = RecordWriter::new(Vec::new(), RecordFormat::Paf);
        writer.write_record(&record()).unwrap();
        assert_eq!(writer.written(), 1);
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));

        let mut writer = RecordWriter::new(Vec::new(), RecordFormat::JsonLines);
        writer.write_record(&record()).unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["target_name"], "chr1");
        assert_eq!(value["strand"], "+");
    }
}
