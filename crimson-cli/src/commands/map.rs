//! Map command implementation - map fragments against a reference genome

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crimson_core::{AlignmentMode, Mapper, SketchParams, StrandModel};

use crate::config::Config;
use crate::error::CliError;
use crate::fasta;
use crate::paf::{PafRecord, RecordFormat, RecordWriter};
use crate::stats;

#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    /// Reference genome (FASTA/FASTQ, optionally gzipped)
    pub reference: PathBuf,

    /// Fragment files (FASTA/FASTQ, optionally gzipped)
    #[arg(required = true, num_args = 1..)]
    pub fragments: Vec<PathBuf>,

    /// Calculate a base-level alignment and emit a cg:Z: CIGAR tag
    #[arg(short = 'c', long = "align")]
    pub align: bool,

    /// Alignment mode
    #[arg(short = 'a', long, value_enum)]
    pub mode: Option<AlignMode>,

    /// Match score
    #[arg(short = 'm', long = "match", allow_negative_numbers = true)]
    pub match_score: Option<i32>,

    /// Mismatch score
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub mismatch: Option<i32>,

    /// Linear gap score
    #[arg(short = 'g', long, allow_negative_numbers = true)]
    pub gap: Option<i32>,

    /// Affine gap opening score (needs --gap-extend as well)
    #[arg(long, allow_negative_numbers = true)]
    pub gap_open: Option<i32>,

    /// Affine gap extension score
    #[arg(long, allow_negative_numbers = true)]
    pub gap_extend: Option<i32>,

    /// K-mer length (1-16)
    #[arg(short = 'k', long)]
    pub k: Option<u32>,

    /// Minimizer window length
    #[arg(short = 'w', long)]
    pub w: Option<u32>,

    /// Fraction of the most frequent minimizers to ignore
    #[arg(short = 'f', long = "filter")]
    pub filter_fraction: Option<f64>,

    /// Canonical k-mer encoding
    #[arg(long, value_enum)]
    pub strand_model: Option<StrandModelArg>,

    /// Largest DP grid (cells) that will be aligned
    #[arg(long)]
    pub max_cells: Option<u64>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output record format
    #[arg(long, value_enum, default_value = "paf")]
    pub format: OutputFormat,

    /// Do not print input statistics to stderr
    #[arg(long)]
    pub no_stats: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignMode {
    Global,
    Local,
    Semiglobal,
}

impl From<AlignMode> for AlignmentMode {
    fn from(mode: AlignMode) -> Self {
        match mode {
            AlignMode::Global => AlignmentMode::Global,
            AlignMode::Local => AlignmentMode::Local,
            AlignMode::Semiglobal => AlignmentMode::Semiglobal,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrandModelArg {
    ReverseComplement,
    Complement,
}

impl From<StrandModelArg> for StrandModel {
    fn from(model: StrandModelArg) -> Self {
        match model {
            StrandModelArg::ReverseComplement => StrandModel::ReverseComplement,
            StrandModelArg::Complement => StrandModel::Complement,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Paf,
    Json,
}

impl From<OutputFormat> for RecordFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Paf => RecordFormat::Paf,
            OutputFormat::Json => RecordFormat::JsonLines,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub mapped: usize,
    pub unmapped: usize,
    pub skipped: usize,
}

/// Configuration with command-line values taking precedence.
pub fn effective_config(config: &Config, args: &MapArgs) -> Config {
    let mut config = config.clone();
    let seed = &mut config.seed;
    seed.k = args.k.unwrap_or(seed.k);
    seed.w = args.w.unwrap_or(seed.w);
    seed.filter_fraction = args.filter_fraction.unwrap_or(seed.filter_fraction);
    if let Some(model) = args.strand_model {
        seed.strand_model = model.into();
    }

    let align = &mut config.align;
    align.enabled |= args.align;
    if let Some(mode) = args.mode {
        align.mode = mode.into();
    }
    align.match_score = args.match_score.unwrap_or(align.match_score);
    align.mismatch = args.mismatch.unwrap_or(align.mismatch);
    align.gap = args.gap.unwrap_or(align.gap);
    align.gap_open = args.gap_open.unwrap_or(align.gap_open);
    align.gap_extend = args.gap_extend.unwrap_or(align.gap_extend);
    align.max_cells = args.max_cells.unwrap_or(align.max_cells);
    config
}

pub fn execute(config: &Config, args: MapArgs) -> Result<MapSummary> {
    let config = effective_config(config, &args);
    log::info!("Reference: {}", args.reference.display());
    log::debug!("Effective configuration: {:?}", config);

    let references = fasta::load_references(&args.reference).context("Failed to load reference sequences")?;
    let fragments = fasta::load_fragments(&args.fragments).context("Failed to load fragments")?;

    if !args.no_stats {
        let stderr = io::stderr();
        stats::write_report(&mut stderr.lock(), &references, &fragments.records)
            .context("Failed to write statistics")?;
    }

    let params = SketchParams::new(config.seed.k, config.seed.w)
        .map_err(CliError::from)?
        .with_strand_model(config.seed.strand_model);
    let (names, sequences): (Vec<String>, Vec<Vec<u8>>) =
        references.into_iter().map(|record| (record.id, record.seq)).unzip();
    let mapper = Mapper::build(sequences, params, config.seed.filter_fraction, config.align.mapper_options())
        .map_err(CliError::from)
        .context("Failed to build reference index")?;
    log::info!(
        "Index ready: {} minimizers, {} occurrences over {} references",
        mapper.index().len(),
        mapper.index().occurrence_count(),
        mapper.index().reference_count()
    );

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = RecordWriter::new(sink, args.format.into());

    let mut summary = MapSummary {
        skipped: fragments.skipped,
        ..MapSummary::default()
    };
    for fragment in &fragments.records {
        let mapping = mapper
            .map_fragment(&fragment.seq)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to map fragment {}", fragment.id))?;

        match mapping {
            Some(mapping) => {
                let target = &names[mapping.reference_id as usize];
                writer.write_record(&PafRecord::from_mapping(&fragment.id, target, &mapping))?;
                summary.mapped += 1;
            }
            None => {
                log::debug!("Fragment {} is unmapped", fragment.id);
                summary.unmapped += 1;
            }
        }
    }
    log::debug!("Wrote {} records", writer.written());
    writer.finish().context("Failed to flush output")?;

    log::info!(
        "Mapped {} fragments, {} unmapped, {} skipped",
        summary.mapped,
        summary.unmapped,
        summary.skipped
    );
    Ok(summary)
}
