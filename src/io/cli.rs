//! Command-line interface for batch synthesis from PNG samples

use crate::algorithm::executor::{SynthesisConfig, SynthesisModel};
use crate::algorithm::selection::TieBreak;
use crate::io::configuration::{
    DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    DEFAULT_SYMMETRY, DEFAULT_VARIANT_COUNT, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, SynthesisError};
use crate::io::image::{SampleImage, export_grid_as_png};
use crate::io::progress::ProgressManager;
use clap::Parser;
use ndarray::Array2;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "wavesynth")]
#[command(
    author,
    version,
    about = "Synthesize images locally similar to a sample using wave function collapse"
)]
/// Command-line arguments for the synthesis tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input PNG file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output width in pixels
    #[arg(short = 'W', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub width: usize,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub height: usize,

    /// Side length of the extracted patterns
    #[arg(short = 'N', long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Number of rotation/reflection variants per pattern (1-8)
    #[arg(short = 'S', long, default_value_t = DEFAULT_SYMMETRY)]
    pub symmetry: usize,

    /// Number of outputs to generate per sample
    #[arg(short, long, default_value_t = DEFAULT_VARIANT_COUNT)]
    pub count: usize,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Contradictions tolerated per output before giving up
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Make outputs tile seamlessly
    #[arg(long)]
    pub periodic_output: bool,

    /// Do not wrap patterns around the sample edges
    #[arg(long)]
    pub clamped_input: bool,

    /// Break entropy ties randomly instead of in row-major order
    #[arg(long)]
    pub random_ties: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Synthesis parameters described by the arguments
    pub const fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            output_height: self.height,
            output_width: self.width,
            pattern_size: self.pattern_size,
            symmetry: self.symmetry,
            variant_count: self.count,
            seed: self.seed,
            max_retries: self.max_retries,
            periodic_input: !self.clamped_input,
            periodic_output: self.periodic_output,
            tie_break: if self.random_ties {
                TieBreak::Random
            } else {
                TieBreak::RowMajor
            },
        }
    }
}

/// Orchestrates batch processing of PNG samples with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation fails, a sample cannot be
    /// loaded or configured, or every variant of a sample fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        let outcome = files.iter().try_for_each(|file| self.process_file(file));

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        outcome
    }

    /// Progress display, absent in quiet mode
    pub const fn progress(&self) -> Option<&ProgressManager> {
        self.progress_manager.as_ref()
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if is_png(&self.cli.target) {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else {
                Err(SynthesisError::InvalidSourceData {
                    reason: "Target file must be a PNG image".to_string(),
                })
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&self.cli.target)? {
                let path = entry?.path();
                if is_png(&path) && !is_generated(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(SynthesisError::InvalidSourceData {
                reason: "Target must be a PNG file or directory".to_string(),
            })
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::get_output_path(input_path, 0);
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    // Allow print for warnings about degenerate catalogs
    #[allow(clippy::print_stderr)]
    fn process_file(&mut self, input_path: &Path) -> Result<()> {
        let config = self.cli.synthesis_config();
        let sample = SampleImage::from_png_path(input_path)?;
        let model = SynthesisModel::build(&sample.labels, &config)?;

        let degenerate = model.adjacency.degenerate_pairs();
        if !degenerate.is_empty() && !self.cli.quiet {
            eprintln!(
                "Warning: {}: {} (pattern, direction) pairs over {} patterns have no compatible neighbour",
                input_path.display(),
                degenerate.len(),
                model.catalog.len()
            );
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(input_path, config.variant_count);
        }

        let progress = self.progress_manager.as_ref();
        let results: Vec<_> = (0..config.variant_count)
            .into_par_iter()
            .map(|variant| {
                let result = model.run_variant(&config, variant);
                if let Some(pm) = progress {
                    pm.variant_finished(result.is_ok());
                }
                result
            })
            .collect();

        let outcome = self.export_variants(input_path, &sample.palette, results);

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file();
        }

        outcome
    }

    // Allow print for failed variant reports
    #[allow(clippy::print_stderr)]
    fn export_variants(
        &self,
        input_path: &Path,
        palette: &[[u8; 4]],
        results: Vec<Result<Array2<usize>>>,
    ) -> Result<()> {
        let mut last_failure = None;
        let mut successes = 0;
        for (variant, result) in results.into_iter().enumerate() {
            match result {
                Ok(grid) => {
                    let output_path = Self::get_output_path(input_path, variant);
                    export_grid_as_png(&grid, palette, &output_path)?;
                    successes += 1;
                }
                Err(error) => {
                    if !self.cli.quiet {
                        eprintln!("{}: variant {variant}: {error}", input_path.display());
                    }
                    last_failure = Some(error);
                }
            }
        }

        match last_failure {
            Some(error) if successes == 0 => Err(error),
            _ => Ok(()),
        }
    }

    fn get_output_path(input_path: &Path, variant: usize) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let extension = input_path.extension().unwrap_or_default();
        let output_name = format!(
            "{}{}_{variant}.{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX,
            extension.to_string_lossy()
        );

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}

fn is_png(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("png")
}

// Earlier results named `<stem>_result_<variant>` are not samples themselves
fn is_generated(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.rsplit_once('_'))
        .is_some_and(|(head, variant)| {
            head.ends_with(OUTPUT_SUFFIX)
                && !variant.is_empty()
                && variant.bytes().all(|b| b.is_ascii_digit())
        })
}
