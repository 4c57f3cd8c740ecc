//! CLI entry point for wave function collapse synthesis

use clap::Parser;
use wavesynth::io::cli::{Cli, FileProcessor};

fn main() -> wavesynth::Result<()> {
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
