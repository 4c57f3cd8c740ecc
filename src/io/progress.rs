//! Progress display for batches of samples and their output variants

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static VARIANT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates progress display for batch operations
///
/// Shows one bar per sample counting finished variants, plus a batch bar
/// once more than a handful of samples are queued. Variant updates take
/// `&self` so parallel solvers can report directly.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bar: Option<ProgressBar>,
    failed_variants: AtomicUsize,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bar: None,
            failed_variants: AtomicUsize::new(0),
        }
    }

    /// Prepare the batch bar for the given number of samples
    pub fn initialize(&mut self, file_count: usize) {
        // Switch to batch mode for large file sets to avoid terminal spam
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }
    }

    /// Start a bar for a sample that will produce `variants` outputs
    pub fn start_file(&mut self, path: &Path, variants: usize) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let bar = ProgressBar::new(variants as u64);
        bar.set_style(VARIANT_STYLE.clone());
        bar.set_prefix(display_name);
        self.failed_variants.store(0, Ordering::Relaxed);
        self.file_bar = Some(self.multi_progress.add(bar));
    }

    /// Report one finished variant of the current sample
    pub fn variant_finished(&self, succeeded: bool) {
        let failed = if succeeded {
            self.failed_variants.load(Ordering::Relaxed)
        } else {
            self.failed_variants.fetch_add(1, Ordering::Relaxed) + 1
        };

        if let Some(ref bar) = self.file_bar {
            bar.inc(1);
            if failed > 0 {
                bar.set_message(format!("({failed} failed)"));
            }
        }
    }

    /// Mark the current sample as completed
    pub fn complete_file(&mut self) {
        if let Some(bar) = self.file_bar.take() {
            bar.finish();
        }
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
    }

    /// Whether a sample's bar is still open
    pub const fn has_active_file(&self) -> bool {
        self.file_bar.is_some()
    }

    /// Number of failed variants reported for the current sample
    pub fn failed_variants(&self) -> usize {
        self.failed_variants.load(Ordering::Relaxed)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }
}
