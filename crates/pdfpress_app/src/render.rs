use std::path::Path;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pdfpress_core::{Panel, ResultOutcome, SessionView};

/// Terminal output for one session: an indicatif bar per file plus an
/// aggregate line for batches while work is in flight, plain result lines
/// once it settles.
pub struct ProgressRenderer {
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
    batch_bar: Option<ProgressBar>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Vec::new(),
            batch_bar: None,
        }
    }

    /// Brings the terminal in line with a fresh view.
    pub fn render(&mut self, view: &SessionView) {
        if view.panel != Panel::Progress {
            return;
        }
        self.ensure_bars(view);
        for (bar, row) in self.bars.iter().zip(&view.files) {
            bar.set_position(u64::from(row.percent));
            bar.set_message(row.status_label);
        }
        if let (Some(bar), Some(line)) = (&self.batch_bar, &view.batch_line) {
            bar.set_message(line.clone());
        }
    }

    /// Removes any live bars, leaving the terminal ready for plain output.
    pub fn clear(&mut self) {
        for bar in self.bars.drain(..) {
            bar.finish_and_clear();
        }
        if let Some(bar) = self.batch_bar.take() {
            bar.finish_and_clear();
        }
        let _ = self.multi.clear();
    }

    /// Prints the per-file outcome lines of a finished session.
    pub fn print_results(&mut self, view: &SessionView) {
        self.clear();
        for row in &view.results {
            match &row.outcome {
                ResultOutcome::Success {
                    size_line,
                    ratio_line,
                    ..
                } => {
                    println!("✓ {}", row.filename);
                    println!("    {size_line}");
                    println!("    {ratio_line}");
                }
                ResultOutcome::Failure { message } => {
                    println!("✗ {}: {message}", row.filename);
                }
            }
        }
        if let Some(counts) = view.summary {
            println!(
                "{} of {} files compressed, {} failed",
                counts.completed, counts.total_files, counts.failed
            );
        }
    }

    pub fn note_saved(&self, path: &Path) {
        println!("Saved {}", path.display());
    }

    pub fn note_save_failed(&self, filename: &str, message: &str) {
        println!("✗ download of {filename} failed: {message}");
    }

    pub fn note_download_dir(&self, saved: usize, dir: &Path) {
        println!("{saved} file(s) saved to {}", dir.display());
    }

    fn ensure_bars(&mut self, view: &SessionView) {
        if self.bars.is_empty() && !view.files.is_empty() {
            let style =
                ProgressStyle::with_template("{prefix:>24.bold} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
                    .expect("progress template")
                    .progress_chars("=>-");
            for row in &view.files {
                let bar = self.multi.add(ProgressBar::new(100));
                bar.set_style(style.clone());
                bar.set_prefix(row.filename.clone());
                self.bars.push(bar);
            }
        }
        if self.batch_bar.is_none() {
            if let Some(line) = &view.batch_line {
                let bar = self.multi.insert(0, ProgressBar::new(0));
                bar.set_style(ProgressStyle::with_template("{msg}").expect("progress template"));
                bar.set_message(line.clone());
                self.batch_bar = Some(bar);
            }
        }
    }
}
