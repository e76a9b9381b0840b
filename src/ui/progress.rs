use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Progress display for source processing, drawn on stderr.
pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    source_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::with_draw_target(
                ProgressDrawTarget::stderr(),
            )),
            source_progress: None,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start tracking sources. `total` is unknown for directory walks, in
    /// which case a spinner is shown instead of a bar.
    pub fn start_sources(&mut self, total: Option<usize>, unit: &str) {
        if !self.enabled {
            return;
        }

        let pb = match total {
            Some(total) => {
                let pb = self.multi_progress.add(ProgressBar::new(total as u64));
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(&format!(
                            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{msg}})"
                        ))
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = self.multi_progress.add(ProgressBar::new_spinner());
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template(&format!("{{spinner:.green}} {{pos}} {unit} ({{msg}})"))
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };
        pb.enable_steady_tick(Duration::from_millis(120));
        self.source_progress = Some(pb);
    }

    /// Mark one source as done.
    pub fn advance(&self, label: &str) {
        if let Some(ref pb) = self.source_progress {
            pb.inc(1);
            pb.set_message(label.to_string());
        }
    }

    pub fn finish_sources(&self, processed: usize, skipped: usize) {
        if let Some(ref pb) = self.source_progress {
            let message = if skipped == 0 {
                format!("✓ {processed} processed")
            } else {
                format!("✓ {processed} processed, {skipped} skipped")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }

    /// Create a simple spinner for indeterminate progress
    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}
