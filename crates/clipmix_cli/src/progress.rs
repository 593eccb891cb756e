//! Terminal progress bar for ffmpeg runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use clipmix_core::runner::ProgressSink;

const TEMPLATE: &str =
    "{msg:24} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% ETA {eta_precise}";

/// Progress bar measured in milliseconds of media processed.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    /// Visible bar, or a hidden one when `enabled` is false.
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    /// Handle for printing above the bar.
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }
}

impl ProgressSink for BarSink {
    fn start(&self, label: &str, total_secs: f64) {
        self.bar.reset();
        self.bar.set_length(to_millis(total_secs));
        self.bar.set_position(0);
        self.bar.set_message(label.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(200));
    }

    fn advance_to(&self, secs: f64) {
        self.bar.set_position(to_millis(secs));
    }

    fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

fn to_millis(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0) as u64
}
