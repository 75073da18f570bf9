//! Diagnostics context passed explicitly through the conversion pipeline

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Verbosity and progress reporting for one conversion run
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    verbosity: u8,
    progress: bool,
}

impl Diagnostics {
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            progress: verbosity > 0 && std::io::stderr().is_terminal(),
        }
    }

    /// No progress bars, warnings only
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity > 0
    }

    pub fn show_progress(&self) -> bool {
        self.progress
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Install the global tracing subscriber. Log output goes to stderr so a
    /// report written to stdout stays clean.
    pub fn init_tracing(&self) {
        let fallback = std::env::var("HSSP_LOG").unwrap_or_else(|_| self.log_level().to_string());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback)),
            )
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Progress bar for `total` items, hidden when progress is disabled
    pub fn progress_bar(&self, total: u64, message: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━━─"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
