//! Import spinners for the CLI; compiled to no-ops without the `progress` feature

use std::time::Duration;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progress"))]
use self::noop::ProgressBar;

/// A spinner shown while a long import or index build runs
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Start a spinner with a message; `quiet` suppresses all output
    pub fn start(message: &str, quiet: bool) -> Self {
        if quiet {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        #[cfg(feature = "progress")]
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    /// Replace the spinner message
    pub fn update(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Stop the spinner, leaving a final message on screen
    pub fn finish(self, message: &str) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(message.to_string());
        }
    }
}

#[cfg(not(feature = "progress"))]
mod noop {
    use std::time::Duration;

    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new_spinner() -> Self {
            ProgressBar
        }

        pub fn set_message(&self, _msg: String) {}
        pub fn enable_steady_tick(&self, _interval: Duration) {}
        pub fn finish_with_message(&self, _msg: String) {}
    }
}
