//! Single-line spinner for long-running work.
//!
//! Log lines written while the spinner is visible must go through
//! [`Spinner::suspend`] so they do not get drawn over.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub(crate) struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create a ticking spinner. When `quiet` is true it is never drawn.
    pub(crate) fn new(quiet: bool, msg: impl Into<String>) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };

        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|");
        pb.set_style(style);
        pb.set_message(msg.into());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    pub(crate) fn set_message(&self, msg: impl Into<String>) {
        self.pb.set_message(msg.into());
    }

    /// Hide the spinner while `f` prints.
    pub(crate) fn suspend<F: FnOnce()>(&self, f: F) {
        self.pb.suspend(f);
    }

    /// Stop ticking and clear the line.
    pub(crate) fn finish(&self) {
        self.pb.disable_steady_tick();
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}
