//! Spinner feedback for catalog extraction.
//!
//! Extraction has no byte count to track, so progress is a spinner whose
//! message follows the extractor's stages.

use crate::extractor::ExtractStage;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A stderr spinner driven by extraction stage callbacks
pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    /// Start a spinner labelled with the catalog target
    pub fn start(target: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
                .unwrap()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        bar.set_prefix(target.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Callback to hand to `SchemaExtractor::with_observer`
    pub fn observer(&self) -> impl Fn(ExtractStage) + '_ {
        move |stage| self.bar.set_message(stage.to_string())
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
