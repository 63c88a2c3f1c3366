//! Step observability
//!
//! Each decide turn is reported to an injected sink: the step number, the
//! parsed action, and the turn's screenshot. A sink must never influence
//! control flow, so every implementation swallows its own failures.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::agent::parser::Prediction;

/// Sink for per-turn progress.
pub trait StepObserver: Send + Sync {
    /// Called once per decide turn, after parsing and before dispatch.
    fn on_decide(&self, step: usize, prediction: &Prediction, screenshot: &[u8]);
}

/// Observer that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_decide(&self, _step: usize, _prediction: &Prediction, _screenshot: &[u8]) {}
}

/// Observer that prints one line per turn and optionally writes the turn's
/// screenshot to a directory. Screenshot failures degrade to the plain-text
/// line alone.
#[derive(Debug, Clone, Default)]
pub struct ConsoleObserver {
    screenshot_dir: Option<PathBuf>,
}

impl ConsoleObserver {
    /// Create a console observer without screenshot capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write each turn's screenshot under `dir`.
    pub fn with_screenshot_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: Some(dir.into()),
        }
    }
}

impl StepObserver for ConsoleObserver {
    fn on_decide(&self, step: usize, prediction: &Prediction, screenshot: &[u8]) {
        match prediction {
            Prediction::Tool { tool, args } => println!("{}. {}: {:?}", step, tool, args),
            Prediction::Answer { args } => println!("{}. ANSWER: {:?}", step, args),
            Prediction::Retry { .. } => println!("{}. (unparseable output, retrying)", step),
        }

        if let Some(ref dir) = self.screenshot_dir {
            if screenshot.is_empty() {
                return;
            }
            let path = dir.join(format!("step_{:03}.png", step));
            let write = fs::create_dir_all(dir).and_then(|_| fs::write(&path, screenshot));
            if let Err(e) = write {
                debug!(error = %e, path = %path.display(), "could not write step screenshot");
            }
        }
    }
}
