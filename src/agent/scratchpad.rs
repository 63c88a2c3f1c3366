//! Scratchpad memory
//!
//! The append-only, step-numbered log of past observations. This is the sole
//! carrier of history across turns: every decision prompt replays the whole
//! block, and nothing else is remembered.

use once_cell::sync::Lazy;
use regex::Regex;

/// Header line written before the first observation.
pub const SCRATCHPAD_HEADER: &str = "Previous action observations:";

static STEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.").unwrap());

/// Step-numbered observation log. Entries are only ever appended; numbers
/// are strictly increasing from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratchpad {
    content: String,
}

impl Scratchpad {
    /// Create an empty scratchpad
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation under the next step number.
    pub fn record(&mut self, observation: &str) {
        let step = if self.content.is_empty() {
            self.content.push_str(SCRATCHPAD_HEADER);
            1
        } else {
            // Fallback counts lines, but every appended line carries its
            // number so the regex match is the normal path.
            self.last_step()
                .map(|n| n + 1)
                .unwrap_or_else(|| self.content.lines().count() as u64)
        };

        self.content.push_str(&format!("\n{}. {}", step, observation));
    }

    /// The step number of the most recent entry, if any.
    pub fn last_step(&self) -> Option<u64> {
        let last_line = self.content.lines().last()?;
        STEP_RE
            .captures(last_line)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }

    /// The full scratchpad text, empty before the first observation.
    pub fn as_text(&self) -> &str {
        &self.content
    }

    /// Whether any observation has been recorded
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
