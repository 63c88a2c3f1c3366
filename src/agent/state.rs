//! Agent loop state
//!
//! The single piece of state threaded through every turn. Grounding data is
//! replaced wholesale each perception cycle so stale element indices can
//! never leak across turns; the task and the scratchpad are the only fields
//! that persist and accumulate.

use std::sync::Arc;

use crate::agent::parser::Prediction;
use crate::agent::scratchpad::Scratchpad;
use crate::browser::annotator::Grounding;
use crate::browser::{format_descriptions, Page};
use crate::core::BoundingBox;

/// State for one task run.
pub struct AgentState {
    /// The user's goal, set once
    pub task: String,
    /// Handle to the browser session, exclusively owned for this run
    pub page: Arc<dyn Page>,
    /// Element descriptors from the current perception cycle
    pub bboxes: Vec<BoundingBox>,
    /// Numbered element descriptions derived from `bboxes`
    pub description: String,
    /// The parsed action of the current turn
    pub prediction: Option<Prediction>,
    /// Result of the most recently dispatched action
    pub observation: Option<String>,
    /// Append-only history of observations
    pub scratchpad: Scratchpad,
    /// Screenshot for the current turn, used for observability only
    pub screenshot: Vec<u8>,
}

impl AgentState {
    /// Create the initial state for a task.
    pub fn new(task: impl Into<String>, page: Arc<dyn Page>) -> Self {
        Self {
            task: task.into(),
            page,
            bboxes: Vec::new(),
            description: String::new(),
            prediction: None,
            observation: None,
            scratchpad: Scratchpad::new(),
            screenshot: Vec::new(),
        }
    }

    /// Replace the perception data with a fresh grounding. The previous
    /// cycle's boxes are discarded, never merged.
    pub fn apply_grounding(&mut self, grounding: Grounding) {
        self.description = format_descriptions(&grounding.bboxes);
        self.bboxes = grounding.bboxes;
        self.screenshot = grounding.screenshot;
    }
}
