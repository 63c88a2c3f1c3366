//! Page grounding
//!
//! Marks interactive elements on the current page, collects their
//! bounding-box descriptors, captures a screenshot, and removes the markup
//! again. Marking can race with page load and rendering, so it is retried a
//! bounded number of times; when every attempt fails the turn proceeds with
//! an empty element list rather than failing the task.

use std::time::Duration;

use tracing::{debug, warn};

use crate::browser::page::Page;
use crate::core::config::GroundingConfig;
use crate::core::{BoundingBox, Result};

/// Element marking script, evaluated on the page before every grounding pass.
pub const MARK_PAGE_JS: &str = include_str!("mark_page.js");

/// Header line for the formatted element list.
const DESCRIPTION_HEADER: &str = "Valid Bounding Boxes:";

/// The output of one perception cycle. Replaces the previous cycle's data
/// wholesale; indices are only meaningful within the cycle that produced
/// them.
#[derive(Debug, Clone)]
pub struct Grounding {
    /// Interactive elements, in marking order
    pub bboxes: Vec<BoundingBox>,
    /// PNG screenshot of the annotated page
    pub screenshot: Vec<u8>,
}

/// Runs the marking script against a page with bounded retries.
#[derive(Debug, Clone)]
pub struct Annotator {
    max_attempts: u32,
    retry_delay: Duration,
}

impl Annotator {
    /// Create an annotator from grounding configuration
    pub fn from_config(config: &GroundingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Mark the page, collect bounding boxes and a screenshot, then unmark.
    ///
    /// The page is left unmarked on every path, including degraded grounding
    /// and screenshot failure.
    pub async fn annotate(&self, page: &dyn Page) -> Result<Grounding> {
        let mut bboxes = Vec::new();
        let mut marked = false;

        for attempt in 1..=self.max_attempts {
            match self.try_mark(page).await {
                Ok(found) => {
                    bboxes = found;
                    marked = true;
                    break;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "page marking attempt failed");
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        if !marked {
            warn!(
                attempts = self.max_attempts,
                "page marking failed; continuing turn without element data"
            );
        }

        // Capture the screenshot even when grounding is degraded, and unmark
        // before deciding whether the screenshot succeeded.
        let screenshot = page.screenshot().await;
        if let Err(e) = page.evaluate("unmarkPage()").await {
            debug!(error = %e, "failed to remove page markup");
        }

        Ok(Grounding {
            bboxes,
            screenshot: screenshot?,
        })
    }

    async fn try_mark(&self, page: &dyn Page) -> Result<Vec<BoundingBox>> {
        // Re-inject every attempt: navigation between turns wipes the
        // script's globals.
        page.evaluate(MARK_PAGE_JS).await?;
        let value = page.evaluate("markPage()").await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Render the bounding-box list as the numbered element descriptions shown
/// to the model. Pure; missing fields fall back to empty text and an
/// `unknown` type.
pub fn format_descriptions(bboxes: &[BoundingBox]) -> String {
    let labels: Vec<String> = bboxes
        .iter()
        .enumerate()
        .map(|(i, bbox)| format!("{} (<{}/>): \"{}\"", i, bbox.type_name(), bbox.label()))
        .collect();
    format!("{}\n{}", DESCRIPTION_HEADER, labels.join("\n"))
}
