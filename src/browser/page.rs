//! Browser page contract
//!
//! The control loop and tools depend only on this trait. The chromiumoxide
//! backend implements it for live Chromium sessions; tests implement it with
//! scripted doubles. One page handle is exclusively owned by one task for the
//! duration of a run.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::Result;

/// A live browser page the agent can perceive and act on.
#[async_trait]
pub trait Page: Send + Sync {
    /// Evaluate a JavaScript snippet and return its value.
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// Capture a screenshot of the visible viewport as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Click at the given viewport coordinates.
    async fn click_at(&self, x: f64, y: f64) -> Result<()>;

    /// Focus the element at the given coordinates, clear its current value,
    /// type `text`, and submit with Enter.
    async fn type_at(&self, x: f64, y: f64, text: &str) -> Result<()>;

    /// Scroll the whole window vertically by `delta_y` pixels (positive is
    /// down).
    async fn scroll_window(&self, delta_y: i64) -> Result<()>;

    /// Scroll the scrollable element under the given coordinates by
    /// `delta_y` pixels.
    async fn scroll_at(&self, x: f64, y: f64, delta_y: i64) -> Result<()>;

    /// Navigate one step back in the page history.
    async fn go_back(&self) -> Result<()>;

    /// Navigate to the given URL.
    async fn goto(&self, url: &str) -> Result<()>;

    /// The URL currently loaded in the page.
    async fn current_url(&self) -> Result<String>;
}
