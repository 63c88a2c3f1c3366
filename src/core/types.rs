//! Shared types used across webpilot modules
//!
//! Contains chat message structures and the bounding-box descriptors produced
//! by page grounding.

use serde::{Deserialize, Serialize};

/// A message in a model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Optional base64-encoded images attached to the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: None,
        }
    }

    /// Create a new user message carrying a screenshot
    pub fn user_with_image(content: impl Into<String>, image_b64: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: Some(vec![image_b64.into()]),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            images: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            images: None,
        }
    }
}

/// Descriptor of one interactive element on the current page, as returned by
/// the marking script. Valid only for the perception cycle that produced it;
/// the element's index is its position in the grounding list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Horizontal center of the element in viewport coordinates
    pub x: f64,
    /// Vertical center of the element in viewport coordinates
    pub y: f64,
    /// Element tag name, when the script could determine one
    #[serde(rename = "type", default)]
    pub element_type: Option<String>,
    /// Visible text of the element
    #[serde(default)]
    pub text: Option<String>,
    /// Accessible label, preferred over visible text when present
    #[serde(rename = "ariaLabel", default)]
    pub aria_label: Option<String>,
}

impl BoundingBox {
    /// The label to present for this element: aria-label, falling back to
    /// visible text, falling back to empty.
    pub fn label(&self) -> &str {
        self.aria_label
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.text.as_deref())
            .unwrap_or("")
    }

    /// The element type, or `"unknown"` when the script reported none.
    pub fn type_name(&self) -> &str {
        self.element_type.as_deref().unwrap_or("unknown")
    }
}
