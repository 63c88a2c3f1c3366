//! Browser module
//!
//! The page contract the agent depends on, the grounding annotator, and the
//! chromiumoxide-backed live implementation.

pub mod annotator;
pub mod chromium;
pub mod page;

pub use annotator::{format_descriptions, Annotator, Grounding};
pub use chromium::{ChromiumBrowser, ChromiumPage};
pub use page::Page;
