//! webpilot - a vision-grounded web browsing agent
//!
//! Lets a multimodal chat model operate a web browser to complete a
//! natural-language task. Each turn, interactive elements on the current
//! page are marked with numbered bounding boxes and the model receives the
//! annotated screenshot, the element list, and the history of its past
//! observations; it replies with one symbolic action which is executed
//! against the page.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model provider abstraction with an Ollama implementation
//! - **Browser**: Page contract, grounding annotator, chromiumoxide backend
//! - **Tools**: The browser operations the model can invoke
//! - **Agent**: The bounded decide-act-remember loop
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webpilot::{Agent, ChromiumBrowser, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load();
//!     let browser = ChromiumBrowser::launch(&config.browser).await?;
//!     let page = Arc::new(browser.new_page("https://www.google.com").await?);
//!
//!     let agent = Agent::new(config);
//!     agent.initialize().await?;
//!
//!     let answer = agent.run("What is the capital of France?", page).await?;
//!     println!("{}", answer.unwrap_or_default());
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod browser;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, ConsoleObserver, Prediction, StepObserver, ToolKind};
pub use browser::{ChromiumBrowser, Page};
pub use core::{Config, Result, WebpilotError};
