//! Tools module - browser operations available to the agent
//!
//! Contains the registry that dispatches parsed actions against the page.

pub mod registry;

pub use registry::ToolRegistry;
