//! Built-in tool implementations for reagent.
//!
//! Tools give the reasoning loop the ability to act on the world between
//! thoughts. Each tool declares a parameter schema; the registry validates
//! and sanitizes every call before it reaches the tool.

pub mod web_search;

pub use web_search::SearchTool;

use reagent_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Create a registry with all built-in tools and the given invocation timeout.
pub fn default_registry(invoke_timeout: Duration) -> ToolRegistry {
    let mut registry = ToolRegistry::with_timeout(invoke_timeout);
    registry.register(Arc::new(SearchTool));
    registry
}
