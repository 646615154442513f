//! # Reagent Core
//!
//! Domain types, traits, and error definitions for the reagent reasoning
//! runtime. Beyond tokio's timer primitives it carries no framework
//! dependencies — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{DispatchError, Error, ProviderError, Result, ToolError};
pub use message::{Message, Role, RunId, Transcript};
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse, Usage};
pub use retry::RetryPolicy;
pub use schema::{ParamKind, ParamSchema, sanitize, validate_params};
pub use tool::{DispatchOutcome, Tool, ToolRegistry, ToolSpec};
