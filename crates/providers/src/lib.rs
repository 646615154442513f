//! Completion provider implementations for reagent.
//!
//! One implementation covers nearly every hosted LLM: the OpenAI-compatible
//! `/chat/completions` wire format.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
