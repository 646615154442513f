//! The reasoning loop for reagent — the Think→Act→Observe cycle.
//!
//! One run works like this:
//!
//! 1. **Think** — prompt the model with the fixed preamble and the bounded
//!    cycle history
//! 2. **Parse** — interpret the completion as a final answer, a tool action,
//!    or a direct answer
//! 3. **Act** — dispatch the action through the registry (validated,
//!    sanitized, timed)
//! 4. **Observe** — fold the outcome back into the history and loop
//!
//! The loop terminates on a declared `Final Answer:`, a marker-free direct
//! answer, the iteration budget (after one forced last-chance completion),
//! cancellation, or provider retry exhaustion.

pub mod history;
pub mod parser;
pub mod prompt;
pub mod react;

#[cfg(test)]
mod test_helpers;

pub use history::{
    ActionRecord, ActionStatus, CycleHistory, CycleRecord, HistorySummary, Observation, Thought,
};
pub use parser::{ParseError, ParsedResponse, parse};
pub use react::{LoopState, ReasoningLoop, RunResult};
