//! Prompt builder — pure functions producing the instruction preamble.
//!
//! The preamble states the problem, enumerates the tool catalog, and spells
//! out the output grammar the parser expects. No state, no side effects:
//! same inputs, same text.

use reagent_core::tool::ToolSpec;

/// Appended as a user message when the iteration budget runs out.
pub const FORCED_FINAL_INSTRUCTION: &str = "You have used all available reasoning steps. \
Do not request any more actions. Respond now with your best conclusion in the form: \
Final Answer: <your answer>";

/// Build the fixed instruction preamble for a run.
pub fn preamble(question: &str, catalog: &[ToolSpec]) -> String {
    let mut out = String::new();

    out.push_str("Answer the following question as well as you can.\n\n");
    out.push_str(&format!("Question: {question}\n\n"));

    if catalog.is_empty() {
        out.push_str("You have no tools available.\n\n");
    } else {
        out.push_str("You have access to the following tools:\n");
        for spec in catalog {
            out.push_str(&format!("- {}: {}\n", spec.name, spec.description));
        }
        out.push('\n');
    }

    out.push_str(
        "Use exactly this format:\n\n\
         Thought: your reasoning about what to do next\n\
         Action: the tool to use, one of the tools listed above\n\
         Action Input: the input to the tool\n\
         Observation: the result of the action (provided to you)\n\n\
         Repeat Thought/Action/Action Input/Observation as needed. \
         When you know the answer, respond with:\n\n\
         Final Answer: the answer to the original question\n",
    );

    out
}
