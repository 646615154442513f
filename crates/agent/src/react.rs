//! The reasoning loop — Think → Act → Observe state machine.
//!
//! Each cycle the loop prompts the model (THINK), interprets the completion
//! into an action or a terminal answer, dispatches the action (ACT), and
//! folds the result back as an observation (OBSERVE). The loop stops on a
//! declared final answer, a direct answer, the iteration budget, or a
//! provider failure surviving retries.
//!
//! Failure containment is the central design rule: tool problems of any
//! shape become observations for the model to correct next cycle. Only
//! provider retry exhaustion aborts a run.

use reagent_config::AgentConfig;
use reagent_core::error::{DispatchError, ProviderError};
use reagent_core::message::{Message, Transcript};
use reagent_core::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
use reagent_core::retry::RetryPolicy;
use reagent_core::tool::{DispatchOutcome, ToolRegistry};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::history::{
    ActionRecord, ActionStatus, CycleHistory, CycleRecord, DEFAULT_WINDOW, Observation, Thought,
};
use crate::parser::{self, ParseError, ParsedResponse};
use crate::prompt;

/// The loop's states. `Think`, `Act`, and `Observe` cycle; `Done` and
/// `Aborted` are terminal and appear in [`RunResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Think,
    Act,
    Observe,
    Done,
    Aborted,
}

/// The outcome of one run.
#[derive(Debug)]
pub struct RunResult {
    /// The final answer text (empty on the aborted path).
    pub answer: String,
    /// The retained cycle history.
    pub history: CycleHistory,
    /// Terminal state: `Done` or `Aborted`.
    pub state: LoopState,
    /// Completed cycles.
    pub iterations: usize,
    /// The provider failure that aborted the run, if any.
    pub error: Option<ProviderError>,
    /// The full append-only message record of the run.
    pub transcript: Transcript,
}

/// The Think→Act→Observe reasoning loop.
///
/// One instance can serve many concurrent runs: `run` takes `&self` and all
/// per-run state (history, transcript) is local to the call. The shared
/// registry is read-only after setup.
pub struct ReasoningLoop {
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
    window: usize,
    retry: RetryPolicy,
    cancel: Arc<AtomicBool>,
}

impl ReasoningLoop {
    /// Create a loop with default settings.
    pub fn new(provider: Arc<dyn CompletionProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tools,
            model: "gpt-4".into(),
            temperature: 0.5,
            max_tokens: Some(1800),
            max_iterations: 10,
            window: DEFAULT_WINDOW,
            retry: RetryPolicy::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a loop from a validated [`AgentConfig`].
    pub fn from_config(
        config: &AgentConfig,
        provider: Arc<dyn CompletionProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            max_iterations: config.reasoning.max_iterations,
            window: config.reasoning.memory_window,
            retry: config.retry.policy(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the history window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the retry policy for provider calls and tool dispatch.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// A handle for cooperative cancellation.
    ///
    /// Setting the flag stops the run at the start of the next THINK phase;
    /// the result terminates as `Aborted` with no error.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Execute the loop for one question.
    ///
    /// Infallible at the signature level: every failure mode is folded into
    /// the returned [`RunResult`].
    pub async fn run(&self, question: &str) -> RunResult {
        let preamble = prompt::preamble(question, &self.tools.catalog());
        let mut history = CycleHistory::new(self.window);
        let mut transcript = Transcript::new();
        transcript.push(Message::system(&preamble));
        transcript.push(Message::user(question));

        info!(
            run_id = %transcript.run_id,
            model = %self.model,
            max_iterations = self.max_iterations,
            "reasoning loop starting"
        );

        for cycle in 1..=self.max_iterations as usize {
            if self.cancel.load(Ordering::SeqCst) {
                info!(cycle, "run cancelled");
                return RunResult {
                    answer: String::new(),
                    history,
                    state: LoopState::Aborted,
                    iterations: cycle - 1,
                    error: None,
                    transcript,
                };
            }

            debug!(cycle, "think phase");
            let messages = self.think_messages(&preamble, &history);
            let response = match self.complete_with_retry(messages).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "completion retries exhausted, aborting run");
                    return RunResult {
                        answer: String::new(),
                        history,
                        state: LoopState::Aborted,
                        iterations: cycle - 1,
                        error: Some(e),
                        transcript,
                    };
                }
            };

            let content = response.content;
            transcript.push(Message::assistant(&content));

            // An empty completion consumes the cycle with a placeholder
            // thought instead of aborting.
            if content.trim().is_empty() {
                let mut action = ActionRecord::tool("none", Map::new(), cycle);
                action.status = ActionStatus::Failed;
                let observation = Observation::new("Empty completion, no action taken", false);
                transcript.push(Message::observation(&observation.content));
                history.push(CycleRecord {
                    thought: Thought::placeholder(),
                    action,
                    observation,
                });
                continue;
            }

            let thought = Thought::new(content.trim());

            match parser::parse(&content) {
                Ok(ParsedResponse::FinalAnswer(answer)) => {
                    info!(cycle, "final answer declared");
                    history.push(CycleRecord {
                        thought,
                        action: ActionRecord::final_answer(cycle),
                        observation: Observation::new(&answer, true),
                    });
                    return RunResult {
                        answer,
                        history,
                        state: LoopState::Done,
                        iterations: cycle,
                        error: None,
                        transcript,
                    };
                }
                Ok(ParsedResponse::Direct(answer)) => {
                    info!(cycle, "no markers, accepting text as direct answer");
                    history.push(CycleRecord {
                        thought,
                        action: ActionRecord::final_answer(cycle),
                        observation: Observation::new(&answer, true),
                    });
                    return RunResult {
                        answer,
                        history,
                        state: LoopState::Done,
                        iterations: cycle,
                        error: None,
                        transcript,
                    };
                }
                Ok(ParsedResponse::Action { tool, input }) => {
                    let mut params = Map::new();
                    params.insert("input".to_string(), Value::String(input));
                    let mut action = ActionRecord::tool(&tool, params.clone(), cycle);

                    debug!(cycle, tool = %tool, "act phase");
                    let observation = match self.dispatch_with_retry(&tool, params).await {
                        Ok(DispatchOutcome::Success { result }) => {
                            action.status = ActionStatus::Completed;
                            Observation::new(result.to_string(), true)
                        }
                        Ok(DispatchOutcome::Error { error }) => {
                            action.status = ActionStatus::Failed;
                            Observation::new(error, false)
                        }
                        // Unknown tool or bad parameters: contained the same
                        // way, so the model can self-correct next cycle.
                        Err(e) => {
                            action.status = ActionStatus::Failed;
                            Observation::new(e.to_string(), false)
                        }
                    };

                    debug!(cycle, success = observation.success, "observe phase");
                    transcript.push(Message::observation(&observation.content));
                    history.push(CycleRecord {
                        thought,
                        action,
                        observation,
                    });
                }
                Err(ParseError::MissingActionInput { tool }) => {
                    warn!(cycle, tool = %tool, "malformed action, missing input");
                    let mut action = ActionRecord::tool(&tool, Map::new(), cycle);
                    action.status = ActionStatus::Failed;
                    let observation = Observation::new(
                        format!("Action '{tool}' is missing its Action Input line"),
                        false,
                    );
                    transcript.push(Message::observation(&observation.content));
                    history.push(CycleRecord {
                        thought,
                        action,
                        observation,
                    });
                }
            }
        }

        // Budget exhausted: one forced last-chance completion, then DONE.
        warn!(
            max_iterations = self.max_iterations,
            "iteration budget exhausted, forcing termination"
        );
        let mut messages = self.think_messages(&preamble, &history);
        messages.push(Message::user(prompt::FORCED_FINAL_INSTRUCTION));
        transcript.push(Message::user(prompt::FORCED_FINAL_INSTRUCTION));

        match self.complete_with_retry(messages).await {
            Ok(response) => {
                transcript.push(Message::assistant(&response.content));
                let answer = parser::extract_final_answer(&response.content)
                    .unwrap_or_else(|| response.content.trim().to_string());
                RunResult {
                    answer,
                    history,
                    state: LoopState::Done,
                    iterations: self.max_iterations as usize,
                    error: None,
                    transcript,
                }
            }
            Err(e) => {
                warn!(error = %e, "forced termination call failed, aborting run");
                RunResult {
                    answer: String::new(),
                    history,
                    state: LoopState::Aborted,
                    iterations: self.max_iterations as usize,
                    error: Some(e),
                    transcript,
                }
            }
        }
    }

    /// The THINK prompt: fixed preamble plus the rendered bounded history.
    ///
    /// Prompt size is O(window) regardless of run length.
    fn think_messages(&self, preamble: &str, history: &CycleHistory) -> Vec<Message> {
        let mut messages = vec![Message::system(preamble)];
        if !history.is_empty() {
            messages.push(Message::user(format!(
                "Your reasoning so far:\n\n{}",
                history.render()
            )));
        }
        messages
    }

    async fn complete_with_retry(
        &self,
        messages: Vec<Message>,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: vec![],
        };
        let provider = Arc::clone(&self.provider);
        self.retry
            .run("completion", move || {
                let provider = Arc::clone(&provider);
                let request = request.clone();
                async move { provider.complete(request).await }
            })
            .await
    }

    async fn dispatch_with_retry(
        &self,
        tool: &str,
        params: Map<String, Value>,
    ) -> std::result::Result<DispatchOutcome, DispatchError> {
        let tools = Arc::clone(&self.tools);
        let tool = tool.to_string();
        self.retry
            .run("tool_dispatch", move || {
                let tools = Arc::clone(&tools);
                let tool = tool.clone();
                let params = params.clone();
                async move { tools.dispatch(&tool, params).await }
            })
            .await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
