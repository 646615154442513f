//! Tool trait, registry, and dispatch pipeline.
//!
//! Tools are the actions a reasoning loop can take. The registry owns every
//! registered tool and runs the full dispatch pipeline on each call:
//! lookup → schema validation → sanitization → timed invocation.
//!
//! Failures split into two layers. [`DispatchError`] means the tool was never
//! invoked (unknown name, bad parameters). A failure *inside* the tool is
//! contained as [`DispatchOutcome::Error`] so the loop can feed it back to
//! the model as an observation instead of tearing down the run.

use crate::error::{DispatchError, ToolError};
use crate::schema::{ParamSchema, sanitize_map, validate_params};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The outcome of a completed dispatch, tagged by status.
///
/// Serializes as `{"status": "success", "result": ...}` or
/// `{"status": "error", "error": "..."}` so observations have a single,
/// self-describing shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Success { result: Value },
    Error { error: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }
}

/// Descriptive metadata for one registered tool.
///
/// This is what the prompt builder renders into the catalog the model sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: ParamSchema,
}

/// A tool that the reasoning loop can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, used in `Action:` lines.
    fn name(&self) -> &str;

    /// Human-readable description for the tool catalog.
    fn description(&self) -> &str;

    /// The parameter schema this tool requires.
    fn schema(&self) -> ParamSchema;

    /// Execute the tool with validated, sanitized parameters.
    async fn invoke(
        &self,
        params: Map<String, Value>,
    ) -> std::result::Result<Value, ToolError>;
}

/// Registry of available tools.
///
/// Thread-safe by construction: tools are `Arc`-wrapped and the registry is
/// built once, then shared immutably across the loop and its callers.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    invoke_timeout: Duration,
}

impl ToolRegistry {
    /// Create an empty registry with the default 60s invocation timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(60))
    }

    /// Create an empty registry with an explicit invocation timeout.
    pub fn with_timeout(invoke_timeout: Duration) -> Self {
        Self {
            tools: HashMap::new(),
            invoke_timeout,
        }
    }

    /// Register a tool. Names are keyed case-insensitively; re-registering a
    /// name replaces the previous tool and logs a warning.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let key = tool.name().to_lowercase();
        if self.tools.insert(key.clone(), tool).is_some() {
            warn!(tool = %key, "overwriting existing tool registration");
        } else {
            debug!(tool = %key, "registered tool");
        }
    }

    /// Look up a tool by name. Lookup is case-insensitive, so a model that
    /// writes `Action: Search` still resolves the `search` tool.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(&name.to_lowercase()).cloned()
    }

    /// Whether a tool with this name is registered (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(&name.to_lowercase())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The specs of every registered tool, sorted by name for stable output.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                schema: t.schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Dispatch a call through the full pipeline.
    ///
    /// Pre-invocation failures (unknown tool, invalid parameters) return
    /// `Err(DispatchError)` and never reach the tool. Once invocation starts,
    /// every failure mode — execution error or timeout — is contained in the
    /// returned [`DispatchOutcome`].
    pub async fn dispatch(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> std::result::Result<DispatchOutcome, DispatchError> {
        let tool = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        validate_params(&params, &tool.schema()).map_err(|reason| {
            DispatchError::InvalidParameters {
                tool_name: name.to_string(),
                reason,
            }
        })?;

        let clean = sanitize_map(&params);

        debug!(tool = %name, "dispatching tool call");
        match tokio::time::timeout(self.invoke_timeout, tool.invoke(clean)).await {
            Ok(Ok(result)) => Ok(DispatchOutcome::Success { result }),
            Ok(Err(err)) => {
                warn!(tool = %name, error = %err, "tool execution failed");
                Ok(DispatchOutcome::Error {
                    error: err.to_string(),
                })
            }
            Err(_) => {
                let err = ToolError::Timeout {
                    tool_name: name.to_string(),
                    timeout_secs: self.invoke_timeout.as_secs(),
                };
                warn!(tool = %name, error = %err, "tool invocation timed out");
                Ok(DispatchOutcome::Error {
                    error: err.to_string(),
                })
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
