//! Cycle history — the bounded per-run record of reasoning cycles.
//!
//! Each Think→Act→Observe cycle produces one [`CycleRecord`]. The history
//! keeps at most the W most recent records (default 5), evicting oldest
//! first, so the rendered prompt section stays the same size no matter how
//! long a run gets. A separate total counter preserves the true cycle count
//! after eviction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};

/// Default history window.
pub const DEFAULT_WINDOW: usize = 5;

/// The action name recorded for a terminal cycle.
pub const FINAL_ANSWER_ACTION: &str = "final_answer";

/// One reasoning step's free-text thought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// In [0, 1]. A produced thought gets 0.8; a synthesized placeholder 0.0.
    pub confidence: f32,
}

impl Thought {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            content: content.into(),
            confidence: 0.8,
        }
    }

    /// Placeholder for a cycle where generation produced no usable thought.
    pub fn placeholder() -> Self {
        Self {
            timestamp: Utc::now(),
            content: "No thought generated".into(),
            confidence: 0.0,
        }
    }
}

/// Lifecycle status of an action within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Completed,
    Failed,
}

/// The action taken in one cycle: a tool name or the terminal marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Tool name, or [`FINAL_ANSWER_ACTION`] for a terminal cycle.
    pub action: String,
    pub parameters: Map<String, Value>,
    pub cycle: usize,
    pub status: ActionStatus,
}

impl ActionRecord {
    pub fn tool(name: impl Into<String>, parameters: Map<String, Value>, cycle: usize) -> Self {
        Self {
            action: name.into(),
            parameters,
            cycle,
            status: ActionStatus::Pending,
        }
    }

    pub fn final_answer(cycle: usize) -> Self {
        Self {
            action: FINAL_ANSWER_ACTION.into(),
            parameters: Map::new(),
            cycle,
            status: ActionStatus::Completed,
        }
    }
}

/// What came back from the action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub success: bool,
}

impl Observation {
    pub fn new(content: impl Into<String>, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            content: content.into(),
            success,
        }
    }
}

/// One complete Think→Act→Observe cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub thought: Thought,
    pub action: ActionRecord,
    pub observation: Observation,
}

/// Aggregate statistics over the retained history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Total cycles pushed over the run's lifetime (eviction included).
    pub total_cycles: usize,
    /// Action counts per tool name, over retained records.
    pub action_counts: BTreeMap<String, usize>,
    /// Fraction of retained observations that succeeded, in [0, 1].
    pub success_rate: f32,
}

/// Bounded ring of cycle records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleHistory {
    window: usize,
    records: VecDeque<CycleRecord>,
    total_cycles: usize,
}

impl CycleHistory {
    /// Create a history retaining at most `window` records (minimum 1).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            records: VecDeque::new(),
            total_cycles: 0,
        }
    }

    /// Append a record, evicting the oldest if the window is full.
    pub fn push(&mut self, record: CycleRecord) {
        if self.records.len() == self.window {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.total_cycles += 1;
    }

    /// Number of retained records (≤ window).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total cycles over the run, including evicted ones.
    pub fn total_cycles(&self) -> usize {
        self.total_cycles
    }

    /// The retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &CycleRecord> {
        self.records.iter()
    }

    /// Render the retained cycles in the output grammar the model itself
    /// uses, so prior cycles read as a continuation of its own transcript.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&format!("Thought: {}\n", record.thought.content));
            if record.action.action == FINAL_ANSWER_ACTION {
                out.push_str(&format!("Final Answer: {}\n", record.observation.content));
            } else {
                out.push_str(&format!("Action: {}\n", record.action.action));
                let input = record
                    .action
                    .parameters
                    .get("input")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                out.push_str(&format!("Action Input: {}\n", input));
                out.push_str(&format!("Observation: {}\n", record.observation.content));
            }
            out.push('\n');
        }
        out
    }

    /// Summarize the retained history: per-tool action counts and success rate.
    pub fn summary(&self) -> HistorySummary {
        let mut action_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut successes = 0usize;

        for record in &self.records {
            *action_counts.entry(record.action.action.clone()).or_insert(0) += 1;
            if record.observation.success {
                successes += 1;
            }
        }

        let success_rate = if self.records.is_empty() {
            0.0
        } else {
            successes as f32 / self.records.len() as f32
        };

        HistorySummary {
            total_cycles: self.total_cycles,
            action_counts,
            success_rate,
        }
    }
}

impl Default for CycleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
