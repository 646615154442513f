//! Shared scripted providers for loop tests.

use async_trait::async_trait;
use reagent_core::error::ProviderError;
use reagent_core::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn text_response(content: &str) -> CompletionResponse {
    CompletionResponse {
        content: content.to_string(),
        usage: None,
        model: "mock-model".into(),
    }
}

/// A mock provider that returns scripted completions in sequence.
///
/// Panics if more calls are made than completions provided.
pub struct SequentialMockProvider {
    responses: Mutex<VecDeque<String>>,
    calls: Arc<AtomicUsize>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A counter handle that survives moving the provider into an `Arc`.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CompletionProvider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(content) => Ok(text_response(&content)),
            None => panic!("SequentialMockProvider: no response scripted for call #{n}"),
        }
    }
}

/// A provider that fails its first N calls, then answers with a fixed text.
pub struct FlakyProvider {
    fail_first: u32,
    response: String,
    calls: Arc<AtomicUsize>,
}

impl FlakyProvider {
    /// Fail the first `n` calls (use `u32::MAX` to always fail).
    pub fn failing(n: u32) -> Self {
        Self {
            fail_first: n,
            response: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the first `n` calls, then return `response`.
    pub fn recovering(n: u32, response: &str) -> Self {
        Self {
            fail_first: n,
            response: response.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CompletionProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky_mock"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
        if n < self.fail_first {
            Err(ProviderError::Network(format!("synthetic failure {n}")))
        } else {
            Ok(text_response(&self.response))
        }
    }
}
