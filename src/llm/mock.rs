//! In-process generator for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::TextGenerator;
use super::GenerationError;

/// Returns queued responses first, then a fixed fallback.
/// Records every (system, prompt) pair it was called with.
pub struct MockGenerator {
    queued: Mutex<VecDeque<Result<String, String>>>,
    fallback: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockGenerator {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Ok(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an HTTP 503.
    pub fn failing(message: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `responses` in order, then repeat the last one.
    pub fn with_responses(responses: Vec<&str>) -> Self {
        let fallback = responses.last().map(|r| r.to_string()).unwrap_or_default();
        Self {
            queued: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            fallback: Ok(fallback),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(_, prompt)| prompt.clone()).collect())
            .unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }

    pub fn last_system(&self) -> Option<String> {
        self.calls
            .lock()
            .ok()
            .and_then(|c| c.last().map(|(system, _)| system.clone()))
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system.to_string(), prompt.to_string()));
        }
        let next = self
            .queued
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone());
        next.map_err(|body| GenerationError::Http { status: 503, body })
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn check_available(&self) -> Result<bool, GenerationError> {
        Ok(self.fallback.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_configured_response_and_counts_calls() {
        let generator = MockGenerator::new("test response");
        assert_eq!(generator.generate("sys", "one").unwrap(), "test response");
        assert_eq!(generator.generate("sys", "two").unwrap(), "test response");
        assert_eq!(generator.call_count(), 2);
        assert_eq!(generator.prompts(), vec!["one", "two"]);
        assert_eq!(generator.last_system().as_deref(), Some("sys"));
    }

    #[test]
    fn queued_responses_then_repeat_last() {
        let generator = MockGenerator::with_responses(vec!["a", "b"]);
        assert_eq!(generator.generate("", "").unwrap(), "a");
        assert_eq!(generator.generate("", "").unwrap(), "b");
        assert_eq!(generator.generate("", "").unwrap(), "b");
    }

    #[test]
    fn failing_generator_errors() {
        let generator = MockGenerator::failing("model overloaded");
        let err = generator.generate("", "p").unwrap_err();
        assert!(matches!(err, GenerationError::Http { status: 503, .. }));
        assert_eq!(generator.call_count(), 1);
        assert!(!generator.check_available().unwrap());
    }
}
