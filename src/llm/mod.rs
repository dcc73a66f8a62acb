//! Text generation capability used by the summary engine.
//!
//! The engine only sees `TextGenerator`; Ollama (local) and Gemini
//! (hosted) are interchangeable behind it.

pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod sanitize;
pub mod types;

pub use gemini::*;
pub use mock::*;
pub use ollama::*;
pub use sanitize::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM backend is not reachable at {0}")]
    Connection(String),

    #[error("LLM backend returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM backend not configured: {0}")]
    NotConfigured(String),
}

/// Build the generator selected by configuration.
///
/// Creates a blocking HTTP client: call outside any async runtime.
pub fn build_generator(
    provider: &crate::config::LlmProvider,
) -> Result<std::sync::Arc<dyn TextGenerator>, GenerationError> {
    use crate::config::LlmProvider;

    let generator: std::sync::Arc<dyn TextGenerator> = match provider {
        LlmProvider::Ollama {
            base_url,
            model,
            timeout_secs,
        } => {
            let ollama = OllamaGenerator::new(base_url, model, *timeout_secs)?;
            // Startup check only; generation failures are handled per call.
            match ollama.is_model_available() {
                Ok(true) => {}
                Ok(false) => tracing::warn!(model = %model, "Model not pulled into Ollama"),
                Err(e) => tracing::warn!(error = %e, "Ollama not reachable at startup"),
            }
            std::sync::Arc::new(ollama)
        }
        LlmProvider::Gemini { api_key, model } => {
            std::sync::Arc::new(GeminiGenerator::new(api_key, model)?)
        }
    };
    tracing::info!(model = generator.model(), "Text generator configured");
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;

    #[test]
    fn builds_ollama_generator() {
        let generator = build_generator(&LlmProvider::Ollama {
            base_url: "http://localhost:11434".into(),
            model: "medgemma:4b".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(generator.model(), "medgemma:4b");
    }

    #[test]
    fn builds_gemini_generator() {
        let generator = build_generator(&LlmProvider::Gemini {
            api_key: "k".into(),
            model: "gemini-1.5-flash".into(),
        })
        .unwrap();
        assert_eq!(generator.model(), "gemini-1.5-flash");
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = GenerationError::Http {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(GenerationError::EmptyResponse.to_string().contains("empty"));
    }
}
