use serde::{Deserialize, Serialize};

use super::types::TextGenerator;
use super::GenerationError;

/// Ollama HTTP client for local LLM inference.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaGenerator {
    /// Create a generator pointing at an Ollama instance with a fixed model.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of models pulled into the Ollama instance.
    pub fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the configured model (or a tagged variant of it) is pulled.
    pub fn is_model_available(&self) -> Result<bool, GenerationError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(&self.model)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            GenerationError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            GenerationError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Ollama generate");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(parsed.response)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn check_available(&self) -> Result<bool, GenerationError> {
        self.is_model_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_generator_constructor() {
        let generator = OllamaGenerator::new("http://localhost:11434", "medgemma:4b", 120).unwrap();
        assert_eq!(generator.base_url(), "http://localhost:11434");
        assert_eq!(generator.model(), "medgemma:4b");
        assert_eq!(generator.timeout_secs, 120);
    }

    #[test]
    fn ollama_generator_trims_trailing_slash() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "m", 60).unwrap();
        assert_eq!(generator.base_url(), "http://localhost:11434");
    }

    #[test]
    fn generate_request_serializes_non_streaming() {
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            system: "s",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["system"], "s");
    }

    #[test]
    fn unreachable_host_is_connection_error() {
        // Port 9 (discard) is closed on test hosts.
        let generator = OllamaGenerator::new("http://127.0.0.1:9", "m", 2).unwrap();
        let err = generator.generate("s", "p").unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Connection(_) | GenerationError::HttpClient(_)
        ));
        assert!(generator.check_available().is_err());
    }
}
