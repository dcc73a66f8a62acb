use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "healthbrief";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Similarity at or above which a regenerated chat summary is treated as unchanged.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Source tag written with the first summary generated from profile data.
pub const INITIAL_SOURCE_TAG: &str = "initial_profile_creation";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "medgemma:4b";
pub const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Get the application data directory.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite file for summaries
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("healthbrief.db")
}

/// `RUST_LOG` fallback used by the binary.
pub fn default_log_filter() -> &'static str {
    "healthbrief=info,healthbrief_lib=info,tower_http=warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Which text-generation backend the summary engine talks to.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    Ollama {
        base_url: String,
        model: String,
        timeout_secs: u64,
    },
    Gemini {
        api_key: String,
        model: String,
    },
}

impl LlmProvider {
    pub fn model(&self) -> &str {
        match self {
            Self::Ollama { model, .. } | Self::Gemini { model, .. } => model,
        }
    }
}

/// Speech-to-Text settings for the `/transcribe` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Full recognizer resource name, `projects/<p>/locations/<l>/recognizers/<r>`.
    pub recognizer_name: String,
    /// Fixed bearer token, used only when no Application Default Credentials exist.
    pub access_token: Option<String>,
    /// Service-account key file; `gcp_auth` reads the variable itself.
    pub credentials_path: Option<PathBuf>,
}

/// Runtime configuration for the service binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub llm: LlmProvider,
    pub similarity_threshold: f64,
    pub api_key: String,
    pub speech: SpeechConfig,
}

impl ServiceConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = get("HEALTHBRIEF_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "HEALTHBRIEF_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let database_path = get("HEALTHBRIEF_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let provider = get("LLM_PROVIDER").unwrap_or_else(|| "ollama".into());
        let llm = match provider.to_ascii_lowercase().as_str() {
            "ollama" => {
                let timeout_secs = match get("OLLAMA_TIMEOUT_SECS") {
                    Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                        var: "OLLAMA_TIMEOUT_SECS",
                        reason: e.to_string(),
                    })?,
                    None => DEFAULT_OLLAMA_TIMEOUT_SECS,
                };
                LlmProvider::Ollama {
                    base_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
                    model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
                    timeout_secs,
                }
            }
            "gemini" => LlmProvider::Gemini {
                api_key: get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "LLM_PROVIDER",
                    reason: format!("unknown provider '{other}' (expected ollama or gemini)"),
                })
            }
        };

        let similarity_threshold = match get("SUMMARY_SIMILARITY_THRESHOLD") {
            Some(raw) => {
                let value = raw.parse::<f64>().map_err(|e| ConfigError::Invalid {
                    var: "SUMMARY_SIMILARITY_THRESHOLD",
                    reason: e.to_string(),
                })?;
                if !(value > 0.0 && value <= 1.0) {
                    return Err(ConfigError::Invalid {
                        var: "SUMMARY_SIMILARITY_THRESHOLD",
                        reason: format!("{value} is outside (0, 1]"),
                    });
                }
                value
            }
            None => DEFAULT_SIMILARITY_THRESHOLD,
        };

        let api_key =
            get("TRANSCRIPTION_API_KEY").ok_or(ConfigError::Missing("TRANSCRIPTION_API_KEY"))?;

        let recognizer_name = get("GOOGLE_SPEECH_RECOGNIZER_NAME")
            .ok_or(ConfigError::Missing("GOOGLE_SPEECH_RECOGNIZER_NAME"))?;
        let access_token = get("GOOGLE_ACCESS_TOKEN");
        let credentials_path = get("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from);
        match &credentials_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using GOOGLE_APPLICATION_CREDENTIALS")
            }
            None => tracing::info!(
                "GOOGLE_APPLICATION_CREDENTIALS not set, relying on Application Default Credentials discovery"
            ),
        }

        Ok(Self {
            bind_addr,
            database_path,
            llm,
            similarity_threshold,
            api_key,
            speech: SpeechConfig {
                recognizer_name,
                access_token,
                credentials_path,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TRANSCRIPTION_API_KEY", "secret"),
            (
                "GOOGLE_SPEECH_RECOGNIZER_NAME",
                "projects/p/locations/global/recognizers/_",
            ),
        ]
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn defaults_apply_when_only_required_vars_set() {
        let config = ServiceConfig::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(config.api_key, "secret");
        assert!(config.speech.access_token.is_none());
        assert!(config.speech.credentials_path.is_none());
        match config.llm {
            LlmProvider::Ollama { base_url, model, timeout_secs } => {
                assert_eq!(base_url, DEFAULT_OLLAMA_URL);
                assert_eq!(model, DEFAULT_OLLAMA_MODEL);
                assert_eq!(timeout_secs, DEFAULT_OLLAMA_TIMEOUT_SECS);
            }
            other => panic!("expected Ollama, got {other:?}"),
        }
    }

    #[test]
    fn google_credentials_are_read() {
        let mut vars = required();
        vars.push(("GOOGLE_APPLICATION_CREDENTIALS", "/etc/healthbrief/sa.json"));
        vars.push(("GOOGLE_ACCESS_TOKEN", "ya29.fixed"));
        let config = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(
            config.speech.credentials_path,
            Some(PathBuf::from("/etc/healthbrief/sa.json"))
        );
        assert_eq!(config.speech.access_token.as_deref(), Some("ya29.fixed"));
    }

    #[test]
    fn missing_api_key_is_error() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(
            "GOOGLE_SPEECH_RECOGNIZER_NAME",
            "projects/p/locations/global/recognizers/_",
        )]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TRANSCRIPTION_API_KEY"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = ServiceConfig::from_lookup(lookup_from(&[
            ("TRANSCRIPTION_API_KEY", "   "),
            ("GOOGLE_SPEECH_RECOGNIZER_NAME", "r"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TRANSCRIPTION_API_KEY"));
    }

    #[test]
    fn gemini_requires_api_key() {
        let mut vars = required();
        vars.push(("LLM_PROVIDER", "gemini"));
        let err = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));

        vars.push(("GEMINI_API_KEY", "g-key"));
        let config = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.llm.model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut vars = required();
        vars.push(("LLM_PROVIDER", "openai"));
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid { var: "LLM_PROVIDER", .. })
        ));
    }

    #[test]
    fn threshold_must_be_in_unit_interval() {
        let mut vars = required();
        vars.push(("SUMMARY_SIMILARITY_THRESHOLD", "1.5"));
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid { var: "SUMMARY_SIMILARITY_THRESHOLD", .. })
        ));

        let mut vars = required();
        vars.push(("SUMMARY_SIMILARITY_THRESHOLD", "0.9"));
        let config = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.similarity_threshold, 0.9);
    }

    #[test]
    fn bad_bind_addr_rejected() {
        let mut vars = required();
        vars.push(("HEALTHBRIEF_BIND_ADDR", "not-an-addr"));
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid { var: "HEALTHBRIEF_BIND_ADDR", .. })
        ));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
