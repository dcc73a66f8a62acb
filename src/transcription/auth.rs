//! Bearer tokens for Google Cloud calls.
//!
//! Application Default Credentials come first: a service-account key named by
//! `GOOGLE_APPLICATION_CREDENTIALS`, gcloud user credentials, or the metadata
//! server. A fixed `GOOGLE_ACCESS_TOKEN` is only a fallback, since it expires
//! after about an hour.

use std::sync::Arc;

use super::TranscriptionError;
use crate::config::SpeechConfig;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Supplies a bearer token for each outgoing request.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Result<String, TranscriptionError>;

    /// Short label for logs.
    fn kind(&self) -> &'static str;
}

/// Refreshing token from a `gcp_auth` provider.
///
/// `access_token` blocks on the runtime handle: call it from a blocking
/// thread (`spawn_blocking`), never from async code.
pub struct ProviderTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
    handle: tokio::runtime::Handle,
}

impl ProviderTokenSource {
    pub fn new(provider: Arc<dyn gcp_auth::TokenProvider>, handle: tokio::runtime::Handle) -> Self {
        Self { provider, handle }
    }
}

impl AccessTokenSource for ProviderTokenSource {
    fn access_token(&self) -> Result<String, TranscriptionError> {
        // gcp_auth caches the token and refreshes it shortly before expiry.
        let token = self
            .handle
            .block_on(self.provider.token(&[CLOUD_PLATFORM_SCOPE]))
            .map_err(|e| TranscriptionError::Credentials(e.to_string()))?;
        Ok(token.as_str().to_string())
    }

    fn kind(&self) -> &'static str {
        "application_default"
    }
}

/// Fixed token from `GOOGLE_ACCESS_TOKEN`.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AccessTokenSource for StaticToken {
    fn access_token(&self) -> Result<String, TranscriptionError> {
        Ok(self.0.clone())
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

/// No credentials at all: every request is rejected before it is sent.
pub struct NoCredentials;

impl AccessTokenSource for NoCredentials {
    fn access_token(&self) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::NotConfigured(
            "no Google credentials: set GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_ACCESS_TOKEN".into(),
        ))
    }

    fn kind(&self) -> &'static str {
        "none"
    }
}

/// Pick the token source for the speech client.
///
/// Must run inside the runtime whose handle the provider will block on.
pub async fn discover_token_source(config: &SpeechConfig) -> Arc<dyn AccessTokenSource> {
    match gcp_auth::provider().await {
        Ok(provider) => {
            tracing::info!("Using Google Application Default Credentials");
            Arc::new(ProviderTokenSource::new(
                provider,
                tokio::runtime::Handle::current(),
            ))
        }
        Err(e) => fallback_token_source(config, &e.to_string()),
    }
}

fn fallback_token_source(config: &SpeechConfig, adc_error: &str) -> Arc<dyn AccessTokenSource> {
    match &config.access_token {
        Some(token) => {
            tracing::warn!(
                error = adc_error,
                "No Application Default Credentials, falling back to GOOGLE_ACCESS_TOKEN"
            );
            Arc::new(StaticToken::new(token.clone()))
        }
        None => {
            tracing::warn!(
                error = adc_error,
                "No Google credentials found, transcription requests will be rejected"
            );
            Arc::new(NoCredentials)
        }
    }
}
