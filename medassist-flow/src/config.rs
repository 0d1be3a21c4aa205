use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::backend::{AnalysisBackend, MockBackend};
use crate::client::AnalysisClient;
use crate::error::{AssistError, Result};
use crate::i18n::Language;

pub const ENV_SYMPTOM_ENDPOINT: &str = "MEDASSIST_SYMPTOM_ENDPOINT";
pub const ENV_IMAGE_BACKEND: &str = "MEDASSIST_IMAGE_BACKEND";
pub const ENV_IMAGE_ENDPOINT: &str = "MEDASSIST_IMAGE_ENDPOINT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MEDASSIST_REQUEST_TIMEOUT_SECS";
pub const ENV_MOCK_LATENCY_MS: &str = "MEDASSIST_MOCK_LATENCY_MS";
pub const ENV_LANGUAGE: &str = "MEDASSIST_LANGUAGE";

const DEFAULT_SYMPTOM_ENDPOINT: &str = "http://localhost:5000/api/analysis/symptoms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackendKind {
    #[default]
    Mock,
    Remote,
}

impl std::str::FromStr for ImageBackendKind {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(ImageBackendKind::Mock),
            "remote" => Ok(ImageBackendKind::Remote),
            other => Err(AssistError::config(format!(
                "unknown image backend '{other}', expected mock or remote"
            ))),
        }
    }
}

/// Client configuration: optional YAML file, then environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub symptom_endpoint: String,
    pub image_backend: ImageBackendKind,
    pub image_endpoint: Option<String>,
    pub request_timeout_secs: u64,
    pub mock_latency_ms: u64,
    pub language: Language,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            symptom_endpoint: DEFAULT_SYMPTOM_ENDPOINT.to_string(),
            image_backend: ImageBackendKind::Mock,
            image_endpoint: None,
            request_timeout_secs: 30,
            mock_latency_ms: 3000,
            language: Language::En,
        }
    }
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_lookup(path, |name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::load`] with the environment supplied by `lookup`.
    pub fn from_lookup<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AssistError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_yaml::from_str(&raw).map_err(|e| {
                    AssistError::config(format!("invalid config {}: {e}", path.display()))
                })?
            }
            None => ClientConfig::default(),
        };

        if let Some(endpoint) = lookup(ENV_SYMPTOM_ENDPOINT) {
            config.symptom_endpoint = endpoint;
        }
        if let Some(kind) = lookup(ENV_IMAGE_BACKEND) {
            config.image_backend = kind.parse()?;
        }
        if let Some(endpoint) = lookup(ENV_IMAGE_ENDPOINT) {
            config.image_endpoint = Some(endpoint);
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, &secs)?;
        }
        if let Some(ms) = lookup(ENV_MOCK_LATENCY_MS) {
            config.mock_latency_ms = parse_number(ENV_MOCK_LATENCY_MS, &ms)?;
        }
        if let Some(language) = lookup(ENV_LANGUAGE) {
            config.language = language.parse().map_err(AssistError::Config)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symptom_endpoint.trim().is_empty() {
            return Err(AssistError::config("symptom_endpoint must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(AssistError::config("request_timeout_secs must be greater than zero"));
        }
        match (&self.image_backend, &self.image_endpoint) {
            (ImageBackendKind::Remote, None) => Err(AssistError::config(
                "image_backend is remote but no image_endpoint is set",
            )),
            (_, Some(endpoint)) if endpoint.trim().is_empty() => {
                Err(AssistError::config("image_endpoint must not be empty"))
            }
            _ => Ok(()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    /// Wire up the analysis client: remote symptoms, mock or remote images.
    #[cfg(feature = "remote")]
    pub fn build_client(&self) -> Result<AnalysisClient> {
        use crate::remote::RemoteBackend;

        self.validate()?;
        let symptoms: Arc<dyn AnalysisBackend> =
            Arc::new(RemoteBackend::new(&self.symptom_endpoint, self.request_timeout())?);

        let images: Arc<dyn AnalysisBackend> = match (&self.image_backend, &self.image_endpoint) {
            (ImageBackendKind::Remote, Some(endpoint)) => {
                Arc::new(RemoteBackend::new(endpoint, self.request_timeout())?)
            }
            _ => Arc::new(MockBackend::with_latency(self.mock_latency())),
        };

        info!(
            symptom_endpoint = %self.symptom_endpoint,
            image_backend = ?self.image_backend,
            "Analysis client configured"
        );
        Ok(AnalysisClient::new(symptoms, images))
    }

    /// Without the `remote` feature both panels run against the mock backend.
    #[cfg(not(feature = "remote"))]
    pub fn build_client(&self) -> Result<AnalysisClient> {
        self.validate()?;
        if self.image_backend == ImageBackendKind::Remote {
            return Err(AssistError::config(
                "remote image backend requires the `remote` feature",
            ));
        }
        let mock: Arc<dyn AnalysisBackend> = Arc::new(MockBackend::with_latency(self.mock_latency()));
        info!("Analysis client configured with mock backends only");
        Ok(AnalysisClient::new(mock.clone(), mock))
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| AssistError::config(format!("{name} must be a whole number, got '{value}'")))
}
