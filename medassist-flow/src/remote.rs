//! HTTP backend speaking the `{success, data, error}` JSON envelope.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::backend::AnalysisBackend;
use crate::error::{AssistError, Result};
use crate::i18n::Language;
use crate::models::{AnalysisRequest, AnalysisResult, ImageAnalysis, SymptomAnalysis};
use crate::panel::PanelKind;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SymptomBody<'a> {
    symptoms: &'a str,
    language: Language,
    additional_info: &'a Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageBody {
    image: String,
    mime_type: &'static str,
    language: Language,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<EnvelopeError>,
    /// Result fields sent at the top level instead of under `data`.
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: Option<String>,
}

/// Backend that performs one POST per analysis against a configured endpoint.
///
/// Dropping the future returned by [`AnalysisBackend::submit`] drops the
/// underlying request, which is how panel resets cancel in-flight calls.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    endpoint: String,
}

impl RemoteBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AnalysisBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let kind = request.kind();
        let builder = match &request {
            AnalysisRequest::Symptoms(symptoms) => self.client.post(&self.endpoint).json(&SymptomBody {
                symptoms: &symptoms.free_text,
                language: symptoms.language,
                additional_info: &symptoms.extra_context,
            }),
            AnalysisRequest::Image(image) => self.client.post(&self.endpoint).json(&ImageBody {
                image: STANDARD.encode(image.image.bytes()),
                mime_type: image.mime.as_str(),
                language: image.language,
            }),
        };

        debug!(endpoint = %self.endpoint, ?kind, "Sending analysis request");

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message);
            return Err(AssistError::backend(match detail {
                Some(message) => format!("HTTP {status}: {message}"),
                None => format!("HTTP {status}"),
            }));
        }

        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| AssistError::backend(format!("invalid response body: {e}")))?;
        decode_envelope(envelope, kind)
    }
}

fn decode_envelope(envelope: Envelope, kind: PanelKind) -> Result<AnalysisResult> {
    if !envelope.success {
        let message = envelope
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| "analysis failed".to_string());
        return Err(AssistError::backend(message));
    }

    let payload = match envelope.data {
        Some(Value::Null) | None => Value::Object(envelope.rest),
        Some(data) => data,
    };

    let decoded = match kind {
        PanelKind::Symptoms => {
            serde_json::from_value::<SymptomAnalysis>(payload).map(AnalysisResult::Symptoms)
        }
        PanelKind::Image => serde_json::from_value::<ImageAnalysis>(payload).map(AnalysisResult::Image),
    };
    decoded.map_err(|e| AssistError::backend(format!("malformed analysis payload: {e}")))
}

fn transport_error(err: reqwest::Error) -> AssistError {
    if err.is_decode() {
        AssistError::backend(format!("undecodable response: {err}"))
    } else if err.is_timeout() {
        AssistError::unreachable(format!("request timed out: {err}"))
    } else {
        AssistError::unreachable(err.to_string())
    }
}
