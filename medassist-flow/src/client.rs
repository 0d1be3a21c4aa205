use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::backend::AnalysisBackend;
use crate::error::{AssistError, Result};
use crate::models::{
    AnalysisRequest, AnalysisResult, ImageAnalysis, ImageRequest, SymptomAnalysis, SymptomRequest,
};
use crate::panel::PanelKind;

/// Routes each analysis kind to its injected backend and normalizes the outcome.
///
/// Exactly one backend call per submission; failures are logged here and
/// returned unchanged, never retried.
#[derive(Clone)]
pub struct AnalysisClient {
    symptoms: Arc<dyn AnalysisBackend>,
    images: Arc<dyn AnalysisBackend>,
}

impl AnalysisClient {
    pub fn new(symptoms: Arc<dyn AnalysisBackend>, images: Arc<dyn AnalysisBackend>) -> Self {
        Self { symptoms, images }
    }

    pub async fn submit_symptom_analysis(&self, request: SymptomRequest) -> Result<SymptomAnalysis> {
        match self.submit(AnalysisRequest::Symptoms(request)).await? {
            AnalysisResult::Symptoms(analysis) => Ok(analysis),
            AnalysisResult::Image(_) => Err(mismatched(PanelKind::Symptoms)),
        }
    }

    pub async fn submit_image_analysis(&self, request: ImageRequest) -> Result<ImageAnalysis> {
        match self.submit(AnalysisRequest::Image(request)).await? {
            AnalysisResult::Image(analysis) => Ok(analysis),
            AnalysisResult::Symptoms(_) => Err(mismatched(PanelKind::Image)),
        }
    }

    /// Kind-agnostic entry point used by the panel controller.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let kind = request.kind();
        let backend = match kind {
            PanelKind::Symptoms => &self.symptoms,
            PanelKind::Image => &self.images,
        };
        let request_id = Uuid::new_v4();

        info!(%request_id, ?kind, backend = backend.name(), "Submitting analysis");

        let outcome = backend.submit(request).await.and_then(|result| {
            if result.kind() == kind {
                Ok(result)
            } else {
                Err(mismatched(kind))
            }
        });

        match &outcome {
            Ok(_) => info!(%request_id, ?kind, "Analysis completed"),
            Err(AssistError::Unreachable { reason }) => {
                warn!(%request_id, ?kind, %reason, "Analysis backend unreachable")
            }
            Err(e) => error!(%request_id, ?kind, "Analysis failed: {}", e),
        }

        outcome
    }
}

fn mismatched(kind: PanelKind) -> AssistError {
    AssistError::backend(format!("backend returned a result of the wrong kind for {kind:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::i18n::Language;
    use crate::models::ImageFile;
    use crate::validation::ImageMime;
    use async_trait::async_trait;
    use std::time::Duration;

    struct WrongKindBackend;

    #[async_trait]
    impl AnalysisBackend for WrongKindBackend {
        fn name(&self) -> &str {
            "wrong-kind"
        }

        async fn submit(&self, _request: AnalysisRequest) -> Result<AnalysisResult> {
            Ok(AnalysisResult::Symptoms(SymptomAnalysis::default()))
        }
    }

    fn image_request() -> ImageRequest {
        ImageRequest {
            image: ImageFile::new(None, "image/jpeg", vec![0xff, 0xd8]),
            mime: ImageMime::Jpeg,
            language: Language::En,
        }
    }

    #[tokio::test]
    async fn test_each_kind_goes_to_its_backend() {
        let symptoms = Arc::new(MockBackend::with_latency(Duration::ZERO));
        let images = Arc::new(MockBackend::with_latency(Duration::ZERO));
        let client = AnalysisClient::new(symptoms.clone(), images.clone());

        client.submit_image_analysis(image_request()).await.unwrap();

        assert_eq!(images.submissions(), 1);
        assert_eq!(symptoms.submissions(), 0);
    }

    #[tokio::test]
    async fn test_symptom_submission() {
        let backend = Arc::new(MockBackend::with_latency(Duration::ZERO));
        let client = AnalysisClient::new(backend.clone(), backend);

        let analysis = client
            .submit_symptom_analysis(SymptomRequest {
                free_text: "fever".into(),
                language: Language::En,
                extra_context: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(analysis.confidence_score, Some(0.75));
    }

    #[tokio::test]
    async fn test_wrong_result_kind_is_backend_failure() {
        let client = AnalysisClient::new(
            Arc::new(MockBackend::with_latency(Duration::ZERO)),
            Arc::new(WrongKindBackend),
        );

        let err = client.submit_image_analysis(image_request()).await.unwrap_err();
        assert!(matches!(err, AssistError::BackendFailure { .. }));
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let backend = Arc::new(MockBackend::failing(
            Duration::ZERO,
            AssistError::backend("HTTP 500"),
        ));
        let client = AnalysisClient::new(backend.clone(), backend.clone());

        let err = client.submit_image_analysis(image_request()).await.unwrap_err();
        assert_eq!(err, AssistError::backend("HTTP 500"));
        assert_eq!(backend.submissions(), 1);
    }
}
