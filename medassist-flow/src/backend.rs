use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::error::{AssistError, Result};
use crate::i18n::Language;
use crate::models::{
    AnalysisRequest, AnalysisResult, CareRecommendation, Diagnosis, ImageAnalysis, ImageQuality,
    Level, QualityRating, RecommendationType, RiskAssessment, Severity, SkinCondition,
    SkinRecommendation, SymptomAnalysis,
};

/// Latency of the reference image analysis stub.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_secs(3);

/// Capability interface for whatever performs the analysis.
///
/// Implementations are injected into the client at construction time; the
/// panel controller never knows which one it is talking to.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Perform one analysis. Called at most once per submission, never retried.
    async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult>;
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Reference,
    Fail(AssistError),
}

/// Deterministic backend for tests and local development.
///
/// Sleeps for a fixed latency, then answers with a canned result for the
/// request's kind and language (or with a fixed error).
#[derive(Debug)]
pub struct MockBackend {
    latency: Duration,
    outcome: MockOutcome,
    submissions: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_MOCK_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            outcome: MockOutcome::Reference,
            submissions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A mock that always fails with `error` after its latency.
    pub fn failing(latency: Duration, error: AssistError) -> Self {
        Self {
            latency,
            outcome: MockOutcome::Fail(error),
            submissions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of requests received so far.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        debug!(latency_ms = self.latency.as_millis() as u64, "Mock analysis started");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &self.outcome {
            MockOutcome::Fail(error) => Err(error.clone()),
            MockOutcome::Reference => Ok(match request {
                AnalysisRequest::Symptoms(request) => {
                    AnalysisResult::Symptoms(reference_symptom_analysis(request.language))
                }
                AnalysisRequest::Image(request) => {
                    AnalysisResult::Image(reference_image_analysis(request.language))
                }
            }),
        }
    }
}

/// Canned skin analysis returned by the mock image backend.
pub fn reference_image_analysis(language: Language) -> ImageAnalysis {
    let localized = |en: &str, ar: &str| match language {
        Language::En => en.to_string(),
        Language::Ar => ar.to_string(),
    };

    ImageAnalysis {
        image_quality: ImageQuality {
            overall: QualityRating::Good,
            sharpness: 85,
            lighting: 78,
            resolution: 92,
        },
        skin_condition_analysis: SkinCondition {
            primary_condition: "Acne Vulgaris".to_string(),
            probability: 0.78,
            severity: Severity::Moderate,
            affected_area: "facial_region".to_string(),
        },
        recommendations: vec![
            SkinRecommendation {
                kind: RecommendationType::Immediate,
                action: localized(
                    "Keep the affected area clean with gentle cleansing",
                    "حافظ على نظافة المنطقة المصابة بالتنظيف اللطيف",
                ),
                priority: Level::High,
            },
            SkinRecommendation {
                kind: RecommendationType::Lifestyle,
                action: localized(
                    "Avoid touching or picking at the affected area",
                    "تجنب لمس أو حك المنطقة المصابة",
                ),
                priority: Level::Medium,
            },
            SkinRecommendation {
                kind: RecommendationType::Medical,
                action: localized(
                    "Consider consulting a dermatologist for treatment options",
                    "فكر في استشارة طبيب الأمراض الجلدية لخيارات العلاج",
                ),
                priority: Level::High,
            },
        ],
        risk_assessment: RiskAssessment {
            level: Level::Low,
            factors: vec![
                "No signs of infection".to_string(),
                "Localized condition".to_string(),
            ],
            monitoring: "Monitor for changes over 1-2 weeks".to_string(),
        },
        confidence_score: 0.82,
    }
}

/// Canned symptom analysis returned by the mock backend.
///
/// Fixed content regardless of the submitted text.
pub fn reference_symptom_analysis(language: Language) -> SymptomAnalysis {
    let (description, actions) = match language {
        Language::En => (
            "A viral infection of the upper respiratory tract",
            [
                (
                    "Stay hydrated and get adequate rest",
                    ["Drink plenty of fluids", "Get 7-8 hours of sleep"],
                ),
                (
                    "Consult with a healthcare professional for proper diagnosis",
                    ["Schedule an appointment with your doctor", "Bring your symptom diary"],
                ),
            ],
        ),
        Language::Ar => (
            "عدوى فيروسية في الجهاز التنفسي العلوي",
            [
                (
                    "حافظ على الترطيب واحصل على راحة كافية",
                    ["اشرب الكثير من السوائل", "احصل على 7-8 ساعات من النوم"],
                ),
                (
                    "استشر أخصائي رعاية صحية للحصول على تشخيص صحيح",
                    ["حدد موعداً مع طبيبك", "أحضر مذكرة الأعراض"],
                ),
            ],
        ),
    };

    SymptomAnalysis {
        red_flags: None,
        extracted_symptoms: None,
        potential_diagnoses: Some(vec![Diagnosis {
            condition: "Common Cold".to_string(),
            probability: 0.6,
            description: description.to_string(),
            icd10_code: Some("J00".to_string()),
        }]),
        recommendations: Some(
            actions
                .iter()
                .map(|(action, precautions)| CareRecommendation {
                    action: action.to_string(),
                    precautions: Some(precautions.iter().map(|p| p.to_string()).collect()),
                })
                .collect(),
        ),
        confidence_score: Some(0.75),
    }
}
