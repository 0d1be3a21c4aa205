use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::i18n::Language;
use crate::panel::PanelKind;
use crate::validation::{self, ImageMime};

/// Free-text symptom analysis request, built fresh on every submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomRequest {
    pub free_text: String,
    pub language: Language,
    pub extra_context: Map<String, Value>,
}

/// Image analysis request. Only constructed from an image that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub image: ImageFile,
    pub mime: ImageMime,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Symptoms(SymptomRequest),
    Image(ImageRequest),
}

impl AnalysisRequest {
    pub fn kind(&self) -> PanelKind {
        match self {
            AnalysisRequest::Symptoms(_) => PanelKind::Symptoms,
            AnalysisRequest::Image(_) => PanelKind::Image,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            AnalysisRequest::Symptoms(request) => request.language,
            AnalysisRequest::Image(request) => request.language,
        }
    }
}

/// An uploaded image as the panel sees it: declared MIME type plus the raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: Option<String>,
    pub mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(file_name: Option<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Load an image from disk.
    ///
    /// The MIME type is inferred from the extension. Size and type are checked
    /// against file metadata before any bytes are read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size_bytes = std::fs::metadata(path)?.len();
        let mime_type = image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");

        validation::validate_image_meta(mime_type, size_bytes)?;

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub condition: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSymptom {
    pub symptom: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub condition: String,
    pub probability: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icd10_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecommendation {
    pub action: String,
    #[serde(default)]
    pub precautions: Option<Vec<String>>,
}

/// Symptom analysis payload. Every section is optional; a missing section is not rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    #[serde(default)]
    pub red_flags: Option<Vec<RedFlag>>,
    #[serde(default)]
    pub extracted_symptoms: Option<Vec<ExtractedSymptom>>,
    #[serde(default)]
    pub potential_diagnoses: Option<Vec<Diagnosis>>,
    #[serde(default)]
    pub recommendations: Option<Vec<CareRecommendation>>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQuality {
    pub overall: QualityRating,
    pub sharpness: i64,
    pub lighting: i64,
    pub resolution: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinCondition {
    pub primary_condition: String,
    pub probability: f64,
    pub severity: Severity,
    pub affected_area: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Immediate,
    Lifestyle,
    Medical,
}

/// Shared three-step scale for recommendation priority and risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub action: String,
    pub priority: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: Level,
    #[serde(default)]
    pub factors: Vec<String>,
    pub monitoring: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub image_quality: ImageQuality,
    pub skin_condition_analysis: SkinCondition,
    #[serde(default)]
    pub recommendations: Vec<SkinRecommendation>,
    pub risk_assessment: RiskAssessment,
    pub confidence_score: f64,
}

/// A completed analysis, owned by the panel that requested it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Symptoms(SymptomAnalysis),
    Image(ImageAnalysis),
}

impl AnalysisResult {
    pub fn kind(&self) -> PanelKind {
        match self {
            AnalysisResult::Symptoms(_) => PanelKind::Symptoms,
            AnalysisResult::Image(_) => PanelKind::Image,
        }
    }

    pub fn as_symptoms(&self) -> Option<&SymptomAnalysis> {
        match self {
            AnalysisResult::Symptoms(analysis) => Some(analysis),
            AnalysisResult::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageAnalysis> {
        match self {
            AnalysisResult::Image(analysis) => Some(analysis),
            AnalysisResult::Symptoms(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symptom_analysis_with_missing_sections() {
        let analysis: SymptomAnalysis = serde_json::from_value(json!({
            "potentialDiagnoses": [
                {"condition": "Common Cold", "probability": 0.6, "description": "...", "icd10Code": "J00"}
            ],
            "confidenceScore": 0.75
        }))
        .unwrap();

        assert!(analysis.red_flags.is_none());
        assert!(analysis.extracted_symptoms.is_none());
        let diagnoses = analysis.potential_diagnoses.unwrap();
        assert_eq!(diagnoses[0].icd10_code.as_deref(), Some("J00"));
        assert_eq!(analysis.confidence_score, Some(0.75));
    }

    #[test]
    fn test_symptom_analysis_ignores_unknown_fields_and_null_severity() {
        let analysis: SymptomAnalysis = serde_json::from_value(json!({
            "extractedSymptoms": [
                {"symptom": "fever", "key": "fever", "severity": "moderate", "category": "general"},
                {"symptom": "back_pain", "severity": null}
            ],
            "timestamp": "2024-01-01T00:00:00"
        }))
        .unwrap();

        let symptoms = analysis.extracted_symptoms.unwrap();
        assert_eq!(symptoms[0].severity, Some(Severity::Moderate));
        assert_eq!(symptoms[1].severity, None);
    }

    #[test]
    fn test_image_analysis_wire_names() {
        let analysis: ImageAnalysis = serde_json::from_value(json!({
            "imageQuality": {"overall": "good", "sharpness": 85, "lighting": 78, "resolution": 92},
            "skinConditionAnalysis": {
                "primaryCondition": "Acne Vulgaris",
                "probability": 0.78,
                "severity": "moderate",
                "affectedArea": "facial_region"
            },
            "recommendations": [{"type": "immediate", "action": "wash", "priority": "high"}],
            "riskAssessment": {"level": "low", "factors": ["Localized condition"], "monitoring": "weekly"},
            "confidenceScore": 0.82
        }))
        .unwrap();

        assert_eq!(analysis.recommendations[0].kind, RecommendationType::Immediate);
        assert_eq!(analysis.risk_assessment.level, Level::Low);
        assert_eq!(analysis.image_quality.overall, QualityRating::Good);
    }

    #[test]
    fn test_image_file_size_comes_from_bytes() {
        let file = ImageFile::new(Some("rash.png".into()), "image/png", vec![0u8; 2048]);
        assert_eq!(file.size_bytes(), 2048);
        assert_eq!(file.bytes().len(), 2048);
    }

    #[test]
    fn test_image_file_from_path_infers_mime() {
        let dir = std::env::temp_dir().join(format!("medassist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("spot.webp");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.mime_type, "image/webp");
        assert_eq!(file.file_name.as_deref(), Some("spot.webp"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_image_file_from_path_rejects_unknown_extension() {
        let dir = std::env::temp_dir().join(format!("medassist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = ImageFile::from_path(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedType);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
