//! Display-ready reports built from analysis results.
//!
//! Nothing here is rendered as the backend sent it: scores are clamped and
//! rounded, labels are humanized and empty sections are dropped.

use std::fmt::Write as _;

use crate::i18n::{Localizer, TextDirection};
use crate::models::{
    AnalysisResult, ImageAnalysis, Level, QualityRating, RecommendationType, Severity,
    SymptomAnalysis,
};

/// Percentage of a [0, 1] score. Out-of-range values are clamped, NaN is 0.
pub fn percent(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Emphasis tier of a probability: high from 0.7, medium from 0.5.
pub fn probability_tier(probability: f64) -> Level {
    match percent(probability) {
        70.. => Level::High,
        50.. => Level::Medium,
        _ => Level::Low,
    }
}

pub fn quality_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// Tier of a 0-100 image quality metric: good from 80, fair from 60.
pub fn quality_tier(score: i64) -> QualityRating {
    match quality_score(score) {
        80.. => QualityRating::Good,
        60.. => QualityRating::Fair,
        _ => QualityRating::Poor,
    }
}

/// `lower_back_pain` → `lower back pain`.
pub fn humanize(label: &str) -> String {
    label.replace('_', " ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disclaimer {
    pub heading: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedFlagLine {
    pub condition: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymptomLine {
    pub label: String,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisLine {
    pub condition: String,
    pub percent: u8,
    pub tier: Level,
    pub description: String,
    pub icd10_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationLine {
    pub action: String,
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymptomReport {
    pub localizer: Localizer,
    pub red_flags: Vec<RedFlagLine>,
    pub symptoms: Vec<SymptomLine>,
    pub diagnoses: Vec<DiagnosisLine>,
    pub recommendations: Vec<RecommendationLine>,
    /// `None` when the backend sent no score.
    pub confidence: Option<u8>,
    pub disclaimer: Disclaimer,
}

impl SymptomReport {
    pub fn build(analysis: &SymptomAnalysis, localizer: Localizer) -> Self {
        let red_flags = analysis
            .red_flags
            .iter()
            .flatten()
            .map(|flag| RedFlagLine {
                condition: flag.condition.clone(),
                action: flag.action.clone(),
            })
            .collect();

        let symptoms = analysis
            .extracted_symptoms
            .iter()
            .flatten()
            .map(|symptom| SymptomLine {
                label: humanize(&symptom.symptom),
                severity: symptom.severity,
            })
            .collect();

        let diagnoses = analysis
            .potential_diagnoses
            .iter()
            .flatten()
            .map(|diagnosis| DiagnosisLine {
                condition: diagnosis.condition.clone(),
                percent: percent(diagnosis.probability),
                tier: probability_tier(diagnosis.probability),
                description: diagnosis.description.clone(),
                icd10_code: diagnosis
                    .icd10_code
                    .clone()
                    .filter(|code| !code.trim().is_empty()),
            })
            .collect();

        let recommendations = analysis
            .recommendations
            .iter()
            .flatten()
            .map(|recommendation| RecommendationLine {
                action: recommendation.action.clone(),
                precautions: recommendation.precautions.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            localizer,
            red_flags,
            symptoms,
            diagnoses,
            recommendations,
            confidence: analysis.confidence_score.map(percent),
            disclaimer: Disclaimer {
                heading: localizer.t("disclaimer"),
                text: localizer.t("symptomDisclaimerText"),
            },
        }
    }

    pub fn to_text(&self) -> String {
        let t = |key| self.localizer.t(key);
        let mut out = TextBlock::new(self.localizer.direction());
        out.heading(t("results"));

        if !self.red_flags.is_empty() {
            out.section(t("redFlags"));
            for flag in &self.red_flags {
                out.line(1, &format!("! {}: {}", flag.condition, flag.action));
            }
        }

        if !self.symptoms.is_empty() {
            out.section(t("detectedSymptoms"));
            for symptom in &self.symptoms {
                match symptom.severity {
                    Some(severity) => out.line(
                        1,
                        &format!("- {} ({}: {})", symptom.label, t("severity"), severity_label(severity)),
                    ),
                    None => out.line(1, &format!("- {}", symptom.label)),
                }
            }
        }

        if !self.diagnoses.is_empty() {
            out.section(t("diagnoses"));
            for diagnosis in &self.diagnoses {
                out.line(
                    1,
                    &format!(
                        "- {} [{}: {}% {}]",
                        diagnosis.condition,
                        t("probability"),
                        diagnosis.percent,
                        tier_marker(diagnosis.tier)
                    ),
                );
                if !diagnosis.description.is_empty() {
                    out.line(2, &diagnosis.description);
                }
                if let Some(code) = &diagnosis.icd10_code {
                    out.line(2, &format!("ICD-10: {code}"));
                }
            }
        }

        if !self.recommendations.is_empty() {
            out.section(t("recommendations"));
            for recommendation in &self.recommendations {
                out.line(1, &format!("- {}", recommendation.action));
                for precaution in &recommendation.precautions {
                    out.line(2, &format!("* {precaution}"));
                }
            }
        }

        if let Some(confidence) = self.confidence {
            out.section(&format!("{}: {confidence}%", t("confidence")));
        }

        out.disclaimer(&self.disclaimer);
        out.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityMetric {
    pub label: &'static str,
    pub score: u8,
    pub tier: QualityRating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinRecommendationLine {
    pub kind: RecommendationType,
    pub action: String,
    pub priority: Level,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub localizer: Localizer,
    pub overall_quality: QualityRating,
    pub metrics: [QualityMetric; 3],
    pub condition: String,
    pub condition_percent: u8,
    pub condition_tier: Level,
    pub severity: Severity,
    pub affected_area: String,
    pub recommendations: Vec<SkinRecommendationLine>,
    pub risk_level: Level,
    pub risk_factors: Vec<String>,
    pub monitoring: String,
    pub confidence: u8,
    pub disclaimer: Disclaimer,
}

impl ImageReport {
    pub fn build(analysis: &ImageAnalysis, localizer: Localizer) -> Self {
        let quality = &analysis.image_quality;
        let metric = |label, score| QualityMetric {
            label: localizer.t(label),
            score: quality_score(score),
            tier: quality_tier(score),
        };
        let condition = &analysis.skin_condition_analysis;
        let risk = &analysis.risk_assessment;

        Self {
            localizer,
            overall_quality: quality.overall,
            metrics: [
                metric("sharpness", quality.sharpness),
                metric("lighting", quality.lighting),
                metric("resolution", quality.resolution),
            ],
            condition: condition.primary_condition.clone(),
            condition_percent: percent(condition.probability),
            condition_tier: probability_tier(condition.probability),
            severity: condition.severity,
            affected_area: humanize(&condition.affected_area),
            recommendations: analysis
                .recommendations
                .iter()
                .map(|recommendation| SkinRecommendationLine {
                    kind: recommendation.kind,
                    action: recommendation.action.clone(),
                    priority: recommendation.priority,
                })
                .collect(),
            risk_level: risk.level,
            risk_factors: risk.factors.clone(),
            monitoring: risk.monitoring.clone(),
            confidence: percent(analysis.confidence_score),
            disclaimer: Disclaimer {
                heading: localizer.t("disclaimer"),
                text: localizer.t("imageDisclaimerText"),
            },
        }
    }

    pub fn to_text(&self) -> String {
        let t = |key| self.localizer.t(key);
        let mut out = TextBlock::new(self.localizer.direction());
        out.heading(t("results"));

        out.section(&format!(
            "{} ({}: {})",
            t("imageQuality"),
            t("quality"),
            quality_label(self.overall_quality)
        ));
        for metric in &self.metrics {
            out.line(
                1,
                &format!("{}: {}% {}", metric.label, metric.score, quality_marker(metric.tier)),
            );
        }

        out.section(t("skinCondition"));
        out.line(1, &format!("{}: {}", t("condition"), self.condition));
        out.line(
            1,
            &format!(
                "{}: {}% {}",
                t("probability"),
                self.condition_percent,
                tier_marker(self.condition_tier)
            ),
        );
        out.line(1, &format!("{}: {}", t("severity"), severity_label(self.severity)));
        out.line(1, &self.affected_area);

        out.section(t("riskAssessment"));
        out.line(1, &format!("{}: {}", t("risk"), level_label(self.risk_level)));
        for factor in &self.risk_factors {
            out.line(2, &format!("- {factor}"));
        }
        if !self.monitoring.is_empty() {
            out.line(1, &self.monitoring);
        }

        if !self.recommendations.is_empty() {
            out.section(t("recommendations"));
            for recommendation in &self.recommendations {
                out.line(
                    1,
                    &format!(
                        "- [{}/{}] {}",
                        recommendation_label(recommendation.kind),
                        level_label(recommendation.priority),
                        recommendation.action
                    ),
                );
            }
        }

        out.section(&format!("{}: {}%", t("confidenceLevel"), self.confidence));
        out.disclaimer(&self.disclaimer);
        out.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Symptoms(SymptomReport),
    Image(ImageReport),
}

impl Report {
    pub fn build(result: &AnalysisResult, localizer: Localizer) -> Self {
        match result {
            AnalysisResult::Symptoms(analysis) => {
                Report::Symptoms(SymptomReport::build(analysis, localizer))
            }
            AnalysisResult::Image(analysis) => Report::Image(ImageReport::build(analysis, localizer)),
        }
    }

    pub fn disclaimer(&self) -> &Disclaimer {
        match self {
            Report::Symptoms(report) => &report.disclaimer,
            Report::Image(report) => &report.disclaimer,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Report::Symptoms(report) => report.to_text(),
            Report::Image(report) => report.to_text(),
        }
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Mild => "mild",
        Severity::Moderate => "moderate",
        Severity::Severe => "severe",
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Low => "low",
        Level::Medium => "medium",
        Level::High => "high",
    }
}

fn quality_label(quality: QualityRating) -> &'static str {
    match quality {
        QualityRating::Good => "good",
        QualityRating::Fair => "fair",
        QualityRating::Poor => "poor",
    }
}

fn recommendation_label(kind: RecommendationType) -> &'static str {
    match kind {
        RecommendationType::Immediate => "immediate",
        RecommendationType::Lifestyle => "lifestyle",
        RecommendationType::Medical => "medical",
    }
}

fn tier_marker(tier: Level) -> &'static str {
    match tier {
        Level::High => "(!!)",
        Level::Medium => "(!)",
        Level::Low => "",
    }
}

fn quality_marker(tier: QualityRating) -> &'static str {
    match tier {
        QualityRating::Good => "[+]",
        QualityRating::Fair => "[~]",
        QualityRating::Poor => "[-]",
    }
}

/// Plain-text writer. RTL lines start with a right-to-left mark so terminals
/// with bidi support align them to the right.
struct TextBlock {
    direction: TextDirection,
    out: String,
}

impl TextBlock {
    const RLM: char = '\u{200f}';

    fn new(direction: TextDirection) -> Self {
        Self {
            direction,
            out: String::new(),
        }
    }

    fn raw(&mut self, indent: usize, text: &str) {
        if self.direction == TextDirection::Rtl {
            self.out.push(Self::RLM);
        }
        let _ = writeln!(self.out, "{:width$}{text}", "", width = indent * 2);
    }

    fn heading(&mut self, text: &str) {
        self.raw(0, &format!("== {text} =="));
    }

    fn section(&mut self, text: &str) {
        self.out.push('\n');
        self.raw(0, text);
    }

    fn line(&mut self, indent: usize, text: &str) {
        self.raw(indent, text);
    }

    fn disclaimer(&mut self, disclaimer: &Disclaimer) {
        self.section(disclaimer.heading);
        self.raw(1, disclaimer.text);
    }

    fn finish(self) -> String {
        self.out
    }
}
