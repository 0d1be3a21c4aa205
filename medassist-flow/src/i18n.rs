//! Bilingual string table and language selection.
//!
//! The table is opaque data: callers look strings up by key and never branch
//! on language for anything other than text and direction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Language::En => TextDirection::Ltr,
            Language::Ar => TextDirection::Rtl,
        }
    }

    /// The language offered by the header toggle.
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(format!("unsupported language '{other}', expected en or ar")),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

type Table = HashMap<&'static str, &'static str>;

const EN: &[(&str, &str)] = &[
    // header & navigation
    ("appTitle", "Medical AI Assistant"),
    ("appSubtitle", "Intelligent Health Analysis"),
    ("languageToggle", "العربية"),
    ("welcome", "Welcome to Medical AI Assistant"),
    ("appDescription", "Advanced AI-powered health analysis for symptoms and skin conditions"),
    ("getStarted", "Get Started"),
    ("chooseAnalysis", "Choose Analysis Type"),
    ("chooseDesc", "Select the type of medical analysis you need"),
    ("analyzeSymptomsNav", "Analyze Symptoms"),
    ("analyzeSkinNav", "Analyze Skin Condition"),
    ("back", "Back"),
    ("notice", "Important Notice"),
    ("noticeText", "This tool is for informational purposes only and does not replace professional medical advice. Always consult with healthcare professionals for medical concerns."),
    // symptom panel
    ("symptomTitle", "Symptom Analysis"),
    ("symptomDescription", "Describe your symptoms in detail. Our AI will analyze them and provide insights."),
    ("symptomPlaceholder", "Describe your symptoms here... (e.g., \"I have a headache and fever for 2 days\")"),
    ("analyzeSymptoms", "Analyze Symptoms"),
    ("analyzing", "Analyzing..."),
    ("results", "Analysis Results"),
    ("detectedSymptoms", "Detected Symptoms"),
    ("diagnoses", "Potential Conditions"),
    ("recommendations", "Recommendations"),
    ("redFlags", "Important Warnings"),
    ("confidence", "Confidence Score"),
    ("disclaimer", "Medical Disclaimer"),
    ("symptomDisclaimerText", "This analysis is for informational purposes only and does not replace professional medical advice. Please consult with a healthcare professional for proper diagnosis and treatment."),
    ("noSymptoms", "Please describe your symptoms to get an analysis."),
    ("symptomAnalysisError", "Failed to analyze symptoms. Please try again."),
    ("severity", "Severity"),
    ("probability", "Probability"),
    // image panel
    ("imageTitle", "Skin Condition Analysis"),
    ("imageDescription", "Upload a clear image of the skin area you want to analyze. Our AI will examine it for potential conditions."),
    ("uploadButton", "Upload Image"),
    ("analyzeImage", "Analyze Image"),
    ("analyzingImage", "Analyzing Image..."),
    ("imageQuality", "Image Quality Assessment"),
    ("skinCondition", "Skin Condition Analysis"),
    ("riskAssessment", "Risk Assessment"),
    ("confidenceLevel", "Confidence Level"),
    ("imageDisclaimerText", "This analysis is for informational purposes only and does not replace professional medical advice. Please consult with a dermatologist for proper diagnosis and treatment."),
    ("noImage", "Please upload an image to analyze."),
    ("imageAnalysisError", "Failed to analyze image. Please try again."),
    ("invalidFile", "Please upload a valid image file (JPG, PNG, or WebP)."),
    ("fileTooLarge", "File size must be less than 10MB"),
    ("removeImage", "Remove Image"),
    ("quality", "Quality"),
    ("condition", "Condition"),
    ("risk", "Risk Level"),
    ("supportedFormats", "Supported formats: JPG, PNG, WebP (max 10MB)"),
    // quality metrics have no Arabic strings and fall back to these
    ("sharpness", "Sharpness"),
    ("lighting", "Lighting"),
    ("resolution", "Resolution"),
];

const AR: &[(&str, &str)] = &[
    ("appTitle", "مساعد الذكاء الاصطناعي الطبي"),
    ("appSubtitle", "تحليل صحي ذكي"),
    ("languageToggle", "English"),
    ("welcome", "مرحباً بك في مساعد الذكاء الاصطناعي الطبي"),
    ("appDescription", "تحليل صحي متقدم مدعوم بالذكاء الاصطناعي للأعراض والحالات الجلدية"),
    ("getStarted", "ابدأ الآن"),
    ("chooseAnalysis", "اختر نوع التحليل"),
    ("chooseDesc", "اختر نوع التحليل الطبي الذي تحتاجه"),
    ("analyzeSymptomsNav", "تحليل الأعراض"),
    ("analyzeSkinNav", "تحليل الحالة الجلدية"),
    ("back", "رجوع"),
    ("notice", "إشعار مهم"),
    ("noticeText", "هذه الأداة لأغراض إعلامية فقط ولا تحل محل المشورة الطبية المهنية. استشر دائماً أخصائيي الرعاية الصحية للمخاوف الطبية."),
    ("symptomTitle", "تحليل الأعراض"),
    ("symptomDescription", "اوصف أعراضك بالتفصيل. سيقوم الذكاء الاصطناعي بتحليلها وتقديم الرؤى."),
    ("symptomPlaceholder", "اوصف أعراضك هنا... (مثال: \"أعاني من صداع وحمى منذ يومين\")"),
    ("analyzeSymptoms", "تحليل الأعراض"),
    ("analyzing", "جاري التحليل..."),
    ("results", "نتائج التحليل"),
    ("detectedSymptoms", "الأعراض المكتشفة"),
    ("diagnoses", "الحالات المحتملة"),
    ("recommendations", "التوصيات"),
    ("redFlags", "تحذيرات مهمة"),
    ("confidence", "درجة الثقة"),
    ("disclaimer", "إخلاء المسؤولية الطبية"),
    ("symptomDisclaimerText", "هذا التحليل لأغراض إعلامية فقط ولا يحل محل المشورة الطبية المهنية. يرجى استشارة أخصائي رعاية صحية للحصول على التشخيص والعلاج المناسب."),
    ("noSymptoms", "يرجى وصف أعراضك للحصول على التحليل."),
    ("symptomAnalysisError", "فشل في تحليل الأعراض. يرجى المحاولة مرة أخرى."),
    ("severity", "الشدة"),
    ("probability", "الاحتمالية"),
    ("imageTitle", "تحليل الحالات الجلدية"),
    ("imageDescription", "ارفع صورة واضحة لمنطقة الجلد التي تريد تحليلها. سيقوم الذكاء الاصطناعي بفحصها للحالات المحتملة."),
    ("uploadButton", "رفع صورة"),
    ("analyzeImage", "تحليل الصورة"),
    ("analyzingImage", "جاري تحليل الصورة..."),
    ("imageQuality", "تقييم جودة الصورة"),
    ("skinCondition", "تحليل الحالة الجلدية"),
    ("riskAssessment", "تقييم المخاطر"),
    ("confidenceLevel", "مستوى الثقة"),
    ("imageDisclaimerText", "هذا التحليل لأغراض إعلامية فقط ولا يحل محل المشورة الطبية المهنية. يرجى استشارة طبيب الأمراض الجلدية للحصول على التشخيص والعلاج المناسب."),
    ("noImage", "يرجى رفع صورة للتحليل."),
    ("imageAnalysisError", "فشل في تحليل الصورة. يرجى المحاولة مرة أخرى."),
    ("invalidFile", "يرجى رفع ملف صورة صالح (JPG, PNG, أو WebP)."),
    ("fileTooLarge", "يجب أن يكون حجم الملف أقل من 10 ميجابايت"),
    ("removeImage", "إزالة الصورة"),
    ("quality", "الجودة"),
    ("condition", "الحالة"),
    ("risk", "مستوى المخاطر"),
    ("supportedFormats", "الصيغ المدعومة: JPG, PNG, WebP (حد أقصى 10 ميجابايت)"),
];

static CATALOG: LazyLock<HashMap<Language, Table>> = LazyLock::new(|| {
    HashMap::from([
        (Language::En, EN.iter().copied().collect()),
        (Language::Ar, AR.iter().copied().collect()),
    ])
});

/// Look up `key` for `language`, falling back to English and then to the key itself.
pub fn lookup(language: Language, key: &'static str) -> &'static str {
    CATALOG
        .get(&language)
        .and_then(|table| table.get(key))
        .or_else(|| CATALOG.get(&Language::En).and_then(|table| table.get(key)))
        .copied()
        .unwrap_or(key)
}

/// Language-bound view of the catalog, handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localizer {
    language: Language,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    pub fn t(&self, key: &'static str) -> &'static str {
        lookup(self.language, key)
    }
}
