pub mod app;
pub mod backend;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod models;
pub mod navigation;
pub mod panel;
#[cfg(feature = "remote")]
pub mod remote;
pub mod render;
pub mod validation;

// Re-export commonly used types
pub use app::Assistant;
pub use backend::{AnalysisBackend, MockBackend};
pub use client::AnalysisClient;
pub use config::{ClientConfig, ImageBackendKind};
pub use context::PanelContext;
pub use error::{AssistError, ErrorKind, Result};
pub use i18n::{Language, Localizer, TextDirection};
pub use models::{
    AnalysisRequest, AnalysisResult, ImageAnalysis, ImageFile, ImageRequest, SymptomAnalysis,
    SymptomRequest,
};
pub use navigation::{Navigator, View};
pub use panel::{
    Completion, ImagePanel, PanelKind, PanelState, SubmitOutcome, SymptomPanel,
};
#[cfg(feature = "remote")]
pub use remote::RemoteBackend;
pub use render::Report;
pub use validation::{ImageMime, MAX_IMAGE_BYTES};
