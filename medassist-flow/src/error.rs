use thiserror::Error;

use crate::panel::PanelKind;

/// Errors surfaced by validation, the analysis client and configuration loading.
///
/// The first five variants are the panel-level kinds; every one of them is
/// recovered at the panel boundary and rendered as a notice. `Config` and `Io`
/// only occur while wiring the client at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Unsupported image type: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("Image is {size_bytes} bytes, limit is {limit_bytes}")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Analysis backend failed: {message}")]
    BackendFailure { message: String },

    #[error("Analysis backend unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Discriminant of [`AssistError`] without payload, for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    UnsupportedType,
    TooLarge,
    BackendFailure,
    Unreachable,
    Config,
}

pub type Result<T> = std::result::Result<T, AssistError>;

impl AssistError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendFailure {
            message: message.into(),
        }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable {
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::BackendFailure { .. } => ErrorKind::BackendFailure,
            Self::Unreachable { .. } => ErrorKind::Unreachable,
            Self::Config(_) | Self::Io(_) => ErrorKind::Config,
        }
    }

    /// True for errors raised before any backend was contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::UnsupportedType { .. } | Self::TooLarge { .. }
        )
    }

    /// Localization key of the notice shown to the user for this error.
    ///
    /// Backend and network failures all collapse to the panel's generic
    /// failure string; their raw text only goes to the log.
    pub fn notice_key(&self, panel: PanelKind) -> &'static str {
        match (self, panel) {
            (Self::EmptyInput, PanelKind::Symptoms) => "noSymptoms",
            (Self::EmptyInput, PanelKind::Image) => "noImage",
            (Self::UnsupportedType { .. }, _) => "invalidFile",
            (Self::TooLarge { .. }, _) => "fileTooLarge",
            (_, PanelKind::Symptoms) => "symptomAnalysisError",
            (_, PanelKind::Image) => "imageAnalysisError",
        }
    }
}

impl From<std::io::Error> for AssistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
