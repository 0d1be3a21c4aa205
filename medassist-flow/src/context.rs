use serde_json::{Map, Value};

use crate::error::{AssistError, Result};
use crate::i18n::{Language, Localizer, TextDirection};

/// Immutable per-panel configuration, handed over at construction.
///
/// Changing the language produces a new context; panels never read ambient
/// globals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelContext {
    language: Language,
    extra_context: Map<String, Value>,
}

impl PanelContext {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            extra_context: Map::new(),
        }
    }

    /// Attach a value sent with every symptom request as `additionalInfo`.
    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl serde::Serialize,
    ) -> Result<Self> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| AssistError::config(format!("extra context '{key}': {e}")))?;
        self.extra_context.insert(key, value);
        Ok(self)
    }

    /// Same context in another language.
    pub fn with_language(&self, language: Language) -> Self {
        Self {
            language,
            extra_context: self.extra_context.clone(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    pub fn localizer(&self) -> Localizer {
        Localizer::new(self.language)
    }

    pub fn extra_context(&self) -> &Map<String, Value> {
        &self.extra_context
    }
}
