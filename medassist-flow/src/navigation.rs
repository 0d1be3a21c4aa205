use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AssistError;
use crate::panel::PanelKind;

/// Top-level pages. There is no routing beyond this set and no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Choose,
    Symptoms,
    Skin,
}

impl View {
    pub const ALL: [View; 4] = [View::Home, View::Choose, View::Symptoms, View::Skin];

    /// The panel hosted by this view, if any.
    pub fn panel(self) -> Option<PanelKind> {
        match self {
            View::Symptoms => Some(PanelKind::Symptoms),
            View::Skin => Some(PanelKind::Image),
            View::Home | View::Choose => None,
        }
    }

    /// Localization key of the view heading.
    pub fn title_key(self) -> &'static str {
        match self {
            View::Home => "welcome",
            View::Choose => "chooseAnalysis",
            View::Symptoms => "symptomTitle",
            View::Skin => "imageTitle",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Choose => "choose",
            View::Symptoms => "symptoms",
            View::Skin => "skin",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        View::ALL
            .into_iter()
            .find(|view| view.as_str() == wanted)
            .ok_or_else(|| AssistError::config(format!("unknown view: {s}")))
    }
}

/// A single jump between views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: View,
    pub to: View,
}

impl Transition {
    /// Panel whose view was left by this jump.
    pub fn left_panel(&self) -> Option<PanelKind> {
        if self.from == self.to {
            return None;
        }
        self.from.panel()
    }
}

/// Current page selection. Every jump is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: View,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn go(&mut self, to: View) -> Transition {
        let from = std::mem::replace(&mut self.current, to);
        Transition { from, to }
    }
}
