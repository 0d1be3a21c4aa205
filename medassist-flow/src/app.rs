//! The assistant shell: navigation, language and both panels in one place.

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::client::AnalysisClient;
use crate::context::PanelContext;
use crate::i18n::{Language, Localizer};
use crate::navigation::{Navigator, Transition, View};
use crate::panel::{Completion, ImagePanel, PanelKind, SymptomPanel};

pub struct Assistant {
    navigator: Navigator,
    context: Arc<PanelContext>,
    symptoms: SymptomPanel,
    images: ImagePanel,
    completions: UnboundedReceiver<Completion>,
}

impl Assistant {
    pub fn new(client: AnalysisClient, context: PanelContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let context = Arc::new(context);
        Self {
            navigator: Navigator::new(),
            symptoms: SymptomPanel::new(context.clone(), client.clone(), tx.clone()),
            images: ImagePanel::new(context.clone(), client, tx),
            context,
            completions: rx,
        }
    }

    pub fn view(&self) -> View {
        self.navigator.current()
    }

    /// Jump to `to`. Leaving a panel view resets that panel.
    pub fn navigate(&mut self, to: View) -> Transition {
        let transition = self.navigator.go(to);
        match transition.left_panel() {
            Some(PanelKind::Symptoms) => self.symptoms.reset(),
            Some(PanelKind::Image) => self.images.reset(),
            None => {}
        }
        debug!(from = %transition.from, to = %transition.to, "Navigated");
        transition
    }

    pub fn context(&self) -> &PanelContext {
        &self.context
    }

    pub fn language(&self) -> Language {
        self.context.language()
    }

    pub fn localizer(&self) -> Localizer {
        self.context.localizer()
    }

    /// Rebuild the panel context in `language`. Panel state is left alone.
    pub fn set_language(&mut self, language: Language) {
        if language == self.context.language() {
            return;
        }
        let context = Arc::new(self.context.with_language(language));
        self.symptoms.set_context(context.clone());
        self.images.set_context(context.clone());
        self.context = context;
        info!(language = language.code(), "Language changed");
    }

    pub fn toggle_language(&mut self) -> Language {
        let next = self.language().toggle();
        self.set_language(next);
        next
    }

    pub fn symptoms(&self) -> &SymptomPanel {
        &self.symptoms
    }

    pub fn symptoms_mut(&mut self) -> &mut SymptomPanel {
        &mut self.symptoms
    }

    pub fn images(&self) -> &ImagePanel {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImagePanel {
        &mut self.images
    }

    pub fn is_busy(&self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Symptoms => self.symptoms.is_busy(),
            PanelKind::Image => self.images.is_busy(),
        }
    }

    /// Hand a completion to its panel. Returns whether it was applied.
    pub fn route(&mut self, completion: Completion) -> bool {
        match completion.panel {
            PanelKind::Symptoms => self.symptoms.apply(completion),
            PanelKind::Image => self.images.apply(completion),
        }
    }

    /// Apply every completion already queued, without waiting.
    /// Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions.try_recv() {
            if self.route(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion and route it.
    ///
    /// Returns the panel it belonged to and whether it was applied.
    pub async fn next_completion(&mut self) -> Option<(PanelKind, bool)> {
        let completion = self.completions.recv().await?;
        let panel = completion.panel;
        Some((panel, self.route(completion)))
    }

    /// Wait until `panel` leaves `Submitting`.
    pub async fn settle(&mut self, panel: PanelKind) {
        while self.is_busy(panel) {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::i18n::TextDirection;
    use crate::models::ImageFile;
    use crate::panel::{PanelState, SubmitOutcome};
    use std::time::Duration;

    fn assistant(latency: Duration) -> Assistant {
        let backend = Arc::new(MockBackend::with_latency(latency));
        Assistant::new(
            AnalysisClient::new(backend.clone(), backend),
            PanelContext::new(Language::En),
        )
    }

    #[tokio::test]
    async fn test_symptom_round_trip_through_shell() {
        let mut app = assistant(Duration::ZERO);
        app.navigate(View::Choose);
        app.navigate(View::Symptoms);
        app.symptoms_mut().set_text("sore throat");
        app.symptoms_mut().submit();

        app.settle(PanelKind::Symptoms).await;

        assert!(app.symptoms().result().is_some());
        assert_eq!(app.images().state(), &PanelState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_panel_discards_in_flight_analysis() {
        let mut app = assistant(Duration::from_secs(3));
        app.navigate(View::Skin);
        app.images_mut()
            .stage_image(ImageFile::new(None, "image/png", vec![0x89, 0x50]))
            .unwrap();
        assert!(matches!(app.images_mut().submit(), SubmitOutcome::Started { .. }));

        app.navigate(View::Home);
        assert_eq!(app.images().state(), &PanelState::Idle);
        assert!(app.images().staged_image().is_some());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(app.pump(), 0);
        assert_eq!(app.images().state(), &PanelState::Idle);
    }

    #[tokio::test]
    async fn test_language_switch_keeps_panel_state() {
        let mut app = assistant(Duration::ZERO);
        app.navigate(View::Symptoms);
        app.symptoms_mut().set_text("صداع");
        app.symptoms_mut().submit();
        app.settle(PanelKind::Symptoms).await;

        assert_eq!(app.toggle_language(), Language::Ar);
        assert_eq!(app.context().direction(), TextDirection::Rtl);
        assert_eq!(app.symptoms().context().language(), Language::Ar);
        assert!(app.symptoms().result().is_some());
        assert_eq!(app.symptoms().text(), "صداع");
    }

    #[tokio::test]
    async fn test_pump_routes_each_completion_to_its_panel() {
        let mut app = assistant(Duration::ZERO);
        app.symptoms_mut().set_text("fever");
        app.symptoms_mut().submit();
        app.images_mut()
            .stage_image(ImageFile::new(None, "image/webp", vec![1, 2, 3]))
            .unwrap();
        app.images_mut().submit();

        while app.is_busy(PanelKind::Symptoms) || app.is_busy(PanelKind::Image) {
            app.next_completion().await;
        }

        assert!(app.symptoms().result().unwrap().result.as_symptoms().is_some());
        assert!(app.images().result().unwrap().result.as_image().is_some());
    }
}
