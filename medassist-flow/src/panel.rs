//! Per-panel view-state controller.
//!
//! ```text
//! Idle ──submit (valid)──▶ Submitting ──completion──▶ Success | Failure
//!  ▲                            │                         │
//!  └──────── clear ─────────────┴───── edit / clear ──────┘
//! ```
//!
//! Each accepted submit bumps a generation counter and spawns one analysis
//! task. The task reports back through a [`Completion`] carrying that
//! generation; anything that does not match the generation currently in
//! flight is dropped.

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::client::AnalysisClient;
use crate::context::PanelContext;
use crate::error::{AssistError, Result};
use crate::models::{AnalysisRequest, AnalysisResult, ImageFile, ImageRequest, SymptomRequest};
use crate::validation::{self, ImageMime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Symptoms,
    Image,
}

/// A finished analysis as held by its panel.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldResult {
    pub result: Arc<AnalysisResult>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Submitting { generation: u64 },
    Success(HeldResult),
    Failure(AssistError),
}

/// Message sent by an analysis task when its backend call returns.
#[derive(Debug)]
pub struct Completion {
    pub panel: PanelKind,
    pub generation: u64,
    pub outcome: Result<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed and an analysis task was spawned.
    Started { generation: u64 },
    /// An analysis is already running; nothing was sent.
    AlreadyInFlight { generation: u64 },
    /// Validation failed; the backend was not contacted.
    Rejected(AssistError),
}

/// What a panel collects from the user and how it becomes a request.
pub trait PanelInput: Default + Send + 'static {
    const KIND: PanelKind;

    fn is_blank(&self) -> bool;

    /// Validate the current input and build a fresh request from it.
    fn to_request(&self, context: &PanelContext) -> Result<AnalysisRequest>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomInput {
    text: String,
}

impl PanelInput for SymptomInput {
    const KIND: PanelKind = PanelKind::Symptoms;

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn to_request(&self, context: &PanelContext) -> Result<AnalysisRequest> {
        let text = validation::validate_text(&self.text)?;
        Ok(AnalysisRequest::Symptoms(SymptomRequest {
            free_text: text.to_string(),
            language: context.language(),
            extra_context: context.extra_context().clone(),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInput {
    staged: Option<ImageFile>,
}

impl PanelInput for ImageInput {
    const KIND: PanelKind = PanelKind::Image;

    fn is_blank(&self) -> bool {
        self.staged.is_none()
    }

    fn to_request(&self, context: &PanelContext) -> Result<AnalysisRequest> {
        let image = self.staged.as_ref().ok_or(AssistError::EmptyInput)?;
        let mime = validation::validate_image(image)?;
        Ok(AnalysisRequest::Image(ImageRequest {
            image: image.clone(),
            mime,
            language: context.language(),
        }))
    }
}

pub type SymptomPanel = PanelController<SymptomInput>;
pub type ImagePanel = PanelController<ImageInput>;

pub struct PanelController<I: PanelInput> {
    context: Arc<PanelContext>,
    client: AnalysisClient,
    completions: UnboundedSender<Completion>,
    input: I,
    state: PanelState,
    notice: Option<AssistError>,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl<I: PanelInput> PanelController<I> {
    pub fn new(
        context: Arc<PanelContext>,
        client: AnalysisClient,
        completions: UnboundedSender<Completion>,
    ) -> Self {
        Self {
            context,
            client,
            completions,
            input: I::default(),
            state: PanelState::Idle,
            notice: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn kind(&self) -> PanelKind {
        I::KIND
    }

    pub fn context(&self) -> &PanelContext {
        &self.context
    }

    /// Swap in a new context. Held input, state and result are untouched.
    pub fn set_context(&mut self, context: Arc<PanelContext>) {
        self.context = context;
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, PanelState::Submitting { .. })
    }

    /// Whether the submit control should be active.
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && !self.input.is_blank()
    }

    pub fn result(&self) -> Option<&HeldResult> {
        match &self.state {
            PanelState::Success(held) => Some(held),
            _ => None,
        }
    }

    /// Error currently shown as an inline notice, if not dismissed.
    pub fn notice(&self) -> Option<&AssistError> {
        self.notice.as_ref()
    }

    /// Localized text of the current notice. Never contains backend text.
    pub fn notice_text(&self) -> Option<&'static str> {
        self.notice
            .as_ref()
            .map(|error| self.context.localizer().t(error.notice_key(I::KIND)))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if let PanelState::Submitting { generation } = self.state {
            debug!(panel = ?I::KIND, generation, "Submit ignored, analysis in flight");
            return SubmitOutcome::AlreadyInFlight { generation };
        }

        let request = match self.input.to_request(&self.context) {
            Ok(request) => request,
            Err(error) => {
                debug!(panel = ?I::KIND, "Submit rejected: {}", error);
                self.notice = Some(error.clone());
                return SubmitOutcome::Rejected(error);
            }
        };

        self.generation += 1;
        let generation = self.generation;
        self.notice = None;
        self.state = PanelState::Submitting { generation };

        let client = self.client.clone();
        let completions = self.completions.clone();
        let panel = I::KIND;
        let handle = tokio::spawn(async move {
            let outcome = client.submit(request).await;
            if completions
                .send(Completion {
                    panel,
                    generation,
                    outcome,
                })
                .is_err()
            {
                debug!(?panel, generation, "Completion dropped, receiver closed");
            }
        });
        self.in_flight = Some(handle.abort_handle());

        info!(panel = ?I::KIND, generation, "Analysis submitted");
        SubmitOutcome::Started { generation }
    }

    /// Apply a completion. Returns `false` when it was stale and ignored.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let current = match self.state {
            PanelState::Submitting { generation } => Some(generation),
            _ => None,
        };

        if completion.panel != I::KIND || current != Some(completion.generation) {
            debug!(
                panel = ?I::KIND,
                generation = completion.generation,
                current = ?current,
                "Discarding stale completion"
            );
            return false;
        }

        self.in_flight = None;
        match completion.outcome {
            Ok(result) => {
                self.notice = None;
                self.state = PanelState::Success(HeldResult {
                    result: Arc::new(result),
                    completed_at: Utc::now(),
                });
            }
            Err(error) => {
                self.notice = Some(error.clone());
                self.state = PanelState::Failure(error);
            }
        }
        true
    }

    /// Explicit remove: drop input and result, cancel any in-flight analysis.
    pub fn clear(&mut self) {
        self.input = I::default();
        self.reset();
    }

    /// Back to `Idle`, keeping the input. In-flight work is cancelled and any
    /// completion already queued becomes stale.
    pub fn reset(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            debug!(panel = ?I::KIND, generation = self.generation, "Cancelled in-flight analysis");
        }
        self.generation += 1;
        self.notice = None;
        self.state = PanelState::Idle;
    }

    /// An edit drops a terminal state; an in-flight analysis keeps running.
    fn input_changed(&mut self) {
        if matches!(self.state, PanelState::Success(_) | PanelState::Failure(_)) {
            self.notice = None;
            self.state = PanelState::Idle;
        }
    }
}

impl PanelController<SymptomInput> {
    pub fn text(&self) -> &str {
        &self.input.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.input.text {
            self.input.text = text;
            self.input_changed();
        }
    }
}

impl PanelController<ImageInput> {
    pub fn staged_image(&self) -> Option<&ImageFile> {
        self.input.staged.as_ref()
    }

    /// Validate and stage an image. Invalid images are not staged; the
    /// previous one, if any, stays.
    pub fn stage_image(&mut self, file: ImageFile) -> Result<ImageMime> {
        match validation::validate_image(&file) {
            Ok(mime) => {
                self.notice = None;
                self.input.staged = Some(file);
                self.input_changed();
                Ok(mime)
            }
            Err(error) => {
                self.notice = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Load and stage an image from disk. A file rejected on size or type
    /// leaves the same notice as [`Self::stage_image`]; read failures are
    /// returned without one.
    pub fn stage_path(&mut self, path: impl AsRef<Path>) -> Result<ImageMime> {
        match ImageFile::from_path(path) {
            Ok(file) => self.stage_image(file),
            Err(error) => {
                if error.is_validation() {
                    self.notice = Some(error.clone());
                }
                Err(error)
            }
        }
    }
}

impl<I: PanelInput> Drop for PanelController<I> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
