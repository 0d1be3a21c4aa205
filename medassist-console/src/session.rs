use medassist_flow::panel::{PanelController, PanelInput};
use medassist_flow::{
    Assistant, Localizer, PanelKind, PanelState, Report, SubmitOutcome, TextDirection, View,
};
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::commands::{Command, HELP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Text front-end over an [`Assistant`]. Every method returns what should be
/// printed; nothing here touches stdout.
pub struct Console {
    app: Assistant,
}

impl Console {
    pub fn new(app: Assistant) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &Assistant {
        &self.app
    }

    pub async fn next_completion(&mut self) -> Option<(PanelKind, bool)> {
        self.app.next_completion().await
    }

    pub fn execute(&mut self, command: Command) -> (Flow, String) {
        let output = match command {
            Command::Quit => return (Flow::Quit, String::new()),
            Command::Help => HELP.to_string(),
            Command::Show => self.render(),
            Command::Go(view) => {
                self.app.navigate(view);
                self.render()
            }
            Command::Back => {
                let up = match self.app.view() {
                    View::Symptoms | View::Skin => View::Choose,
                    View::Choose | View::Home => View::Home,
                };
                self.app.navigate(up);
                self.render()
            }
            Command::Lang(language) => {
                match language {
                    Some(language) => self.app.set_language(language),
                    None => {
                        self.app.toggle_language();
                    }
                }
                self.render()
            }
            Command::Text(text) => match self.app.view() {
                View::Symptoms => {
                    self.app.symptoms_mut().set_text(text);
                    self.render()
                }
                _ => open_panel_hint(),
            },
            Command::Image(path) => match self.app.view() {
                View::Skin => self.stage_image(&path),
                _ => open_panel_hint(),
            },
            Command::Remove => match self.app.view().panel() {
                Some(PanelKind::Symptoms) => {
                    self.app.symptoms_mut().clear();
                    self.render()
                }
                Some(PanelKind::Image) => {
                    self.app.images_mut().clear();
                    self.render()
                }
                None => open_panel_hint(),
            },
            Command::Analyze => match self.app.view().panel() {
                Some(PanelKind::Symptoms) => {
                    let outcome = self.app.symptoms_mut().submit();
                    self.submitted(PanelKind::Symptoms, outcome)
                }
                Some(PanelKind::Image) => {
                    let outcome = self.app.images_mut().submit();
                    self.submitted(PanelKind::Image, outcome)
                }
                None => open_panel_hint(),
            },
            Command::Dismiss => match self.app.view().panel() {
                Some(PanelKind::Symptoms) => {
                    self.app.symptoms_mut().dismiss_notice();
                    self.render()
                }
                Some(PanelKind::Image) => {
                    self.app.images_mut().dismiss_notice();
                    self.render()
                }
                None => open_panel_hint(),
            },
        };
        (Flow::Continue, output)
    }

    /// Output for a routed completion, if the user should see anything.
    pub fn completed(&self, panel: PanelKind, applied: bool) -> Option<String> {
        if !applied {
            return None;
        }
        if self.app.view().panel() == Some(panel) {
            Some(self.render())
        } else {
            debug!(?panel, "Completion applied while panel not shown");
            None
        }
    }

    pub fn render(&self) -> String {
        let t = self.app.localizer();
        let mut screen = Screen::new(t);
        screen.line(&format!("{} | {}", t.t("appTitle"), t.t("appSubtitle")));
        screen.line(&format!("[lang] {}", t.t("languageToggle")));
        screen.blank();
        screen.title(t.t(self.app.view().title_key()));

        match self.app.view() {
            View::Home => {
                screen.line(t.t("appDescription"));
                screen.blank();
                screen.line(&format!("{}: {}", t.t("notice"), t.t("noticeText")));
                screen.blank();
                screen.line(&format!("[start] {}", t.t("getStarted")));
            }
            View::Choose => {
                screen.line(t.t("chooseDesc"));
                screen.line(&format!("[go symptoms] {}", t.t("analyzeSymptomsNav")));
                screen.line(&format!("[go skin] {}", t.t("analyzeSkinNav")));
                screen.line(&format!("[back] {}", t.t("back")));
            }
            View::Symptoms => {
                let panel = self.app.symptoms();
                screen.line(t.t("symptomDescription"));
                screen.blank();
                if panel.text().trim().is_empty() {
                    screen.line(&format!("> {}", t.t("symptomPlaceholder")));
                } else {
                    screen.line(&format!("> {}", panel.text()));
                }
                self.panel_body(&mut screen, panel, "analyzeSymptoms", "analyzing");
            }
            View::Skin => {
                let panel = self.app.images();
                screen.line(t.t("imageDescription"));
                screen.line(t.t("supportedFormats"));
                screen.blank();
                match panel.staged_image() {
                    Some(image) => screen.line(&format!(
                        "> {} ({}, {} KB) [remove] {}",
                        image.file_name.as_deref().unwrap_or("image"),
                        image.mime_type,
                        image.size_bytes().div_ceil(1024),
                        t.t("removeImage")
                    )),
                    None => screen.line(&format!("[image <path>] {}", t.t("uploadButton"))),
                }
                self.panel_body(&mut screen, panel, "analyzeImage", "analyzingImage");
            }
        }

        screen.finish()
    }

    fn panel_body<I: PanelInput>(
        &self,
        screen: &mut Screen,
        panel: &PanelController<I>,
        submit_key: &'static str,
        busy_key: &'static str,
    ) {
        let t = self.app.localizer();
        screen.blank();
        if panel.is_busy() {
            screen.line(&format!("... {}", t.t(busy_key)));
        } else if panel.can_submit() {
            screen.line(&format!("[analyze] {}", t.t(submit_key)));
        }

        if let Some(notice) = panel.notice_text() {
            screen.blank();
            screen.line(&format!("! {notice} [dismiss]"));
        }

        if let PanelState::Success(held) = panel.state() {
            screen.blank();
            screen.raw(&Report::build(&held.result, t).to_text());
        }
    }

    fn stage_image(&mut self, path: &std::path::Path) -> String {
        match self.app.images_mut().stage_path(path) {
            Ok(_) => {}
            Err(e) if e.is_validation() => {
                debug!(path = %path.display(), "Image not staged: {}", e);
            }
            Err(e) => {
                warn!(path = %path.display(), "Cannot load image: {}", e);
                return format!("! {e}");
            }
        }
        self.render()
    }

    fn submitted(&self, panel: PanelKind, outcome: SubmitOutcome) -> String {
        if let SubmitOutcome::AlreadyInFlight { generation } = outcome {
            debug!(?panel, generation, "Analysis already running");
        }
        self.render()
    }
}

fn open_panel_hint() -> String {
    "open a panel first: go symptoms | go skin".to_string()
}

/// Line buffer that marks right-to-left lines for the terminal.
struct Screen {
    direction: TextDirection,
    out: String,
}

impl Screen {
    fn new(localizer: Localizer) -> Self {
        Self {
            direction: localizer.direction(),
            out: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        if self.direction == TextDirection::Rtl {
            self.out.push('\u{200f}');
        }
        let _ = writeln!(self.out, "{text}");
    }

    fn title(&mut self, text: &str) {
        self.line(&format!("## {text}"));
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Already direction-marked text.
    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parse;
    use medassist_flow::{AnalysisClient, Language, MockBackend, PanelContext};
    use std::sync::Arc;
    use std::time::Duration;

    fn console(language: Language) -> Console {
        let mock = Arc::new(MockBackend::with_latency(Duration::ZERO));
        Console::new(Assistant::new(
            AnalysisClient::new(mock.clone(), mock),
            PanelContext::new(language),
        ))
    }

    fn run(console: &mut Console, line: &str) -> String {
        let command = parse(line).unwrap().unwrap();
        console.execute(command).1
    }

    #[tokio::test]
    async fn test_symptom_session() {
        let mut console = console(Language::En);
        assert!(console.render().contains("Welcome to Medical AI Assistant"));

        run(&mut console, "start");
        run(&mut console, "go symptoms");
        let screen = run(&mut console, "analyze");
        assert!(screen.contains("Please describe your symptoms to get an analysis."));

        run(&mut console, "text I have a headache and fever for 2 days");
        let screen = run(&mut console, "analyze");
        assert!(screen.contains("Analyzing..."));

        let (panel, applied) = console.next_completion().await.unwrap();
        let screen = console.completed(panel, applied).unwrap();
        assert!(screen.contains("Common Cold"));
        assert!(screen.contains("Confidence Score: 75%"));
        assert!(screen.contains("Medical Disclaimer"));
    }

    #[tokio::test]
    async fn test_commands_outside_panel_views() {
        let mut console = console(Language::En);
        assert_eq!(run(&mut console, "analyze"), open_panel_hint());
        assert_eq!(run(&mut console, "text fever"), open_panel_hint());
        assert_eq!(console.execute(Command::Quit).0, Flow::Quit);
    }

    #[tokio::test]
    async fn test_back_walks_up_the_views() {
        let mut console = console(Language::En);
        run(&mut console, "go skin");
        run(&mut console, "back");
        assert_eq!(console.app().view(), View::Choose);
        run(&mut console, "back");
        assert_eq!(console.app().view(), View::Home);
    }

    #[tokio::test]
    async fn test_arabic_screen_is_marked_rtl() {
        let mut console = console(Language::En);
        let screen = run(&mut console, "lang");
        assert_eq!(console.app().language(), Language::Ar);
        assert!(screen.starts_with('\u{200f}'));
        assert!(screen.contains("English"));
    }

    #[tokio::test]
    async fn test_missing_image_file_is_reported() {
        let mut console = console(Language::En);
        run(&mut console, "go skin");
        let out = run(&mut console, "image /nonexistent/rash.png");
        assert!(out.starts_with("! "));
        assert!(console.app().images().staged_image().is_none());
    }

    #[tokio::test]
    async fn test_oversize_image_notice_survives_redraw() {
        let dir = std::env::temp_dir().join(format!("medassist-console-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rash.png");
        std::fs::File::create(&path)
            .unwrap()
            .set_len(12 * 1024 * 1024)
            .unwrap();

        let mut console = console(Language::En);
        run(&mut console, "go skin");
        let screen = run(&mut console, &format!("image {}", path.display()));
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(screen.contains("## Skin Condition Analysis"));
        assert!(screen.contains("! File size must be less than 10MB [dismiss]"));
        assert!(console.app().images().staged_image().is_none());

        let screen = run(&mut console, "show");
        assert!(screen.contains("File size must be less than 10MB"));

        let screen = run(&mut console, "dismiss");
        assert!(!screen.contains("File size must be less than 10MB"));
        assert!(console.app().images().notice().is_none());
    }

    #[tokio::test]
    async fn test_every_view_shows_its_title() {
        let mut console = console(Language::En);
        for (line, view) in [
            ("go home", View::Home),
            ("go choose", View::Choose),
            ("go symptoms", View::Symptoms),
            ("go skin", View::Skin),
        ] {
            let screen = run(&mut console, line);
            let title = console.app().localizer().t(view.title_key());
            assert!(screen.contains(&format!("## {title}")), "{line}");
        }
    }
}
