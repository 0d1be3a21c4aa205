use async_trait::async_trait;
use clap::Parser;
use medassist_flow::{
    AnalysisBackend, AnalysisClient, AnalysisRequest, AnalysisResult, Assistant, ImageFile,
    Language, MockBackend, PanelContext, PanelKind, Report, SubmitOutcome, View,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// A walkthrough of both panels against the mock backend:
// 1. empty symptom text is rejected without a backend call
// 2. a symptom analysis runs, a second submit while it runs is ignored
// 3. leaving the panel mid-analysis discards the late result
// 4. the image panel runs in Arabic
#[derive(Parser, Debug)]
struct Args {
    /// Simulated backend latency
    #[arg(long, default_value_t = 300)]
    latency_ms: u64,

    /// Language for the image panel step
    #[arg(long, default_value = "ar")]
    language: Language,
}

// Wraps another backend and logs what it is asked to do.
// Any AnalysisBackend can be handed to the client the same way.
struct LoggingBackend<B> {
    inner: B,
}

#[async_trait]
impl<B: AnalysisBackend> AnalysisBackend for LoggingBackend<B> {
    fn name(&self) -> &str {
        "logging-mock"
    }

    async fn submit(&self, request: AnalysisRequest) -> medassist_flow::Result<AnalysisResult> {
        info!(kind = ?request.kind(), language = %request.language(), "Backend received request");
        self.inner.submit(request).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let latency = Duration::from_millis(args.latency_ms);
    let backend: Arc<dyn AnalysisBackend> = Arc::new(LoggingBackend {
        inner: MockBackend::with_latency(latency),
    });
    let client = AnalysisClient::new(backend.clone(), backend);
    let mut app = Assistant::new(client, PanelContext::new(Language::En));

    app.navigate(View::Choose);
    app.navigate(View::Symptoms);

    // 1. validation happens before any request is built
    let outcome = app.symptoms_mut().submit();
    println!("empty submit: {outcome:?}");
    println!("notice: {}", app.symptoms().notice_text().unwrap_or("-"));

    // 2. one analysis in flight at a time
    app.symptoms_mut().set_text("I have a headache and fever for 2 days");
    let first = app.symptoms_mut().submit();
    let second = app.symptoms_mut().submit();
    println!("first submit: {first:?}, second submit: {second:?}");

    app.settle(PanelKind::Symptoms).await;
    if let Some(held) = app.symptoms().result() {
        println!("{}", Report::build(&held.result, app.localizer()).to_text());
    }

    // 3. navigating away resets the panel; the pending result never lands
    app.symptoms_mut().set_text("sore throat and cough");
    if let SubmitOutcome::Started { generation } = app.symptoms_mut().submit() {
        println!("started generation {generation}, leaving the panel");
    }
    app.navigate(View::Home);
    tokio::time::sleep(latency * 2).await;
    println!(
        "completions applied after leaving: {}, symptom state: {:?}",
        app.pump(),
        app.symptoms().state()
    );

    // 4. image panel in the requested language
    app.set_language(args.language);
    app.navigate(View::Skin);
    let mime = app
        .images_mut()
        .stage_image(ImageFile::new(
            Some("forearm.jpg".to_string()),
            "image/jpeg",
            vec![0xff, 0xd8, 0xff, 0xe0],
        ))?;
    println!("staged {mime:?}");

    app.images_mut().submit();
    app.settle(PanelKind::Image).await;
    if let Some(held) = app.images().result() {
        println!("{}", Report::build(&held.result, app.localizer()).to_text());
    }

    Ok(())
}
