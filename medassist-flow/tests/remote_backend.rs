#![cfg(feature = "remote")]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use medassist_flow::{
    AnalysisBackend, AnalysisClient, AnalysisRequest, Assistant, AssistError, ImageFile,
    ImageMime, ImageRequest, Language, MockBackend, PanelContext, PanelKind, PanelState,
    RemoteBackend, SymptomRequest, View,
};

#[derive(Clone, Default)]
struct Received {
    bodies: Arc<Mutex<Vec<Value>>>,
    flaky_calls: Arc<AtomicUsize>,
}

async fn record(State(received): State<Received>, Json(body): Json<Value>) {
    received.bodies.lock().await.push(body);
}

async fn symptoms_ok(state: State<Received>, body: Json<Value>) -> Json<Value> {
    record(state, body).await;
    Json(json!({
        "success": true,
        "data": {
            "potentialDiagnoses": [{
                "condition": "Common Cold",
                "probability": 0.6,
                "description": "Viral infection of the upper airway",
                "icd10Code": "J00"
            }],
            "confidenceScore": 0.75
        }
    }))
}

async fn image_ok(state: State<Received>, body: Json<Value>) -> Json<Value> {
    record(state, body).await;
    Json(json!({
        "success": true,
        "data": {
            "imageQuality": {"overall": "fair", "sharpness": 70, "lighting": 65, "resolution": 90},
            "skinConditionAnalysis": {
                "primaryCondition": "Eczema",
                "probability": 0.55,
                "severity": "mild",
                "affectedArea": "left_forearm"
            },
            "recommendations": [],
            "riskAssessment": {"level": "medium", "factors": [], "monitoring": "Recheck in 2 weeks"},
            "confidenceScore": 0.64
        }
    }))
}

/// Succeeds once, then fails with HTTP 500.
async fn flaky(state: State<Received>, body: Json<Value>) -> (StatusCode, Json<Value>) {
    if state.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        let Json(ok) = symptoms_ok(state, body).await;
        return (StatusCode::OK, Json(ok));
    }
    boom().await
}

async fn refused() -> Json<Value> {
    Json(json!({
        "success": false,
        "error": {"message": "Symptoms text is required", "code": "VALIDATION_ERROR"}
    }))
}

async fn boom() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "error": {"message": "Analysis failed"}})),
    )
}

async fn flattened() -> Json<Value> {
    Json(json!({
        "success": true,
        "redFlags": [{"condition": "chest_pain", "action": "Seek emergency care immediately"}],
        "confidenceScore": 0.9,
        "timestamp": "2024-05-01T10:00:00"
    }))
}

async fn garbage() -> &'static str {
    "<html>gateway</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"success": true, "data": {}}))
}

async fn spawn_server() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/symptoms", post(symptoms_ok))
        .route("/image", post(image_ok))
        .route("/flaky", post(flaky))
        .route("/refused", post(refused))
        .route("/boom", post(boom))
        .route("/flattened", post(flattened))
        .route("/garbage", post(garbage))
        .route("/slow", post(slow))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received)
}

fn symptoms(text: &str) -> AnalysisRequest {
    let mut extra = serde_json::Map::new();
    extra.insert("age".into(), json!(34));
    AnalysisRequest::Symptoms(SymptomRequest {
        free_text: text.to_string(),
        language: Language::Ar,
        extra_context: extra,
    })
}

fn backend(base: &str, path: &str) -> RemoteBackend {
    RemoteBackend::new(format!("{base}{path}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_symptom_success_and_request_body() -> anyhow::Result<()> {
    let (base, received) = spawn_server().await;

    let result = backend(&base, "/symptoms")
        .submit(symptoms("I have a headache and fever for 2 days"))
        .await?;

    let analysis = result.as_symptoms().unwrap();
    let diagnoses = analysis.potential_diagnoses.as_ref().unwrap();
    assert_eq!(diagnoses[0].icd10_code.as_deref(), Some("J00"));
    assert_eq!(analysis.confidence_score, Some(0.75));

    let bodies = received.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "symptoms": "I have a headache and fever for 2 days",
            "language": "ar",
            "additionalInfo": {"age": 34}
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_image_request_is_base64_with_mime_and_language() -> anyhow::Result<()> {
    let (base, received) = spawn_server().await;

    let request = AnalysisRequest::Image(ImageRequest {
        image: ImageFile::new(Some("arm.png".into()), "image/png", b"png!".to_vec()),
        mime: ImageMime::Png,
        language: Language::En,
    });
    let result = backend(&base, "/image").submit(request).await?;

    let analysis = result.as_image().unwrap();
    assert_eq!(analysis.skin_condition_analysis.primary_condition, "Eczema");

    let bodies = received.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({"image": "cG5nIQ==", "mimeType": "image/png", "language": "en"})
    );
    Ok(())
}

#[tokio::test]
async fn test_success_false_is_backend_failure() {
    let (base, _) = spawn_server().await;

    let err = backend(&base, "/refused")
        .submit(symptoms("fever"))
        .await
        .unwrap_err();

    assert_eq!(err, AssistError::backend("Symptoms text is required"));
}

#[tokio::test]
async fn test_http_500_is_backend_failure() {
    let (base, _) = spawn_server().await;

    let err = backend(&base, "/boom")
        .submit(symptoms("fever"))
        .await
        .unwrap_err();

    let AssistError::BackendFailure { message } = err else {
        panic!("expected backend failure, got {err:?}");
    };
    assert!(message.starts_with("HTTP 500"));
    assert!(message.contains("Analysis failed"));
}

#[tokio::test]
async fn test_flattened_envelope_is_accepted() -> anyhow::Result<()> {
    let (base, _) = spawn_server().await;

    let result = backend(&base, "/flattened").submit(symptoms("chest pain")).await?;

    let analysis = result.as_symptoms().unwrap();
    assert_eq!(analysis.red_flags.as_ref().unwrap()[0].condition, "chest_pain");
    assert_eq!(analysis.confidence_score, Some(0.9));
    assert!(analysis.potential_diagnoses.is_none());
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_is_backend_failure() {
    let (base, _) = spawn_server().await;

    let err = backend(&base, "/garbage")
        .submit(symptoms("fever"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistError::BackendFailure { .. }));
}

#[tokio::test]
async fn test_closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = RemoteBackend::new(format!("http://{addr}/symptoms"), Duration::from_secs(2))
        .unwrap()
        .submit(symptoms("fever"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistError::Unreachable { .. }));
}

#[tokio::test]
async fn test_timeout_is_unreachable() {
    let (base, _) = spawn_server().await;

    let err = RemoteBackend::new(format!("{base}/slow"), Duration::from_millis(200))
        .unwrap()
        .submit(symptoms("fever"))
        .await
        .unwrap_err();

    let AssistError::Unreachable { reason } = err else {
        panic!("expected unreachable, got {err:?}");
    };
    assert!(reason.contains("timed out"));
}

#[tokio::test]
async fn test_http_500_after_success_clears_previous_result() {
    let (base, _) = spawn_server().await;
    let client = AnalysisClient::new(
        Arc::new(backend(&base, "/flaky")),
        Arc::new(MockBackend::with_latency(Duration::ZERO)),
    );
    let mut app = Assistant::new(client, PanelContext::new(Language::En));
    app.navigate(View::Symptoms);

    app.symptoms_mut().set_text("I have a headache and fever for 2 days");
    app.symptoms_mut().submit();
    app.settle(PanelKind::Symptoms).await;
    assert!(app.symptoms().result().is_some());

    app.symptoms_mut().submit();
    assert!(app.symptoms().result().is_none());
    app.settle(PanelKind::Symptoms).await;

    assert!(matches!(
        app.symptoms().state(),
        PanelState::Failure(AssistError::BackendFailure { .. })
    ));
    assert!(app.symptoms().result().is_none());
    assert_eq!(
        app.symptoms().notice_text(),
        Some("Failed to analyze symptoms. Please try again.")
    );
}
