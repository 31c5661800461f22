//! End-to-end integration tests for DualChat.
//!
//! These tests exercise the full pipeline: ingestion into a persisted
//! vector index, session wiring from config, and the HTTP API answering a
//! prompt in both panels.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dualchat_chat::{Panel, UiNode};
use dualchat_config::{AppConfig, DEFAULT_RAG_PERSONA};
use dualchat_core::error::{CompletionError, EmbeddingError, SynthesisError};
use dualchat_core::knowledge::KnowledgeBase;
use dualchat_core::message::Audio;
use dualchat_core::provider::{ChatModel, Completion, CompletionRequest, Embedder};
use dualchat_core::speech::TextToSpeech;
use dualchat_gateway::{ApiV1State, Blueprint, build_router};
use dualchat_knowledge::{FileIndex, Ingestor};
use dualchat_providers::Services;
use http_body_util::BodyExt;
use tower::ServiceExt;

const BAGGAGE_PROMPT: &str = "What is your baggage allowance?";

// ── Mock services ────────────────────────────────────────────────────────

/// Records every request and answers with a fixed text.
#[derive(Default)]
struct RecordingModel {
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingModel {
    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        self.requests.lock().unwrap().push(request);
        Ok(Completion {
            text: "You may check one bag of up to 23kg.".into(),
            model: "mock".into(),
            usage: None,
        })
    }
}

/// Two-topic embedding: [baggage, lounges, bias].
struct KeywordEmbedder;

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let has = |w: &str| if lower.contains(w) { 1.0 } else { 0.0 };
    vec![has("bag"), has("lounge"), 0.1]
}

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(keyword_vector(text))
    }
}

#[derive(Default)]
struct CountingSpeech {
    calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl TextToSpeech for CountingSpeech {
    fn name(&self) -> &str {
        "counting"
    }

    async fn synthesize(&self, text: &str) -> Result<Audio, SynthesisError> {
        *self.calls.lock().unwrap() += 1;
        Ok(Audio {
            bytes: text.as_bytes().to_vec(),
            mime_type: "audio/mpeg".into(),
        })
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    config: AppConfig,
    model: Arc<RecordingModel>,
    speech: Arc<CountingSpeech>,
    services: Services,
}

fn harness() -> Harness {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.knowledge_base.path = dir.path().join("index").join("index.jsonl");

    let model = Arc::new(RecordingModel::default());
    let speech = Arc::new(CountingSpeech::default());
    let services = Services {
        chat: model.clone(),
        embedder: Arc::new(KeywordEmbedder),
        speech: Some(speech.clone()),
    };

    Harness {
        _dir: dir,
        config,
        model,
        speech,
        services,
    }
}

async fn ingest_baggage(h: &Harness) {
    let source = h.config.knowledge_base.path.with_file_name("baggage.jsonl");
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    std::fs::write(
        &source,
        concat!(
            r#"{"content": "Economy passengers may check one bag of up to 23kg.", "metadata": {"url": "https://www.britishairways.com/baggage/checked", "title": "Checked baggage"}}"#,
            "\n",
            r#"{"content": "Business passengers may check two bags of up to 23kg each.", "metadata": {"url": "https://www.britishairways.com/baggage/checked"}}"#,
            "\n",
            r#"{"content": "Cabin bags may weigh up to 23kg.", "metadata": {"url": "https://www.britishairways.com/baggage/cabin"}}"#,
            "\n",
        ),
    )
    .unwrap();

    let index = FileIndex::open(&h.config.knowledge_base.path);
    let ingestor = Ingestor::new(h.services.embedder.clone(), h.config.knowledge_base.chunk_size);
    let report = ingestor.ingest(&[source], None, &index).await.unwrap();
    assert_eq!(report.chunks, 3);
}

fn app(h: &Harness) -> axum::Router {
    // reopen from disk, as `dualchat serve` does at startup
    let index: Arc<dyn KnowledgeBase> = Arc::new(FileIndex::open(&h.config.knowledge_base.path));
    let blueprint = Blueprint::from_config(&h.config, &h.services, index);
    build_router(Arc::new(ApiV1State::new(blueprint)))
}

async fn post_prompt(
    app: axum::Router,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/chats/e2e-client")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn panels(json: &serde_json::Value) -> Vec<Panel> {
    serde_json::from_value(json["panels"].clone()).unwrap()
}

fn links(panel: &Panel) -> Vec<String> {
    panel
        .nodes
        .iter()
        .filter_map(|n| match n {
            UiNode::Link { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect()
}

// ── E2E: Baggage question through both panels ───────────────────────────

#[tokio::test]
async fn e2e_baggage_question_answered_by_both_panels() {
    let h = harness();
    ingest_baggage(&h).await;

    let (status, json) = post_prompt(
        app(&h),
        serde_json::json!({"prompt": BAGGAGE_PROMPT, "voice_on": false, "sessions": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let panels = panels(&json);
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0].id, "gpt");
    assert_eq!(panels[1].id, "rag");

    // Basic panel: plain answer, no citations
    assert!(links(&panels[0]).is_empty());

    // RAG panel: de-duplicated citations in retrieval order
    let rag_links = links(&panels[1]);
    assert_eq!(rag_links.len(), 2);
    assert!(rag_links.contains(&"https://www.britishairways.com/baggage/checked".to_string()));
    assert!(rag_links.contains(&"https://www.britishairways.com/baggage/cabin".to_string()));

    // One completion per panel, in panel order
    let requests = h.model.requests();
    assert_eq!(requests.len(), 2);

    let basic = &requests[0];
    assert_eq!(basic.prompt, BAGGAGE_PROMPT);
    assert!(basic.system_prompt.is_none());

    let rag = &requests[1];
    assert_eq!(rag.system_prompt.as_deref(), Some(DEFAULT_RAG_PERSONA));
    assert_eq!(rag.prompt.matches("23kg").count(), 3);
    assert!(rag.prompt.contains("Economy passengers may check one bag of up to 23kg."));
    assert!(rag.prompt.ends_with(&format!("Question: {BAGGAGE_PROMPT}")));
}

#[tokio::test]
async fn e2e_voice_toggle_adds_audio_to_every_panel() {
    let h = harness();
    ingest_baggage(&h).await;

    let (status, json) = post_prompt(
        app(&h),
        serde_json::json!({"prompt": BAGGAGE_PROMPT, "voice_on": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(*h.speech.calls.lock().unwrap(), 2);
    for panel in panels(&json) {
        assert!(matches!(panel.nodes.last(), Some(UiNode::Audio { .. })));
    }
}

#[tokio::test]
async fn e2e_disabled_rag_panel_keeps_empty_history() {
    let h = harness();
    ingest_baggage(&h).await;
    let app = app(&h);

    let (_, json) = post_prompt(
        app.clone(),
        serde_json::json!({"prompt": "hello", "sessions": {"rag": {"enabled": false}}}),
    )
    .await;
    let panels = panels(&json);
    assert_eq!(panels[0].nodes.len(), 2);
    assert!(panels[1].nodes.is_empty());
    assert_eq!(h.model.requests().len(), 1);

    // persona edits apply to the next answer
    post_prompt(
        app,
        serde_json::json!({
            "prompt": "bags?",
            "sessions": {"rag": {"enabled": true, "persona": "Be brief."}}
        }),
    )
    .await;
    let requests = h.model.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].system_prompt.as_deref(), Some("Be brief."));
}

#[tokio::test]
async fn e2e_index_survives_restart_and_ranks_by_similarity() {
    let h = harness();
    ingest_baggage(&h).await;

    let lounge = h.config.knowledge_base.path.with_file_name("lounges.md");
    std::fs::write(
        &lounge,
        "# Lounges\n\nLounge access opens three hours before departure.",
    )
    .unwrap();
    let index = FileIndex::open(&h.config.knowledge_base.path);
    Ingestor::new(h.services.embedder.clone(), 512)
        .ingest(&[lounge], Some("https://www.britishairways.com/lounges"), &index)
        .await
        .unwrap();

    let reopened = FileIndex::open(&h.config.knowledge_base.path);
    assert_eq!(reopened.count().await.unwrap(), 4);

    let top = reopened.query(&keyword_vector("lounge hours"), 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].meta_str("title"), Some("Lounges"));
    assert_eq!(top[0].meta_str("url"), Some("https://www.britishairways.com/lounges"));

    let bags = reopened.query(&keyword_vector(BAGGAGE_PROMPT), 5).await.unwrap();
    assert_eq!(bags.len(), 4);
    assert!(bags.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(bags[..3].iter().all(|d| d.content.contains("23kg")));
}

#[tokio::test]
async fn e2e_init_output_round_trips_through_config_loader() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, AppConfig::default_toml()).unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.knowledge_base.k, 5);
    assert_eq!(config.sessions[1].persona.as_deref(), Some(DEFAULT_RAG_PERSONA));
}
