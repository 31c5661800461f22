//! HTTP API v1: the browser's view of its chat panels.
//!
//! Endpoints:
//!
//! - `GET  /v1/layout`: Panel descriptors and default toggles
//! - `GET  /v1/chats/{client_id}`: Render the client's panels
//! - `POST /v1/chats/{client_id}`: Apply widget state, answer the prompt

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use dualchat_chat::{Interaction, Orchestrator, Panel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::blueprint::{Blueprint, Layout};

/// Maximum number of in-memory clients before the oldest is evicted.
pub const MAX_CLIENTS: usize = 1_000;

/// Longest accepted client id.
const MAX_CLIENT_ID_LEN: usize = 64;

/// Shown to the user when an interaction fails; details go to the log.
const GENERIC_ERROR: &str = "Something went wrong while answering. Please try again.";

// ── State ─────────────────────────────────────────────────────────────────

struct ClientEntry {
    seq: u64,
    orchestrator: Arc<Mutex<Orchestrator>>,
}

/// Per-client orchestrators, capped at `capacity`.
pub struct ClientMap {
    capacity: usize,
    inner: RwLock<(u64, HashMap<String, ClientEntry>)>,
}

impl ClientMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new((0, HashMap::new())),
        }
    }

    pub async fn get(&self, client_id: &str) -> Option<Arc<Mutex<Orchestrator>>> {
        let inner = self.inner.read().await;
        inner.1.get(client_id).map(|e| e.orchestrator.clone())
    }

    /// Fetch the client's orchestrator, creating it if needed.
    ///
    /// At capacity the least recently created client is evicted.
    pub async fn get_or_create(
        &self,
        client_id: &str,
        create: impl FnOnce() -> Orchestrator,
    ) -> Arc<Mutex<Orchestrator>> {
        let mut inner = self.inner.write().await;
        let (next_seq, clients) = &mut *inner;

        if let Some(entry) = clients.get(client_id) {
            return entry.orchestrator.clone();
        }

        if clients.len() >= self.capacity {
            if let Some(oldest) = clients
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone())
            {
                clients.remove(&oldest);
                info!(client = %oldest, "Client evicted");
            }
        }

        *next_seq += 1;
        let orchestrator = Arc::new(Mutex::new(create()));
        clients.insert(
            client_id.to_string(),
            ClientEntry {
                seq: *next_seq,
                orchestrator: orchestrator.clone(),
            },
        );
        orchestrator
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.1.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub blueprint: Blueprint,
    pub clients: ClientMap,
}

impl ApiV1State {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            clients: ClientMap::new(MAX_CLIENTS),
        }
    }
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/layout", get(layout_handler))
        .route("/chats/{client_id}", get(view_handler).post(interact_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub panels: Vec<Panel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    pub panels: Vec<Panel>,
    pub error: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn validate_client_id(client_id: &str) -> Result<(), ApiError> {
    let valid = !client_id.is_empty()
        && client_id.len() <= MAX_CLIENT_ID_LEN
        && client_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid client id".into(),
            }),
        ))
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn layout_handler(State(state): State<SharedApiState>) -> Json<Layout> {
    Json(state.blueprint.layout())
}

async fn view_handler(
    State(state): State<SharedApiState>,
    Path(client_id): Path<String>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate_client_id(&client_id)?;

    let panels = match state.clients.get(&client_id).await {
        Some(orchestrator) => orchestrator.lock().await.view(),
        None => state.blueprint.orchestrator().view(),
    };
    Ok(Json(ChatResponse { panels }))
}

async fn interact_handler(
    State(state): State<SharedApiState>,
    Path(client_id): Path<String>,
    Json(interaction): Json<Interaction>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatErrorResponse>)> {
    if validate_client_id(&client_id).is_err() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ChatErrorResponse {
                panels: Vec::new(),
                error: "Invalid client id".into(),
            }),
        ));
    }

    info!(
        client = %client_id,
        has_prompt = interaction.effective_prompt().is_some(),
        voice_on = interaction.voice_on,
        "v1/chats request"
    );

    let orchestrator = state
        .clients
        .get_or_create(&client_id, || state.blueprint.orchestrator())
        .await;
    let mut orchestrator = orchestrator.lock().await;

    match orchestrator.handle(&interaction).await {
        Ok(panels) => Ok(Json(ChatResponse { panels })),
        Err(e) => {
            error!(client = %client_id, error = %e, "Interaction failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ChatErrorResponse {
                    panels: orchestrator.view(),
                    error: GENERIC_ERROR.into(),
                }),
            ))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
