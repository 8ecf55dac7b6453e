//! Session and action handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use mathmentor_core::{ActionKind, ApiKey};
use mathmentor_session::{ActionInputs, ActionOutcome, SessionView};
use mathmentor_understanding::OcrOutcome;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::session_registry::SharedSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ocr: OcrOutcome,
    pub notice: String,
    pub session: SessionView,
}

/// Wire form of an [`ActionOutcome`].
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeBody {
    Completed { reply: String },
    Skipped { reason: String },
    Failed { error: String },
}

impl From<&ActionOutcome> for OutcomeBody {
    fn from(outcome: &ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Completed(reply) => OutcomeBody::Completed { reply: reply.clone() },
            ActionOutcome::Skipped(req) => OutcomeBody::Skipped { reason: req.describe().to_string() },
            ActionOutcome::Failed(err) => OutcomeBody::Failed { error: err.display_text() },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub action: ActionKind,
    pub outcome: OutcomeBody,
    pub session: SessionView,
}

/// `GET /api/health`
pub async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mathmentor",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "sessions": state.registry.len().await,
    }))
}

/// `POST /api/sessions`
pub async fn create_session(
    State(state): State<GatewayState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let api_key = ApiKey::new(body.api_key)?;
    let session_id = state.registry.create(api_key).await;
    tracing::info!(session_id = %session_id, "Session created");
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// `GET /api/sessions/:id`
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = lookup(&state, &id).await?;
    let guard = session.lock().await;
    Ok(Json(SessionView::render(&guard)))
}

/// `DELETE /api/sessions/:id`
pub async fn delete_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = parse_id(&id)?;
    if state.registry.remove(&uuid).await {
        tracing::info!(session_id = %uuid, "Session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

/// `POST /api/sessions/:id/image?filename=..` with the raw image as body.
pub async fn upload_image(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("image body is empty".into()));
    }
    let session = lookup(&state, &id).await?;
    let mut guard = session.lock().await;

    let ocr = state
        .tutor
        .upload_image(&mut guard, query.filename.as_deref(), &body)
        .await?;

    Ok(Json(UploadResponse {
        notice: ocr.notice(),
        ocr,
        session: SessionView::render(&guard),
    }))
}

/// `POST /api/sessions/:id/actions/:action`
pub async fn run_action(
    State(state): State<GatewayState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let kind: ActionKind = action.parse()?;
    let session = lookup(&state, &id).await?;
    let inputs = parse_inputs(&body)?;

    // Held across the remote call: one action at a time per session.
    let mut guard = session.lock().await;
    let outcome = state.tutor.dispatch(&mut guard, kind, &inputs).await?;

    Ok(Json(ActionResponse {
        action: kind,
        outcome: OutcomeBody::from(&outcome),
        session: SessionView::render(&guard),
    }))
}

/// An empty body means no inputs; anything else must be valid JSON.
fn parse_inputs(body: &[u8]) -> Result<ActionInputs, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ActionInputs::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid action body: {e}")))
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| not_found(id))
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("session not found: {id}"))
}

async fn lookup(state: &GatewayState, id: &str) -> Result<SharedSession, ApiError> {
    let uuid = parse_id(id)?;
    state.registry.get(&uuid).await.ok_or_else(|| not_found(id))
}
