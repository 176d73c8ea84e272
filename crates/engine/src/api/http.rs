//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use skirmish_domain::{BattleId, CharacterId, Command, DomainError, MapId, NarrationStyle};
use skirmish_shared::{
    BatchResult, BattleView, CreatePveBattleRequest, CreatePvpBattleRequest, ErrorResponse,
    HealthResponse, SubmitCommandRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{stream, views};
use crate::app::App;
use crate::use_cases::BattleError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/pve/battles", post(create_pve_battle))
        .route("/api/pve/battles/{id}/run", post(run_pve_battle))
        .route("/api/pve/battles/{id}/stream", get(stream::stream_battle))
        .route("/api/pvp/battles", post(create_pvp_battle))
        .route("/api/pvp/battles/{id}", get(get_pvp_battle))
        .route("/api/pvp/battles/{id}/commands", post(submit_command))
        .route("/api/pvp/battles/{id}/abandon", post(abandon_pvp_battle))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

fn narration_style(raw: Option<&str>) -> Result<Option<NarrationStyle>, ApiError> {
    raw.map(str::parse::<NarrationStyle>)
        .transpose()
        .map_err(|e: DomainError| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// PvE
// =============================================================================

async fn create_pve_battle(
    State(app): State<Arc<App>>,
    Json(request): Json<CreatePveBattleRequest>,
) -> Result<(StatusCode, Json<BattleView>), ApiError> {
    let style = narration_style(request.narration_style.as_deref())?;
    let battle = app
        .use_cases
        .battles
        .create_pve
        .execute(
            CharacterId::from_uuid(request.character_id),
            MapId::from_uuid(request.map_id),
            style,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::battle_view(&battle))))
}

async fn run_pve_battle(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchResult>, ApiError> {
    let battle = app
        .use_cases
        .battles
        .run
        .execute(BattleId::from_uuid(id))
        .await?;
    let result = views::batch_result(&battle)
        .ok_or_else(|| ApiError::Internal(format!("battle {id} stopped before it ended")))?;
    Ok(Json(result))
}

// =============================================================================
// PvP
// =============================================================================

async fn create_pvp_battle(
    State(app): State<Arc<App>>,
    Json(request): Json<CreatePvpBattleRequest>,
) -> Result<(StatusCode, Json<BattleView>), ApiError> {
    let style = narration_style(request.narration_style.as_deref())?;
    let battle = app
        .use_cases
        .battles
        .create_pvp
        .execute(
            CharacterId::from_uuid(request.character_id),
            CharacterId::from_uuid(request.opponent_character_id),
            style,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::battle_view(&battle))))
}

async fn get_pvp_battle(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BattleView>, ApiError> {
    let battle = app
        .use_cases
        .battles
        .get
        .execute(BattleId::from_uuid(id))
        .await?;
    Ok(Json(views::battle_view(&battle)))
}

async fn submit_command(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitCommandRequest>,
) -> Result<Json<BattleView>, ApiError> {
    // Parse before touching the battle so a bad token changes nothing
    let command: Command = request.command.parse()?;
    let battle = app
        .use_cases
        .battles
        .submit
        .execute(BattleId::from_uuid(id), command)
        .await?;
    Ok(Json(views::battle_view(&battle)))
}

async fn abandon_pvp_battle(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BattleView>, ApiError> {
    let battle = app
        .use_cases
        .battles
        .abandon
        .execute(BattleId::from_uuid(id))
        .await?;
    Ok(Json(views::battle_view(&battle)))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal error".to_string(),
                )
            }
        };
        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(_) | DomainError::Parse(_) => {
                ApiError::BadRequest(e.to_string())
            }
            DomainError::InvalidStateTransition(_) | DomainError::StaleTurn { .. } => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<BattleError> for ApiError {
    fn from(e: BattleError) -> Self {
        match e {
            BattleError::NotFound(_)
            | BattleError::CharacterNotFound(_)
            | BattleError::MapNotFound(_)
            | BattleError::NoMonsters(_) => ApiError::NotFound(e.to_string()),
            BattleError::WrongKind { .. } | BattleError::InvalidRequest(_) => {
                ApiError::BadRequest(e.to_string())
            }
            BattleError::Domain(inner) => inner.into(),
            BattleError::Repo(_) | BattleError::StreamClosed(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
