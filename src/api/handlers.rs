//! HTTP request handlers

use super::auth::api_key_middleware;
use super::types::{
    CategoriesResponse, ChatRequest, ChatResponse, ErrorResponse, HealthResponse,
    MaterialsQuery, MaterialsResponse, SuppliersQuery, SuppliersResponse,
};
use super::AppState;
use crate::catalog::{CatalogConnection, CatalogError, CatalogResult};
use crate::dialogue::{StageName, StateSnapshot};
use crate::runtime::{self, CatalogStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        // Guided conversation
        .route("/chat", post(chat))
        .route("/chat/:session_id", delete(reset_session))
        // Catalog lookups
        .route("/categories", get(list_categories))
        .route("/materials", get(list_materials))
        .route("/suppliers", get(list_suppliers))
        .route_layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            api_key_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============================================================
// Conversation
// ============================================================

async fn chat(
    State(state): State<AppState>,
    body: Option<Json<ChatRequest>>,
) -> Result<Json<ChatResponse>, AppError> {
    // Unreadable bodies are treated like a missing message
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let message = req
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("campo 'message' é obrigatório no corpo JSON".to_string())
        })?;

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let _guard = state.locks.lock(&session_id).await;

    let snapshot = match state
        .sessions
        .load_state(&session_id)
        .await
        .map_err(|e| store_error(&session_id, e))?
    {
        // A closed conversation starts over on the next message
        Some(snapshot) if snapshot.stage != StageName::Ended => snapshot,
        _ => StateSnapshot::default(),
    };

    let catalog = state.catalog.clone();
    let span = tracing::info_span!("chat_turn", session_id = %session_id);
    let outcome = tokio::task::spawn_blocking(move || {
        span.in_scope(|| runtime::handle_turn(&catalog, &message, snapshot))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Turn task failed: {e}")))?
    .map_err(|e| {
        tracing::error!(session_id = %session_id, error = %e, "Turn failed");
        AppError::Internal(e.to_string())
    })?;

    state
        .sessions
        .save_state(&session_id, &outcome.state)
        .await
        .map_err(|e| store_error(&session_id, e))?;

    Ok(Json(ChatResponse {
        ended: outcome.ended,
        reply: outcome.reply,
        session_id,
    }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _guard = state.locks.lock(&session_id).await;
    let existed = state
        .sessions
        .delete_state(&session_id)
        .await
        .map_err(|e| store_error(&session_id, e))?;

    if existed {
        tracing::info!(session_id = %session_id, "Session reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "sessão '{session_id}' não encontrada"
        )))
    }
}

fn store_error(session_id: &str, message: String) -> AppError {
    tracing::error!(session_id = %session_id, error = %message, "Session store failed");
    AppError::Internal(message)
}

// ============================================================
// Catalog Lookups
// ============================================================

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = with_catalog(&state, |store| store.list_categories()).await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialsQuery>,
) -> Result<Json<MaterialsResponse>, AppError> {
    let category = required(query.category)
        .ok_or_else(|| AppError::BadRequest("parametro 'category' é obrigatório".to_string()))?;

    let materials = with_catalog(&state, move |store| store.list_materials(&category)).await?;
    Ok(Json(MaterialsResponse { materials }))
}

async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SuppliersQuery>,
) -> Result<Json<SuppliersResponse>, AppError> {
    let (Some(material), Some(region)) = (required(query.material), required(query.region))
    else {
        return Err(AppError::BadRequest(
            "parametros 'material' e 'region' são obrigatórios".to_string(),
        ));
    };

    let results =
        with_catalog(&state, move |store| store.query_suppliers(&material, &region)).await?;
    Ok(Json(SuppliersResponse { results }))
}

fn required(param: Option<String>) -> Option<String> {
    param
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Run a catalog query on the blocking pool over a fresh connection
async fn with_catalog<T, F>(state: &AppState, query: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&CatalogConnection) -> CatalogResult<T> + Send + 'static,
{
    let catalog = state.catalog.clone();
    tokio::task::spawn_blocking(move || {
        let conn = catalog.connect()?;
        query(&conn)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Catalog task failed: {e}")))?
    .map_err(AppError::from)
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        tracing::error!(error = %e, "Catalog query failed");
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
