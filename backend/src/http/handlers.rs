//! HTTP handlers for the REST API.
//!
//! Each handler validates its inputs at the boundary, delegates to the
//! service layer, and wraps the result in the response envelope.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    Json,
};

use super::dto::{
    ApiResponse, CreateComicRequest, CreateSeriesRequest, HealthResponse, LimitQuery,
    SearchQuery, SeriesListQuery, UpdateComicRequest, UpdateSeriesRequest,
};
use super::error::AppError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Comic, SeriesWithOnlineRead};
use crate::validation::{
    parse_identifier, parse_ranking_limit, parse_strict_limit, validate_search_term,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub const BANNER: &str = "API Infinity Comics running";

fn ok<T>(data: T) -> HandlerResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /
pub async fn root() -> &'static str {
    BANNER
}

/// GET /health
///
/// Liveness plus store connectivity. Always 200; the store state is reported
/// in `database`.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

/// Fallback for unknown routes.
pub async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("Route {} {} not found", method, uri.path()))
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!(
        "Method {} not allowed on {}",
        method,
        uri.path()
    ))
}

// =============================================================================
// Series
// =============================================================================

/// GET /api/series?publisher=
pub async fn list_series(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SeriesListQuery>,
) -> HandlerResult<Vec<SeriesWithOnlineRead>> {
    let series =
        db_services::list_series(state.repository.as_ref(), query.publisher.as_deref()).await?;
    ok(series)
}

/// GET /api/series/search?q=
pub async fn search_series(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> HandlerResult<Vec<SeriesWithOnlineRead>> {
    let term = validate_search_term(query.q.as_deref())?;
    let series = db_services::search_series(state.repository.as_ref(), &term).await?;
    ok(series)
}

/// GET /api/series/top?limit=
///
/// A missing or unusable limit falls back to the default ranking size.
pub async fn top_series(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> HandlerResult<Vec<SeriesWithOnlineRead>> {
    let limit = parse_ranking_limit(query.limit.as_deref());
    let series = db_services::top_series(state.repository.as_ref(), limit).await?;
    ok(series)
}

/// GET /api/series/{id}
pub async fn get_series(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<SeriesWithOnlineRead> {
    let id = parse_identifier("id", &id)?;
    let series = db_services::get_series(state.repository.as_ref(), id).await?;
    ok(series)
}

/// POST /api/series
pub async fn create_series(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSeriesRequest>,
) -> CreatedResult<SeriesWithOnlineRead> {
    let new_series = request.validate()?;
    let series = db_services::create_series(state.repository.as_ref(), new_series).await?;
    created(series)
}

/// PUT /api/series/{id}
pub async fn update_series(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateSeriesRequest>,
) -> HandlerResult<SeriesWithOnlineRead> {
    let id = parse_identifier("id", &id)?;
    let patch = request.validate()?;
    let series = db_services::update_series(state.repository.as_ref(), id, patch).await?;
    ok(series)
}

/// POST /api/series/{id}/views
pub async fn increment_series_views(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<SeriesWithOnlineRead> {
    let id = parse_identifier("id", &id)?;
    let series = db_services::increment_series_views(state.repository.as_ref(), id).await?;
    ok(series)
}

/// DELETE /api/series/{id}
pub async fn delete_series(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_identifier("id", &id)?;
    db_services::delete_series(state.repository.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/series/{id}/comics
pub async fn list_series_comics(
    State(state): State<AppState>,
    ApiPath(series_id): ApiPath<String>,
) -> HandlerResult<Vec<Comic>> {
    let series_id = parse_identifier("seriesId", &series_id)?;
    let comics = db_services::list_comics_for_series(state.repository.as_ref(), series_id).await?;
    ok(comics)
}

// =============================================================================
// Comics
// =============================================================================

/// GET /api/comics?limit=
pub async fn list_comics(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> HandlerResult<Vec<Comic>> {
    let limit = parse_strict_limit(query.limit.as_deref())?;
    let comics = db_services::list_comics(state.repository.as_ref(), limit).await?;
    ok(comics)
}

/// GET /api/comics/{id}
pub async fn get_comic(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<Comic> {
    let id = parse_identifier("id", &id)?;
    let comic = db_services::get_comic(state.repository.as_ref(), id).await?;
    ok(comic)
}

/// POST /api/comics
pub async fn create_comic(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateComicRequest>,
) -> CreatedResult<Comic> {
    let new_comic = request.validate()?;
    let comic = db_services::create_comic(state.repository.as_ref(), new_comic).await?;
    created(comic)
}

/// PUT /api/comics/{id}
pub async fn update_comic(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateComicRequest>,
) -> HandlerResult<Comic> {
    let id = parse_identifier("id", &id)?;
    let patch = request.validate()?;
    let comic = db_services::update_comic(state.repository.as_ref(), id, patch).await?;
    ok(comic)
}

/// DELETE /api/comics/{id}
pub async fn delete_comic(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_identifier("id", &id)?;
    db_services::delete_comic(state.repository.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
