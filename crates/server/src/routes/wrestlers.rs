use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Host, Path, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use service::file::wrestler_store::{NewWrestler, Wrestler, WrestlerPatch};

use crate::errors::ApiError;
use crate::routes::ServerState;

/// Wire form of a roster entry: `id` is replaced by the absolute resource
/// locator built from the serving request's scheme and host.
#[derive(Debug, Serialize)]
pub struct WrestlerView {
    pub uri: String,
    pub name: String,
}

fn base_url(headers: &HeaderMap, host: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

fn render(base: &str, w: Wrestler) -> WrestlerView {
    WrestlerView {
        uri: format!("{base}/wwe/api/v1.0/wrestlers/{}", w.id),
        name: w.name,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Host(host): Host,
    headers: HeaderMap,
) -> Json<Value> {
    let base = base_url(&headers, &host);
    let views: Vec<WrestlerView> = state
        .roster
        .list()
        .await
        .into_iter()
        .map(|w| render(&base, w))
        .collect();
    Json(json!({ "wrestlers": views }))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Host(host): Host,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let wrestler = state.roster.get(id).await.ok_or(ApiError::NotFound)?;
    let base = base_url(&headers, &host);
    Ok(Json(json!({ "wrestler": render(&base, wrestler) })))
}

pub async fn create(
    State(state): State<ServerState>,
    Host(host): Host,
    headers: HeaderMap,
    payload: Result<Json<NewWrestler>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = payload.map_err(|_| ApiError::BadRequest)?;
    let created = state.roster.create(input).await?;
    let base = base_url(&headers, &host);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "wrestler": render(&base, created) })),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Host(host): Host,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<WrestlerPatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    // An unknown id wins over a malformed body.
    if state.roster.get(id).await.is_none() {
        return Err(ApiError::NotFound);
    }
    let Json(patch) = payload.map_err(|_| ApiError::BadRequest)?;
    let updated = state.roster.update(id, patch).await?;
    let base = base_url(&headers, &host);
    Ok(Json(json!({ "wrestler": render(&base, updated) })))
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    if !state.roster.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(json!({ "result": true })))
}
