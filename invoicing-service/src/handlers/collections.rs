use super::StatusParams;
use crate::models::{CollectionStatus, NewCollection};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<CollectionStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let store = state.store.read().await;
    Ok(Json(store.list_collections(status)))
}

pub async fn schedule_collection(
    State(state): State<AppState>,
    Json(input): Json<NewCollection>,
) -> Result<impl IntoResponse, AppError> {
    let collection = state.store.write().await.schedule_collection(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn process_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let collection = state
        .store
        .write()
        .await
        .mark_collection_processed(&id)
        .await?;
    Ok(Json(collection))
}
