use super::SearchParams;
use crate::models::{NewClient, UpdateClient};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(store.list_clients(params.search.as_deref())))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(store.client(&id)?))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<NewClient>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.store.write().await.add_client(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateClient>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.store.write().await.update_client(&id, patch).await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.store.write().await.delete_client(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_client_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.store.write().await.toggle_client_status(&id).await?;
    Ok(Json(client))
}
