use super::SearchParams;
use crate::models::{NewProduct, UpdateProduct};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(store.list_products(params.search.as_deref())))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(store.product(&id)?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.store.write().await.add_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.store.write().await.update_product(&id, patch).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.store.write().await.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_product_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.store.write().await.toggle_product_status(&id).await?;
    Ok(Json(product))
}
