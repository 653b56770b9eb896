use crate::services::analytics;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(analytics::dashboard(store.snapshot(), store.today())))
}

pub async fn fiscal_report(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(analytics::fiscal_summary(store.snapshot())))
}
