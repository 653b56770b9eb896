use super::StatusParams;
use crate::documents::InvoiceDocument;
use crate::models::{EffectiveStatus, InvoiceDraft, UpdateInvoice};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<EffectiveStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let store = state.store.read().await;
    Ok(Json(store.list_invoices(status)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.read().await;
    Ok(Json(store.invoice(&id)?))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.store.write().await.create_invoice(draft).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateInvoice>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.store.write().await.update_invoice(&id, patch).await?;
    Ok(Json(invoice))
}

pub async fn pay_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.store.write().await.mark_invoice_paid(&id).await?;
    Ok(Json(invoice))
}

/// Render the invoice as a PDF attachment.
pub async fn download_invoice_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (document, generated_at) = {
        let store = state.store.read().await;
        let invoice = store.invoice(&id)?;
        let client = store
            .snapshot()
            .client_by_name(&invoice.client)
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Client {} of invoice {} not found",
                    invoice.client,
                    invoice.id
                ))
            })?;
        let document = InvoiceDocument::from_invoice(
            &invoice,
            client,
            &state.config.company,
            &state.config.default_invoice_notes,
        );
        (document, store.clock().now())
    };

    let artifact = state.documents.generate(document, generated_at).await?;

    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.filename),
            ),
            (
                HeaderName::from_static("x-page-count"),
                artifact.page_count.to_string(),
            ),
        ],
        artifact.bytes,
    ))
}
