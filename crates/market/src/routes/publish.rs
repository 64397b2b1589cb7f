//! Publish route handler.

use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::{PublishReceipt, PublishRequest};
use crate::state::AppState;

/// Publish a dataset from a multipart form.
///
/// Expected fields: `title`, `description`, `price` (decimal ether) and
/// `file`. Unknown fields are ignored.
#[instrument(skip(state, multipart))]
pub async fn publish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PublishReceipt>> {
    let mut title = None;
    let mut description = None;
    let mut price = None;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("title") => title = Some(read_text(field).await?),
            Some("description") => description = Some(read_text(field).await?),
            Some("price") => price = Some(read_text(field).await?),
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map_or_else(|| "dataset".to_string(), ToString::to_string);
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read file: {e}")))?
                    .to_vec();
                file = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::BadRequest("title is required".to_string()))?;
    let description =
        description.ok_or_else(|| AppError::BadRequest("description is required".to_string()))?;
    let price =
        price.ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;

    let receipt = state
        .market()
        .publish(PublishRequest {
            title,
            description,
            price_eth: price,
            file_name,
            content_type,
            bytes,
            conditions: None,
        })
        .await?;

    Ok(Json(receipt))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid field value: {e}")))
}
