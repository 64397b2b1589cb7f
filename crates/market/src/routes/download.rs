//! Download route handlers.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use ddm_core::ListingId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::Download;
use crate::state::AppState;

/// Full decrypt-then-download flow for a listing.
#[instrument(skip(state))]
pub async fn listing(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response> {
    let download = state.market().download(ListingId::new(id)).await?;
    Ok(attachment_response(download))
}

/// Raw proxy query parameters.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub hash: Option<String>,
}

/// Raw gateway proxy: serve an already-released CID.
#[instrument(skip(state))]
pub async fn proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response> {
    let hash = query
        .hash
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Data hash is required".to_string()))?;

    let download = state.market().download_by_cid(hash).await?;
    Ok(attachment_response(download))
}

/// Build the attachment response a browser will save with the original
/// filename.
fn attachment_response(download: Download) -> Response {
    // Quotes would break the header's filename quoting
    let safe_name: String = download
        .file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\r' && *c != '\n')
        .collect();

    (
        [
            (header::CONTENT_TYPE, download.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe_name}\""),
            ),
        ],
        download.bytes,
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_response_headers() {
        let response = attachment_response(Download {
            file_name: "weather\".csv".to_string(),
            content_type: "text/csv".to_string(),
            bytes: vec![1, 2, 3],
        });

        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"weather.csv\""
        );
    }
}
