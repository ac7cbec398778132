//! HTTP handlers.

use crate::dto::{ConvertResponse, MessageResponse};
use crate::error::ApiError;
use crate::AppState;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream;
use slidepdf_core::PresentationFormat;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

const INVALID_FORMAT: &str = "Invalid file format. Please upload a .pptx file";

/// Read size for streamed PDF responses.
const CHUNK_SIZE: usize = 64 * 1024;

/// `POST /convert`: save the uploaded deck and convert it to PDF.
///
/// The upload is read from the multipart field `file`. Its name is checked
/// before anything is written to disk.
pub async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if PresentationFormat::from_filename(&filename) != Some(PresentationFormat::Pptx) {
            return Err(ApiError::InvalidInput(INVALID_FORMAT.to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Failed to read file data: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::InvalidInput("No file provided in upload".to_string()))?;

    let stored = state
        .dirs
        .save_upload(&filename, &data)
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    log::info!("Received {} ({} bytes) as {}", filename, data.len(), stored.id);

    let converter = Arc::clone(&state.converter);
    let src = stored.upload_path.clone();
    let dest = stored.output_path.clone();
    let report = tokio::task::spawn_blocking(move || converter.convert_file(&src, &dest))
        .await
        .map_err(|e| ApiError::Internal(format!("Conversion task failed: {}", e)))?
        .map_err(|e| ApiError::Conversion(e.to_string()))?;

    if !report.failed_slides.is_empty() {
        log::warn!(
            "{}: slides {:?} were replaced by error pages",
            stored.id,
            report.failed_slides
        );
    }

    Ok(Json(ConvertResponse::ok(stored.pdf_url())))
}

/// `GET /pdf/{filename}`: stream a finished PDF.
pub async fn get_pdf(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.dirs.output_path(&filename).ok_or(ApiError::NotFound)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ApiError::NotFound),
        Err(e) => return Err(ApiError::Internal(format!("Failed to open {}: {}", filename, e))),
    };
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stat {}: {}", filename, e)))?
        .len();

    let chunks = stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0; CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok::<_, io::Error>(None);
        }
        buf.truncate(read);
        Ok(Some((buf, file)))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(chunks),
    )
        .into_response())
}

/// `DELETE /cleanup`: acknowledged, nothing is removed.
pub async fn cleanup() -> Json<MessageResponse> {
    Json(MessageResponse::new("Cleanup completed"))
}
