//! JSON response bodies.

use serde::Serialize;

/// Body of a successful `POST /convert`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub pdf_url: String,
}

impl ConvertResponse {
    pub fn ok(pdf_url: impl Into<String>) -> Self {
        Self {
            success: true,
            pdf_url: pdf_url.into(),
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
