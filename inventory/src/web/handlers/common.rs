// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub fn not_found(message: String) -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error(message)))
}

pub fn bad_request(message: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(message.to_string())),
    )
}

/// One entry of a batch lookup
#[derive(Debug, Serialize)]
pub struct BatchEntry<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

impl<T> BatchEntry<T> {
    pub fn found(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pending: None,
        }
    }

    pub fn missing(pending: Option<bool>) -> Self {
        Self {
            success: false,
            data: None,
            pending,
        }
    }
}
