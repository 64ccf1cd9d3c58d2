/*
 * Responsibility
 * - handler 境界のエラー定義 (AppError)
 * - IntoResponse 実装 (HTTP status + reason phrase の text/plain body)
 * - 内部の詳細 (sqlx のメッセージ等) はログにだけ出し、レスポンスには含めない
 */
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::context::ResourceNotAvailable;
use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("method not allowed")]
    MethodNotAllowed,
    // Wiring defect: a dependency was never bound into the request context.
    #[error("resource not available: {0}")]
    ResourceNotAvailable(#[from] ResourceNotAvailable),
    #[error("query failed: {0}")]
    Query(#[from] RepoError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::ResourceNotAvailable(_) | AppError::Query(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MethodNotAllowed => {}
            AppError::ResourceNotAvailable(e) => {
                tracing::error!(error = %e, "dependency missing from request context");
            }
            AppError::Query(RepoError::Aborted(e)) => {
                tracing::warn!(error = %e, "request aborted before the query finished");
            }
            AppError::Query(e) => {
                tracing::error!(error = ?e, "book query failed");
            }
        }

        let status = self.status();
        let body = format!("{}\n", status.canonical_reason().unwrap_or("Error"));
        let mut response = (status, body).into_response();

        if matches!(self, AppError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }

        response
    }
}
