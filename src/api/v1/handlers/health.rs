/*
 * Responsibility
 * - GET /health (疎通用)
 * - BookStore の ping で backend まで確認する
 */
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{api::v1::dto::health::HealthResponse, context::Context, state::AppState};

pub async fn health(
    State(state): State<AppState>,
    Extension(ctx): Extension<Context>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.books.backend_name();

    match state.books.ping(&ctx).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                backend,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = ?e, backend, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    backend,
                }),
            )
        }
    }
}
