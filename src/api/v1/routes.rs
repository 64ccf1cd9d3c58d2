/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /books, /scoped/books
 * - リクエスト Context の付与は route_layer でここに閉じる
 */
use axum::{
    Router,
    middleware,
    routing::{any, get},
};

use crate::{
    api::v1::handlers::{
        books::{list_books, list_books_scoped},
        health::health,
    },
    middleware::request_context,
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // `any` so the handlers themselves answer non-GET with 405 + text body.
        .route("/books", any(list_books))
        .route("/scoped/books", any(list_books_scoped))
        .route_layer(middleware::from_fn_with_state(state, request_context::attach))
}
