//! Per-request `Context` derivation.
//!
//! Every request gets a child of `AppState::root` with the configured deadline
//! and its own cancellation scope, stored in the request extensions.
//!
//! The cancel handle lives in this middleware's future: it fires when the
//! response is produced or when the request future is dropped (client gone).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

pub async fn attach(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let (ctx, _cancel) = state.root.with_timeout(state.request_timeout);
    req.extensions_mut().insert(ctx);

    next.run(req).await
}
