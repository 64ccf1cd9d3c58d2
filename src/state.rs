/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - books: Arc<dyn BookStore> (本番は PgBookStore, テストは MockBookStore)
 *   - root: BOOK_STORE を束縛済みの root Context (scoped handler 用)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 構築後は不変。実装の差し替えは構築時のみ
 */
use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::repos::books::{BOOK_STORE, BookStore};

#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookStore>,
    pub root: Context,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(books: Arc<dyn BookStore>, request_timeout: Duration) -> Self {
        let root = Context::background().with_value(&BOOK_STORE, Arc::clone(&books));
        Self {
            books,
            root,
            request_timeout,
        }
    }
}
