//! Book data-access interface used by the HTTP handlers.
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{Context, Key};
use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub price: f64,
}

/// Context slot the scoped handlers read the store from.
pub static BOOK_STORE: Key<Arc<dyn BookStore>> = Key::new("book_store");

/// Catalog operations, independent of the backing store.
///
/// Every method takes the request `Context` and must stop early once it is
/// canceled or past its deadline (`RepoError::Aborted`).
///
/// Implementations are shared across requests as `Arc<dyn BookStore>`.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // All books ordered by isbn. No rows is `Ok(vec![])`, not an error.
    async fn all(&self, ctx: &Context) -> RepoResult<Vec<Book>>;

    // Liveness of the backing store.
    async fn ping(&self, ctx: &Context) -> RepoResult<()>;
}
