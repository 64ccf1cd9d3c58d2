use async_trait::async_trait;

use crate::context::Context;
use crate::repos::books::store::{Book, BookStore};
use crate::repos::error::{RepoError, RepoResult};

/// In-memory `BookStore` for handler tests.
///
/// Returns the books it was built with (or the configured failure) without
/// touching any backend.
#[derive(Clone, Debug, Default)]
pub struct MockBookStore {
    books: Vec<Book>,
    failure: Option<String>,
}

impl MockBookStore {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            failure: None,
        }
    }

    /// Every call fails with a backend error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            books: Vec::new(),
            failure: Some(message.into()),
        }
    }

    fn check(&self, ctx: &Context) -> RepoResult<()> {
        if let Some(err) = ctx.err() {
            return Err(RepoError::Aborted(err));
        }
        match &self.failure {
            Some(message) => Err(RepoError::Db(sqlx::Error::Protocol(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BookStore for MockBookStore {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn all(&self, ctx: &Context) -> RepoResult<Vec<Book>> {
        self.check(ctx)?;
        Ok(self.books.clone())
    }

    async fn ping(&self, ctx: &Context) -> RepoResult<()> {
        self.check(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;

    fn emma() -> Book {
        Book {
            isbn: "978-1503261969".into(),
            title: "Emma".into(),
            author: "Jayne Austen".into(),
            price: 9.44,
        }
    }

    #[tokio::test]
    async fn returns_the_fixed_books_every_time() {
        let store = MockBookStore::new(vec![emma()]);
        let ctx = Context::background();

        assert_eq!(store.all(&ctx).await.unwrap(), vec![emma()]);
        assert_eq!(store.all(&ctx).await.unwrap(), vec![emma()]);
    }

    #[tokio::test]
    async fn failing_store_reports_a_db_error() {
        let store = MockBookStore::failing("relation \"books\" does not exist");
        let err = store.all(&Context::background()).await.unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }

    #[tokio::test]
    async fn canceled_context_is_observed() {
        let store = MockBookStore::new(vec![emma()]);
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let err = store.all(&ctx).await.unwrap_err();
        assert!(matches!(err, RepoError::Aborted(ContextError::Canceled)));
    }
}
