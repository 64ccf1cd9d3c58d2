/*
 * Responsibility
 * - books テーブル向け SQLx 操作 (BookStore の本番実装)
 * - コネクション / カーソルはスコープで所有し、どの経路でも drop で返却
 * - Context の cancel / deadline を query と競争させ、先に終われば中断
 */
use async_trait::async_trait;
use futures::TryStreamExt;

use crate::context::Context;
use crate::db::Db;
use crate::repos::books::store::{Book, BookStore};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Clone, Debug)]
pub struct PgBookStore {
    db: Db,
}

impl PgBookStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn fetch_all(&self) -> RepoResult<Vec<Book>> {
        // Both the connection and the row stream are released when this scope
        // ends, including on `?` and when the future is dropped mid-query.
        let mut conn = self.db.pool().acquire().await?;

        let mut rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT isbn, title, author, price::float8 AS price
            FROM books
            ORDER BY isbn
            "#,
        )
        .fetch(&mut *conn);

        let mut books = Vec::new();
        while let Some(book) = rows.try_next().await? {
            books.push(book);
        }

        Ok(books)
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn all(&self, ctx: &Context) -> RepoResult<Vec<Book>> {
        if let Some(err) = ctx.err() {
            return Err(RepoError::Aborted(err));
        }

        tokio::select! {
            err = ctx.done() => Err(RepoError::Aborted(err)),
            res = self.fetch_all() => res,
        }
    }

    async fn ping(&self, ctx: &Context) -> RepoResult<()> {
        if let Some(err) = ctx.err() {
            return Err(RepoError::Aborted(err));
        }
        if self.db.is_closed() {
            return Err(RepoError::Db(sqlx::Error::PoolClosed));
        }

        tokio::select! {
            err = ctx.done() => Err(RepoError::Aborted(err)),
            res = self.db.ping() => res.map_err(RepoError::Db),
        }
    }
}
