/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

use crate::context::ContextError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("aborted: {0}")]
    Aborted(#[from] ContextError),
}

pub type RepoResult<T> = Result<T, RepoError>;
