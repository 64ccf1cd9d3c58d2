/*
 * Responsibility
 * - PgPool の生成と疎通確認 (open)
 * - open が成功した時点で必ず ping 済み (半端な状態の pool は外に出さない)
 * - shutdown 時に close で全コネクションを解放
 */
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Connection;
use thiserror::Error;

use crate::config::DbConfig;

/// Pool could not be brought up. Fatal at startup.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid database url")]
    InvalidUrl(#[source] sqlx::Error),
    #[error("database unreachable")]
    Unreachable(#[source] sqlx::Error),
}

/// Shared handle to the connection pool.
///
/// Clone is cheap (the pool is reference counted inside sqlx) and every clone
/// talks to the same set of connections.
#[derive(Clone, Debug)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Builds the pool and verifies it with a ping.
    ///
    /// Sizing values left unset in `DbConfig` fall through to sqlx defaults.
    pub async fn open(config: &DbConfig) -> Result<Self, PoolError> {
        let connect_options =
            PgConnectOptions::from_str(&config.url).map_err(PoolError::InvalidUrl)?;

        let mut options = PgPoolOptions::new();
        if let Some(max) = config.max_connections {
            options = options.max_connections(max);
        }
        if let Some(min) = config.min_connections {
            options = options.min_connections(min);
        }
        if let Some(timeout) = config.acquire_timeout {
            options = options.acquire_timeout(timeout);
        }

        // Lazy so the ping below is the single point where reachability is decided.
        let db = Self {
            pool: options.connect_lazy_with(connect_options),
        };

        if let Err(e) = db.ping().await {
            tracing::error!(error = %e, "database liveness check failed");
            db.pool.close().await;
            return Err(PoolError::Unreachable(e));
        }

        tracing::info!(
            max_connections = ?config.max_connections,
            "database pool ready"
        );
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acquires one connection and pings the server over it.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await
    }

    /// Waits for checked-out connections to come back, then closes them all.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
