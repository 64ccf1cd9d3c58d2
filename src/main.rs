/*
 * Responsibility
 * - tokio runtime 起動
 * - app::run() の呼び出し（ロジックは置かない）
 * - 起動失敗 (DB に繋がらない等) は Err を返して非ゼロ終了
 */
use anyhow::Result;

mod api;
mod app;
mod config;
mod context;
mod db;
mod error;
mod middleware;
mod repos;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
