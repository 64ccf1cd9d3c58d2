/*
 * Responsibility
 * - middleware の公開インターフェース
 */
pub mod http;
pub mod request_context;
