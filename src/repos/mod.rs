/*
 * Responsibility
 * - データアクセス層の公開インターフェース
 */
pub mod books;
pub mod error;
