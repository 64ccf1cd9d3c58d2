#[cfg(test)]
pub mod mock;
pub mod postgres;
pub mod store;

#[cfg(test)]
pub use mock::MockBookStore;
pub use postgres::PgBookStore;
pub use store::{BOOK_STORE, Book, BookStore};
