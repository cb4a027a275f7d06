//! Persistence for the books collection.

pub use memory::InMemoryBookStore;
pub use postgres::PostgresBookStore;
#[cfg(test)]
pub use unavailable::UnavailableStore;

use async_trait::async_trait;
use thiserror::Error;

use super::models::Book;

mod memory;
mod postgres;
#[cfg(test)]
mod unavailable;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage backing the books API. Lookups follow first-match semantics.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books in store order
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Book>, StoreError>;

    /// Persist `book`, ignoring its `id`; returns the stored record with its assigned id
    async fn insert(&self, book: Book) -> Result<Book, StoreError>;

    /// Overwrite `name` and `type` of the matching book; returns the updated
    /// record, or `None` when no book has this id
    async fn update_fields(
        &self,
        id: i64,
        name: Option<String>,
        kind: Option<String>,
    ) -> Result<Option<Book>, StoreError>;

    /// Returns true if a book was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// Cheap round trip to the backing storage
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
