use async_trait::async_trait;

use super::{BookStore, StoreError};
use crate::modules::books::models::Book;

/// Store whose backing database never answers
pub struct UnavailableStore;

fn timed_out<T>() -> Result<T, StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl BookStore for UnavailableStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        timed_out()
    }

    async fn get_by_id(&self, _id: i64) -> Result<Option<Book>, StoreError> {
        timed_out()
    }

    async fn insert(&self, _book: Book) -> Result<Book, StoreError> {
        timed_out()
    }

    async fn update_fields(
        &self,
        _id: i64,
        _name: Option<String>,
        _kind: Option<String>,
    ) -> Result<Option<Book>, StoreError> {
        timed_out()
    }

    async fn delete_by_id(&self, _id: i64) -> Result<bool, StoreError> {
        timed_out()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        timed_out()
    }
}
