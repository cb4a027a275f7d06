use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{seed_books, Book};

/// Process-local collection. One lock guards the whole collection, so each
/// operation is atomic on its own.
pub struct InMemoryBookStore {
    inner: RwLock<Collection>,
}

struct Collection {
    books: Vec<Book>,
    next_id: i64,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::with_books(Vec::new())
    }

    /// Start from existing records; new ids continue after the highest one.
    pub fn with_books(books: Vec<Book>) -> Self {
        let next_id = books.iter().map(|book| book.id).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Collection { books, next_id }),
        }
    }

    pub fn seeded() -> Self {
        Self::with_books(seed_books())
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.inner.read().await.books.clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let collection = self.inner.read().await;
        Ok(collection.books.iter().find(|book| book.id == id).cloned())
    }

    async fn insert(&self, mut book: Book) -> Result<Book, StoreError> {
        let mut collection = self.inner.write().await;
        book.id = collection.next_id;
        collection.next_id += 1;
        collection.books.push(book.clone());
        Ok(book)
    }

    async fn update_fields(
        &self,
        id: i64,
        name: Option<String>,
        kind: Option<String>,
    ) -> Result<Option<Book>, StoreError> {
        let mut collection = self.inner.write().await;
        Ok(collection
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .map(|book| {
                book.name = name;
                book.kind = kind;
                book.clone()
            }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let mut collection = self.inner.write().await;
        match collection.books.iter().position(|book| book.id == id) {
            Some(index) => {
                collection.books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
