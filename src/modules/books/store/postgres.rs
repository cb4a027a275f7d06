use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError};
use crate::modules::books::models::Book;

/// Books table in PostgreSQL; ids come from the `BIGSERIAL` sequence.
pub struct PostgresBookStore {
    pool: PgPool,
}

impl PostgresBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PostgresBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books =
            sqlx::query_as::<_, Book>(r#"SELECT id, name, "type", author FROM books ORDER BY id"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(books)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let book =
            sqlx::query_as::<_, Book>(r#"SELECT id, name, "type", author FROM books WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(book)
    }

    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        let created = sqlx::query_as::<_, Book>(
            r#"INSERT INTO books (name, "type", author) VALUES ($1, $2, $3)
               RETURNING id, name, "type", author"#,
        )
        .bind(book.name)
        .bind(book.kind)
        .bind(book.author)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_fields(
        &self,
        id: i64,
        name: Option<String>,
        kind: Option<String>,
    ) -> Result<Option<Book>, StoreError> {
        let updated = sqlx::query_as::<_, Book>(
            r#"UPDATE books SET name = $2, "type" = $3 WHERE id = $1
               RETURNING id, name, "type", author"#,
        )
        .bind(id)
        .bind(name)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
