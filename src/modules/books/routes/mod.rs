//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use bookshelf_http::{error::NOT_FOUND, AppError, Envelope};

use super::models::{Book, BookInput};
use super::store::{BookStore, StoreError};

pub type SharedStore = Arc<dyn BookStore>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// Non-numeric ids become 0, which no stored book carries.
fn parse_id(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}

async fn list_books(State(store): State<SharedStore>) -> Result<Envelope<Vec<Book>>, AppError> {
    let books = store.list().await?;
    Ok(Envelope::new(StatusCode::OK)
        .with_message("All books")
        .with_data(books))
}

async fn get_book(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<Envelope<Book>, AppError> {
    let id = parse_id(&raw_id);
    tracing::debug!(raw_id = %raw_id, id, "looking up book");

    match store.get_by_id(id).await? {
        Some(book) => Ok(Envelope::new(StatusCode::OK)
            .with_message("All books")
            .with_data(book)),
        None => Err(AppError::not_found(NOT_FOUND)),
    }
}

async fn create_book(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<Envelope<Book>, AppError> {
    let book = store.insert(BookInput::decode(&body).into_book()).await?;
    tracing::info!(id = book.id, "book created");

    Ok(Envelope::new(StatusCode::CREATED)
        .with_message("book successfully created")
        .with_data(book))
}

async fn update_book(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Envelope<Vec<Book>>, AppError> {
    let id = parse_id(&raw_id);
    let input = BookInput::decode(&body);

    if store
        .update_fields(id, input.name, input.kind)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(NOT_FOUND));
    }
    tracing::info!(id, "book updated");

    let books = store.list().await?;
    Ok(Envelope::new(StatusCode::OK)
        .with_message("book successfully updated")
        .with_data(books))
}

async fn delete_book(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<Envelope<Vec<Book>>, AppError> {
    let id = parse_id(&raw_id);

    if !store.delete_by_id(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    tracing::info!(id, "book deleted");

    let books = store.list().await?;
    Ok(Envelope::new(StatusCode::OK)
        .with_message("events have been successfully deleted")
        .with_data(books))
}
