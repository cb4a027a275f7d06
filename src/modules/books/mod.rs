pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use store::BookStore;

/// Books CRUD module backed by a [`BookStore`]
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.store.list().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            books = books.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id     BIGSERIAL PRIMARY KEY,
                    name   TEXT,
                    "type" TEXT,
                    author TEXT
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        self.store.ping().await?;
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn envelope_response(description: &str, data: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "allOf": [
                        { "$ref": "#/components/schemas/Envelope" },
                        { "type": "object", "properties": { "data": data } }
                    ]
                }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let book = json!({ "$ref": "#/components/schemas/Book" });
    let books = json!({ "type": "array", "items": { "$ref": "#/components/schemas/Book" } });
    let not_found = json!({
        "description": "Not found",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Envelope" }
            }
        }
    });
    let id_param = json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    }]);
    let input_body = json!({
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    });

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": { "200": envelope_response("All books", books.clone()) }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": input_body.clone(),
                    "responses": { "201": envelope_response("Created book", book.clone()) }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "responses": {
                        "200": envelope_response("The book", book),
                        "404": not_found.clone()
                    }
                },
                "patch": {
                    "summary": "Update a book's name and type",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "requestBody": input_body,
                    "responses": {
                        "200": envelope_response("All books after the update", books.clone()),
                        "404": not_found.clone()
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": envelope_response("Remaining books", books),
                        "404": not_found
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "description": "Store-assigned identifier" },
                        "name": { "type": "string" },
                        "type": { "type": "string", "description": "Genre" },
                        "author": { "type": "string" }
                    }
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "type": { "type": "string" },
                        "author": { "type": "string", "description": "Ignored on update" }
                    }
                }
            }
        }
    })
}

/// Create the books module over the given store
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{InMemoryBookStore, UnavailableStore};

    #[test]
    fn openapi_fragment_covers_all_operations() {
        let spec = openapi_fragment();
        for method in ["get", "post"] {
            assert!(spec["paths"]["/books"][method].is_object());
        }
        for method in ["get", "patch", "delete"] {
            assert!(spec["paths"]["/books/{id}"][method].is_object());
        }
        assert!(spec["components"]["schemas"]["Book"].is_object());
    }

    #[test]
    fn contributes_books_table_migration() {
        let module = BooksModule::new(Arc::new(InMemoryBookStore::new()));
        let migrations = module.migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].up.contains("CREATE TABLE IF NOT EXISTS books"));
    }

    #[tokio::test]
    async fn health_follows_the_store() {
        let healthy = BooksModule::new(Arc::new(InMemoryBookStore::new()));
        assert!(healthy.health().await.is_ok());

        let unreachable = BooksModule::new(Arc::new(UnavailableStore));
        let error = unreachable.health().await.unwrap_err();
        assert!(error.to_string().contains("database error"));
    }
}
