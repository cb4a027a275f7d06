//! HTTP server facade for bookshelf: Axum router, response envelope, error
//! mapping and OpenAPI support.

use std::sync::Arc;

use anyhow::Context;
use axum::{http::StatusCode, routing::get, Router};
use tower_http::normalize_path::NormalizePath;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod envelope;
pub mod error;
pub mod router;

pub use envelope::Envelope;
pub use error::AppError;

use router::RouterBuilder;

/// Serve the application until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    settings: &Settings,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = settings.bind_addr();
    tracing::info!("starting HTTP server on {}", addr);

    let app = build_app(registry, settings);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("HTTP server listening on http://{}", addr);

    let make_service = axum::ServiceExt::<axum::extract::Request>::into_make_service(app);
    axum::serve(listener, make_service)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// The served application: [`build_router`] with trailing slashes trimmed
/// before routing, so `/books/` reaches `/books`.
pub fn build_app(registry: &ModuleRegistry, settings: &Settings) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_router(registry, settings))
}

/// Build the application router: welcome and health routes, every module's
/// routes, OpenAPI docs, the not-found fallback, then the global middleware stack.
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let health_registry = Arc::new(registry.clone());
    let mut router_builder = RouterBuilder::new()
        .route("/", get(welcome))
        .route("/healthz", get(move || health_check(health_registry.clone())));

    for module in registry.modules() {
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_not_found_fallback()
        .with_timeout(settings.server.request_timeout_ms)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .build()
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

async fn welcome() -> Envelope {
    Envelope::message(StatusCode::OK, "Welcome !")
}

/// `ok`, or 503 naming every module whose health check failed
async fn health_check(registry: Arc<ModuleRegistry>) -> (StatusCode, String) {
    let failures = registry.check_health().await;
    if failures.is_empty() {
        return (StatusCode::OK, "ok".to_string());
    }

    for (module, error) in &failures {
        tracing::warn!(module = *module, error = %format!("{:#}", error), "module unhealthy");
    }
    let names: Vec<&str> = failures.iter().map(|(module, _)| *module).collect();
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("unavailable: {}", names.join(", ")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, response::Response};
    use bookshelf_kernel::Module;
    use serde_json::{json, Value};
    use std::convert::Infallible;
    use tower::{Service, ServiceExt};

    struct Unreachable;

    #[async_trait]
    impl Module for Unreachable {
        fn name(&self) -> &'static str {
            "books"
        }

        fn routes(&self) -> Router {
            Router::new()
        }

        async fn health(&self) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    async fn call<S>(app: S, uri: &str) -> (StatusCode, Vec<u8>)
    where
        S: Service<Request<Body>, Response = Response, Error = Infallible>,
    {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
        call(
            build_router(&ModuleRegistry::new(), &Settings::default()),
            uri,
        )
        .await
    }

    #[tokio::test]
    async fn welcome_returns_envelope() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"status": 200, "message": "Welcome !"}));
    }

    #[tokio::test]
    async fn health_check_is_plain_text() {
        let (status, body) = get("/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn health_check_names_unhealthy_modules() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Unreachable));

        let (status, body) = call(build_router(&registry, &Settings::default()), "/healthz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, b"unavailable: books");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = get("/docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["openapi"], "3.1.0");
    }

    #[tokio::test]
    async fn unknown_route_is_404_envelope() {
        let (status, body) = get("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"status": 404, "error": "Not found"}));
    }

    #[tokio::test]
    async fn app_trims_trailing_slash() {
        let app = build_app(&ModuleRegistry::new(), &Settings::default());
        let (status, body) = call(app, "/healthz/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");

        let app = build_app(&ModuleRegistry::new(), &Settings::default());
        let (status, _) = call(app, "/").await;
        assert_eq!(status, StatusCode::OK);
    }
}
