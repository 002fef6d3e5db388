use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Response;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, ApiErrorBody, AppState};
use crate::config::ServerConfig;

/// Build the full application: `/api` routes plus optional static pages
pub fn app(config: &ServerConfig, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().nest("/api", api::router(state));

    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    if let Some(seconds) = config.request_timeout_seconds {
        app = app
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(seconds),
            ))
            .layer(middleware::map_response(timeout_error_body));
    }

    // Oversized bodies surface as a 413 rejection from the JSON extractor.
    app.layer(DefaultBodyLimit::max(config.body_limit_kb * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// The timeout layer answers with an empty body; give it the API error shape
async fn timeout_error_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiErrorBody::response(StatusCode::REQUEST_TIMEOUT, "Request timed out");
    }
    response
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(config, state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;

    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        return serve_tls(addr, app, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "Web server stopped unexpectedly")?;
    tracing::info!("Web server shut down");
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(addr: SocketAddr, app: Router, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    check_pem_files(cert, key)?;
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| "Failed to load TLS certificate or key")?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| "Web server stopped unexpectedly")?;
    Ok(())
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_addr: SocketAddr, _app: Router, _cert: &str, _key: &str) -> Result<()> {
    anyhow::bail!("TLS paths are configured but this build has no `tls` feature")
}

/// Fail early with a readable message instead of a rustls error
#[cfg(feature = "tls")]
fn check_pem_files(cert: &str, key: &str) -> Result<()> {
    use std::fs::File;
    use std::io::BufReader;

    let mut cert_reader = BufReader::new(
        File::open(cert).with_context(|| format!("Cannot open TLS certificate {cert}"))?,
    );
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid PEM in {cert}"))?;
    if certs.is_empty() {
        anyhow::bail!("No certificates found in {cert}");
    }

    let mut key_reader = BufReader::new(
        File::open(key).with_context(|| format!("Cannot open TLS key {key}"))?,
    );
    rustls_pemfile::private_key(&mut key_reader)
        .with_context(|| format!("Invalid PEM in {key}"))?
        .with_context(|| format!("No private key found in {key}"))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
