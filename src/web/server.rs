use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use super::control::ControlSurface;

#[derive(Clone)]
pub struct WebServer {
    pub port: u16,
    pub host: String,
    pub control: ControlSurface,
}

impl WebServer {
    pub fn new(port: u16, host: String, control: ControlSurface) -> Self {
        Self {
            port,
            host,
            control,
        }
    }

    /// Serve until the process exits
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn start_with_shutdown<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        // Convert localhost to 127.0.0.1 for proper parsing
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            &self.host
        };
        let addr: SocketAddr = format!("{}:{}", host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("🌐 Monitoring service server started on port: {}", self.port);
        Ok(listener)
    }

    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.create_app())
            .with_graceful_shutdown(shutdown)
            .await
            .context("Web server failed")?;
        Ok(())
    }

    pub fn create_app(&self) -> Router {
        Router::new()
            .route("/", get(serve_status))
            .route("/start", get(serve_start))
            .route("/stop", get(serve_stop))
            .with_state(self.control.clone())
            .layer(
                ServiceBuilder::new().layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                ),
            )
    }
}

async fn serve_status(State(control): State<ControlSurface>) -> String {
    control.status().await
}

async fn serve_start(State(control): State<ControlSurface>) -> String {
    let message = control.start().await;
    info!("📨 /start → {}", message);
    message
}

async fn serve_stop(State(control): State<ControlSurface>) -> String {
    let message = control.stop().await;
    info!("📨 /stop → {}", message);
    message
}
