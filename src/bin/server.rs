//! polarity HTTP server binary.
//!
//! Serves the assessment flow: trait listing, session lifecycle, and the
//! pass-throughs to the external analysis and report services.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `ANALYSIS_URL` — Base URL of the analysis service (default: http://127.0.0.1:5000)
//! - `REPORT_URL` — Base URL of the report service (default: http://127.0.0.1:5000)
//! - `RUST_LOG` — Tracing filter (default: "info,polarity=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;

use polarity::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,polarity=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let state = AppState::new();
    tracing::info!("analysis service: {}", state.analysis.base_url());
    tracing::info!("report service:   {}", state.report.base_url());

    let app = app_router(state);

    tracing::info!("polarity server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                 — liveness probe");
    tracing::info!("  GET    /traits                 — trait listing");
    tracing::info!("  POST   /sessions               — start an assessment");
    tracing::info!("  POST   /sessions/{{id}}/answers  — record an answer");
    tracing::info!("  POST   /sessions/{{id}}/analysis — submit for analysis");
    tracing::info!("  POST   /sessions/{{id}}/report   — download a report");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
