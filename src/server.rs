use crate::handlers::{self, AppContext, HandlerError};
use axum::{body::Bytes, extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tracing::info;

/// Build the HTTP router: `GET /` liveness, `POST /webhook` for Telegram updates.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", post(webhook))
        .with_state(ctx)
}

/// Bind `0.0.0.0:<port>` and serve until ctrl-c.
pub async fn serve(ctx: AppContext, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "webhook server listening");
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "tg-linkbot is running" }))
}

// Raw bytes in: malformed payloads must answer with the JSON error body.
async fn webhook(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    handlers::handle_webhook_body(&ctx, &body).await?;
    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
