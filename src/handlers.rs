use crate::db::{self, Pool};
use crate::extract::extract_url;
use crate::model::{LinkRecord, ReplyKind, TelegramUpdate};
use crate::reply::{ReplySender, ReplyTemplates};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to store link: {0}")]
    Persistence(anyhow::Error),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            HandlerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            HandlerError::InvalidJson(_) => "invalid JSON",
            HandlerError::Persistence(_) => "internal server error",
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppContext {
    pub pool: Pool,
    pub replier: Arc<dyn ReplySender>,
    pub templates: Arc<ReplyTemplates>,
}

impl AppContext {
    pub fn new(pool: Pool, replier: Arc<dyn ReplySender>, templates: ReplyTemplates) -> Self {
        Self {
            pool,
            replier,
            templates: Arc::new(templates),
        }
    }
}

/// What happened to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(LinkRecord),
    NoLink,
}

impl Outcome {
    pub fn reply_kind(&self) -> ReplyKind {
        match self {
            Outcome::Saved(_) => ReplyKind::Saved,
            Outcome::NoLink => ReplyKind::MissingLink,
        }
    }
}

/// Extract a link from the update, store it when present, then reply.
///
/// A store failure returns early and no reply is sent. A failed reply is
/// logged and does not change the outcome.
#[instrument(skip_all, fields(chat_id = update.chat_id()))]
pub async fn handle_update(ctx: &AppContext, update: &TelegramUpdate) -> Result<Outcome, HandlerError> {
    let chat_id = update.chat_id();
    let text = update.text();
    info!(chat_id, text, "new message");

    let outcome = match extract_url(text) {
        Some(url) => {
            let record = LinkRecord::new(text, url);
            if let Err(err) = db::insert_link(&ctx.pool, &record).await {
                error!(?err, "failed to store link");
                return Err(HandlerError::Persistence(err));
            }
            info!(id = %record.id, url, "stored link");
            Outcome::Saved(record)
        }
        None => Outcome::NoLink,
    };

    let kind = outcome.reply_kind();
    if let Err(err) = ctx
        .replier
        .send_text(chat_id, ctx.templates.text(kind))
        .await
    {
        warn!(?err, reply = kind.as_str(), "failed to send reply");
    }

    Ok(outcome)
}

/// Decode a raw webhook body and run it through [`handle_update`].
pub async fn handle_webhook_body(ctx: &AppContext, body: &[u8]) -> Result<Outcome, HandlerError> {
    let update: TelegramUpdate = serde_json::from_slice(body).map_err(|err| {
        warn!(%err, "failed to decode update");
        HandlerError::InvalidJson(err)
    })?;
    handle_update(ctx, &update).await
}
