use crate::config::Replies;
use crate::model::ReplyKind;
use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::info;

/// Sends a text message to a chat.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// [`ReplySender`] backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramReplier {
    bot: Bot,
}

impl TelegramReplier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Bot::new(token))
    }

    /// Resolve the bot account behind the token. Fails on a revoked or
    /// malformed token.
    pub async fn identify(&self) -> Result<Me> {
        let me = self.bot.get_me().await?;
        info!(username = %me.username(), "bot authorized");
        Ok(me)
    }
}

#[async_trait]
impl ReplySender for TelegramReplier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}

/// Fixed reply texts, picked by whether a link was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTemplates {
    saved: String,
    missing_link: String,
}

impl ReplyTemplates {
    pub fn text(&self, kind: ReplyKind) -> &str {
        match kind {
            ReplyKind::Saved => &self.saved,
            ReplyKind::MissingLink => &self.missing_link,
        }
    }
}

impl Default for ReplyTemplates {
    fn default() -> Self {
        Replies::default().into()
    }
}

impl From<Replies> for ReplyTemplates {
    fn from(r: Replies) -> Self {
        Self {
            saved: r.saved,
            missing_link: r.missing_link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_follow_config() {
        let t = ReplyTemplates::from(Replies {
            saved: "ok!".into(),
            missing_link: "send a link".into(),
        });
        assert_eq!(t.text(ReplyKind::Saved), "ok!");
        assert_eq!(t.text(ReplyKind::MissingLink), "send a link");
    }

    #[test]
    fn default_templates_mention_schemes() {
        let t = ReplyTemplates::default();
        assert!(t.text(ReplyKind::MissingLink).contains("http://"));
        assert!(t.text(ReplyKind::MissingLink).contains("https://"));
        assert_ne!(t.text(ReplyKind::Saved), t.text(ReplyKind::MissingLink));
    }
}
