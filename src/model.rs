use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Telegram webhook update, reduced to the fields the bot reads.
///
/// Missing or `null` fields decode to their zero values, so a payload without
/// a `message` still yields an update with an empty text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramUpdate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: IncomingMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomingMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat: Chat,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TelegramUpdate {
    pub fn chat_id(&self) -> i64 {
        self.message.chat.id
    }

    pub fn text(&self) -> &str {
        &self.message.text
    }
}

/// A saved link, one row in the `urls` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct LinkRecord {
    pub id: String,
    pub message: String,
    pub url: String,
    pub date: DateTime<Utc>,
}

impl LinkRecord {
    /// Build a record with a fresh UUID and the current time.
    pub fn new(message: &str, url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.to_owned(),
            url: url.to_owned(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReplyKind {
    Saved,
    MissingLink,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Saved => "saved",
            ReplyKind::MissingLink => "missing_link",
        }
    }
}
