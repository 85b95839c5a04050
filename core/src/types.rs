//! Bot API objects and method parameters.
//!
//! # Design
//! Mirrors of the remote schema, limited to what the bound methods use.
//! Identifiers are `i64` throughout. Optional request fields are skipped when
//! `None` so they never reach the query string or body.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Telegram user or bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub added_to_attachment_menu: bool,
    /// Only returned by `getMe`.
    #[serde(default)]
    pub can_join_groups: bool,
    #[serde(default)]
    pub can_read_all_group_messages: bool,
    #[serde(default)]
    pub supports_inline_queries: bool,
    #[serde(default)]
    pub can_connect_to_business: bool,
    #[serde(default)]
    pub has_main_web_app: bool,
    #[serde(default)]
    pub has_topics_enabled: bool,
    #[serde(default)]
    pub allows_users_to_create_topics: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A chat as embedded in messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_forum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatPhoto {
    pub small_file_id: String,
    pub small_file_unique_id: String,
    pub big_file_id: String,
    pub big_file_unique_id: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptedGiftTypes {
    #[serde(default)]
    pub unlimited_gifts: bool,
    #[serde(default)]
    pub limited_gifts: bool,
    #[serde(default)]
    pub unique_gifts: bool,
    #[serde(default)]
    pub premium_subscription: bool,
}

/// Full chat information, as returned by `getChat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatFullInfo {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_forum: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_usernames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<ChatPhoto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reaction_count: Option<i64>,
    #[serde(default)]
    pub has_visible_history: bool,
    #[serde(default)]
    pub can_send_paid_media: bool,
    #[serde(default)]
    pub can_send_gift: bool,
    /// Reactions allowed in the chat; absent means all emoji are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_reactions: Option<Vec<ReactionType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_gift_types: Option<AcceptedGiftTypes>,
}

/// A reaction: a standard emoji, a custom emoji or a paid star reaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

/// A special entity in message text (mention, URL, bold run, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: i64,
    pub length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    /// Unix time in seconds.
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
}

/// An incoming update. At most one of the optional payloads is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
}

impl Update {
    /// The message carried by this update, whichever kind it is.
    pub fn any_message(&self) -> Option<&Message> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .or(self.channel_post.as_ref())
            .or(self.edited_channel_post.as_ref())
    }
}

/// Target chat: a numeric id or a public `@username`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        ChatId::Username(username.to_string())
    }
}

impl From<String> for ChatId {
    fn from(username: String) -> Self {
        ChatId::Username(username)
    }
}

impl std::str::FromStr for ChatId {
    type Err = std::convert::Infallible;

    /// Integers become `Id`, anything else is taken as a username.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(ChatId::Id)
            .unwrap_or_else(|_| ChatId::Username(s.to_string())))
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{id}"),
            ChatId::Username(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    MarkdownV2,
    /// Legacy Markdown, kept for compatibility.
    Markdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetChatParams {
    pub chat_id: ChatId,
}

impl GetChatParams {
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
        }
    }
}

/// Parameters for `sendMessage`. Only `chat_id` and `text` are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageParams {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protect_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl SendMessageParams {
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            message_thread_id: None,
            disable_web_page_preview: None,
            disable_notification: None,
            protect_content: None,
            reply_to_message_id: None,
        }
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn silent(mut self) -> Self {
        self.disable_notification = Some(true);
        self
    }
}

/// Parameters for `getUpdates` long polling. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetUpdatesParams {
    /// First update to return; earlier updates are confirmed and dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// 1-100, server default 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Long-poll timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_decodes_with_missing_optional_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 123456789,
            "is_bot": true,
            "first_name": "TestBot",
            "username": "test_bot"
        }))
        .unwrap();
        assert_eq!(user.id, 123456789);
        assert!(user.is_bot);
        assert_eq!(user.username.as_deref(), Some("test_bot"));
        assert!(user.last_name.is_none());
        assert!(!user.can_join_groups);
    }

    #[test]
    fn user_topic_flags_default_to_false() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "is_bot": true,
            "first_name": "Forum",
            "has_topics_enabled": true
        }))
        .unwrap();
        assert!(user.has_topics_enabled);
        assert!(!user.allows_users_to_create_topics);
    }

    #[test]
    fn chat_full_info_decodes_gift_and_reactions() {
        let info: ChatFullInfo = serde_json::from_value(json!({
            "id": -100,
            "type": "supergroup",
            "title": "Rust Club",
            "can_send_gift": true,
            "available_reactions": [
                {"type": "emoji", "emoji": "\u{1F44D}"},
                {"type": "custom_emoji", "custom_emoji_id": "5368324170671202286"}
            ]
        }))
        .unwrap();
        assert!(info.can_send_gift);
        let reactions = info.available_reactions.unwrap();
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].kind, "emoji");
        assert_eq!(reactions[1].custom_emoji_id.as_deref(), Some("5368324170671202286"));

        let bare: ChatFullInfo = serde_json::from_value(json!({"id": 1, "type": "private"})).unwrap();
        assert!(!bare.can_send_gift);
        assert!(bare.available_reactions.is_none());
    }

    #[test]
    fn chat_kind_uses_wire_names() {
        let chat: Chat =
            serde_json::from_value(json!({"id": -1001234567890_i64, "type": "supergroup", "title": "Rust"}))
                .unwrap();
        assert_eq!(chat.kind, ChatKind::Supergroup);
        assert_eq!(chat.id, -1001234567890);
        assert_eq!(serde_json::to_value(&chat).unwrap()["type"], "supergroup");
    }

    #[test]
    fn chat_id_serializes_untagged() {
        assert_eq!(serde_json::to_value(ChatId::Id(-42)).unwrap(), json!(-42));
        assert_eq!(serde_json::to_value(ChatId::from("@rust")).unwrap(), json!("@rust"));
        assert_eq!("123".parse::<ChatId>().unwrap(), ChatId::Id(123));
        assert_eq!("@rust".parse::<ChatId>().unwrap(), ChatId::Username("@rust".into()));
    }

    #[test]
    fn parse_mode_wire_names() {
        assert_eq!(serde_json::to_value(ParseMode::Html).unwrap(), "HTML");
        assert_eq!(serde_json::to_value(ParseMode::MarkdownV2).unwrap(), "MarkdownV2");
    }

    #[test]
    fn send_message_skips_unset_options() {
        let params = SendMessageParams::new(5, "hi").parse_mode(ParseMode::MarkdownV2);
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"chat_id": 5, "text": "hi", "parse_mode": "MarkdownV2"}));
    }

    #[test]
    fn update_any_message_falls_back_to_channel_post() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 9,
            "channel_post": {
                "message_id": 1,
                "chat": {"id": -100, "type": "channel", "title": "news"},
                "date": 0,
                "text": "post"
            }
        }))
        .unwrap();
        assert_eq!(update.any_message().unwrap().text.as_deref(), Some("post"));
    }
}
