//! Typed bindings for the bound Bot API methods.
//!
//! # Design
//! Each method picks a verb and a method name, hands its parameters to the
//! `Transport`, and decodes the raw `result` into its own return type. The
//! transport never looks inside `result`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::config::EndpointConfig;
use crate::error::{BotApiError, Result};
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{ChatFullInfo, GetChatParams, GetUpdatesParams, Message, SendMessageParams, Update, User};

/// Blocking client for the Telegram Bot API.
///
/// Cheap to clone; clones share one connection pool. Safe to use from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct BotClient {
    transport: Transport,
}

impl BotClient {
    /// Client for the public API origin with the default 30s timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(EndpointConfig::new(token))
    }

    pub fn with_config(endpoint: EndpointConfig) -> Self {
        Self {
            transport: Transport::new(endpoint),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        self.transport.endpoint()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `getMe`: the bot's own user.
    pub fn get_me(&self) -> Result<User> {
        let raw = self.transport.call::<()>(HttpMethod::Get, "getMe", None)?;
        decode(&raw)
    }

    /// `getChat`: up-to-date information about a chat.
    pub fn get_chat(&self, params: &GetChatParams) -> Result<ChatFullInfo> {
        let raw = self.transport.call(HttpMethod::Get, "getChat", Some(params))?;
        decode(&raw)
    }

    /// `sendMessage`: send a text message, returning it as stored by the server.
    pub fn send_message(&self, params: &SendMessageParams) -> Result<Message> {
        let raw = self.transport.call(HttpMethod::Post, "sendMessage", Some(params))?;
        decode(&raw)
    }

    /// `getUpdates`: pending updates, oldest first.
    ///
    /// With `timeout` set the server holds the request open; the client
    /// timeout must be longer than that.
    pub fn get_updates(&self, params: &GetUpdatesParams) -> Result<Vec<Update>> {
        let raw = self.transport.call(HttpMethod::Get, "getUpdates", Some(params))?;
        decode(&raw)
    }
}

/// Second decode stage: raw `result` into the binding's type.
pub fn decode<T: DeserializeOwned>(raw: &RawValue) -> Result<T> {
    serde_json::from_str(raw.get()).map_err(BotApiError::Decode)
}
