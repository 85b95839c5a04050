//! Blocking client for the Telegram Bot API.
//!
//! # Overview
//! Typed parameters are encoded into a query string (GET) or a JSON body
//! (POST), sent with `ureq`, and the response envelope is unwrapped into
//! either the raw `result` or a `BotApiError`. `BotClient` layers typed
//! bindings (`getMe`, `getChat`, `sendMessage`, `getUpdates`) on top.
//!
//! # Design
//! - `Transport` holds only the endpoint configuration, the timeout and a
//!   shared `ureq::Agent`; calls take `&self` and never mutate it.
//! - Request building and envelope parsing are pure functions over
//!   `HttpRequest`/`HttpResponse`, so only `Transport::execute` does I/O.
//! - Decoding is two-stage: the envelope first, then `result` into the
//!   binding's type.
//! - Types are defined independently of the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::BotClient;
pub use config::{EndpointConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use encode::{encode_body, encode_query};
pub use envelope::Envelope;
pub use error::{BotApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{parse_response, Transport};
pub use types::{
    AcceptedGiftTypes, Chat, ChatFullInfo, ChatId, ChatKind, ChatPhoto, GetChatParams, GetUpdatesParams, Message,
    MessageEntity, ParseMode, ReactionType, SendMessageParams, Update, User,
};
