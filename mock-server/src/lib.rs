use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const TEST_TOKEN: &str = "123456789:test-token";
pub const BOT_ID: i64 = 123456789;

/// Seeded private chat with a user.
pub const PRIVATE_CHAT_ID: i64 = 987654321;
/// Seeded supergroup, also reachable as `@rustclub`.
pub const GROUP_CHAT_ID: i64 = -1001234567890;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Message,
}

/// Test hook payload: a message some user sent to the bot.
#[derive(Deserialize)]
pub struct Incoming {
    pub chat_id: i64,
    pub text: String,
}

pub struct MockState {
    token: String,
    bot: User,
    chats: HashMap<i64, Chat>,
    next_message_id: i64,
    next_update_id: i64,
    updates: VecDeque<Update>,
}

pub type Db = Arc<RwLock<MockState>>;

/// An API failure, rendered as an `ok: false` envelope.
#[derive(Debug)]
pub struct ApiError {
    code: u16,
    description: String,
}

impl ApiError {
    fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    fn bad_request(reason: &str) -> Self {
        Self::new(400, format!("Bad Request: {reason}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::BAD_REQUEST);
        let body = json!({"ok": false, "error_code": self.code, "description": self.description});
        (status, Json(body)).into_response()
    }
}

fn ok(result: impl Serialize) -> Result<Json<Value>, ApiError> {
    let result = serde_json::to_value(result).map_err(|e| ApiError::new(500, e.to_string()))?;
    Ok(Json(json!({"ok": true, "result": result})))
}

impl MockState {
    fn new(token: &str) -> Self {
        let chats = [
            Chat {
                id: PRIVATE_CHAT_ID,
                kind: "private".to_string(),
                title: None,
                username: Some("alice".to_string()),
                first_name: Some("Alice".to_string()),
            },
            Chat {
                id: GROUP_CHAT_ID,
                kind: "supergroup".to_string(),
                title: Some("Rust Club".to_string()),
                username: Some("rustclub".to_string()),
                first_name: None,
            },
        ];
        Self {
            token: token.to_string(),
            bot: User {
                id: BOT_ID,
                is_bot: true,
                first_name: "TestBot".to_string(),
                username: Some("test_bot".to_string()),
            },
            chats: chats.into_iter().map(|c| (c.id, c)).collect(),
            next_message_id: 1,
            next_update_id: 10000,
            updates: VecDeque::new(),
        }
    }

    /// Resolve a `chat_id` parameter: an integer, a numeric string, or
    /// `@username`.
    fn find_chat(&self, chat_id: Option<&Value>) -> Result<&Chat, ApiError> {
        let chat_id = chat_id.ok_or_else(|| ApiError::bad_request("chat_id is empty"))?;
        let found = match (int_param(chat_id), chat_id.as_str()) {
            (Some(id), _) => self.chats.get(&id),
            (None, Some(name)) => {
                let name = name.trim_start_matches('@');
                self.chats.values().find(|c| c.username.as_deref() == Some(name))
            }
            (None, None) => None,
        };
        found.ok_or_else(|| ApiError::bad_request("chat not found"))
    }

    fn new_message(&mut self, chat: Chat, from: User, text: String) -> Message {
        let message = Message {
            message_id: self.next_message_id,
            from: Some(from),
            chat,
            date: unix_now(),
            text: Some(text),
        };
        self.next_message_id += 1;
        message
    }
}

pub fn app() -> Router {
    app_with_token(TEST_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(MockState::new(token)));
    Router::new()
        .route("/{bot_token}/{method}", get(dispatch).post(dispatch))
        .route("/_mock/incoming", post(push_incoming))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

/// Bot API entry point. Parameters are merged from the query string and, if
/// present, a JSON object body.
async fn dispatch(
    State(db): State<Db>,
    Path((bot_token, method)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let mut params: Map<String, Value> = query.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    if !body.is_empty() {
        match serde_json::from_slice(&body) {
            Ok(Value::Object(fields)) => params.extend(fields),
            _ => return Err(ApiError::bad_request("can't parse request body")),
        }
    }

    let mut state = db.write().await;
    if bot_token.strip_prefix("bot") != Some(state.token.as_str()) {
        return Err(ApiError::new(401, "Unauthorized"));
    }

    match method.as_str() {
        "getMe" => ok(&state.bot),
        "getChat" => get_chat(&state, &params),
        "sendMessage" => send_message(&mut state, &params),
        "getUpdates" => get_updates(&mut state, &params),
        _ => Err(ApiError::new(404, "Not Found")),
    }
}

fn get_chat(state: &MockState, params: &Map<String, Value>) -> Result<Json<Value>, ApiError> {
    let chat = state.find_chat(params.get("chat_id"))?;
    let mut info = serde_json::to_value(chat).map_err(|e| ApiError::new(500, e.to_string()))?;
    if let Value::Object(fields) = &mut info {
        fields.insert("accent_color_id".to_string(), json!(0));
        fields.insert("max_reaction_count".to_string(), json!(11));
        if let Some(username) = &chat.username {
            fields.insert("active_usernames".to_string(), json!([username]));
        }
    }
    ok(info)
}

fn send_message(state: &mut MockState, params: &Map<String, Value>) -> Result<Json<Value>, ApiError> {
    let chat = state.find_chat(params.get("chat_id"))?.clone();
    let text = params
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("message text is empty"))?
        .to_string();
    if let Some(mode) = params.get("parse_mode") {
        match mode.as_str() {
            Some("HTML" | "MarkdownV2" | "Markdown") => {}
            _ => return Err(ApiError::bad_request("unsupported parse_mode")),
        }
    }
    let bot = state.bot.clone();
    let message = state.new_message(chat, bot, text);
    ok(message)
}

fn get_updates(state: &mut MockState, params: &Map<String, Value>) -> Result<Json<Value>, ApiError> {
    let limit = params.get("limit").and_then(int_param).unwrap_or(100).clamp(1, 100);
    if let Some(offset) = params.get("offset").and_then(int_param) {
        // any offset confirms everything before it
        state.updates.retain(|u| u.update_id >= offset);
    }
    let batch: Vec<&Update> = state.updates.iter().take(limit as usize).collect();
    ok(batch)
}

async fn push_incoming(State(db): State<Db>, Json(input): Json<Incoming>) -> Result<Json<Value>, ApiError> {
    let mut state = db.write().await;
    let chat = state.find_chat(Some(&json!(input.chat_id)))?.clone();
    let from = User {
        id: chat.id,
        is_bot: false,
        first_name: chat.first_name.clone().unwrap_or_else(|| "Member".to_string()),
        username: chat.username.clone(),
    };
    let message = state.new_message(chat, from, input.text);
    let update = Update {
        update_id: state.next_update_id,
        message,
    };
    state.next_update_id += 1;
    state.updates.push_back(update.clone());
    ok(update)
}

/// Integers arrive as JSON numbers in bodies and as strings in queries.
fn int_param(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_param_accepts_numbers_and_numeric_strings() {
        assert_eq!(int_param(&json!(42)), Some(42));
        assert_eq!(int_param(&json!("-100")), Some(-100));
        assert_eq!(int_param(&json!("@rustclub")), None);
        assert_eq!(int_param(&json!(true)), None);
    }

    #[test]
    fn find_chat_by_id_string_and_username() {
        let state = MockState::new(TEST_TOKEN);
        assert_eq!(state.find_chat(Some(&json!(PRIVATE_CHAT_ID))).unwrap().id, PRIVATE_CHAT_ID);
        assert_eq!(
            state.find_chat(Some(&json!(GROUP_CHAT_ID.to_string()))).unwrap().id,
            GROUP_CHAT_ID
        );
        assert_eq!(state.find_chat(Some(&json!("@rustclub"))).unwrap().id, GROUP_CHAT_ID);
    }

    #[test]
    fn find_chat_missing_is_bad_request() {
        let state = MockState::new(TEST_TOKEN);
        let err = state.find_chat(Some(&json!(1))).unwrap_err();
        assert_eq!(err.code, 400);
        assert_eq!(err.description, "Bad Request: chat not found");
    }

    #[test]
    fn user_serializes_to_json() {
        let state = MockState::new(TEST_TOKEN);
        let json = serde_json::to_value(&state.bot).unwrap();
        assert_eq!(json["id"], BOT_ID);
        assert_eq!(json["is_bot"], true);
        assert_eq!(json["first_name"], "TestBot");
        assert_eq!(json["username"], "test_bot");
    }

    #[test]
    fn messages_get_increasing_ids() {
        let mut state = MockState::new(TEST_TOKEN);
        let chat = state.chats[&PRIVATE_CHAT_ID].clone();
        let bot = state.bot.clone();
        let first = state.new_message(chat.clone(), bot.clone(), "a".to_string());
        let second = state.new_message(chat, bot, "b".to_string());
        assert_eq!(second.message_id, first.message_id + 1);
    }
}
