//! tgbot CLI: inspect the bot, look up chats, send messages and long-poll
//! updates. Config from env (`.env` supported) and CLI flags.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tgbot_core::{BotClient, ChatId, EndpointConfig, GetChatParams, GetUpdatesParams, ParseMode, SendMessageParams};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tgbot")]
#[command(about = "Telegram Bot API client: me, chat, send, poll", long_about = None)]
#[command(version)]
struct Cli {
    /// Bot token as issued by @BotFather.
    #[arg(long, global = true, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API origin, e.g. a local Bot API server or the mock server.
    #[arg(long, global = true, env = "TELEGRAM_API_URL")]
    api_url: Option<String>,

    /// HTTP timeout per call, in seconds.
    #[arg(long, global = true, env = "TELEGRAM_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the bot's own user.
    Me,
    /// Print information about a chat (numeric id or @username).
    Chat {
        #[arg(allow_negative_numbers = true, value_parser = parse_chat_id)]
        chat: ChatId,
    },
    /// Send a text message.
    Send {
        #[arg(allow_negative_numbers = true, value_parser = parse_chat_id)]
        chat: ChatId,
        text: String,
        #[arg(long, value_enum)]
        parse_mode: Option<ParseModeArg>,
        /// Deliver without a notification sound.
        #[arg(long)]
        silent: bool,
    },
    /// Long-poll for updates and print incoming messages.
    Poll {
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
        /// Seconds the server may hold each poll open.
        #[arg(long, default_value_t = 30)]
        poll_timeout: u32,
        /// Stop after the first batch.
        #[arg(long)]
        once: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ParseModeArg {
    Html,
    MarkdownV2,
    Markdown,
}

impl From<ParseModeArg> for ParseMode {
    fn from(arg: ParseModeArg) -> Self {
        match arg {
            ParseModeArg::Html => ParseMode::Html,
            ParseModeArg::MarkdownV2 => ParseMode::MarkdownV2,
            ParseModeArg::Markdown => ParseMode::Markdown,
        }
    }
}

impl Cli {
    fn client(&self) -> Result<BotClient> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("bot token missing: pass --token or set TELEGRAM_BOT_TOKEN"))?;
        let mut endpoint = EndpointConfig::new(token);
        if let Some(api_url) = &self.api_url {
            endpoint = endpoint.with_api_url(api_url);
        }
        tracing::debug!(?endpoint, timeout_secs = self.timeout_secs, "client configured");
        Ok(BotClient::with_config(endpoint).with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut client = cli.client()?;

    match cli.command {
        Commands::Me => {
            let me = client.get_me().context("failed to get bot info")?;
            print_json(&me)
        }
        Commands::Chat { chat } => {
            let info = client
                .get_chat(&GetChatParams::new(chat.clone()))
                .with_context(|| format!("failed to get chat {chat}"))?;
            print_json(&info)
        }
        Commands::Send {
            chat,
            text,
            parse_mode,
            silent,
        } => {
            let mut params = SendMessageParams::new(chat.clone(), text);
            if let Some(mode) = parse_mode {
                params = params.parse_mode(mode.into());
            }
            if silent {
                params = params.silent();
            }
            let message = client
                .send_message(&params)
                .with_context(|| format!("failed to send message to {chat}"))?;
            tracing::info!(message_id = message.message_id, chat_id = message.chat.id, "message sent");
            print_json(&message)
        }
        Commands::Poll {
            limit,
            poll_timeout,
            once,
        } => {
            let needed = poll_http_timeout(poll_timeout);
            if client.timeout() < needed {
                client.set_timeout(needed);
            }
            poll(&client, limit, poll_timeout, once)
        }
    }
}

/// Integers become chat ids, anything else a username.
fn parse_chat_id(s: &str) -> Result<ChatId, std::convert::Infallible> {
    s.parse()
}

/// The HTTP deadline must outlast the server-side long-poll hold.
fn poll_http_timeout(poll_timeout: u32) -> Duration {
    Duration::from_secs(u64::from(poll_timeout) + 10)
}

fn poll(client: &BotClient, limit: u32, poll_timeout: u32, once: bool) -> Result<()> {
    tracing::info!(limit, poll_timeout, "listening for updates (Ctrl+C to stop)");
    let mut offset = None;
    loop {
        let params = GetUpdatesParams {
            offset,
            limit: Some(limit),
            timeout: Some(poll_timeout),
            allowed_updates: None,
        };
        let updates = client.get_updates(&params).context("failed to get updates")?;
        tracing::debug!(count = updates.len(), ?offset, "poll returned");

        for update in &updates {
            if let Some(message) = update.any_message() {
                let from = message
                    .from
                    .as_ref()
                    .map(|u| match &u.username {
                        Some(username) => format!("@{username} ({})", u.first_name),
                        None => u.first_name.clone(),
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                println!(
                    "[{}] chat {} from {}: {}",
                    update.update_id,
                    message.chat.id,
                    from,
                    message.text.as_deref().unwrap_or("<non-text message>")
                );
            }
            offset = Some(update.update_id + 1);
        }

        if once {
            return Ok(());
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("failed to render response")?;
    println!("{pretty}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tgbot").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn send_parses_chat_and_mode() {
        let cli = parse(&["--token", "1:abc", "send", "@rustclub", "hi", "--parse-mode", "markdown-v2"]);
        match cli.command {
            Commands::Send {
                chat,
                text,
                parse_mode,
                silent,
            } => {
                assert_eq!(chat, ChatId::Username("@rustclub".to_string()));
                assert_eq!(text, "hi");
                assert_eq!(parse_mode, Some(ParseModeArg::MarkdownV2));
                assert!(!silent);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chat_accepts_numeric_id() {
        let cli = parse(&["--token", "1:abc", "chat", "-1001234567890"]);
        assert!(matches!(cli.command, Commands::Chat { chat: ChatId::Id(-1001234567890) }));
    }

    #[test]
    fn send_to_numeric_chat_serializes_integer_id() {
        let cli = parse(&["--token", "1:abc", "send", "987654321", "hi"]);
        let Commands::Send { chat, text, .. } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(chat, ChatId::Id(987654321));
        let body = serde_json::to_value(SendMessageParams::new(chat, text)).unwrap();
        assert_eq!(body, serde_json::json!({"chat_id": 987654321, "text": "hi"}));
    }

    #[test]
    fn client_uses_flags() {
        let cli = parse(&[
            "--token",
            "1:abc",
            "--api-url",
            "http://127.0.0.1:3000/",
            "--timeout-secs",
            "5",
            "me",
        ]);
        let client = cli.client().unwrap();
        assert_eq!(client.endpoint().api_url(), "http://127.0.0.1:3000");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn empty_token_is_rejected() {
        let cli = parse(&["--token", "", "me"]);
        assert!(cli.client().is_err());
    }

    #[test]
    fn poll_timeout_exceeds_long_poll_hold() {
        assert_eq!(poll_http_timeout(30), Duration::from_secs(40));
        assert_eq!(poll_http_timeout(0), Duration::from_secs(10));
    }
}
