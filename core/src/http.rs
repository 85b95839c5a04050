//! HTTP exchange described as plain data.
//!
//! # Design
//! `Transport::build_request` produces an `HttpRequest` and
//! `Transport::parse_response` consumes an `HttpResponse`; only
//! `Transport::execute` touches the network. Keeping both ends as plain
//! values lets the encoding and envelope rules be tested without a socket.

use std::fmt;

use crate::config::mask_token;

/// HTTP method for a Bot API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be executed.
///
/// `url` carries the bot token; `Debug` masks it. `query` holds the
/// unescaped pairs; percent-encoding happens when the request is executed.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &redact_url(&self.url))
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body_bytes", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Replace the token in `<api_url>/bot<token>/<operation>` with its masked form.
fn redact_url(url: &str) -> String {
    let Some(start) = url.rfind("/bot").map(|i| i + "/bot".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('/').map_or(url.len(), |i| start + i);
    format!("{}{}{}", &url[..start], mask_token(&url[start..end]), &url[end..])
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
