//! One request/response exchange with the Bot API.
//!
//! # Design
//! `call` is `build_request`, `execute`, `parse_response` in sequence. The
//! first and last are pure, so everything except the network round-trip is
//! testable with plain values. No state survives a call apart from the
//! endpoint configuration and the `ureq::Agent`, whose connection pool is
//! shared by every clone of the transport.

use std::fmt;
use std::time::Duration;

use serde::de::Error as _;
use serde::Serialize;
use serde_json::value::RawValue;
use tracing::debug;

use crate::config::{EndpointConfig, DEFAULT_TIMEOUT};
use crate::encode::{encode_body, encode_query};
use crate::envelope::Envelope;
use crate::error::{BotApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Blocking transport bound to one endpoint.
#[derive(Clone)]
pub struct Transport {
    endpoint: EndpointConfig,
    timeout: Duration,
    agent: ureq::Agent,
}

impl Transport {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            agent: build_agent(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    /// Replace the per-call deadline. Rebuilds the agent, so warm
    /// connections from before the change are not reused.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
        self.agent = build_agent(timeout);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Invoke `operation` and return the envelope's raw `result`.
    pub fn call<P>(&self, method: HttpMethod, operation: &str, params: Option<&P>) -> Result<Box<RawValue>>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_request(method, operation, params)?;
        debug!(
            operation,
            %method,
            query_params = request.query.len(),
            body_bytes = request.body.as_ref().map_or(0, Vec::len),
            "sending bot api request"
        );
        let response = self.execute(request)?;
        debug!(
            operation,
            status = response.status,
            body_bytes = response.body.len(),
            "received bot api response"
        );
        parse_response(response)
    }

    /// Build the request for `operation` without sending it.
    pub fn build_request<P>(
        &self,
        method: HttpMethod,
        operation: &str,
        params: Option<&P>,
    ) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let url = self.endpoint.method_url(operation);
        match method {
            HttpMethod::Get => Ok(HttpRequest {
                method,
                url,
                query: encode_query(params)?,
                headers: Vec::new(),
                body: None,
            }),
            HttpMethod::Post => Ok(HttpRequest {
                method,
                url,
                query: Vec::new(),
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: encode_body(params)?,
            }),
        }
    }

    /// Run `request` over the network and read the whole body.
    ///
    /// Non-2xx statuses are returned as data; the Bot API reports rejections
    /// in the body.
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            query,
            headers,
            body,
        } = request;

        let sent = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&url);
                for (key, value) in &query {
                    builder = builder.query(key, value);
                }
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&url);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_slice()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = sent.map_err(BotApiError::Transport)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(BotApiError::Transport)?;
        Ok(HttpResponse { status, body })
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Decode the envelope and unwrap `result`.
///
/// The envelope decides success; a non-2xx status only matters when the body
/// claims `ok: true`, which is treated as a malformed response.
pub fn parse_response(response: HttpResponse) -> Result<Box<RawValue>> {
    let envelope = Envelope::from_slice(&response.body)?;
    if envelope.ok && !response.is_success() {
        return Err(BotApiError::Decode(serde_json::Error::custom(format!(
            "envelope reported ok with HTTP status {}",
            response.status
        ))));
    }
    envelope.into_result()
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn transport() -> Transport {
        Transport::new(EndpointConfig::new("42:secret").with_api_url("http://localhost:3000"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn get_request_carries_query_and_no_body() {
        let params = json!({"chat_id": "@rustclub", "limit": 100, "silent": false});
        let req = transport()
            .build_request(HttpMethod::Get, "getChat", Some(&params))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/bot42:secret/getChat");
        assert_eq!(
            req.query,
            vec![
                ("chat_id".to_string(), "@rustclub".to_string()),
                ("limit".to_string(), "100".to_string()),
                ("silent".to_string(), "false".to_string()),
            ]
        );
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn post_request_carries_json_body() {
        let params = json!({"chat_id": 7, "text": "hi"});
        let req = transport()
            .build_request(HttpMethod::Post, "sendMessage", Some(&params))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.query.is_empty());
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, params);
    }

    #[test]
    fn post_without_params_has_no_body() {
        let req = transport()
            .build_request::<Value>(HttpMethod::Post, "logOut", None)
            .unwrap();
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_success_returns_result_untouched() {
        let raw = parse_response(response(200, r#"{"ok":true,"result":[{"update_id":1}]}"#)).unwrap();
        assert_eq!(raw.get(), r#"[{"update_id":1}]"#);
    }

    #[test]
    fn parse_remote_rejection_on_error_status() {
        let err = parse_response(response(
            400,
            r#"{"ok":false,"description":"Bad Request: chat not found","error_code":400}"#,
        ))
        .unwrap_err();
        match err {
            BotApiError::Remote { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Bad Request: chat not found");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn parse_non_json_body_is_decode_error() {
        let err = parse_response(response(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert!(matches!(err, BotApiError::Decode(_)));

        let err = parse_response(response(200, "")).unwrap_err();
        assert!(matches!(err, BotApiError::Decode(_)));
    }

    #[test]
    fn parse_ok_on_error_status_is_decode_error() {
        let err = parse_response(response(500, r#"{"ok":true,"result":true}"#)).unwrap_err();
        assert!(matches!(err, BotApiError::Decode(_)));
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let t = transport();
        assert_eq!(t.timeout(), DEFAULT_TIMEOUT);
        let t = t.with_timeout(Duration::from_millis(250));
        assert_eq!(t.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn debug_masks_token() {
        let printed = format!("{:?}", transport());
        assert!(printed.contains("Transport"));
        assert!(!printed.contains("42:secret"));
    }

    #[test]
    fn transport_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transport>();
    }
}
