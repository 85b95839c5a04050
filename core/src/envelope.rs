//! The `{ok, result, description, error_code}` wrapper around every response.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::error::{BotApiError, Result};

/// Response envelope as sent by the Bot API.
///
/// `result` is kept as raw JSON; the binding that issued the call decodes it
/// into its own type. `None` means the field was absent; an explicit `null`
/// is kept as raw `null`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default, deserialize_with = "present_raw")]
    pub result: Option<Box<RawValue>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl Envelope {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(BotApiError::Decode)
    }

    /// Unwrap the envelope: `ok: false` becomes `BotApiError::Remote`, a
    /// success without `result` is a decode error.
    pub fn into_result(self) -> Result<Box<RawValue>> {
        if !self.ok {
            return Err(BotApiError::Remote {
                code: self.error_code.unwrap_or_default(),
                message: self.description.unwrap_or_default(),
            });
        }
        self.result.ok_or_else(|| {
            BotApiError::Decode(serde_json::Error::custom(
                "envelope reported ok but carried no result",
            ))
        })
    }
}

/// Only called when the field exists, so `null` stays a value.
fn present_raw<'de, D>(deserializer: D) -> std::result::Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}
