//! JSON envelopes returned by the AppMetrica API

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "error_type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// Common response envelope
///
/// A non-zero `code` marks a failed request; `message` and `errors` then
/// describe the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<ApiErrorDetail>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        self.code != 0
    }

    /// Best available description of a failure.
    pub fn error_message(&self) -> String {
        if !self.message.is_empty() || self.errors.is_empty() {
            return self.message.clone();
        }

        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.kind, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// `"errors": null` is sent by some endpoints on success.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ApiErrorDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}
