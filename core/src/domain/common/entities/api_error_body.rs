//! Typed view of the error payloads the backend returns.
//!
//! The backend is not consistent about error shapes: authentication failures
//! come back as `{"detail": "..."}`, some endpoints use `message` or `error`,
//! and serializer failures return a map of field name to a list of messages.
//! [`ApiErrorBody`] accepts all of these and picks one message to show.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::app_errors::GENERIC_ERROR_MESSAGE;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessages {
    One(String),
    Many(Vec<String>),
    Nested(BTreeMap<String, ErrorMessages>),
    Other(serde_json::Value),
}

impl ErrorMessages {
    fn first(&self) -> Option<&str> {
        match self {
            ErrorMessages::One(message) => Some(message.as_str()),
            ErrorMessages::Many(messages) => messages.first().map(String::as_str),
            ErrorMessages::Nested(fields) => fields.values().find_map(ErrorMessages::first),
            ErrorMessages::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub non_field_errors: Option<ErrorMessages>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, ErrorMessages>,
}

impl ApiErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Picks the most specific message: `detail`, `message`, `error`,
    /// `non_field_errors`, then the first field error by field name.
    pub fn first_message(&self) -> Option<String> {
        [&self.detail, &self.message, &self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .cloned()
            .or_else(|| {
                self.non_field_errors
                    .as_ref()
                    .and_then(ErrorMessages::first)
                    .map(str::to_string)
            })
            .or_else(|| {
                self.fields
                    .values()
                    .find_map(ErrorMessages::first)
                    .map(str::to_string)
            })
    }
}

/// Extracts a user-facing message from a raw response body, falling back to a
/// generic message when the body is empty or not one of the known shapes.
pub fn extract_error_message(body: &str) -> String {
    ApiErrorBody::parse(body)
        .and_then(|parsed| parsed.first_message())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}
