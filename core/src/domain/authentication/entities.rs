use serde::{Deserialize, Serialize};

/// Credentials returned by sign-in and OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Token refresh may or may not rotate the refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// The persisted client session. Always written and cleared as one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub email: String,
}

impl StoredSession {
    pub fn from_tokens(tokens: TokenPair, email: impl Into<String>) -> Self {
        Self {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut,
    /// The backend rejected the stored credentials; the user must sign in again.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    SignedIn { email: String },
    SignedOut,
}
