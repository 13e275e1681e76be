use std::sync::Arc;

use base64::{Engine, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    authentication::{
        entities::{SessionEvent, SessionStatus, StoredSession},
        ports::{AuthRepository, TokenStore},
        validators::validate_fields,
        value_objects::{
            ChangePasswordInput, EmailInput, SetPasswordInput, SignInInput, SignUpInput,
            VerifyOtpInput,
        },
    },
    common::entities::app_errors::CoreError,
};

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT without verifying its signature.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| debug!("failed to decode JWT payload: {e}"))
        .ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&decoded)
        .map_err(|e| debug!("failed to deserialize JWT claims: {e}"))
        .ok()?;

    DateTime::from_timestamp(claim.exp?, 0)
}

pub struct AuthService<A> {
    repository: A,
    tokens: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl<A> AuthService<A>
where
    A: AuthRepository,
{
    pub fn new(
        repository: A,
        tokens: Arc<dyn TokenStore>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            repository,
            tokens,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn current_session(&self) -> Result<Option<StoredSession>, CoreError> {
        self.tokens.load()
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<StoredSession, CoreError> {
        let input = SignInInput {
            email: input.email.trim().to_string(),
            password: input.password,
        };
        validate_fields(&input, &SignInInput::FIELDS)?;

        let email = input.email.clone();
        let tokens = self.repository.sign_in(input).await?;
        self.start_session(StoredSession::from_tokens(tokens, email))
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<(), CoreError> {
        let input = SignUpInput {
            email: input.email.trim().to_string(),
            ..input
        };
        validate_fields(&input, &SignUpInput::FIELDS)?;
        self.repository.sign_up(input).await
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn verify_otp(&self, input: VerifyOtpInput) -> Result<StoredSession, CoreError> {
        let input = VerifyOtpInput {
            email: input.email.trim().to_string(),
            otp: input.otp.trim().to_string(),
        };
        validate_fields(&input, &VerifyOtpInput::FIELDS)?;

        let email = input.email.clone();
        let tokens = self.repository.verify_otp(input).await?;
        self.start_session(StoredSession::from_tokens(tokens, email))
    }

    #[instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> Result<(), CoreError> {
        let input = EmailInput {
            email: email.trim().to_string(),
        };
        validate_fields(&input, &["email"])?;
        self.repository.resend_otp(input).await
    }

    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), CoreError> {
        let input = EmailInput {
            email: email.trim().to_string(),
        };
        validate_fields(&input, &["email"])?;
        self.repository.request_password_reset(input).await
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn set_password(&self, input: SetPasswordInput) -> Result<(), CoreError> {
        let input = SetPasswordInput {
            email: input.email.trim().to_string(),
            otp: input.otp.trim().to_string(),
            ..input
        };
        validate_fields(&input, &SetPasswordInput::FIELDS)?;
        self.repository.set_password(input).await
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, input: ChangePasswordInput) -> Result<(), CoreError> {
        validate_fields(&input, &ChangePasswordInput::FIELDS)?;
        if input.new_password == input.old_password {
            return Err(CoreError::Validation(
                "New password must differ from the current password.".to_string(),
            ));
        }
        if self.tokens.load()?.is_none() {
            return Err(CoreError::Unauthorized);
        }

        self.repository
            .change_password(input.old_password, input.new_password)
            .await
    }

    /// Brings a stored session back to life on startup.
    ///
    /// A live access token is checked with the backend; anything else goes
    /// through the refresh token. Credentials are cleared only when the
    /// backend rejects them, never on a transport failure.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Result<SessionStatus, CoreError> {
        let Some(session) = self.tokens.load()? else {
            return Ok(SessionStatus::SignedOut);
        };

        let live = token_expiry(&session.access_token).is_some_and(|exp| exp > Utc::now());
        if live {
            match self.repository.verify_token(session.access_token.clone()).await {
                Ok(()) => {
                    return Ok(SessionStatus::SignedIn {
                        email: session.email,
                    });
                }
                Err(CoreError::Network(reason)) => {
                    warn!(%reason, "could not verify token, keeping stored session");
                    return Ok(SessionStatus::SignedIn {
                        email: session.email,
                    });
                }
                Err(error) => debug!(%error, "access token rejected"),
            }
        }

        match self
            .repository
            .refresh_token(session.refresh_token.clone())
            .await
        {
            Ok(refreshed) => {
                let renewed = StoredSession {
                    access_token: refreshed.access,
                    refresh_token: refreshed.refresh.unwrap_or(session.refresh_token),
                    email: session.email,
                };
                self.tokens.save(&renewed)?;
                info!(email = %renewed.email, "session refreshed");
                Ok(SessionStatus::SignedIn {
                    email: renewed.email,
                })
            }
            Err(error @ CoreError::Network(_)) => Err(error),
            Err(error) => {
                info!(%error, "refresh rejected, signing out");
                self.tokens.clear()?;
                self.emit(SessionEvent::Expired);
                Ok(SessionStatus::SignedOut)
            }
        }
    }

    #[instrument(skip(self))]
    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.tokens.clear()?;
        self.emit(SessionEvent::SignedOut);
        Ok(())
    }

    fn start_session(&self, session: StoredSession) -> Result<StoredSession, CoreError> {
        self.tokens.save(&session)?;
        info!(email = %session.email, "signed in");
        self.emit(SessionEvent::SignedIn {
            email: session.email.clone(),
        });
        Ok(session)
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
