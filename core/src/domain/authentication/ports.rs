use std::future::Future;

use crate::domain::{
    authentication::{
        entities::{RefreshedToken, StoredSession, TokenPair},
        value_objects::{EmailInput, SetPasswordInput, SignInInput, SignUpInput, VerifyOtpInput},
    },
    common::entities::app_errors::CoreError,
};

pub trait AuthRepository: Send + Sync {
    fn sign_in(
        &self,
        input: SignInInput,
    ) -> impl Future<Output = Result<TokenPair, CoreError>> + Send;

    fn sign_up(&self, input: SignUpInput) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn verify_otp(
        &self,
        input: VerifyOtpInput,
    ) -> impl Future<Output = Result<TokenPair, CoreError>> + Send;

    fn resend_otp(&self, input: EmailInput) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn request_password_reset(
        &self,
        input: EmailInput,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_password(
        &self,
        input: SetPasswordInput,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Authenticated call; the bearer token comes from the token store.
    fn change_password(
        &self,
        old_password: String,
        new_password: String,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn verify_token(&self, token: String) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn refresh_token(
        &self,
        refresh: String,
    ) -> impl Future<Output = Result<RefreshedToken, CoreError>> + Send;
}

/// Persistence for the client session record.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, CoreError>;

    fn save(&self, session: &StoredSession) -> Result<(), CoreError>;

    fn clear(&self) -> Result<(), CoreError>;
}
