use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    domain::{
        authentication::{
            entities::{RefreshedToken, TokenPair},
            ports::AuthRepository,
            value_objects::{
                EmailInput, SetPasswordInput, SignInInput, SignUpInput, VerifyOtpInput,
            },
        },
        common::entities::app_errors::CoreError,
    },
    infrastructure::http::{ApiClient, Auth},
};

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SetPasswordBody<'a> {
    email: &'a str,
    otp: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordBody {
    old_password: String,
    new_password: String,
}

#[derive(Serialize)]
struct TokenBody {
    token: String,
}

#[derive(Serialize)]
struct RefreshBody {
    refresh: String,
}

#[derive(Clone)]
pub struct HttpAuthRepository {
    client: ApiClient,
}

impl HttpAuthRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.client.endpoint(path, &[])?;
        let request = self.client.request(Method::POST, url).json(body);
        self.client.send_json(request, auth).await
    }

    async fn post_empty<B>(&self, path: &str, body: &B, auth: Auth) -> Result<(), CoreError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.client.endpoint(path, &[])?;
        let request = self.client.request(Method::POST, url).json(body);
        self.client.send_empty(request, auth).await
    }
}

impl AuthRepository for HttpAuthRepository {
    #[instrument(skip_all)]
    async fn sign_in(&self, input: SignInInput) -> Result<TokenPair, CoreError> {
        self.post_json("auth/sign-in", &input, Auth::Anonymous).await
    }

    #[instrument(skip_all)]
    async fn sign_up(&self, input: SignUpInput) -> Result<(), CoreError> {
        let body = CredentialsBody {
            email: &input.email,
            password: &input.password,
        };
        self.post_empty("auth/sign-up", &body, Auth::Anonymous).await
    }

    #[instrument(skip_all)]
    async fn verify_otp(&self, input: VerifyOtpInput) -> Result<TokenPair, CoreError> {
        self.post_json("auth/otp/verify", &input, Auth::Anonymous)
            .await
    }

    #[instrument(skip_all)]
    async fn resend_otp(&self, input: EmailInput) -> Result<(), CoreError> {
        self.post_empty("auth/otp/resend", &input, Auth::Anonymous)
            .await
    }

    #[instrument(skip_all)]
    async fn request_password_reset(&self, input: EmailInput) -> Result<(), CoreError> {
        self.post_empty("auth/password/reset", &input, Auth::Anonymous)
            .await
    }

    #[instrument(skip_all)]
    async fn set_password(&self, input: SetPasswordInput) -> Result<(), CoreError> {
        let body = SetPasswordBody {
            email: &input.email,
            otp: &input.otp,
            password: &input.password,
        };
        self.post_empty("auth/password/set", &body, Auth::Anonymous)
            .await
    }

    #[instrument(skip_all)]
    async fn change_password(
        &self,
        old_password: String,
        new_password: String,
    ) -> Result<(), CoreError> {
        let body = ChangePasswordBody {
            old_password,
            new_password,
        };
        self.post_empty("auth/password/change", &body, Auth::Bearer)
            .await
    }

    #[instrument(skip_all)]
    async fn verify_token(&self, token: String) -> Result<(), CoreError> {
        self.post_empty("auth/token/verify", &TokenBody { token }, Auth::Anonymous)
            .await
    }

    #[instrument(skip_all)]
    async fn refresh_token(&self, refresh: String) -> Result<RefreshedToken, CoreError> {
        self.post_json("auth/token/refresh", &RefreshBody { refresh }, Auth::Anonymous)
            .await
    }
}
