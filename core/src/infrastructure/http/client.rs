use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{error, warn};
use url::Url;

use crate::domain::{
    authentication::{entities::SessionEvent, ports::TokenStore},
    common::{
        ApiConfig,
        entities::{api_error_body::extract_error_message, app_errors::CoreError},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the stored access token and treat 401/403 as an expired session.
    Bearer,
    Anonymous,
}

pub fn map_transport_error(e: reqwest::Error) -> CoreError {
    if e.is_decode() {
        return CoreError::Decode(e.to_string());
    }
    CoreError::Network(e.to_string())
}

/// Shared HTTP client for every backend adapter.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Result<Self, CoreError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CoreError::Config(format!("invalid API base URL {base:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "API base URL {base:?} cannot have paths"
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            tokens,
            events,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` (no leading slash) against the base URL, then appends
    /// each of `segments` percent-encoded.
    pub fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CoreError::Config(format!("invalid endpoint {path:?}: {e}")))?;

        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| CoreError::Config(format!("invalid endpoint {path:?}")))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: Auth,
    ) -> Result<T, CoreError> {
        let response = self.send(request, auth).await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!("failed to decode response body: {e}");
            CoreError::Decode(e.to_string())
        })
    }

    pub async fn send_empty(&self, request: RequestBuilder, auth: Auth) -> Result<(), CoreError> {
        self.send(request, auth).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder, auth: Auth) -> Result<Response, CoreError> {
        let request = match auth {
            Auth::Bearer => {
                let session = self.tokens.load()?.ok_or(CoreError::Unauthorized)?;
                request.bearer_auth(session.access_token)
            }
            Auth::Anonymous => request,
        };

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if auth == Auth::Bearer
            && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            warn!(status = status.as_u16(), "credentials rejected, clearing session");
            if let Err(e) = self.tokens.clear() {
                error!("failed to clear stored session: {e}");
            }
            let _ = self.events.send(SessionEvent::Expired);
            return Err(CoreError::Unauthorized);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(status = status.as_u16(), %url, %message, "request failed");
        Err(CoreError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
