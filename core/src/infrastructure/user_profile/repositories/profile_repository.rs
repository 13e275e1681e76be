use reqwest::Method;
use tracing::instrument;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        user_profile::{
            entities::UserProfile, ports::ProfileRepository, value_objects::UpdateProfileInput,
        },
    },
    infrastructure::{
        http::{ApiClient, Auth},
        user_profile::mappers::UserProfileDto,
    },
};

const USER_PROFILE_PATH: &str = "user-profile";

#[derive(Clone)]
pub struct HttpProfileRepository {
    client: ApiClient,
}

impl HttpProfileRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ProfileRepository for HttpProfileRepository {
    #[instrument(skip(self))]
    async fn get_profile(&self) -> Result<UserProfile, CoreError> {
        let url = self.client.endpoint(USER_PROFILE_PATH, &[])?;
        let dto: UserProfileDto = self
            .client
            .send_json(self.client.request(Method::GET, url), Auth::Bearer)
            .await?;
        Ok(dto.into())
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, input: UpdateProfileInput) -> Result<UserProfile, CoreError> {
        let url = self.client.endpoint(USER_PROFILE_PATH, &[])?;
        let request = self.client.request(Method::PATCH, url).json(&input);
        let dto: UserProfileDto = self.client.send_json(request, Auth::Bearer).await?;
        Ok(dto.into())
    }
}
