use tracing::instrument;

use crate::domain::{
    authentication::validators::validate_fields,
    common::entities::app_errors::CoreError,
    user_profile::{
        entities::UserProfile, ports::ProfileRepository, value_objects::UpdateProfileInput,
    },
};

pub struct ProfileService<P> {
    repository: P,
}

impl<P> ProfileService<P>
where
    P: ProfileRepository,
{
    pub fn new(repository: P) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<UserProfile, CoreError> {
        self.repository.get_profile().await
    }

    #[instrument(skip(self))]
    pub async fn update_profile(&self, input: UpdateProfileInput) -> Result<UserProfile, CoreError> {
        let input = UpdateProfileInput {
            full_name: input.full_name.map(|name| name.trim().to_string()),
            gender: input.gender.map(|gender| gender.trim().to_string()),
            ..input
        };
        validate_fields(&input, &UpdateProfileInput::FIELDS)?;
        if input.is_empty() {
            return Err(CoreError::Validation("Nothing to update.".to_string()));
        }

        self.repository.update_profile(input).await
    }
}
