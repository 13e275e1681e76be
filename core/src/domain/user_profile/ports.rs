use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    user_profile::{entities::UserProfile, value_objects::UpdateProfileInput},
};

pub trait ProfileRepository: Send + Sync {
    fn get_profile(&self) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn update_profile(
        &self,
        input: UpdateProfileInput,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;
}
