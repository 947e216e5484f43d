//! Current user profile and settings

use domain::{UserProfile, UserSettings};
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }
}

impl UsersApi<'_> {
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.client.get_json("/users/me").await
    }

    #[instrument(skip(self, settings))]
    pub async fn update_settings(&self, settings: &UserSettings) -> Result<UserSettings, ApiError> {
        self.client.put_json("/users/me/settings", settings).await
    }
}
