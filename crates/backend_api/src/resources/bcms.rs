//! Building Control Management System notices

use domain::BcmsNotice;
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct BcmsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn bcms(&self) -> BcmsApi<'_> {
        BcmsApi { client: self }
    }
}

impl BcmsApi<'_> {
    /// Commencement and completion notices linked to a planning application
    #[instrument(skip(self))]
    pub async fn notices_for_application(
        &self,
        application_number: &str,
    ) -> Result<Vec<BcmsNotice>, ApiError> {
        if application_number.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "application number must not be empty".to_string(),
            ));
        }
        self.client
            .get_json_with_query(
                "/bcms/notices",
                &[("applicationNumber", application_number.trim())],
            )
            .await
    }
}
