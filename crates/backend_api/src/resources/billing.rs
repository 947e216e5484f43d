//! Hosted billing portal handoff

use domain::BillingPortalSession;
use serde::Serialize;
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy)]
pub struct BillingApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn billing(&self) -> BillingApi<'_> {
        BillingApi { client: self }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortalRequest<'a> {
    return_url: &'a str,
}

impl BillingApi<'_> {
    /// URL of a billing portal session that returns to `return_url`
    #[instrument(skip(self))]
    pub async fn portal_session(&self, return_url: &str) -> Result<BillingPortalSession, ApiError> {
        self.client
            .post_json("/billing/portal", &PortalRequest { return_url })
            .await
    }
}
