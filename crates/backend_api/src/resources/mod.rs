//! One module per backend resource
//!
//! Each accessor borrows the [`ApiClient`](crate::ApiClient) and maps its
//! parameters onto a single HTTP call.

mod alerts;
mod applications;
mod bcms;
mod billing;
mod heatmap;
mod path;
mod property;
mod reports;
mod users;
mod zoning;

pub use alerts::AlertsApi;
pub use applications::ApplicationsApi;
pub use bcms::BcmsApi;
pub use billing::BillingApi;
pub use heatmap::HeatmapApi;
pub use property::PropertyApi;
pub use reports::ReportsApi;
pub use users::UsersApi;
pub use zoning::ZoningApi;
