//! Backend API client
//!
//! Thin, typed access to the planwatch backend. [`ApiClient`] owns the base
//! URL, timeouts and credential injection; each resource module maps its
//! parameters onto HTTP calls and nothing more.

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod resources;

pub use config::ApiConfig;
pub use credentials::{CredentialStore, Credentials, SharedCredentials};
pub use error::ApiError;
pub use http::{ApiClient, X_REQUEST_ID, X_USER_ID};
pub use resources::{
    AlertsApi, ApplicationsApi, BcmsApi, BillingApi, HeatmapApi, PropertyApi, ReportsApi, UsersApi,
    ZoningApi,
};
