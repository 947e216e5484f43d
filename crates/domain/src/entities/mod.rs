//! Domain entities

mod account;
mod alert;
mod analysis;
mod application;
mod heatmap;
mod lenient;
mod report;
mod site;

pub use account::{BillingPortalSession, SubscriptionPlan, UserProfile, UserSettings};
pub use alert::{
    Alert, AlertArea, AlertCriteria, AlertFrequency, BulkActionKind, BulkActionOutcome,
    BulkInboxAction, InboxItem, InboxQuery, NewAlert,
};
pub use analysis::{
    AnalysisRequest, AnalysisResult, AnalysisStage, DEFAULT_MAX_DOCUMENTS, DocumentAnalysis,
    ExtractedImage, KeyFacts, ProgressEvent,
};
pub use application::{
    ApplicationDocument, ApplicationQuery, ApplicationStatus, ApplicationSummary,
    PlanningApplication, SortOrder, TimelineEvent,
};
pub use heatmap::{HeatmapPoint, HeatmapQuery, normalized_triples};
pub use report::{Report, ReportRequest, ReportStatus};
pub use site::{BcmsNotice, BcmsNoticeType, PropertySale, ZoningInfo};
