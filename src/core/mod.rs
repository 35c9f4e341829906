pub mod aggregator;
pub mod filter;
pub mod notifier;
pub mod summary;

pub use crate::domain::model::{
    EnrichmentResult, FetchOutcome, NotificationOutcome, NotificationRequest, ProjectList,
    ProjectListState, ProjectRecord, RepositoryCandidate,
};
pub use crate::domain::ports::{ConfigProvider, ContentSource, MailRelay, RepositorySource};
pub use crate::utils::error::Result;
