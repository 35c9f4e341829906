pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{github::GitHubClient, smtp::SmtpRelay};
pub use crate::config::{mail::MailConfig, toml_config::TomlConfig, CliConfig};
pub use crate::core::{
    aggregator::{ProjectAggregator, ProjectLoad},
    notifier::{ContactForm, NotificationDispatcher},
};
pub use crate::utils::error::{PortfolioError, Result};
