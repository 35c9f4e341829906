pub mod mail;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const MAX_CANDIDATE_POOL: usize = 100;

#[cfg(feature = "cli")]
use clap::Parser;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "portfolio"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Build the project list shown on a portfolio site")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, env = "GITHUB_HANDLE"))]
    pub handle: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "4"))]
    pub limit: usize,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub candidates: usize,

    #[cfg_attr(feature = "cli", arg(long, help = "Keep forked repositories"))]
    pub include_forks: bool,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_API_BASE))]
    pub api_base: String,

    #[serde(skip_serializing)]
    #[cfg_attr(feature = "cli", arg(long, env = "GITHUB_TOKEN", hide_env_values = true))]
    pub token: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub timeout: u64,

    #[cfg_attr(feature = "cli", arg(long, default_value = "100"))]
    pub word_budget: usize,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn github_api_base(&self) -> &str {
        &self.api_base
    }

    fn handle(&self) -> &str {
        &self.handle
    }

    fn github_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn display_limit(&self) -> usize {
        self.limit
    }

    fn candidate_pool(&self) -> usize {
        self.candidates
    }

    fn exclude_forks(&self) -> bool {
        !self.include_forks
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout
    }

    fn summary_word_budget(&self) -> usize {
        self.word_budget
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// CLI 與 TOML 共用的檢查
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_non_empty_string("handle", config.handle())?;
    validate_url("api_base", config.github_api_base())?;
    validate_range("candidate_pool", config.candidate_pool(), 1, MAX_CANDIDATE_POOL)?;
    validate_range("display_limit", config.display_limit(), 1, config.candidate_pool())?;
    validate_range("request_timeout_seconds", config.request_timeout_seconds(), 1, 300)?;
    validate_range("summary_word_budget", config.summary_word_budget(), 1, 10_000)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CliConfig {
        CliConfig {
            handle: "alice".to_string(),
            limit: 4,
            candidates: 10,
            include_forks: false,
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: 10,
            word_budget: 100,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_defaults_validate() {
        let config = config();
        assert!(config.validate().is_ok());
        assert!(config.exclude_forks());
        assert_eq!(config.github_token(), None);
    }

    #[test]
    fn test_limit_must_fit_candidate_pool() {
        let mut config = config();
        config.limit = 11;
        assert!(config.validate().is_err());
        config.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let mut config = config();
        config.token = Some("".to_string());
        assert_eq!(config.github_token(), None);
        config.token = Some("ghp_x".to_string());
        assert_eq!(config.github_token(), Some("ghp_x"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_cli_arguments() {
        let config = CliConfig::try_parse_from([
            "portfolio",
            "--handle",
            "alice",
            "--limit",
            "6",
            "--include-forks",
        ])
        .unwrap();
        assert_eq!(config.handle, "alice");
        assert_eq!(config.limit, 6);
        assert_eq!(config.candidates, 10);
        assert!(!config.exclude_forks());
    }
}
