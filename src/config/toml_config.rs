use crate::config::mail::{present, MailConfig};
use crate::config::{validate_provider, DEFAULT_API_BASE};
use crate::core::aggregator::DEFAULT_CANDIDATE_POOL;
use crate::core::summary::DEFAULT_WORD_BUDGET;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub github: GitHubConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub handle: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub display_limit: Option<usize>,
    pub candidate_pool: Option<usize>,
    pub exclude_forks: Option<bool>,
    pub summary_word_budget: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortfolioError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| PortfolioError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(config.normalized())
    }

    /// 替換環境變數 (例如 ${GITHUB_TOKEN})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn normalized(mut self) -> Self {
        self.github.token = self.github.token.and_then(present);
        self.mail = self.mail.normalized().with_env_fallback();
        self
    }

    pub fn bind_address(&self) -> &str {
        &self.server.bind_address
    }
}

impl ConfigProvider for TomlConfig {
    fn github_api_base(&self) -> &str {
        &self.github.api_base
    }

    fn handle(&self) -> &str {
        &self.github.handle
    }

    fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }

    fn display_limit(&self) -> usize {
        self.aggregation.display_limit.unwrap_or(4)
    }

    fn candidate_pool(&self) -> usize {
        self.aggregation
            .candidate_pool
            .unwrap_or(DEFAULT_CANDIDATE_POOL)
    }

    fn exclude_forks(&self) -> bool {
        self.aggregation.exclude_forks.unwrap_or(true)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.github.timeout_seconds.unwrap_or(10)
    }

    fn summary_word_budget(&self) -> usize {
        self.aggregation
            .summary_word_budget
            .unwrap_or(DEFAULT_WORD_BUDGET)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        self.mail.validate()?;
        validate_non_empty_string("server.bind_address", &self.server.bind_address)?;
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .map_err(|e| PortfolioError::InvalidConfigValueError {
                field: "server.bind_address".to_string(),
                value: self.server.bind_address.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
