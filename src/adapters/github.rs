use crate::core::filter::CandidateFilter;
use crate::core::summary;
use crate::domain::model::{EnrichmentResult, RepositoryCandidate};
use crate::domain::ports::{ConfigProvider, ContentSource, RepositorySource};
use crate::utils::error::{PortfolioError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const MAX_PAGE_SIZE: usize = 100;

/// 服務端回傳的倉庫資料，欄位可能缺漏或為 null
#[derive(Debug, Deserialize)]
struct RawRepository {
    id: u64,
    name: String,
    description: Option<String>,
    html_url: Option<String>,
    homepage: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    topics: Option<Vec<String>>,
    fork: Option<bool>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RawRepository> for RepositoryCandidate {
    fn from(raw: RawRepository) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            html_url: raw.html_url.unwrap_or_default(),
            homepage: raw.homepage.unwrap_or_default(),
            language: raw.language.unwrap_or_default(),
            stargazers_count: raw.stargazers_count.unwrap_or(0),
            topics: raw.topics.unwrap_or_default(),
            fork: raw.fork.unwrap_or(false),
            updated_at: raw.updated_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

/// GitHub REST API 客戶端，同時提供倉庫列表與 README 摘要
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
    filter: CandidateFilter,
    word_budget: usize,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: parse_api_base(api_base)?,
            token: token.filter(|t| !t.trim().is_empty()),
            filter: CandidateFilter::default(),
            word_budget: summary::DEFAULT_WORD_BUDGET,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Self::new(
            config.github_api_base(),
            config.github_token().map(str::to_string),
            Duration::from_secs(config.request_timeout_seconds()),
        )?;
        Ok(client
            .with_filter(CandidateFilter {
                exclude_forks: config.exclude_forks(),
            })
            .with_word_budget(config.summary_word_budget()))
    }

    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_word_budget(mut self, word_budget: usize) -> Self {
        self.word_budget = word_budget;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// 在 API base 後面接上路徑片段，片段內容會做百分比編碼
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| PortfolioError::InvalidConfigValueError {
                field: "api_base".to_string(),
                value: self.api_base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn classify_failure(response: Response) -> PortfolioError {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => PortfolioError::Unauthorized { message: body },
            StatusCode::TOO_MANY_REQUESTS => PortfolioError::RateLimited {
                retry_after_seconds: retry_after(&headers),
            },
            StatusCode::FORBIDDEN if is_rate_limited(&headers) => PortfolioError::RateLimited {
                retry_after_seconds: retry_after(&headers),
            },
            _ => PortfolioError::SourceError {
                message: format!("Repository listing returned HTTP {}", status.as_u16()),
            },
        }
    }

    async fn fetch_readme(&self, handle: &str, repository_name: &str) -> Result<Option<String>> {
        let url = self.endpoint(&["repos", handle, repository_name, "readme"])?;
        let request = self.authorize(self.client.get(url).header(ACCEPT, RAW_MEDIA_TYPE));

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(PortfolioError::SourceError {
                message: format!("README request returned HTTP {}", status.as_u16()),
            }),
        }
    }
}

fn parse_api_base(api_base: &str) -> Result<Url> {
    Url::parse(api_base).map_err(|e| PortfolioError::InvalidConfigValueError {
        field: "api_base".to_string(),
        value: api_base.to_string(),
        reason: e.to_string(),
    })
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    let exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);
    exhausted || headers.contains_key(RETRY_AFTER)
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(
        &self,
        handle: &str,
        max_candidates: usize,
    ) -> Result<Vec<RepositoryCandidate>> {
        let url = self.endpoint(&["users", handle, "repos"])?;
        let per_page = max_candidates.clamp(1, MAX_PAGE_SIZE).to_string();

        tracing::debug!(
            "Listing repositories for {} (per_page={}, token configured: {})",
            handle,
            per_page,
            if self.is_authenticated() { "yes" } else { "no" }
        );

        let request = self.authorize(
            self.client
                .get(url)
                .header(ACCEPT, JSON_MEDIA_TYPE)
                .query(&[
                    ("sort", "updated"),
                    ("direction", "desc"),
                    ("per_page", per_page.as_str()),
                ]),
        );

        let response = request.send().await.map_err(|e| PortfolioError::SourceError {
            message: format!("Repository listing request failed: {}", e),
        })?;
        tracing::debug!("Repository listing status: {}", response.status());

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let raw: Vec<RawRepository> =
            response.json().await.map_err(|e| PortfolioError::SourceError {
                message: format!("Repository listing could not be parsed: {}", e),
            })?;

        // 保持服務端排序，不重新排序
        let candidates = raw.into_iter().map(RepositoryCandidate::from).collect();
        Ok(self.filter.apply(handle, candidates))
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    async fn fetch_summary(&self, handle: &str, repository_name: &str) -> EnrichmentResult {
        match self.fetch_readme(handle, repository_name).await {
            Ok(Some(text)) => EnrichmentResult::success(
                repository_name,
                summary::summarize(&text, self.word_budget),
            ),
            Ok(None) => {
                tracing::debug!("No README for {}", repository_name);
                EnrichmentResult::not_found(repository_name)
            }
            Err(e) => {
                tracing::warn!("⚠️ README fetch failed for {}: {}", repository_name, e);
                EnrichmentResult::error(repository_name)
            }
        }
    }
}
