use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No description available";

/// 從代碼託管服務取得的倉庫，正規化後不可變
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCandidate {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub html_url: String,
    pub homepage: String,
    pub language: String,
    pub stargazers_count: u64,
    pub topics: Vec<String>,
    pub fork: bool,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryCandidate {
    /// 倉庫名稱與使用者名稱相同即為個人檔案倉庫
    pub fn is_profile_repository(&self, handle: &str) -> bool {
        self.name.eq_ignore_ascii_case(handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchOutcome {
    Success,
    NotFound,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub repository_name: String,
    pub summary: Option<String>,
    pub outcome: FetchOutcome,
}

impl EnrichmentResult {
    pub fn success(repository_name: &str, summary: Option<String>) -> Self {
        Self {
            repository_name: repository_name.to_string(),
            summary,
            outcome: FetchOutcome::Success,
        }
    }

    pub fn not_found(repository_name: &str) -> Self {
        Self {
            repository_name: repository_name.to_string(),
            summary: None,
            outcome: FetchOutcome::NotFound,
        }
    }

    pub fn error(repository_name: &str) -> Self {
        Self {
            repository_name: repository_name.to_string(),
            summary: None,
            outcome: FetchOutcome::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub name: String,
    pub description: String,
    pub html_url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub topics: Vec<String>,
    pub homepage: Option<String>,
}

impl ProjectRecord {
    /// 描述優先順序：摘要 > 倉庫描述 > 固定佔位字串
    pub fn merge(candidate: RepositoryCandidate, enrichment: Option<&EnrichmentResult>) -> Self {
        let summary = enrichment
            .and_then(|e| e.summary.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let description = match summary {
            Some(summary) => summary.to_string(),
            None if !candidate.description.trim().is_empty() => {
                candidate.description.trim().to_string()
            }
            None => NO_DESCRIPTION_PLACEHOLDER.to_string(),
        };

        Self {
            name: candidate.name,
            description,
            html_url: candidate.html_url,
            language: non_empty(candidate.language),
            stars: candidate.stargazers_count,
            topics: candidate.topics,
            homepage: non_empty(candidate.homepage),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 一次聚合的成功結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectRecord>,
    #[serde(skip)]
    pub missing_enrichment: usize,
}

impl ProjectList {
    pub fn is_degraded(&self) -> bool {
        self.missing_enrichment > 0
    }
}

/// 呈現層看到的載入結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectListState {
    Ready(ProjectList),
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl NotificationRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.email.is_empty()
            && self.subject.is_empty()
            && self.message.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { message_id: String },
    ValidationError { message: String },
    ConfigurationError,
    TransportError { retryable: bool },
}

/// 寄出的信件內容，與實際傳輸協定無關
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub message_id: String,
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html_body: String,
}
