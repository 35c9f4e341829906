use crate::domain::model::{EnrichmentResult, OutboundMessage, RepositoryCandidate};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn github_api_base(&self) -> &str;
    fn handle(&self) -> &str;
    fn github_token(&self) -> Option<&str>;
    fn display_limit(&self) -> usize;
    fn candidate_pool(&self) -> usize;
    fn exclude_forks(&self) -> bool;
    fn request_timeout_seconds(&self) -> u64;
    fn summary_word_budget(&self) -> usize;
}

/// 倉庫列表來源，結果需保持服務端的更新時間排序
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn list_repositories(
        &self,
        handle: &str,
        max_candidates: usize,
    ) -> Result<Vec<RepositoryCandidate>>;
}

/// 單一倉庫的補充內容，失敗只會反映在回傳的 outcome 上
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_summary(&self, handle: &str, repository_name: &str) -> EnrichmentResult;
}

#[derive(Clone)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn connect(&self, credentials: &MailCredentials) -> Result<Box<dyn MailSession>>;
}

#[async_trait]
pub trait MailSession: Send + Sync {
    async fn verify(&self) -> Result<()>;
    /// 回傳 message id
    async fn send(&self, message: &OutboundMessage) -> Result<String>;
}
