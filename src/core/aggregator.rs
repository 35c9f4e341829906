use crate::core::filter::CandidateFilter;
use crate::domain::model::{FetchOutcome, ProjectList, ProjectListState, ProjectRecord};
use crate::domain::ports::{ConfigProvider, ContentSource, RepositorySource};
use crate::utils::error::{PortfolioError, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const DEFAULT_CANDIDATE_POOL: usize = 10;

/// 倉庫列表 + README 補充 → 有上限、依更新時間排序的專案清單
pub struct ProjectAggregator<S: RepositorySource, E: ContentSource> {
    source: S,
    enricher: E,
    filter: CandidateFilter,
    candidate_pool: usize,
}

impl<S: RepositorySource, E: ContentSource> ProjectAggregator<S, E> {
    pub fn new(source: S, enricher: E) -> Self {
        Self {
            source,
            enricher,
            filter: CandidateFilter::default(),
            candidate_pool: DEFAULT_CANDIDATE_POOL,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, enricher: E, config: &C) -> Self {
        Self::new(source, enricher)
            .with_filter(CandidateFilter {
                exclude_forks: config.exclude_forks(),
            })
            .with_candidate_pool(config.candidate_pool())
    }

    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_candidate_pool(mut self, candidate_pool: usize) -> Self {
        self.candidate_pool = candidate_pool;
        self
    }

    /// 只有倉庫列表失敗會中止；個別 README 失敗只會退回原始描述
    pub async fn build_project_list(&self, handle: &str, limit: usize) -> Result<ProjectList> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(PortfolioError::ValidationError {
                message: "A user handle is required".to_string(),
            });
        }

        // 多抓一些，過濾後仍能湊滿 limit
        let pool = self.candidate_pool.max(limit);
        tracing::info!("🚀 Building project list for {} (limit={}, pool={})", handle, limit, pool);

        let candidates = match self.source.list_repositories(handle, pool).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("❌ Repository listing failed for {}: {}", handle, e);
                return Err(e);
            }
        };
        tracing::debug!("Repository source returned {} candidates", candidates.len());

        let selected: Vec<_> = self
            .filter
            .apply(handle, candidates)
            .into_iter()
            .take(limit)
            .collect();

        // 全部同時發出，等每一個都結束
        let enrichments = join_all(
            selected
                .iter()
                .map(|candidate| self.enricher.fetch_summary(handle, &candidate.name)),
        )
        .await;

        let missing_enrichment = enrichments
            .iter()
            .filter(|e| e.outcome != FetchOutcome::Success)
            .count();
        if missing_enrichment > 0 {
            tracing::warn!(
                "⚠️ {} of {} projects fell back to repository descriptions",
                missing_enrichment,
                selected.len()
            );
        }

        let projects: Vec<ProjectRecord> = selected
            .into_iter()
            .zip(enrichments.iter())
            .map(|(candidate, enrichment)| ProjectRecord::merge(candidate, Some(enrichment)))
            .collect();

        tracing::info!("✅ Built {} projects for {}", projects.len(), handle);
        Ok(ProjectList {
            projects,
            missing_enrichment,
        })
    }

    pub async fn load(&self, handle: &str, limit: usize) -> ProjectListState {
        match self.build_project_list(handle, limit).await {
            Ok(list) => ProjectListState::Ready(list),
            Err(e) => ProjectListState::Failed {
                reason: e.user_friendly_message(),
            },
        }
    }
}

impl<S, E> ProjectAggregator<S, E>
where
    S: RepositorySource + 'static,
    E: ContentSource + 'static,
{
    /// 在背景執行聚合；取消或丟棄回傳的 `ProjectLoad` 會中止所有進行中的請求
    pub fn spawn(self: Arc<Self>, handle: String, limit: usize) -> ProjectLoad {
        let task = tokio::spawn(async move { self.load(&handle, limit).await });
        ProjectLoad { task }
    }
}

pub struct ProjectLoad {
    task: JoinHandle<ProjectListState>,
}

impl ProjectLoad {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 被取消時回傳 `None`，遲到的結果不會被套用；背景任務 panic 時原樣拋出
    pub async fn wait(mut self) -> Option<ProjectListState> {
        match (&mut self.task).await {
            Ok(state) => Some(state),
            Err(e) if e.is_cancelled() => None,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

impl Drop for ProjectLoad {
    fn drop(&mut self) {
        self.task.abort();
    }
}
