use crate::domain::model::RepositoryCandidate;

/// 排除個人檔案倉庫，並可選擇排除 fork；保持原有順序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub exclude_forks: bool,
}

impl CandidateFilter {
    pub fn keeps(&self, handle: &str, candidate: &RepositoryCandidate) -> bool {
        !candidate.is_profile_repository(handle) && !(self.exclude_forks && candidate.fork)
    }

    pub fn apply(
        &self,
        handle: &str,
        candidates: Vec<RepositoryCandidate>,
    ) -> Vec<RepositoryCandidate> {
        candidates
            .into_iter()
            .filter(|c| self.keeps(handle, c))
            .collect()
    }
}
