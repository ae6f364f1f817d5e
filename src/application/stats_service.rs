use std::sync::Arc;

use thiserror::Error;

use crate::domain::stats::PlatformStats;
use crate::ports::repository::TokenRepository;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Database unavailable for stats")]
    Unavailable,
}

/// Platform-wide totals
#[derive(Clone)]
pub struct StatsService {
    repository: Option<Arc<dyn TokenRepository>>,
}

impl StatsService {
    pub fn new(repository: Option<Arc<dyn TokenRepository>>) -> Self {
        Self { repository }
    }

    pub async fn platform(&self) -> Result<PlatformStats, StatsError> {
        let repository = self.repository.as_ref().ok_or(StatsError::Unavailable)?;
        repository.platform_stats().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load platform stats");
            StatsError::Unavailable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::InMemoryTokenRepository;

    #[tokio::test]
    async fn test_stats_without_database() {
        let service = StatsService::new(None);
        assert!(matches!(service.platform().await, Err(StatsError::Unavailable)));
    }

    #[tokio::test]
    async fn test_stats_database_failure() {
        let repo = InMemoryTokenRepository::new();
        repo.set_failing(true);
        let service = StatsService::new(Some(Arc::new(repo)));
        assert!(matches!(service.platform().await, Err(StatsError::Unavailable)));
    }

    #[tokio::test]
    async fn test_stats_empty_database() {
        let service = StatsService::new(Some(Arc::new(InMemoryTokenRepository::new())));
        let stats = service.platform().await.unwrap();
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.volume_change, 0.0);
    }
}
