use std::sync::Arc;

use anyhow::Result;

use super::search_err_fmt;
use crate::repositories::SearchHistoryRepository;
use crate::utils::Chain;

/// Recent queries typed into search. Local bookkeeping, so no latency applies.
pub struct SearchService {
    pub history_repository: Arc<dyn SearchHistoryRepository + Sync + Send>,
}

impl SearchService {
    /// Most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn recent(&self) -> Result<Vec<String>> {
        self.history_repository.list().await.map_err(search_err_fmt)
    }

    /// Moves `query` to the front of the history; blank queries are ignored.
    #[tracing::instrument(skip(self))]
    pub async fn record(&self, query: &str) -> Result<Vec<String>> {
        let query = query.trim();
        if query.is_empty() {
            return self.recent().await;
        }

        self.history_repository
            .push(query.to_string())
            .await
            .map_err(search_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        self.history_repository.clear().await.map_err(search_err_fmt)
    }
}
