use async_trait::async_trait;
use smallvec::SmallVec;

use super::super::collection::{SharedStorage, Slot};
use super::super::{Result, SearchHistoryRepository};

type History = SmallVec<[String; 5]>;

pub struct StoredSearchHistory {
    history: Slot<History>,
    limit: usize,
}

impl StoredSearchHistory {
    /// Keeps at most `limit` queries.
    pub fn new_with(storage: SharedStorage, namespace: &str, limit: usize) -> Self {
        Self {
            history: Slot::new(storage, namespace, "recent_searches"),
            limit,
        }
    }
}

#[async_trait]
impl SearchHistoryRepository for StoredSearchHistory {
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.history.get().await?.unwrap_or_default().into_vec())
    }

    async fn push(&self, query: String) -> Result<Vec<String>> {
        let _guard = self.history.lock().await;

        let mut history = self.history.get().await?.unwrap_or_default();
        history.retain(|q| *q != query);
        history.insert(0, query);
        history.truncate(self.limit);

        self.history.set(&history).await?;

        Ok(history.into_vec())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.history.lock().await;

        self.history.remove().await
    }
}
