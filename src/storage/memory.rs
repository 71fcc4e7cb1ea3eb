use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{validate_key, Result, Storage};

/// Process-local storage, lost on drop.
pub struct MemoryStorage(Mutex<BTreeMap<String, String>>);

impl MemoryStorage {
    pub fn new() -> Self { Self(Mutex::new(BTreeMap::new())) }
}
impl Default for MemoryStorage {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        Ok(self.0.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        validate_key(key)?;

        self.0.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        self.0.lock().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> { Ok(self.0.lock().await.keys().cloned().collect()) }
}
