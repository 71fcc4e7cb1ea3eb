use core::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use super::{RepositoryError, Result as RepoResult};
use crate::entities::{Id, Record};
use crate::storage::Storage;

pub(crate) type SharedStorage = Arc<dyn Storage + Sync + Send>;

pub(crate) fn namespaced(namespace: &str, name: &str) -> String {
    format!("{}_{}", namespace, name)
}

/// One whole collection stored as a JSON array under `<namespace>_<name>`.
///
/// The array is written from `seed` the first time the key is found missing.
/// Mutations go through [`Collection::write`], which holds the collection's
/// writer lock until the [`Writer`] is committed or dropped.
pub(crate) struct Collection<T> {
    storage: SharedStorage,
    key: String,
    seq_key: String,
    seed: Vec<T>,
    writer: Mutex<()>,
}

impl<T> Collection<T>
where T: Record + Serialize + DeserializeOwned + Clone + Send + Sync
{
    pub(crate) fn new(storage: SharedStorage, namespace: &str, name: &str, seed: Vec<T>) -> Self {
        Self {
            storage,
            key: namespaced(namespace, name),
            seq_key: namespaced(namespace, &format!("{}_seq", name)),
            seed,
            writer: Mutex::new(()),
        }
    }

    pub(crate) fn seed(&self) -> &[T] { &self.seed }

    /// Reads the whole collection without taking the writer lock.
    pub(crate) async fn read(&self) -> RepoResult<Vec<T>> {
        if let Some(items) = self.fetch().await? {
            return Ok(items);
        }

        let _guard = self.writer.lock().await;
        self.fetch_or_seed().await
    }

    pub(crate) async fn write(&self) -> RepoResult<Writer<'_, T>> {
        let guard = self.writer.lock().await;
        let items = self.fetch_or_seed().await?;

        Ok(Writer {
            collection: self,
            _guard: guard,
            items,
            last_id: None,
        })
    }

    async fn fetch(&self) -> RepoResult<Option<Vec<T>>> {
        match self.storage.get(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    // callers must hold the writer lock
    async fn fetch_or_seed(&self) -> RepoResult<Vec<T>> {
        if let Some(items) = self.fetch().await? {
            return Ok(items);
        }

        tracing::debug!("seeding `{}` with {} records", self.key, self.seed.len());
        self.store(&self.seed).await?;

        Ok(self.seed.clone())
    }

    async fn store(&self, items: &[T]) -> RepoResult<()> {
        let raw = serde_json::to_string(items)?;
        self.storage.set(&self.key, raw).await?;

        Ok(())
    }

    async fn last_issued(&self) -> RepoResult<Option<Id>> {
        match self.storage.get(&self.seq_key).await? {
            Some(raw) => raw.trim().parse::<Id>().map(Some).map_err(|e| {
                RepositoryError::Internal(anyhow!("broken sequence `{}`: {}", self.seq_key, e))
            }),
            None => Ok(None),
        }
    }
}

/// Exclusive, buffered access to a collection. Nothing reaches storage before
/// [`Writer::commit`]; dropping the writer discards the changes.
pub(crate) struct Writer<'a, T>
where T: Record + Serialize + DeserializeOwned + Clone + Send + Sync
{
    collection: &'a Collection<T>,
    _guard: MutexGuard<'a, ()>,
    pub(crate) items: Vec<T>,
    last_id: Option<Id>,
}

impl<'a, T> Writer<'a, T>
where T: Record + Serialize + DeserializeOwned + Clone + Send + Sync
{
    /// Issues the next id. Ids only grow, deleted ids are never handed out again.
    pub(crate) async fn next_id(&mut self) -> RepoResult<Id> {
        let last = match self.last_id {
            Some(id) => id,
            None => self.collection.last_issued().await?.unwrap_or(0),
        };
        let max_existing = self.items.iter().map(Record::id).max().unwrap_or(0);

        let next = last.max(max_existing) + 1;
        self.last_id = Some(next);

        Ok(next)
    }

    pub(crate) async fn commit(self) -> RepoResult<()> {
        self.collection.store(&self.items).await?;

        if let Some(id) = self.last_id {
            self.collection
                .storage
                .set(&self.collection.seq_key, id.to_string())
                .await?;
        }

        Ok(())
    }
}

/// A single JSON value under `<namespace>_<name>`, with its own writer lock.
pub(crate) struct Slot<T> {
    storage: SharedStorage,
    key: String,
    writer: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slot<T>
where T: Serialize + DeserializeOwned
{
    pub(crate) fn new(storage: SharedStorage, namespace: &str, name: &str) -> Self {
        Self {
            storage,
            key: namespaced(namespace, name),
            writer: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> { self.writer.lock().await }

    pub(crate) async fn get(&self) -> RepoResult<Option<T>> {
        match self.storage.get(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn set(&self, value: &T) -> RepoResult<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(&self.key, raw).await?;

        Ok(())
    }

    pub(crate) async fn remove(&self) -> RepoResult<()> {
        self.storage.remove(&self.key).await?;

        Ok(())
    }
}
