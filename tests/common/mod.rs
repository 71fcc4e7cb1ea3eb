#![allow(dead_code)]

use std::sync::Arc;

use snapflow::storage::{MemoryStorage, Storage};
use snapflow::{Config, Fixtures, Services};

pub fn config() -> Config { Config::default() }

pub fn bundled() -> Services { snapflow::in_memory(&config(), Fixtures::bundled().unwrap()) }

pub fn empty() -> Services { snapflow::in_memory(&config(), Fixtures::empty()) }

/// Services over a storage the test keeps a handle to.
pub fn shared(fixtures: Fixtures) -> (Arc<MemoryStorage>, Services) {
    let storage = Arc::new(MemoryStorage::new());
    let services = snapflow::with_storage(
        storage.clone() as Arc<dyn Storage + Sync + Send>,
        &config(),
        fixtures,
    );

    (storage, services)
}
