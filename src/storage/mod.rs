//! Key-value namespace backing every collection.
//!
//! Keys are short ASCII identifiers (`snapflow_posts`, `snapflow_current_user`, ...)
//! and values are whole serialized collections. Backends only move strings around;
//! encoding and seeding happen in the repositories.

use async_trait::async_trait;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

pub type Result<T> = ::std::result::Result<T, StorageError>;

#[async_trait]
pub trait Storage {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    #[error("value of `{0}` is not valid utf-8")]
    Encoding(String),
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');

    match valid {
        true => Ok(()),
        false => Err(StorageError::InvalidKey(key.to_string())),
    }
}
