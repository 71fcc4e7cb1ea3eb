use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{validate_key, Result, Storage, StorageError};

const EXTENSION: &str = "json";

/// Persistent storage keeping one `<key>.json` file per key inside a directory.
///
/// Writes go to a sibling temporary file first and are renamed into place, so a
/// reader never observes a half-written collection.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir).await.map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        tracing::debug!("file storage opened at {}", dir.display());

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path_of(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;

        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }
}

fn io_err(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_of(key)?;

        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData =>
                Err(StorageError::Encoding(key.to_string())),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_of(key)?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));

        fs::write(&tmp, value).await.map_err(io_err(key))?;
        fs::rename(&tmp, &path).await.map_err(io_err(key))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_of(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let dir_key = self.dir.display().to_string();
        let mut entries = fs::read_dir(&self.dir).await.map_err(io_err(&dir_key))?;
        let mut keys = vec![];

        while let Some(entry) = entries.next_entry().await.map_err(io_err(&dir_key))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}
