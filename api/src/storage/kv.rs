use super::{StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, path::PathBuf};
use tokio::sync::Mutex;

/// Flat string-to-string document store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
    async fn put(&self, key: &str, value: String) -> StoreResult<()>;
    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
    /// Keys starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

pub async fn get_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> StoreResult<Option<T>> {
    match kv.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn put_json<T: Serialize + ?Sized>(
    kv: &dyn KvStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    kv.put(key, serde_json::to_string(value)?).await
}

fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn sorted_keys(entries: &DashMap<String, String>, prefix: &str) -> Vec<String> {
    let mut keys: Vec<String> = entries
        .iter()
        .filter(|entry| entry.key().starts_with(prefix))
        .map(|entry| entry.key().clone())
        .collect();
    keys.sort();
    keys
}

#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(sorted_keys(&self.entries, prefix))
    }
}

/// DashMap kept in memory and mirrored to a JSON snapshot after every write.
pub struct FileKv {
    entries: DashMap<String, String>,
    path: PathBuf,
    flush: Mutex<()>,
}

impl FileKv {
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let snapshot: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        let entries: DashMap<String, String> = snapshot.into_iter().collect();

        Ok(Self {
            entries,
            path,
            flush: Mutex::new(()),
        })
    }

    async fn persist(&self) -> StoreResult<()> {
        let _guard = self.flush.lock().await;
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let body = serde_json::to_vec_pretty(&snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value);
        self.persist().await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.persist().await?;
        }
        Ok(existed)
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(sorted_keys(&self.entries, prefix))
    }
}
