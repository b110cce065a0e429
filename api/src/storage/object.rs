use super::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Object {
    pub meta: ObjectMeta,
    pub body: Vec<u8>,
}

/// Blob storage addressed by slash-separated keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StoreResult<ObjectMeta>;
    async fn get(&self, key: &str) -> StoreResult<Option<Object>>;
    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>>;
    /// Returns whether the object existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
    /// Objects whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>>;
}

/// Keys are relative, slash-separated paths without `.`/`..` segments.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn new_meta(key: &str, size: usize, content_type: &str) -> ObjectMeta {
    ObjectMeta {
        key: key.to_string(),
        size: size as u64,
        content_type: content_type.to_string(),
        uploaded: Utc::now(),
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, Object>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StoreResult<ObjectMeta> {
        validate_key(key)?;
        let meta = new_meta(key, body.len(), content_type);
        self.objects.insert(
            key.to_string(),
            Object {
                meta: meta.clone(),
                body,
            },
        );
        Ok(meta)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Object>> {
        Ok(self.objects.get(key).map(|object| object.clone()))
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>> {
        Ok(self.objects.get(key).map(|object| object.meta.clone()))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.objects.remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let mut metas: Vec<ObjectMeta> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.meta.clone())
            .collect();
        metas.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metas)
    }
}

/// Objects on local disk: `blobs/{key}` holds the bytes and
/// `meta/{key}.json` the [`ObjectMeta`]. A key cannot be both an object and
/// a directory of other objects (`a` and `a/b`); the second one is rejected
/// as an invalid key.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join("blobs")).await?;
        tokio::fs::create_dir_all(root.join("meta")).await?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join("blobs").join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join("meta").join(format!("{key}.json"))
    }

    /// Rejects keys whose blob path would collide with an existing blob,
    /// either through a parent directory or as a directory itself.
    async fn check_placement(&self, key: &str) -> StoreResult<()> {
        let mut parent = self.root.join("blobs");
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                break;
            }
            parent.push(segment);
            if file_kind(&parent).await? == Some(false) {
                return Err(StoreError::InvalidKey(key.to_string()));
            }
        }
        if file_kind(&self.blob_path(key)).await? == Some(true) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    async fn read_meta(path: &Path) -> StoreResult<Option<ObjectMeta>> {
        match tokio::fs::read(path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// `Some(true)` for a directory, `Some(false)` for anything else, `None`
/// when nothing is there.
async fn file_kind(path: &Path) -> StoreResult<Option<bool>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.is_dir())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_file(path: &Path, body: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(())
}

async fn remove_if_present(path: &Path) -> StoreResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StoreResult<ObjectMeta> {
        validate_key(key)?;
        self.check_placement(key).await?;
        let meta = new_meta(key, body.len(), content_type);
        write_file(&self.blob_path(key), &body).await?;
        write_file(&self.meta_path(key), &serde_json::to_vec(&meta)?).await?;
        Ok(meta)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Object>> {
        validate_key(key)?;
        let Some(meta) = Self::read_meta(&self.meta_path(key)).await? else {
            return Ok(None);
        };
        match tokio::fs::read(self.blob_path(key)).await {
            Ok(body) => Ok(Some(Object { meta, body })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>> {
        validate_key(key)?;
        Self::read_meta(&self.meta_path(key)).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let had_meta = remove_if_present(&self.meta_path(key)).await?;
        let had_blob = remove_if_present(&self.blob_path(key)).await?;
        Ok(had_meta || had_blob)
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let mut metas = Vec::new();
        let mut pending = vec![self.root.join("meta")];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(meta) = Self::read_meta(&path).await? {
                    if meta.key.starts_with(prefix) {
                        metas.push(meta);
                    }
                }
            }
        }

        metas.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metas)
    }
}
