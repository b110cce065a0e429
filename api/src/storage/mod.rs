pub mod kv;
pub mod object;

pub use kv::{FileKv, KvStore, MemoryKv};
pub use object::{LocalObjectStore, MemoryObjectStore, Object, ObjectMeta, ObjectStore};

use crate::config::{Config, StorageBackend};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored document: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Opens the key-value and object stores selected by the configuration.
pub async fn open_backends(
    config: &Config,
) -> StoreResult<(Arc<dyn KvStore>, Arc<dyn ObjectStore>)> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok((
                Arc::new(MemoryKv::new()),
                Arc::new(MemoryObjectStore::new()),
            ))
        }
        StorageBackend::Filesystem => {
            let kv_path = config.data_dir.join("metadata.json");
            let objects_root = config.data_dir.join("objects");
            info!(
                "Using filesystem storage: kv={}, objects={}",
                kv_path.display(),
                objects_root.display()
            );
            let kv = FileKv::open(kv_path).await?;
            let objects = LocalObjectStore::open(objects_root).await?;
            Ok((Arc::new(kv), Arc::new(objects)))
        }
    }
}
