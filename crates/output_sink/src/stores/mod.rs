//! Built-in result stores

mod file;
mod log;
mod memory;

pub use file::{FileStore, FileStoreConfig};
pub use log::LogStore;
pub use memory::{MemoryStore, MemoryStoreHandle};

use contracts::{ContractError, ResultStore, StoreConfig, StoreType, WorkResult};
use tracing::instrument;

/// Any built-in store, selected from configuration
pub enum BuiltinStore {
    Log(LogStore),
    File(FileStore),
    Memory(MemoryStore),
}

/// Create a built-in store from configuration
///
/// # Errors
/// `ContractError::Store` if a file store cannot open its output
#[instrument(
    name = "output_sink_build_store",
    skip(config),
    fields(store = %config.name, store_type = ?config.store_type)
)]
pub fn build_store(config: &StoreConfig) -> Result<BuiltinStore, ContractError> {
    match config.store_type {
        StoreType::Log => Ok(BuiltinStore::Log(LogStore::new(&config.name))),
        StoreType::File => FileStore::from_params(&config.name, &config.params)
            .map(BuiltinStore::File)
            .map_err(|e| ContractError::store(&config.name, e.to_string())),
        StoreType::Memory => Ok(BuiltinStore::Memory(MemoryStore::new(&config.name))),
    }
}

impl BuiltinStore {
    /// Read handle when this is a memory store
    pub fn memory_handle(&self) -> Option<MemoryStoreHandle> {
        match self {
            Self::Memory(store) => Some(store.handle()),
            _ => None,
        }
    }
}

impl ResultStore for BuiltinStore {
    fn name(&self) -> &str {
        match self {
            Self::Log(s) => s.name(),
            Self::File(s) => s.name(),
            Self::Memory(s) => s.name(),
        }
    }

    async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError> {
        match self {
            Self::Log(s) => s.commit(result).await,
            Self::File(s) => s.commit(result).await,
            Self::Memory(s) => s.commit(result).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(s) => s.flush().await,
            Self::File(s) => s.flush().await,
            Self::Memory(s) => s.flush().await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(s) => s.close().await,
            Self::File(s) => s.close().await,
            Self::Memory(s) => s.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_store_by_type() {
        let config = StoreConfig {
            name: "mem".to_string(),
            store_type: StoreType::Memory,
            params: HashMap::new(),
        };
        let store = build_store(&config).unwrap();
        assert_eq!(store.name(), "mem");
        assert!(store.memory_handle().is_some());

        let config = StoreConfig {
            store_type: StoreType::Log,
            ..config
        };
        let store = build_store(&config).unwrap();
        assert!(matches!(store, BuiltinStore::Log(_)));
        assert!(store.memory_handle().is_none());
    }

    #[test]
    fn test_build_file_store_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as the output file
        let config = StoreConfig {
            name: "broken".to_string(),
            store_type: StoreType::File,
            params: HashMap::from([("path".to_string(), dir.path().display().to_string())]),
        };
        let err = build_store(&config).err().unwrap();
        assert!(matches!(err, ContractError::Store { ref store, .. } if store == "broken"));
    }
}
