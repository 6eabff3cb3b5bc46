//! Access table storage
//!
//! Provides trait-based persistence for the access table so hosts can swap
//! the on-disk file for something else.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

use crate::codec::{self, AccessTable, StoreFormat};

/// File name of the persisted table inside the application config directory
pub const DEFAULT_FILE_NAME: &str = "plugin_manager.yml";

/// Error type for access store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid entry for plugin {plugin}: {reason}")]
    Invalid { plugin: String, reason: String },

    #[error("Store is read-only")]
    ReadOnly,
}

/// Trait for access table persistence
pub trait AccessStore: Send + Sync {
    /// Load the persisted table; a store with nothing saved yields an empty table
    fn load(&self) -> Result<AccessTable, StoreError>;

    /// Replace the persisted table
    fn save(&self, table: &AccessTable) -> Result<(), StoreError>;
}

// ============================================================================
// File-based Access Store
// ============================================================================

/// File-based access store
///
/// Default: `~/.config/<app>/plugin_manager.yml`. Files ending in `.json`
/// are written as JSON, anything else as YAML.
pub struct FileAccessStore {
    path: PathBuf,
    format: StoreFormat,
}

impl FileAccessStore {
    /// Create a store backed by the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = StoreFormat::from_path(&path);
        Self { path, format }
    }

    /// Create a store in the default location for an application
    pub fn default_for_app(app_name: &str) -> Self {
        Self::new(default_path(app_name))
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the document format
    pub fn format(&self) -> StoreFormat {
        self.format
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Default table location for an application
pub fn default_path(app_name: &str) -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
    config_dir.join(app_name).join(DEFAULT_FILE_NAME)
}

impl AccessStore for FileAccessStore {
    fn load(&self) -> Result<AccessTable, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No access table on disk");
            return Ok(AccessTable::new());
        }

        let text = fs::read_to_string(&self.path)?;
        codec::decode(&text, self.format)
    }

    fn save(&self, table: &AccessTable) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = codec::encode(table, self.format)?;

        // Write next to the target and swap it in
        let temp = self.temp_path();
        {
            let file = File::create(&temp)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&temp, &self.path)?;

        tracing::debug!(path = %self.path.display(), entries = table.len(), "Access table saved");
        Ok(())
    }
}

impl std::fmt::Debug for FileAccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAccessStore")
            .field("path", &self.path)
            .field("format", &self.format)
            .finish()
    }
}

// ============================================================================
// In-Memory Access Store
// ============================================================================

/// In-memory access store for testing or hosts without durable state
pub struct MemoryAccessStore {
    data: RwLock<AccessTable>,
    saves: RwLock<usize>,
}

impl MemoryAccessStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::with_table(AccessTable::new())
    }

    /// Create a store pre-populated with a table
    pub fn with_table(table: AccessTable) -> Self {
        Self {
            data: RwLock::new(table),
            saves: RwLock::new(0),
        }
    }

    /// Snapshot of the last saved table
    pub fn snapshot(&self) -> AccessTable {
        self.data.read().unwrap().clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap()
    }
}

impl Default for MemoryAccessStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessStore for MemoryAccessStore {
    fn load(&self) -> Result<AccessTable, StoreError> {
        Ok(self.data.read().unwrap().clone())
    }

    fn save(&self, table: &AccessTable) -> Result<(), StoreError> {
        *self.data.write().unwrap() = table.clone();
        *self.saves.write().unwrap() += 1;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryAccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAccessStore")
            .field("entries", &self.data.read().unwrap().len())
            .field("saves", &self.save_count())
            .finish()
    }
}

// ============================================================================
// Read-Only Access Store
// ============================================================================

/// Read-only wrapper for any access store
///
/// Useful where the table is provisioned ahead of time and must not be
/// rewritten by the running host.
pub struct ReadOnlyAccessStore<S: AccessStore> {
    inner: S,
}

impl<S: AccessStore> ReadOnlyAccessStore<S> {
    /// Create a read-only wrapper
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Access the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AccessStore> AccessStore for ReadOnlyAccessStore<S> {
    fn load(&self) -> Result<AccessTable, StoreError> {
        self.inner.load()
    }

    fn save(&self, _table: &AccessTable) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly)
    }
}

impl<S: AccessStore + std::fmt::Debug> std::fmt::Debug for ReadOnlyAccessStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOnlyAccessStore")
            .field("inner", &self.inner)
            .finish()
    }
}
