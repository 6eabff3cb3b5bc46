//! Access manager configuration and presets
//!
//! Bundles the pluggable pieces the manager needs (the store and the name
//! prefixes) and provides ready-made setups for common hosts.

use std::path::PathBuf;
use std::sync::Arc;

use crate::directory::DEFAULT_NAME_PREFIXES;
use crate::store::{AccessStore, FileAccessStore, MemoryAccessStore};

/// Complete access manager configuration
pub struct AccessConfig {
    /// Table persistence
    pub store: Arc<dyn AccessStore>,
    /// Prefixes stripped from identifiers to derive short names
    pub name_prefixes: Vec<String>,
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("name_prefixes", &self.name_prefixes)
            .finish_non_exhaustive()
    }
}

impl AccessConfig {
    /// Create a configuration with default name prefixes
    pub fn new(store: impl AccessStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            name_prefixes: default_name_prefixes(),
        }
    }
}

fn default_name_prefixes() -> Vec<String> {
    DEFAULT_NAME_PREFIXES.iter().map(|p| p.to_string()).collect()
}

/// Builder for access manager configurations
pub struct AccessConfigBuilder {
    app_name: Option<String>,
    path: Option<PathBuf>,
    store: Option<Arc<dyn AccessStore>>,
    name_prefixes: Option<Vec<String>>,
}

impl AccessConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            app_name: None,
            path: None,
            store: None,
            name_prefixes: None,
        }
    }

    /// Set the application name (used for default paths)
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Persist to a file at this path instead of the default location
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the access store
    pub fn store(self, store: impl AccessStore + 'static) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Set an access store the caller keeps a handle to
    pub fn shared_store(mut self, store: Arc<dyn AccessStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the short-name prefixes
    pub fn name_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AccessConfig, PresetError> {
        if self.store.is_some() && self.path.is_some() {
            return Err(PresetError::InvalidConfig(
                "both a store and a store path were given".to_string(),
            ));
        }

        let app_name = self.app_name.as_deref().unwrap_or("plugin-host");
        if app_name.trim().is_empty() {
            return Err(PresetError::InvalidConfig(
                "application name is empty".to_string(),
            ));
        }

        let store: Arc<dyn AccessStore> = match (self.store, self.path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileAccessStore::new(path)),
            (None, None) => Arc::new(FileAccessStore::default_for_app(app_name)),
        };

        Ok(AccessConfig {
            store,
            name_prefixes: self.name_prefixes.unwrap_or_else(default_name_prefixes),
        })
    }
}

impl Default for AccessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for preset initialization
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Preset Configurations
// ============================================================================

/// Preset configurations for common use cases
pub struct AccessPresets;

impl AccessPresets {
    /// Regular host: YAML table in the application config directory
    pub fn standard(app_name: &str) -> Result<AccessConfig, PresetError> {
        AccessConfigBuilder::new().app_name(app_name).build()
    }

    /// Testing mode (in-memory, no persistence)
    pub fn testing() -> AccessConfig {
        AccessConfig::new(MemoryAccessStore::new())
    }
}
