//! Access manager
//!
//! Owns the access table, answers allow/deny questions and writes the whole
//! table back through its store after every change.
//!
//! # Reconciliation
//!
//! [`AccessManager::init`] builds the table in two explicit steps:
//!
//! 1. [`AccessManager::default_table`]: a default record for every plugin the
//!    directory currently knows.
//! 2. [`AccessManager::overlay`]: persisted records laid over the defaults.
//!    Persisted settings always win, and persisted plugins that are no longer
//!    live are kept.
//!
//! # Failed writes
//!
//! A mutation that cannot be persisted is undone in memory and reported as
//! `false`, so the table never drifts from what is on disk.

use plugin_access_api::{mode, ManageType, PluginConfig, PluginDescriptor};
use std::sync::Arc;
use thiserror::Error;

use crate::codec::AccessTable;
use crate::directory::{self, PluginDirectory};
use crate::presets::AccessConfig;
use crate::store::{AccessStore, StoreError};

/// Errors that abort startup reconciliation
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Failed to load access table: {0}")]
    Load(#[source] StoreError),

    #[error("Failed to save access table: {0}")]
    Save(#[source] StoreError),
}

/// Per-plugin access control and mode manager
pub struct AccessManager {
    table: AccessTable,
    store: Arc<dyn AccessStore>,
    directory: Arc<dyn PluginDirectory>,
    name_prefixes: Vec<String>,
}

impl AccessManager {
    /// Create a manager with an empty table
    ///
    /// Nothing is loaded until [`AccessManager::init`] runs.
    pub fn new(config: AccessConfig, directory: Arc<dyn PluginDirectory>) -> Self {
        Self {
            table: AccessTable::new(),
            store: config.store,
            directory,
            name_prefixes: config.name_prefixes,
        }
    }

    /// Default records for the given live plugins
    pub fn default_table(plugins: &[PluginDescriptor]) -> AccessTable {
        plugins
            .iter()
            .map(|p| (p.id.clone(), p.default_config()))
            .collect()
    }

    /// Lay persisted records over defaults
    pub fn overlay(mut defaults: AccessTable, persisted: AccessTable) -> AccessTable {
        defaults.extend(persisted);
        defaults
    }

    /// Reconcile the persisted table with the live plugin directory
    ///
    /// A missing table file is an empty table. An unreadable or invalid one
    /// is returned as an error and the in-memory table is left untouched.
    /// The merged table is always written back.
    pub fn init(&mut self) -> Result<(), AccessError> {
        let persisted = self.store.load().map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse access table");
            AccessError::Load(e)
        })?;

        let plugins = self.directory.plugins();
        let defaults = Self::default_table(&plugins);
        self.table = Self::overlay(defaults, persisted);

        self.persist().map_err(AccessError::Save)?;

        tracing::info!(
            live = plugins.len(),
            total = self.table.len(),
            "Access table reconciled"
        );
        Ok(())
    }

    /// Deny `user_id` access to a plugin
    ///
    /// Under black-list management the caller is added to the black list;
    /// under white-list management it is removed from the white list.
    pub fn block(&mut self, plugin_name: &str, user_id: &str) -> bool {
        let updated = self.mutate(plugin_name, |config| match config.manage_type {
            ManageType::Black => insert_unique(&mut config.black_list, user_id),
            ManageType::White => config.white_list.retain(|u| u != user_id),
        });
        if updated {
            tracing::info!(plugin = %plugin_name, user = %user_id, "Caller blocked");
        }
        updated
    }

    /// Allow `user_id` access to a plugin
    ///
    /// Mirror of [`AccessManager::block`].
    pub fn unblock(&mut self, plugin_name: &str, user_id: &str) -> bool {
        let updated = self.mutate(plugin_name, |config| match config.manage_type {
            ManageType::White => insert_unique(&mut config.white_list, user_id),
            ManageType::Black => config.black_list.retain(|u| u != user_id),
        });
        if updated {
            tracing::info!(plugin = %plugin_name, user = %user_id, "Caller unblocked");
        }
        updated
    }

    /// Overwrite the mode bitmask; values outside `0..=7` are rejected
    pub fn change_mode(&mut self, plugin_name: &str, new_mode: u8) -> bool {
        if !mode::is_valid(new_mode) {
            tracing::debug!(plugin = %plugin_name, mode = new_mode, "Rejected invalid mode");
            return false;
        }
        let updated = self.mutate(plugin_name, |config| config.mode = new_mode);
        if updated {
            tracing::info!(plugin = %plugin_name, mode = new_mode, "Mode changed");
        }
        updated
    }

    /// Switch between black-list and white-list management
    ///
    /// Both lists are kept as they are; the inactive one simply stops
    /// mattering until the type is switched back.
    pub fn change_manage_type(&mut self, plugin_name: &str, manage_type: ManageType) -> bool {
        let updated = self.mutate(plugin_name, |config| config.manage_type = manage_type);
        if updated {
            tracing::info!(plugin = %plugin_name, manage_type = ?manage_type, "Manage type changed");
        }
        updated
    }

    /// Settings for a plugin
    pub fn get_config(&self, plugin_name: &str) -> Option<&PluginConfig> {
        self.table.get(plugin_name)
    }

    /// Decide whether `user_id` may use a plugin
    pub fn check(&self, plugin_name: &str, user_id: &str) -> bool {
        let Some(config) = self.table.get(plugin_name) else {
            return false;
        };
        if !config.is_enabled() {
            return false;
        }
        match config.manage_type {
            ManageType::Black => !config.black_list.iter().any(|u| u == user_id),
            ManageType::White => config.white_list.iter().any(|u| u == user_id),
        }
    }

    /// Resolve a keyword to a live plugin identifier
    ///
    /// Later registrations win when several plugins share a name.
    pub fn find(&self, keyword: &str) -> Option<String> {
        directory::find_plugin(&self.directory.plugins(), keyword, &self.name_prefixes)
    }

    /// Short name of a plugin under this manager's prefixes
    pub fn short_name(&self, plugin: &PluginDescriptor) -> String {
        directory::short_name(plugin, &self.name_prefixes)
    }

    /// Iterate over all known records
    pub fn plugins(&self) -> impl Iterator<Item = (&str, &PluginConfig)> {
        self.table.iter().map(|(name, config)| (name.as_str(), config))
    }

    /// The whole table
    pub fn table(&self) -> &AccessTable {
        &self.table
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn mutate<F>(&mut self, plugin_name: &str, apply: F) -> bool
    where
        F: FnOnce(&mut PluginConfig),
    {
        let Some(config) = self.table.get_mut(plugin_name) else {
            tracing::debug!(plugin = %plugin_name, "Unknown plugin");
            return false;
        };

        let previous = config.clone();
        apply(config);

        if let Err(e) = self.persist() {
            tracing::warn!(
                plugin = %plugin_name,
                error = %e,
                "Failed to persist access table, change reverted"
            );
            self.table.insert(plugin_name.to_string(), previous);
            return false;
        }

        true
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.table)
    }
}

fn insert_unique(list: &mut Vec<String>, user_id: &str) {
    if !list.iter().any(|u| u == user_id) {
        list.push(user_id.to_string());
    }
}

impl std::fmt::Debug for AccessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessManager")
            .field("entries", &self.table.len())
            .field("name_prefixes", &self.name_prefixes)
            .finish_non_exhaustive()
    }
}
