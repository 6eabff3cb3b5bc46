//! plugin-access-api: Shared types for plugin access control
//!
//! This crate defines the records exchanged between a plugin host and the
//! access manager: the per-plugin access settings and the descriptors a
//! plugin directory hands out at startup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mode bit constants
///
/// A plugin mode is a 3-bit mask. Only [`mode::ENABLED`] is interpreted by the
/// access manager; the context bits are left to callers.
pub mod mode {
    /// Master gate: the plugin is enabled at all
    pub const ENABLED: u8 = 0b001;
    /// Enabled in group/channel contexts
    pub const GROUP: u8 = 0b010;
    /// Enabled in direct/private contexts
    pub const PRIVATE: u8 = 0b100;
    /// Every bit set
    pub const ALL: u8 = ENABLED | GROUP | PRIVATE;
    /// Default for plugins that cannot run in private contexts
    pub const REDUCED: u8 = ALL & !PRIVATE;
    /// Largest valid mode value
    pub const MAX: u8 = ALL;

    /// Check whether a raw value is a valid mode
    pub fn is_valid(mode: u8) -> bool {
        mode <= MAX
    }
}

/// Access management strategy for a plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ManageType {
    /// Everyone is allowed except callers on the black list
    #[default]
    Black,
    /// Only callers on the white list are allowed
    White,
}

impl ManageType {
    /// Integer code used in persisted documents
    pub fn code(self) -> u8 {
        match self {
            ManageType::Black => 0,
            ManageType::White => 1,
        }
    }

    /// Parse a persisted integer code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ManageType::Black),
            1 => Some(ManageType::White),
            _ => None,
        }
    }
}

/// Access settings for a single plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Mode bitmask in `0..=7`
    pub mode: u8,
    /// Which list governs exclusion
    pub manage_type: ManageType,
    /// Excluded callers, used under [`ManageType::Black`]
    pub black_list: Vec<String>,
    /// Admitted callers, used under [`ManageType::White`]
    pub white_list: Vec<String>,
}

impl PluginConfig {
    /// Default settings for a plugin that cannot run in private contexts
    pub fn reduced() -> Self {
        Self {
            mode: mode::REDUCED,
            ..Self::default()
        }
    }

    /// Whether the master gate bit is set
    pub fn is_enabled(&self) -> bool {
        self.mode & mode::ENABLED != 0
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            mode: mode::ALL,
            manage_type: ManageType::Black,
            black_list: Vec::new(),
            white_list: Vec::new(),
        }
    }
}

/// Extras key that overrides the derived short name
pub const UNIQUE_NAME_KEY: &str = "unique_name";

/// Descriptive metadata a plugin declares about itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Human-readable display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Free-form extras
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an extras entry
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Short name declared in extras, if any
    ///
    /// Falsy values (empty strings, zero, `null`, `false`) do not count as an
    /// override.
    pub fn unique_name(&self) -> Option<String> {
        match self.extra.get(UNIQUE_NAME_KEY)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

/// A plugin as reported by the host's plugin directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Stable plugin identifier
    pub id: String,

    /// Declared metadata
    #[serde(default)]
    pub metadata: Option<PluginMetadata>,

    /// Whether the plugin registered any active handler
    #[serde(default)]
    pub has_handlers: bool,
}

impl PluginDescriptor {
    /// Create a descriptor with no metadata and no handlers
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: None,
            has_handlers: false,
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: PluginMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Mark whether the plugin has active handlers
    pub fn with_handlers(mut self, has_handlers: bool) -> Self {
        self.has_handlers = has_handlers;
        self
    }

    /// Plugins without metadata or handlers default to [`mode::REDUCED`]
    pub fn needs_reduced_mode(&self) -> bool {
        self.metadata.is_none() || !self.has_handlers
    }

    /// Default access settings for this plugin
    pub fn default_config(&self) -> PluginConfig {
        if self.needs_reduced_mode() {
            PluginConfig::reduced()
        } else {
            PluginConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PluginConfig::default();
        assert_eq!(config.mode, 7);
        assert_eq!(config.manage_type, ManageType::Black);
        assert!(config.black_list.is_empty());
        assert!(config.white_list.is_empty());
        assert!(config.is_enabled());
    }

    #[test]
    fn test_reduced_config() {
        let config = PluginConfig::reduced();
        assert_eq!(config.mode, 3);
        assert!(config.is_enabled());
    }

    #[test]
    fn test_mode_bits() {
        assert!(mode::is_valid(0));
        assert!(mode::is_valid(7));
        assert!(!mode::is_valid(8));
        assert_eq!(mode::REDUCED & mode::PRIVATE, 0);

        let config = PluginConfig {
            mode: 6,
            ..PluginConfig::default()
        };
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_manage_type_codes() {
        assert_eq!(ManageType::Black.code(), 0);
        assert_eq!(ManageType::White.code(), 1);
        assert_eq!(ManageType::from_code(1), Some(ManageType::White));
        assert_eq!(ManageType::from_code(2), None);
    }

    #[test]
    fn test_descriptor_defaults() {
        let bare = PluginDescriptor::new("bare");
        assert!(bare.needs_reduced_mode());
        assert_eq!(bare.default_config().mode, mode::REDUCED);

        let no_handlers = PluginDescriptor::new("idle").with_metadata(PluginMetadata::new("Idle"));
        assert!(no_handlers.needs_reduced_mode());

        let full = PluginDescriptor::new("full")
            .with_metadata(PluginMetadata::new("Full"))
            .with_handlers(true);
        assert!(!full.needs_reduced_mode());
        assert_eq!(full.default_config().mode, mode::ALL);
    }

    #[test]
    fn test_unique_name_override() {
        let meta = PluginMetadata::new("Weather").with_extra(UNIQUE_NAME_KEY, "wx");
        assert_eq!(meta.unique_name(), Some("wx".to_string()));

        let empty = PluginMetadata::new("Weather").with_extra(UNIQUE_NAME_KEY, "");
        assert_eq!(empty.unique_name(), None);

        let numeric = PluginMetadata::new("Weather").with_extra(UNIQUE_NAME_KEY, 42);
        assert_eq!(numeric.unique_name(), Some("42".to_string()));

        let zero = PluginMetadata::new("Weather").with_extra(UNIQUE_NAME_KEY, 0);
        assert_eq!(zero.unique_name(), None);

        let zero_float = PluginMetadata::new("Weather").with_extra(UNIQUE_NAME_KEY, 0.0);
        assert_eq!(zero_float.unique_name(), None);

        assert_eq!(PluginMetadata::new("Weather").unique_name(), None);
    }
}
