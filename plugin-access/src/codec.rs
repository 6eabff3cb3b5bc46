//! Document codec for the access table
//!
//! The table is written as a mapping from plugin identifier to its settings.
//! `manage_type` goes on the wire as its integer code; everything else is
//! emitted as-is.

use plugin_access_api::{mode, ManageType, PluginConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::store::StoreError;

/// In-memory access table keyed by plugin identifier
pub type AccessTable = BTreeMap<String, PluginConfig>;

/// Document format of a persisted table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Yaml,
    Json,
}

impl StoreFormat {
    /// Pick a format from the file extension (`.json` or YAML otherwise)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StoreFormat::Json,
            _ => StoreFormat::Yaml,
        }
    }
}

fn default_mode() -> u8 {
    mode::ALL
}

/// Wire representation of [`PluginConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPluginConfig {
    #[serde(default = "default_mode")]
    mode: u8,
    #[serde(default)]
    manage_type: u8,
    #[serde(default)]
    black_list: Vec<String>,
    #[serde(default)]
    white_list: Vec<String>,
}

impl From<&PluginConfig> for StoredPluginConfig {
    fn from(config: &PluginConfig) -> Self {
        Self {
            mode: config.mode,
            manage_type: config.manage_type.code(),
            black_list: config.black_list.clone(),
            white_list: config.white_list.clone(),
        }
    }
}

impl StoredPluginConfig {
    /// Mode values are kept as written; only `change_mode` enforces the range.
    fn into_config(self, plugin: &str) -> Result<PluginConfig, StoreError> {
        let manage_type =
            ManageType::from_code(self.manage_type).ok_or_else(|| StoreError::Invalid {
                plugin: plugin.to_string(),
                reason: format!("unknown manage_type {}", self.manage_type),
            })?;

        Ok(PluginConfig {
            mode: self.mode,
            manage_type,
            black_list: self.black_list,
            white_list: self.white_list,
        })
    }
}

/// Parse a persisted document into an access table
///
/// An empty or `null` document is an empty table, the same as a missing
/// file. Structural or schema problems are returned as errors.
pub fn decode(text: &str, format: StoreFormat) -> Result<AccessTable, StoreError> {
    if text.trim().is_empty() {
        return Ok(AccessTable::new());
    }

    let raw: Option<BTreeMap<String, StoredPluginConfig>> = match format {
        StoreFormat::Yaml => serde_yaml::from_str(text)?,
        StoreFormat::Json => serde_json::from_str(text)?,
    };

    raw.unwrap_or_default()
        .into_iter()
        .map(|(name, stored)| {
            let config = stored.into_config(&name)?;
            Ok((name, config))
        })
        .collect()
}

/// Serialize an access table into a document
pub fn encode(table: &AccessTable, format: StoreFormat) -> Result<String, StoreError> {
    let raw: BTreeMap<&str, StoredPluginConfig> = table
        .iter()
        .map(|(name, config)| (name.as_str(), StoredPluginConfig::from(config)))
        .collect();

    let text = match format {
        StoreFormat::Yaml => serde_yaml::to_string(&raw)?,
        StoreFormat::Json => serde_json::to_string_pretty(&raw)?,
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> AccessTable {
        let mut table = AccessTable::new();
        table.insert(
            "weather".to_string(),
            PluginConfig {
                mode: 5,
                manage_type: ManageType::White,
                black_list: vec!["100".to_string()],
                white_list: vec!["200".to_string(), "300".to_string()],
            },
        );
        table.insert("echo".to_string(), PluginConfig::reduced());
        table
    }

    #[test]
    fn test_yaml_round_trip() {
        let table = sample_table();
        let text = encode(&table, StoreFormat::Yaml).unwrap();
        assert_eq!(decode(&text, StoreFormat::Yaml).unwrap(), table);
    }

    #[test]
    fn test_json_round_trip() {
        let table = sample_table();
        let text = encode(&table, StoreFormat::Json).unwrap();
        assert_eq!(decode(&text, StoreFormat::Json).unwrap(), table);
    }

    #[test]
    fn test_manage_type_written_as_integer() {
        let text = encode(&sample_table(), StoreFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["weather"]["manage_type"], 1);
        assert_eq!(value["echo"]["manage_type"], 0);
        assert_eq!(value["echo"]["mode"], 3);
    }

    #[test]
    fn test_empty_document() {
        assert!(decode("", StoreFormat::Yaml).unwrap().is_empty());
        assert!(decode("  \n", StoreFormat::Json).unwrap().is_empty());
        assert!(decode("{}", StoreFormat::Yaml).unwrap().is_empty());
        assert!(decode("~\n", StoreFormat::Yaml).unwrap().is_empty());
        assert!(decode("null", StoreFormat::Json).unwrap().is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let table = decode("echo:\n  black_list: ['1']\n", StoreFormat::Yaml).unwrap();
        let config = &table["echo"];
        assert_eq!(config.mode, 7);
        assert_eq!(config.manage_type, ManageType::Black);
        assert_eq!(config.black_list, vec!["1".to_string()]);
        assert!(config.white_list.is_empty());
    }

    #[test]
    fn test_unknown_manage_type_is_invalid() {
        let err = decode("echo:\n  manage_type: 4\n", StoreFormat::Yaml).unwrap_err();
        assert!(matches!(err, StoreError::Invalid { ref plugin, .. } if plugin == "echo"));
    }

    #[test]
    fn test_out_of_range_mode_is_loaded() {
        let table = decode("echo:\n  mode: 9\n", StoreFormat::Yaml).unwrap();
        assert_eq!(table["echo"].mode, 9);

        let table = decode(r#"{"echo": {"mode": 9}}"#, StoreFormat::Json).unwrap();
        assert_eq!(table["echo"].mode, 9);
    }

    #[test]
    fn test_negative_mode_is_rejected() {
        assert!(matches!(
            decode("echo:\n  mode: -1\n", StoreFormat::Yaml),
            Err(StoreError::Yaml(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            decode("- just\n- a list\n", StoreFormat::Yaml),
            Err(StoreError::Yaml(_))
        ));
        assert!(matches!(
            decode("{not json", StoreFormat::Json),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            StoreFormat::from_path(Path::new("a/plugin_manager.yml")),
            StoreFormat::Yaml
        );
        assert_eq!(
            StoreFormat::from_path(Path::new("a/plugin_manager.JSON")),
            StoreFormat::Json
        );
        assert_eq!(StoreFormat::from_path(Path::new("noext")), StoreFormat::Yaml);
    }
}
