//! Plugin directory and name matching
//!
//! The directory is the host's live list of known plugins. The access manager
//! never caches it: reconciliation and keyword lookup both ask again.

use plugin_access_api::PluginDescriptor;
use std::sync::RwLock;

/// Conventional ecosystem prefixes stripped when deriving a short name
pub const DEFAULT_NAME_PREFIXES: &[&str] = &[
    "nonebot_plugin_",
    "nonebot-plugin-",
    "nonebot_",
    "nonebot-",
];

/// Source of the currently known plugins
///
/// Implementations must return plugins in registration order.
pub trait PluginDirectory: Send + Sync {
    fn plugins(&self) -> Vec<PluginDescriptor>;
}

impl<F> PluginDirectory for F
where
    F: Fn() -> Vec<PluginDescriptor> + Send + Sync,
{
    fn plugins(&self) -> Vec<PluginDescriptor> {
        self()
    }
}

/// In-process plugin directory
#[derive(Debug, Default)]
pub struct StaticPluginDirectory {
    plugins: RwLock<Vec<PluginDescriptor>>,
}

impl StaticPluginDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory from plugins in registration order
    pub fn from_plugins(plugins: impl IntoIterator<Item = PluginDescriptor>) -> Self {
        Self {
            plugins: RwLock::new(plugins.into_iter().collect()),
        }
    }

    /// Register a plugin after the ones already known
    pub fn register(&self, plugin: PluginDescriptor) {
        tracing::debug!(plugin = %plugin.id, "Plugin registered with directory");
        self.plugins.write().unwrap().push(plugin);
    }

    /// Number of known plugins
    pub fn len(&self) -> usize {
        self.plugins.read().unwrap().len()
    }

    /// Check if the directory is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.read().unwrap().is_empty()
    }
}

impl PluginDirectory for StaticPluginDirectory {
    fn plugins(&self) -> Vec<PluginDescriptor> {
        self.plugins.read().unwrap().clone()
    }
}

/// Strip conventional prefixes from a plugin identifier, in order
pub fn strip_prefixes<'a, P: AsRef<str>>(id: &'a str, prefixes: &[P]) -> &'a str {
    prefixes.iter().fold(id, |name, prefix| {
        name.strip_prefix(prefix.as_ref()).unwrap_or(name)
    })
}

/// Short name for a plugin: the metadata override, or the stripped identifier
pub fn short_name<P: AsRef<str>>(plugin: &PluginDescriptor, prefixes: &[P]) -> String {
    plugin
        .metadata
        .as_ref()
        .and_then(|m| m.unique_name())
        .unwrap_or_else(|| strip_prefixes(&plugin.id, prefixes).to_string())
}

/// Lowercased names a keyword may match for this plugin
///
/// Plugins without metadata only match on their identifier.
pub fn search_names<P: AsRef<str>>(plugin: &PluginDescriptor, prefixes: &[P]) -> Vec<String> {
    let mut names = vec![plugin.id.to_lowercase()];
    if let Some(metadata) = &plugin.metadata {
        names.push(metadata.name.to_lowercase());
        names.push(short_name(plugin, prefixes).to_lowercase());
    }
    names
}

/// Find the most recently registered plugin matching `keyword`
///
/// Matching is exact and case-insensitive against the identifier, display
/// name and short name.
pub fn find_plugin<P: AsRef<str>>(
    plugins: &[PluginDescriptor],
    keyword: &str,
    prefixes: &[P],
) -> Option<String> {
    let keyword = keyword.to_lowercase();
    plugins
        .iter()
        .rev()
        .find(|p| search_names(p, prefixes).contains(&keyword))
        .map(|p| p.id.clone())
}
