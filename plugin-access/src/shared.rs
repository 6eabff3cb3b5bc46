//! Thread-safe handle to an access manager
//!
//! Every operation holds the lock for its full duration, so a `check` never
//! observes a half-applied mutation.

use async_trait::async_trait;
use plugin_access_api::{ManageType, PluginConfig};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::manager::{AccessError, AccessManager};
use crate::startup::StartupHook;

/// Cloneable, lock-protected [`AccessManager`]
#[derive(Clone)]
pub struct SharedAccessManager {
    inner: Arc<RwLock<AccessManager>>,
}

impl SharedAccessManager {
    pub fn new(manager: AccessManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// See [`AccessManager::init`]
    pub async fn init(&self) -> Result<(), AccessError> {
        self.inner.write().await.init()
    }

    /// See [`AccessManager::block`]
    pub async fn block(&self, plugin_name: &str, user_id: &str) -> bool {
        self.inner.write().await.block(plugin_name, user_id)
    }

    /// See [`AccessManager::unblock`]
    pub async fn unblock(&self, plugin_name: &str, user_id: &str) -> bool {
        self.inner.write().await.unblock(plugin_name, user_id)
    }

    /// See [`AccessManager::change_mode`]
    pub async fn change_mode(&self, plugin_name: &str, mode: u8) -> bool {
        self.inner.write().await.change_mode(plugin_name, mode)
    }

    /// See [`AccessManager::change_manage_type`]
    pub async fn change_manage_type(&self, plugin_name: &str, manage_type: ManageType) -> bool {
        self.inner
            .write()
            .await
            .change_manage_type(plugin_name, manage_type)
    }

    /// Copy of a plugin's settings
    pub async fn get_config(&self, plugin_name: &str) -> Option<PluginConfig> {
        self.inner.read().await.get_config(plugin_name).cloned()
    }

    /// See [`AccessManager::check`]
    pub async fn check(&self, plugin_name: &str, user_id: &str) -> bool {
        self.inner.read().await.check(plugin_name, user_id)
    }

    /// See [`AccessManager::find`]
    pub async fn find(&self, keyword: &str) -> Option<String> {
        self.inner.read().await.find(keyword)
    }

    /// Number of records
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the table is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl std::fmt::Debug for SharedAccessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAccessManager").finish_non_exhaustive()
    }
}

#[async_trait]
impl StartupHook for SharedAccessManager {
    fn name(&self) -> &str {
        "plugin-access"
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.init().await?;
        tracing::info!("Plugin access manager initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticPluginDirectory;
    use crate::presets::AccessPresets;
    use crate::startup::StartupPhases;
    use plugin_access_api::{PluginDescriptor, PluginMetadata};

    fn shared(plugins: Vec<PluginDescriptor>) -> SharedAccessManager {
        let directory = Arc::new(StaticPluginDirectory::from_plugins(plugins));
        SharedAccessManager::new(AccessManager::new(AccessPresets::testing(), directory))
    }

    #[tokio::test]
    async fn test_startup_hook_initializes() {
        let manager = shared(vec![PluginDescriptor::new("echo")]);
        assert!(manager.is_empty().await);

        let mut phases = StartupPhases::new();
        phases.register(manager.clone());
        phases.run_all().await.unwrap();

        assert_eq!(manager.len().await, 1);
        assert_eq!(manager.get_config("echo").await.unwrap().mode, 3);
    }

    #[tokio::test]
    async fn test_concurrent_mutations() {
        let plugin = PluginDescriptor::new("weather")
            .with_metadata(PluginMetadata::new("Weather"))
            .with_handlers(true);
        let manager = shared(vec![plugin]);
        manager.init().await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let manager = manager.clone();
            tasks.push(tokio::spawn(async move {
                manager.block("weather", &format!("user-{}", i % 4)).await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap());
        }

        let config = manager.get_config("weather").await.unwrap();
        assert_eq!(config.black_list.len(), 4);
        assert!(!manager.check("weather", "user-0").await);
        assert!(manager.check("weather", "user-9").await);
    }

    #[tokio::test]
    async fn test_shared_find_and_mode() {
        let plugin = PluginDescriptor::new("nonebot_plugin_echo")
            .with_metadata(PluginMetadata::new("Echo"))
            .with_handlers(true);
        let manager = shared(vec![plugin]);
        manager.init().await.unwrap();

        let id = manager.find("echo").await.unwrap();
        assert!(manager.change_mode(&id, 0).await);
        assert!(!manager.check(&id, "anyone").await);
        assert!(!manager.change_mode(&id, 9).await);
        assert!(manager.change_manage_type(&id, ManageType::White).await);
        assert!(manager.unblock(&id, "anyone").await);
    }
}
