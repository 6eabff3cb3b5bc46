//! plugin-access: Per-plugin access control for plugin hosts
//!
//! Decides, per registered plugin and per caller, whether an action is
//! permitted, and keeps that state in a human-editable file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plugin_access::{AccessManager, AccessPresets, SharedAccessManager, StartupPhases};
//! use plugin_access::StaticPluginDirectory;
//! use plugin_access_api::{PluginDescriptor, PluginMetadata};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let directory = Arc::new(StaticPluginDirectory::new());
//! directory.register(
//!     PluginDescriptor::new("nonebot_plugin_weather")
//!         .with_metadata(PluginMetadata::new("Weather"))
//!         .with_handlers(true),
//! );
//!
//! let config = AccessPresets::standard("myapp")?;
//! let manager = SharedAccessManager::new(AccessManager::new(config, directory));
//!
//! let mut startup = StartupPhases::new();
//! startup.register(manager.clone());
//! startup.run_all().await?;
//!
//! if let Some(id) = manager.find("weather").await {
//!     manager.block(&id, "user-42").await;
//!     assert!(!manager.check(&id, "user-42").await);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod directory;
pub mod manager;
pub mod presets;
pub mod shared;
pub mod startup;
pub mod store;
#[cfg(feature = "subscriber")]
pub mod tracing_support;

pub use codec::{AccessTable, StoreFormat};
pub use directory::{PluginDirectory, StaticPluginDirectory, DEFAULT_NAME_PREFIXES};
pub use manager::{AccessError, AccessManager};
pub use presets::{AccessConfig, AccessConfigBuilder, AccessPresets, PresetError};
pub use shared::SharedAccessManager;
pub use startup::{StartupHook, StartupPhases};
pub use store::{AccessStore, FileAccessStore, MemoryAccessStore, ReadOnlyAccessStore, StoreError};
pub use plugin_access_api::{mode, ManageType, PluginConfig, PluginDescriptor, PluginMetadata};
