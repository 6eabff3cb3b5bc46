//! Ordered startup phases
//!
//! Hosts register their initialization hooks explicitly and run them once,
//! after plugin discovery has finished.

use anyhow::Context;
use async_trait::async_trait;

/// A unit of work run once during host startup
#[async_trait]
pub trait StartupHook: Send + Sync {
    /// Name used in logs and error context
    fn name(&self) -> &str;

    /// Run the hook
    async fn run(&self) -> anyhow::Result<()>;
}

/// Ordered list of startup hooks
#[derive(Default)]
pub struct StartupPhases {
    hooks: Vec<Box<dyn StartupHook>>,
    // Index of the first hook that has not yet succeeded
    completed: usize,
}

impl StartupPhases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in registration order
    pub fn register(&mut self, hook: impl StartupHook + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Whether every hook has already run successfully
    pub fn is_completed(&self) -> bool {
        self.completed == self.hooks.len()
    }

    /// Run pending hooks in order, stopping at the first failure
    ///
    /// A hook that succeeded is never run again: a later call resumes at the
    /// hook that failed, and does nothing once all hooks have succeeded.
    pub async fn run_all(&mut self) -> anyhow::Result<()> {
        if self.is_completed() {
            tracing::debug!("Startup phases already completed");
            return Ok(());
        }

        for hook in &self.hooks[self.completed..] {
            tracing::debug!(hook = hook.name(), "Running startup hook");
            hook.run()
                .await
                .with_context(|| format!("Startup hook '{}' failed", hook.name()))?;
            self.completed += 1;
        }

        Ok(())
    }
}

impl std::fmt::Debug for StartupPhases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.hooks.iter().map(|h| h.name()).collect();
        f.debug_struct("StartupPhases")
            .field("hooks", &names)
            .field("completed", &self.completed)
            .field("pending", &(self.hooks.len() - self.completed))
            .finish()
    }
}
