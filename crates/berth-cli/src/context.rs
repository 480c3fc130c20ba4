//! Wiring shared by every subcommand: configuration, engine and command bus.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use berth_common::config::BerthConfig;
use berth_registry::Registry;
use berth_runtime::adapter::RuntimeAdapter;
use berth_runtime::dispatch::{CommandTable, Dispatcher};
use berth_runtime::engine::Engine;
use berth_runtime::exec::{CommandRunner, ProcessRunner};

use crate::bus;

/// Loaded engine plus the command table it dispatches through.
pub struct Context {
    /// Lifecycle engine over the configured registry and runtime.
    pub engine: Engine,
    bus: Arc<CommandTable>,
}

impl Context {
    /// Loads configuration from `config_path` and wires the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the registry
    /// directory cannot be created.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let config = BerthConfig::load(config_path).with_context(|| {
            format!("failed to load configuration from {}", config_path.display())
        })?;

        let registry = Registry::open(config.registry_file.clone()).with_context(|| {
            format!("failed to open registry at {}", config.registry_file.display())
        })?;

        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
        let adapter = RuntimeAdapter::from_config(Arc::clone(&runner), &config);
        if !adapter.is_available() {
            tracing::warn!(binary = adapter.binary(), "container runtime not found on PATH");
        }

        let engine = Engine::new(Arc::new(registry), adapter)
            .with_run_flags(config.run_flags.clone());
        let bus = bus::build(&engine, &config, runner);
        tracing::debug!(commands = ?bus.commands(), "command table ready");
        Ok(Self { engine, bus })
    }

    /// Assembles a context from an already wired engine and table.
    #[cfg(test)]
    pub const fn from_parts(engine: Engine, bus: Arc<CommandTable>) -> Self {
        Self { engine, bus }
    }

    /// The command table as a dispatcher.
    pub fn bus(&self) -> Arc<dyn Dispatcher> {
        self.bus.clone()
    }
}
