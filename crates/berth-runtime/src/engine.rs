//! Lifecycle engine that orchestrates registered containers.
//!
//! Whether a container is running is never stored; it is observed live by
//! combining the registry with the runtime's listing. Multi-step operations
//! are not compensated: a step that already ran (a proxy route, a DNS
//! record) stays in place when a later step fails.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

use berth_common::error::{BerthError, Result};
use berth_common::types::ListFilter;
use berth_registry::Registry;
use berth_registry::sanitize::entries;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::task::JoinSet;

use crate::adapter::{LaunchSpec, RuntimeAdapter};
use crate::allocator::{self, LocalPortProbe, PortProbe};
use crate::dispatch::{self, CommandTable, Dispatcher, commands, str_arg};
use crate::exec::EnvMap;

/// One container that could not be refreshed during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    /// Container name.
    pub name: String,
    /// Rendered error.
    pub error: String,
}

/// Outcome of [`Engine::reconcile_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Registered containers that were not running, sorted by name.
    pub attempted: Vec<String>,
    /// Subset of `attempted` whose refresh failed, sorted by name.
    pub failed: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// Whether every attempted refresh succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The lifecycle engine.
///
/// Cheap to clone; clones share the registry, adapter and probe.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    adapter: RuntimeAdapter,
    probe: Arc<dyn PortProbe>,
    ambient: Arc<EnvMap>,
    run_flags: Arc<[String]>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine using the loopback port probe and the current
    /// process environment as the ambient environment.
    #[must_use]
    pub fn new(registry: Arc<Registry>, adapter: RuntimeAdapter) -> Self {
        Self {
            registry,
            adapter,
            probe: Arc::new(LocalPortProbe),
            ambient: Arc::new(allocator::ambient_env()),
            run_flags: Arc::from(Vec::new()),
        }
    }

    /// Replaces the port probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn PortProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replaces the ambient environment handed to launched containers.
    #[must_use]
    pub fn with_ambient_env(mut self, ambient: EnvMap) -> Self {
        self.ambient = Arc::new(ambient);
        self
    }

    /// Sets runtime flags added to every launch, just before the image.
    #[must_use]
    pub fn with_run_flags(mut self, flags: Vec<String>) -> Self {
        self.run_flags = Arc::from(flags);
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the runtime adapter.
    #[must_use]
    pub const fn adapter(&self) -> &RuntimeAdapter {
        &self.adapter
    }

    /// Starts a registered container.
    ///
    /// Order: environment lookup, then (for a bound host) proxy update,
    /// DNS add and DNS reload, then launch.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] for an empty name,
    /// [`BerthError::NotFound`] for an unregistered one, any dispatcher
    /// error, or [`BerthError::Runtime`] if the launch fails.
    pub async fn start(&self, name: &str, bus: &dyn Dispatcher) -> Result<()> {
        require_name(name)?;
        let record = self.registry.find(name)?;

        let shown = bus.run(commands::ENV_SHOW, json!({ "name": name })).await?;
        let vars = dispatch::env_pairs(shown)?;
        let alloc = allocator::allocate(self.probe.as_ref(), vars, &self.ambient).await?;

        let spec = LaunchSpec {
            name: record.name.clone(),
            image: record.image.clone(),
            port_flags: port_flags(&record.ports, alloc.port),
            volume_flags: entries(&record.volumes).map(|v| format!("-v{v}")).collect(),
            env_keys: alloc.env_keys,
            extra_flags: self.run_flags.to_vec(),
            env: alloc.env,
        };

        if let Some(domain) = record.domain() {
            let target = format!("http://localhost:{}", alloc.port);
            let _ = bus
                .run(commands::PX_UPDATE, json!({ "domain": domain, "target": target }))
                .await?;
            let _ = bus.run(commands::DNS_ADD, json!({ "domain": domain })).await?;
            let _ = bus.run(commands::DNS_RELOAD, json!({})).await?;
            tracing::info!(name, domain, target = %target, "routed domain");
        }

        self.adapter.launch(&spec).await?;
        tracing::info!(name, port = alloc.port, "container started");
        Ok(())
    }

    /// Stops a container and, if it is registered with a host, withdraws
    /// its DNS record.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] for an empty name, a runtime
    /// error from termination, or any dispatcher error.
    pub async fn stop(&self, name: &str, bus: &dyn Dispatcher) -> Result<()> {
        require_name(name)?;
        self.adapter.terminate(name).await?;

        if let Some(record) = self.registry.get(name)? {
            if let Some(domain) = record.domain() {
                let _ = bus.run(commands::DNS_REMOVE, json!({ "domain": domain })).await?;
                let _ = bus.run(commands::DNS_RELOAD, json!({})).await?;
                tracing::info!(name, domain, "withdrew domain");
            }
        }
        tracing::info!(name, "container stopped");
        Ok(())
    }

    /// Stops then starts a container. Returns the name on success.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; a failed stop skips the start.
    pub async fn restart(&self, name: &str, bus: &dyn Dispatcher) -> Result<String> {
        self.stop(name, bus).await?;
        self.start(name, bus).await?;
        Ok(name.to_string())
    }

    /// Pulls the registered image, stops the container, prunes images and
    /// starts it again, all through the dispatcher.
    ///
    /// A failure after the pull leaves the container stopped.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] for an empty name,
    /// [`BerthError::NotFound`] for an unregistered one, or the first
    /// failing step's error.
    pub async fn refresh(&self, name: &str, bus: &dyn Dispatcher) -> Result<()> {
        require_name(name)?;
        let record = self.registry.find(name)?;

        let _ = bus.run(commands::DX_PULL, json!({ "image": record.image })).await?;
        let _ = bus.run(commands::DX_STOP, json!({ "name": name })).await?;
        let _ = bus.run(commands::DX_PRUNE, json!({})).await?;
        let _ = bus.run(commands::DX_START, json!({ "name": name })).await?;
        tracing::info!(name, image = %record.image, "container refreshed");
        Ok(())
    }

    /// Refreshes every registered container that is not running.
    ///
    /// Refreshes run concurrently and independently; individual failures
    /// are logged and collected in the report instead of aborting the rest.
    ///
    /// # Errors
    ///
    /// Returns an error only if the registry or the runtime listing cannot
    /// be read.
    pub async fn reconcile_all(&self, bus: Arc<dyn Dispatcher>) -> Result<ReconcileReport> {
        let running: BTreeSet<String> = self.adapter.list_running().await?.into_iter().collect();
        let attempted: Vec<String> = self
            .registry
            .list(&ListFilter::default())?
            .into_iter()
            .map(|c| c.name)
            .filter(|name| !running.contains(name))
            .collect();

        let mut tasks = JoinSet::new();
        for name in &attempted {
            let engine = self.clone();
            let bus = Arc::clone(&bus);
            let name = name.clone();
            let _ = tasks.spawn(async move {
                let result = engine.refresh(&name, bus.as_ref()).await;
                (name, result)
            });
        }

        let mut finished = BTreeSet::new();
        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    let _ = finished.insert(name);
                }
                Ok((name, Err(e))) => {
                    tracing::warn!(name = %name, error = %e, "reconcile: refresh failed");
                    let _ = finished.insert(name.clone());
                    failed.push(ReconcileFailure {
                        name,
                        error: e.to_string(),
                    });
                }
                Err(e) => tracing::warn!(error = %e, "reconcile: refresh task aborted"),
            }
        }
        failed.extend(
            attempted
                .iter()
                .filter(|name| !finished.contains(*name))
                .map(|name| ReconcileFailure {
                    name: name.clone(),
                    error: "refresh task aborted".into(),
                }),
        );
        failed.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(attempted = attempted.len(), failed = failed.len(), "reconcile finished");
        Ok(ReconcileReport { attempted, failed })
    }

    /// Pulls an image through the runtime.
    ///
    /// # Errors
    ///
    /// See [`RuntimeAdapter::pull`].
    pub async fn pull(&self, image: &str) -> Result<()> {
        self.adapter.pull(image).await
    }

    /// Prunes unused images through the runtime.
    ///
    /// # Errors
    ///
    /// See [`RuntimeAdapter::prune`].
    pub async fn prune(&self) -> Result<()> {
        self.adapter.prune().await
    }

    /// Registers the `dx.*` commands on `table`, routing them back into
    /// this engine. `bus` is the table the handlers dispatch through when
    /// the engine itself needs the dispatcher.
    pub fn register_commands(&self, table: &mut CommandTable, bus: Weak<dyn Dispatcher>) {
        let engine = self.clone();
        table.register(commands::DX_PULL, move |args: Value| {
            let engine = engine.clone();
            async move {
                engine.pull(str_arg(&args, "image")).await?;
                Ok(Value::Bool(true))
            }
        });

        let engine = self.clone();
        table.register(commands::DX_PRUNE, move |_| {
            let engine = engine.clone();
            async move {
                engine.prune().await?;
                Ok(Value::Bool(true))
            }
        });

        let engine = self.clone();
        let weak = bus.clone();
        table.register(commands::DX_STOP, move |args: Value| {
            let engine = engine.clone();
            let weak = weak.clone();
            async move {
                let bus = upgrade(&weak, commands::DX_STOP)?;
                engine.stop(str_arg(&args, "name"), bus.as_ref()).await?;
                Ok(Value::Bool(true))
            }
        });

        let engine = self.clone();
        table.register(commands::DX_START, move |args: Value| {
            let engine = engine.clone();
            let weak = bus.clone();
            async move {
                let bus = upgrade(&weak, commands::DX_START)?;
                engine.start(str_arg(&args, "name"), bus.as_ref()).await?;
                Ok(Value::Bool(true))
            }
        });
    }
}

fn upgrade(bus: &Weak<dyn Dispatcher>, command: &str) -> Result<Arc<dyn Dispatcher>> {
    bus.upgrade()
        .ok_or_else(|| BerthError::dispatch(command, "dispatcher is no longer available"))
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BerthError::validation("Name is required"));
    }
    Ok(())
}

/// Builds `-p` flags from the registered list plus the allocated port.
///
/// Entries are keyed by numeric host port; a later entry for the same host
/// port replaces an earlier one. Flags come out in ascending host-port order.
fn port_flags(ports: &str, allocated: u16) -> Vec<String> {
    let allocated = format!("{allocated}:{allocated}");
    let mut by_host: BTreeMap<(usize, String), String> = BTreeMap::new();
    for pair in entries(ports).chain(std::iter::once(allocated.as_str())) {
        if let Some((host, _)) = pair.split_once(':') {
            let digits = host.trim_start_matches('0');
            let _ = by_host.insert((digits.len(), digits.to_string()), pair.to_string());
        }
    }
    by_host.into_values().map(|pair| format!("-p{pair}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_flags_sort_numerically_and_include_allocated() {
        assert_eq!(
            port_flags("80:80,8080:8000", 1234),
            vec!["-p80:80", "-p1234:1234", "-p8080:8000"]
        );
    }

    #[test]
    fn allocated_port_wins_host_port_collision() {
        assert_eq!(port_flags("1234:80", 1234), vec!["-p1234:1234"]);
    }

    #[test]
    fn later_registered_entry_wins() {
        assert_eq!(port_flags("80:80,080:81", 9), vec!["-p9:9", "-p080:81"]);
    }

    #[test]
    fn empty_registered_ports_yield_only_allocated() {
        assert_eq!(port_flags("", 5000), vec!["-p5000:5000"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = require_name("").unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn report_is_clean_without_failures() {
        let report = ReconcileReport {
            attempted: vec!["a".into()],
            failed: Vec::new(),
        };
        assert!(report.is_clean());
    }
}
