//! Late-bound command dispatch.
//!
//! The engine reaches the proxy, DNS and environment subsystems (and its
//! own operations, for bulk reconciliation) only through
//! [`Dispatcher::run`], keyed by command name. Arguments and results are
//! JSON values.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use berth_common::error::{BerthError, Result};
use berth_common::types::EnvPair;
use serde::Deserialize;
use serde_json::Value;

/// Command names understood by the external subsystems and the engine.
pub mod commands {
    /// Externally managed environment variables for a service: `{name}`.
    pub const ENV_SHOW: &str = "env.show";
    /// Create a proxy route: `{domain, target, cors?, redirect?}`.
    pub const PX_ADD: &str = "px.add";
    /// Create or replace a proxy route: `{domain, target, cors?, redirect?}`.
    pub const PX_UPDATE: &str = "px.update";
    /// Delete a proxy route: `{domain}`.
    pub const PX_REMOVE: &str = "px.remove";
    /// Register a DNS record: `{domain}`.
    pub const DNS_ADD: &str = "dns.add";
    /// Delete a DNS record: `{domain}`.
    pub const DNS_REMOVE: &str = "dns.remove";
    /// Reload the DNS server: `{}`.
    pub const DNS_RELOAD: &str = "dns.reload";
    /// Pull an image: `{image}`.
    pub const DX_PULL: &str = "dx.pull";
    /// Stop a container: `{name}`.
    pub const DX_STOP: &str = "dx.stop";
    /// Prune unused images: `{}`.
    pub const DX_PRUNE: &str = "dx.prune";
    /// Start a container: `{name}`.
    pub const DX_START: &str = "dx.start";
}

/// The single capability through which cross-subsystem calls are made.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Runs `command` with `args`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the handler produced, unmodified.
    async fn run(&self, command: &str, args: Value) -> Result<Value>;
}

/// Boxed future returned by table handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A registered command handler.
pub type Handler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// String-keyed function table implementing [`Dispatcher`].
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<String, Handler>,
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.commands())
            .finish()
    }
}

impl CommandTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `command`, replacing any previous one.
    pub fn register<F, Fut>(&mut self, command: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| Box::pin(handler(args)));
        let _ = self.handlers.insert(command.into(), handler);
    }

    /// Returns whether a handler is registered for `command`.
    #[must_use]
    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Dispatcher for CommandTable {
    async fn run(&self, command: &str, args: Value) -> Result<Value> {
        let handler = self
            .handlers
            .get(command)
            .cloned()
            .ok_or_else(|| {
                BerthError::dispatch(command, format!("no handler registered for {command}"))
            })?;
        tracing::debug!(command, "dispatching");
        handler(args).await
    }
}

/// One `env.show` entry before its value is rendered to a string.
#[derive(Deserialize)]
struct RawPair {
    key: String,
    value: Value,
}

/// Reads an `env.show` result. `null` means no variables.
///
/// Numeric and boolean values are rendered to their JSON text.
///
/// # Errors
///
/// Returns [`BerthError::Dispatch`] if the value is not a list of pairs or
/// a value is not a string, number or boolean.
pub fn env_pairs(value: Value) -> Result<Vec<EnvPair>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawPair> = serde_json::from_value(value)
        .map_err(|e| BerthError::dispatch(commands::ENV_SHOW, e.to_string()))?;
    raw.into_iter()
        .map(|RawPair { key, value }| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(_) | Value::Bool(_) => value.to_string(),
                other => {
                    return Err(BerthError::dispatch(
                        commands::ENV_SHOW,
                        format!("unsupported value for {key}: {other}"),
                    ));
                }
            };
            Ok(EnvPair { key, value })
        })
        .collect()
}

/// Reads a string argument, treating absence as empty.
#[must_use]
pub fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}
