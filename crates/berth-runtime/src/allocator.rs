//! Port and environment allocation for container launches.
//!
//! One free host port is requested per launch and exported to the
//! container as `PORT`. Values go into the child environment map; only the
//! key names are handed back for the command line.

use async_trait::async_trait;
use berth_common::constants::PORT_VAR;
use berth_common::error::{BerthError, Result};
use berth_common::types::EnvPair;

use crate::exec::EnvMap;

/// Source of currently free host ports.
///
/// No reservation is kept: two callers may be handed the same port before
/// either binds it.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Returns a port that is free at the time of the call.
    ///
    /// # Errors
    ///
    /// Returns an error if no port could be obtained.
    async fn free_port(&self) -> Result<u16>;
}

/// Asks the kernel for an ephemeral port on the loopback interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPortProbe;

#[async_trait]
impl PortProbe for LocalPortProbe {
    async fn free_port(&self) -> Result<u16> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| BerthError::Io {
                path: "127.0.0.1:0".into(),
                source: e,
            })?;
        let addr = listener.local_addr().map_err(|e| BerthError::Io {
            path: "127.0.0.1:0".into(),
            source: e,
        })?;
        Ok(addr.port())
    }
}

/// Result of one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Port assigned to the container, mapped to itself.
    pub port: u16,
    /// Ambient environment merged with every supplied variable.
    pub env: EnvMap,
    /// Distinct variable names in first-seen order.
    pub env_keys: Vec<String>,
}

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[must_use]
pub fn ambient_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Allocates a port and merges it with `vars` over `ambient`.
///
/// Later pairs overwrite earlier values in the map; the key list keeps the
/// first occurrence of each name.
///
/// # Errors
///
/// Returns an error if the probe cannot supply a port.
pub async fn allocate(
    probe: &dyn PortProbe,
    vars: Vec<EnvPair>,
    ambient: &EnvMap,
) -> Result<Allocation> {
    let port = probe.free_port().await?;

    let mut env = ambient.clone();
    let mut env_keys: Vec<String> = Vec::new();
    let port_pair = EnvPair::new(PORT_VAR, port.to_string());
    for EnvPair { key, value } in vars.into_iter().chain(std::iter::once(port_pair)) {
        if !env_keys.contains(&key) {
            env_keys.push(key.clone());
        }
        let _ = env.insert(key, value);
    }

    tracing::debug!(port, keys = ?env_keys, "allocated port and environment");
    Ok(Allocation { port, env, env_keys })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(u16);

    #[async_trait]
    impl PortProbe for FixedProbe {
        async fn free_port(&self) -> Result<u16> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn port_is_appended_after_external_vars() {
        let vars = vec![EnvPair::new("FOO", "one"), EnvPair::new("BAR", "two")];
        let alloc = allocate(&FixedProbe(1234), vars, &EnvMap::new()).await.expect("allocate");

        assert_eq!(alloc.port, 1234);
        assert_eq!(alloc.env_keys, vec!["FOO", "BAR", "PORT"]);
        assert_eq!(alloc.env.get("PORT").map(String::as_str), Some("1234"));
        assert_eq!(alloc.env.get("FOO").map(String::as_str), Some("one"));
    }

    #[tokio::test]
    async fn duplicate_keys_keep_first_position_and_last_value() {
        let vars = vec![
            EnvPair::new("A", "1"),
            EnvPair::new("B", "2"),
            EnvPair::new("A", "3"),
        ];
        let alloc = allocate(&FixedProbe(9000), vars, &EnvMap::new()).await.expect("allocate");

        assert_eq!(alloc.env_keys, vec!["A", "B", "PORT"]);
        assert_eq!(alloc.env.get("A").map(String::as_str), Some("3"));
    }

    #[tokio::test]
    async fn supplied_vars_override_ambient_without_touching_it() {
        let mut ambient = EnvMap::new();
        let _ = ambient.insert("PATH".into(), "/bin".into());
        let _ = ambient.insert("FOO".into(), "ambient".into());

        let alloc = allocate(&FixedProbe(1), vec![EnvPair::new("FOO", "external")], &ambient)
            .await
            .expect("allocate");

        assert_eq!(alloc.env.get("FOO").map(String::as_str), Some("external"));
        assert_eq!(alloc.env.get("PATH").map(String::as_str), Some("/bin"));
        assert_eq!(ambient.get("FOO").map(String::as_str), Some("ambient"));
        assert!(!alloc.env_keys.contains(&"PATH".to_string()));
    }

    #[tokio::test]
    async fn local_probe_returns_nonzero_port() {
        let port = LocalPortProbe.free_port().await.expect("probe");
        assert_ne!(port, 0);
    }
}
