//! Domain types used across the berth workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Row identifier assigned by the registry on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted desired configuration of one managed container.
///
/// `ports` and `volumes` are stored in canonical form: comma-joined pairs
/// that already passed the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Registry identifier.
    pub id: RecordId,
    /// Unique container name, also used as the runtime container name.
    pub name: String,
    /// Runtime image reference.
    pub image: String,
    /// External domain routed to this container through proxy and DNS.
    #[serde(default)]
    pub host: Option<String>,
    /// Canonical `hostPort:containerPort` list.
    #[serde(default)]
    pub ports: String,
    /// Canonical `hostPath:containerPath` list.
    #[serde(default)]
    pub volumes: String,
}

impl ContainerConfig {
    /// Returns the bound domain, treating an empty string as unbound.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.is_empty())
    }
}

/// Input to registry insertion. Fields are validated and sanitized on add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContainer {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Optional domain.
    #[serde(default)]
    pub host: Option<String>,
    /// Raw port list, sanitized on insert.
    #[serde(default)]
    pub ports: Option<String>,
    /// Raw volume list, sanitized on insert.
    #[serde(default)]
    pub volumes: Option<String>,
}

impl NewContainer {
    /// Creates an insertion request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Self::default()
        }
    }

    /// Sets the bound domain.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the raw port list.
    #[must_use]
    pub fn ports(mut self, ports: impl Into<String>) -> Self {
        self.ports = Some(ports.into());
        self
    }

    /// Sets the raw volume list.
    #[must_use]
    pub fn volumes(mut self, volumes: impl Into<String>) -> Self {
        self.volumes = Some(volumes.into());
        self
    }
}

/// Partial update of a registry record. Absent or empty fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPatch {
    /// Replacement image.
    #[serde(default)]
    pub image: Option<String>,
    /// Replacement domain.
    #[serde(default)]
    pub host: Option<String>,
    /// Replacement raw port list.
    #[serde(default)]
    pub ports: Option<String>,
    /// Replacement raw volume list.
    #[serde(default)]
    pub volumes: Option<String>,
}

/// Exact-match filter for registry listing. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Match on name.
    #[serde(default)]
    pub name: Option<String>,
    /// Match on image.
    #[serde(default)]
    pub image: Option<String>,
    /// Match on domain.
    #[serde(default)]
    pub host: Option<String>,
}

impl ListFilter {
    /// Returns whether `config` satisfies every set field.
    #[must_use]
    pub fn matches(&self, config: &ContainerConfig) -> bool {
        let field = |want: &Option<String>, have: Option<&str>| {
            want.as_deref()
                .filter(|w| !w.is_empty())
                .is_none_or(|w| have == Some(w))
        };
        field(&self.name, Some(&config.name))
            && field(&self.image, Some(&config.image))
            && field(&self.host, config.host.as_deref())
    }
}

/// An externally managed environment variable, as returned by `env.show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvPair {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
}

impl EnvPair {
    /// Creates a pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Live view of a running container, derived from the runtime on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningContainer {
    /// Runtime container name.
    pub name: String,
    /// Published ports, `hostPort -> containerPort`.
    pub ports: BTreeMap<u16, u16>,
}
