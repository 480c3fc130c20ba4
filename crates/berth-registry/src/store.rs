//! Registry of container configurations backed by a JSON table file.
//!
//! The whole table is read on every call and rewritten on every mutation.
//! Mutations inside one process are serialized by a mutex; across
//! processes the last writer wins.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use berth_common::error::{BerthError, Result};
use berth_common::types::{ContainerConfig, ContainerPatch, ListFilter, NewContainer, RecordId};
use serde::{Deserialize, Serialize};

use crate::sanitize::{sanitize_ports, sanitize_volumes};

/// On-disk layout of the container table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Table {
    /// Identifier handed to the next inserted row.
    next_id: u64,
    /// All rows, in insertion order.
    containers: Vec<ContainerConfig>,
}

/// CRUD access to persisted container configurations.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Registry {
    /// Opens or creates a registry at the given table file.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BerthError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Returns the table file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] if the name or image is empty,
    /// [`BerthError::Conflict`] if the name is taken, or an I/O error.
    pub fn add(&self, request: NewContainer) -> Result<ContainerConfig> {
        if request.name.trim().is_empty() {
            return Err(BerthError::validation("Name required"));
        }
        if request.image.trim().is_empty() {
            return Err(BerthError::validation("Image required"));
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.read_table()?;
        if table.containers.iter().any(|c| c.name == request.name) {
            return Err(BerthError::Conflict {
                kind: "container",
                id: request.name,
            });
        }

        table.next_id = table.next_id.max(1);
        let record = ContainerConfig {
            id: RecordId::new(table.next_id),
            name: request.name,
            image: request.image,
            host: request.host.filter(|h| !h.is_empty()),
            ports: request.ports.as_deref().map(sanitize_ports).unwrap_or_default(),
            volumes: request
                .volumes
                .as_deref()
                .map(sanitize_volumes)
                .unwrap_or_default(),
        };
        table.next_id += 1;
        table.containers.push(record.clone());
        self.write_table(&table)?;

        tracing::info!(
            id = %record.id,
            name = %record.name,
            image = %record.image,
            "container registered"
        );
        Ok(record)
    }

    /// Applies a partial update to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::NotFound`] if no record has this name.
    pub fn update(&self, name: &str, patch: ContainerPatch) -> Result<ContainerConfig> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.read_table()?;
        let record = table
            .containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| BerthError::container_not_found(name))?;

        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        if let Some(ports) = present(patch.ports) {
            record.ports = sanitize_ports(&ports);
        }
        if let Some(volumes) = present(patch.volumes) {
            record.volumes = sanitize_volumes(&volumes);
        }
        if let Some(image) = present(patch.image) {
            record.image = image;
        }
        if let Some(host) = present(patch.host) {
            record.host = Some(host);
        }

        let updated = record.clone();
        self.write_table(&table)?;
        tracing::info!(name = %updated.name, "container updated");
        Ok(updated)
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::NotFound`] if no record has this name.
    pub fn remove(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.read_table()?;
        let before = table.containers.len();
        table.containers.retain(|c| c.name != name);
        if table.containers.len() == before {
            return Err(BerthError::container_not_found(name));
        }
        self.write_table(&table)?;
        tracing::info!(name, "container removed");
        Ok(())
    }

    /// Looks up a record by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read.
    pub fn get(&self, name: &str) -> Result<Option<ContainerConfig>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .read_table()?
            .containers
            .into_iter()
            .find(|c| c.name == name))
    }

    /// Looks up a record by name, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::NotFound`] if no record has this name.
    pub fn find(&self, name: &str) -> Result<ContainerConfig> {
        self.get(name)?
            .ok_or_else(|| BerthError::container_not_found(name))
    }

    /// Lists records matching `filter`, sorted ascending by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<ContainerConfig>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<_> = self
            .read_table()?
            .containers
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn read_table(&self) -> Result<Table> {
        if !self.path.exists() {
            return Ok(Table::default());
        }
        tracing::debug!(path = %self.path.display(), "loading registry table");
        let content = std::fs::read_to_string(&self.path).map_err(|e| BerthError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_table(&self, table: &Table) -> Result<()> {
        tracing::debug!(
            path = %self.path.display(),
            rows = table.containers.len(),
            "saving registry table"
        );
        let json = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| BerthError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| BerthError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}
