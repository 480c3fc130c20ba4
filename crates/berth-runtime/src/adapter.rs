//! Adapter over the container runtime's command line.
//!
//! Builds argument vectors, runs them through a [`CommandRunner`] and
//! parses the textual output into structured results.

use std::collections::BTreeMap;
use std::sync::Arc;

use berth_common::config::BerthConfig;
use berth_common::constants::{DEFAULT_RUNTIME_BINARY, DEFAULT_STOP_GRACE_SECS, LOG_SEPARATOR};
use berth_common::error::{BerthError, Result};
use berth_common::types::RunningContainer;

use crate::exec::{CommandRunner, EnvMap, ExecOutput};

/// Go template that prints every published port as `port/proto:hostPort`.
const PORTS_TEMPLATE: &str =
    "{{range $p, $conf := .NetworkSettings.Ports}}{{$p}}:{{(index $conf 0).HostPort}} {{end}}";

/// Repository shown for images without a tag.
const UNTAGGED: &str = "<none>";

/// Marker the runtime prints when asked about a container it does not know.
const ABSENT_MARKER: &str = "No such container";

/// Everything needed to launch one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Runtime container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// `-p` flags, already formatted.
    pub port_flags: Vec<String>,
    /// `-v` flags, already formatted.
    pub volume_flags: Vec<String>,
    /// Variable names passed through with `-e`.
    pub env_keys: Vec<String>,
    /// Additional runtime flags placed before the image.
    pub extra_flags: Vec<String>,
    /// Full environment of the runtime client process.
    pub env: EnvMap,
}

/// Thin typed layer over the runtime binary.
#[derive(Clone)]
pub struct RuntimeAdapter {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    dns: Option<String>,
    stop_grace_secs: u32,
}

impl std::fmt::Debug for RuntimeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeAdapter")
            .field("binary", &self.binary)
            .field("dns", &self.dns)
            .field("stop_grace_secs", &self.stop_grace_secs)
            .finish_non_exhaustive()
    }
}

impl RuntimeAdapter {
    /// Creates an adapter for the default runtime binary.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            binary: DEFAULT_RUNTIME_BINARY.to_string(),
            dns: None,
            stop_grace_secs: DEFAULT_STOP_GRACE_SECS,
        }
    }

    /// Creates an adapter configured from `config`.
    #[must_use]
    pub fn from_config(runner: Arc<dyn CommandRunner>, config: &BerthConfig) -> Self {
        Self {
            runner,
            binary: config.runtime_binary.clone(),
            dns: config.dns.clone().filter(|d| !d.is_empty()),
            stop_grace_secs: config.stop_grace_secs,
        }
    }

    /// Sets the DNS server passed to launched containers.
    #[must_use]
    pub fn with_dns(mut self, dns: impl Into<String>) -> Self {
        self.dns = Some(dns.into());
        self
    }

    /// Returns the runtime binary name.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Returns whether the runtime binary can be found on `PATH`.
    #[must_use]
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Lists the names of running containers, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the listing command fails.
    pub async fn list_running(&self) -> Result<Vec<String>> {
        let out = self.invoke(["ps", "--format", "{{.Names}}"]).await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: format!("Failed to list containers: {}", out.stderr.trim()),
                diagnostics: out.diagnostics(),
            });
        }
        let mut names: Vec<String> = out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Returns whether a container with this name is running.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the listing command fails.
    pub async fn is_running(&self, name: &str) -> Result<bool> {
        Ok(self.list_running().await?.iter().any(|n| n == name))
    }

    /// Lists repositories of locally stored images. Untagged (`<none>`)
    /// entries are left out.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the listing command fails.
    pub async fn list_images(&self) -> Result<Vec<String>> {
        let out = self
            .invoke(["image", "ls", "--format", "{{.Repository}}"])
            .await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: format!("Failed to list images: {}", out.stderr.trim()),
                diagnostics: out.diagnostics(),
            });
        }
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != UNTAGGED)
            .map(String::from)
            .collect())
    }

    /// Fetches container logs as stdout, separator, stderr.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] if `name` is empty.
    pub async fn fetch_logs(&self, name: &str, lines: Option<u32>) -> Result<String> {
        if name.is_empty() {
            return Err(BerthError::validation("Name not specified"));
        }
        let mut args = vec!["logs".to_string(), name.to_string()];
        if let Some(lines) = lines {
            args.push("-n".into());
            args.push(lines.to_string());
        }
        let out = self.runner.run(&self.binary, &args, None).await?;
        Ok([out.stdout, out.stderr].join(LOG_SEPARATOR))
    }

    /// Reads the published ports of a container as `hostPort -> containerPort`.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the inspect command fails.
    pub async fn inspect_ports(&self, name: &str) -> Result<BTreeMap<u16, u16>> {
        let out = self.invoke(["inspect", "--format", PORTS_TEMPLATE, name]).await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: format!("failed to inspect {name}"),
                diagnostics: out.diagnostics(),
            });
        }
        Ok(parse_port_map(&out.stdout))
    }

    /// Lists running containers together with their published ports.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if listing or any inspection fails.
    pub async fn running_views(&self) -> Result<Vec<RunningContainer>> {
        let mut views = Vec::new();
        for name in self.list_running().await? {
            let ports = self.inspect_ports(&name).await?;
            views.push(RunningContainer { name, ports });
        }
        Ok(views)
    }

    /// Starts a detached container that the runtime restarts automatically.
    ///
    /// Only variable names reach the command line; values travel in the
    /// client's environment.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the runtime reports failure.
    pub async fn launch(&self, spec: &LaunchSpec) -> Result<()> {
        let args = self.launch_args(spec);
        let out = self.runner.run(&self.binary, &args, Some(&spec.env)).await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: format!("failed to start {}", spec.name),
                diagnostics: out.diagnostics(),
            });
        }
        tracing::info!(name = %spec.name, image = %spec.image, "container launched");
        Ok(())
    }

    /// Stops a container with a grace period, then removes it.
    ///
    /// A container the runtime does not know counts as already terminated.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if stop or removal fails for any
    /// other reason.
    pub async fn terminate(&self, name: &str) -> Result<()> {
        let grace = self.stop_grace_secs.to_string();
        let stop = self.invoke(["stop", "-t", grace.as_str(), name]).await?;
        check_terminate_step(name, "stop", &stop)?;

        let rm = self.invoke(["rm", name]).await?;
        check_terminate_step(name, "remove", &rm)?;

        tracing::info!(name, "container terminated");
        Ok(())
    }

    /// Pulls the latest version of an image.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Validation`] if `image` is empty, or
    /// [`BerthError::Runtime`] if the pull fails.
    pub async fn pull(&self, image: &str) -> Result<()> {
        if image.is_empty() {
            return Err(BerthError::validation("Image is required"));
        }
        let out = self.invoke(["pull", image]).await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: format!("failed to pull {image}"),
                diagnostics: out.diagnostics(),
            });
        }
        tracing::info!(image, "image pulled");
        Ok(())
    }

    /// Removes dangling images.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Runtime`] if the prune fails.
    pub async fn prune(&self) -> Result<()> {
        let out = self.invoke(["image", "prune", "-f"]).await?;
        if !out.success() {
            return Err(BerthError::Runtime {
                message: "failed to prune images".into(),
                diagnostics: out.diagnostics(),
            });
        }
        Ok(())
    }

    fn launch_args(&self, spec: &LaunchSpec) -> Vec<String> {
        let mut args: Vec<String> = ["run", "--detach", "--restart", "always", "--name"]
            .into_iter()
            .map(String::from)
            .collect();
        args.push(spec.name.clone());
        if let Some(dns) = &self.dns {
            args.push(format!("--dns={dns}"));
        }
        args.extend(spec.volume_flags.iter().cloned());
        args.extend(spec.port_flags.iter().cloned());
        args.extend(spec.env_keys.iter().map(|key| format!("-e{key}")));
        args.extend(spec.extra_flags.iter().cloned());
        args.push(spec.image.clone());
        args.retain(|a| !a.is_empty());
        args
    }

    async fn invoke<const N: usize>(&self, args: [&str; N]) -> Result<ExecOutput> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.runner.run(&self.binary, &args, None).await
    }
}

fn check_terminate_step(name: &str, step: &str, out: &ExecOutput) -> Result<()> {
    if out.success() {
        return Ok(());
    }
    let diagnostics = out.diagnostics();
    if diagnostics.contains(ABSENT_MARKER) {
        tracing::debug!(name, step, "container already absent");
        return Ok(());
    }
    Err(BerthError::Runtime {
        message: format!("failed to {step} {name}"),
        diagnostics,
    })
}

/// Parses `hostPort/proto:containerPort` tokens. Unparseable tokens are skipped.
fn parse_port_map(text: &str) -> BTreeMap<u16, u16> {
    text.split_whitespace()
        .filter_map(|token| {
            let (left, right) = token.split_once(':')?;
            let host = left.split('/').next()?.parse().ok()?;
            let container = right.parse().ok()?;
            Some((host, container))
        })
        .collect()
}
