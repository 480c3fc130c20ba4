//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default base directory for berth data when running as root.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/berth";

/// Returns the data directory, preferring `$HOME/.berth` and falling back
/// to `/var/lib/berth`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(".berth");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default configuration file path.
pub fn default_config_file() -> PathBuf {
    data_dir().join("config.json")
}

/// File name of the persisted container table inside the data directory.
pub const REGISTRY_FILE_NAME: &str = "registry.json";

/// Default container runtime executable.
pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

/// Grace period, in seconds, given to a container before forced removal.
pub const DEFAULT_STOP_GRACE_SECS: u32 = 5;

/// Upper bound accepted for the stop grace period.
pub const MAX_STOP_GRACE_SECS: u32 = 3600;

/// Separator placed between stdout and stderr in fetched logs.
pub const LOG_SEPARATOR: &str = "\n---\n";

/// Environment variable carrying the allocated port into the container.
pub const PORT_VAR: &str = "PORT";

