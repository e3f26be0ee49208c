//! Configuration loading and root folder resolution
//!
//! Missing or unreadable configuration never stops a module from starting:
//! every lookup falls through to the next source and finally to compiled
//! defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that names the root folder
pub const ROOT_FOLDER_ENV: &str = "RELEASIO_ROOT_FOLDER";

/// Shorter alias, consulted after [`ROOT_FOLDER_ENV`]
pub const ROOT_ENV: &str = "RELEASIO_ROOT";

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "releasio.db";

/// Logging section of the TOML config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path (stdout when absent)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Per-module TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP bind address, e.g. `127.0.0.1:5740`
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Capacity of the cross-context event bus
    #[serde(default)]
    pub event_capacity: Option<usize>,
}

impl TomlConfig {
    /// Parse a config file; errors are returned so callers can decide to warn
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub bind_address: String,
    pub event_capacity: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/releasio (or /var/lib/releasio without a home)
            dirs::data_local_dir()
                .map(|d| d.join("releasio"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/releasio"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("releasio"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/releasio"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("releasio"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\releasio"))
        } else {
            PathBuf::from("./releasio_data")
        };

        Self {
            root_folder,
            log_level: default_log_level(),
            log_file: None,
            bind_address: "127.0.0.1:5740".to_string(),
            event_capacity: 1000,
        }
    }
}

/// Root folder resolution in priority order:
/// 1. Command-line argument
/// 2. `RELEASIO_ROOT_FOLDER`, then `RELEASIO_ROOT`
/// 3. `root_folder` in the module's TOML config file
/// 4. OS-dependent compiled default
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
        }
    }

    /// Highest-priority override from the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(config) = self.load_toml() {
            if let Some(root) = config.root_folder {
                return root;
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Load the module's TOML config if one exists and parses
    pub fn load_toml(&self) -> Option<TomlConfig> {
        let path = self.config_file_path()?;
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return None;
        }
        match TomlConfig::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                None
            }
        }
    }

    /// Platform config path for this module
    pub fn config_file_path(&self) -> Option<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let user_config = dirs::config_dir().map(|d| d.join("releasio").join(&file_name));

        if cfg!(target_os = "linux") {
            if let Some(path) = &user_config {
                if path.exists() {
                    return user_config;
                }
            }
            let system_config = PathBuf::from("/etc/releasio").join(&file_name);
            if system_config.exists() {
                return Some(system_config);
            }
        }

        user_config
    }
}

/// Creates the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
