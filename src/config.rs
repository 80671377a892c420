use crate::error::{ReleaseError, Result};
use crate::persistence::DEFAULT_COMMIT_MESSAGE;
use crate::registry::npm::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name searched for in the current directory
pub const CONFIG_FILE_NAME: &str = "wrapper-release.toml";

/// Represents the complete configuration for wrapper-release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub commit: CommitConfig,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_compiler_command() -> String {
    "java".to_string()
}

fn default_compiler_args() -> Vec<String> {
    vec![
        "-jar".to_string(),
        "compiler.jar".to_string(),
        "--version".to_string(),
    ]
}

fn default_registry_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

/// How to run the wrapped compiler in version-report mode.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CompilerConfig {
    #[serde(default = "default_compiler_command")]
    pub command: String,

    #[serde(default = "default_compiler_args")]
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            command: default_compiler_command(),
            args: default_compiler_args(),
        }
    }
}

/// Package registry settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Package to look up; defaults to the manifest's `name`
    #[serde(default)]
    pub package: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            url: default_registry_url(),
            package: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Commit settings. `{version}` in the message is replaced by the new version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitConfig {
    #[serde(default = "default_commit_message")]
    pub message: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        CommitConfig {
            message: default_commit_message(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifest: default_manifest(),
            compiler: CompilerConfig::default(),
            registry: RegistryConfig::default(),
            commit: CommitConfig::default(),
        }
    }
}

impl Config {
    fn validate(self) -> Result<Self> {
        if self.compiler.command.trim().is_empty() {
            return Err(ReleaseError::config("compiler.command must not be empty"));
        }
        if self.registry.timeout_secs == 0 {
            return Err(ReleaseError::config(
                "registry.timeout_secs must be greater than zero",
            ));
        }
        if !self.commit.message.contains("{version}") {
            return Err(ReleaseError::config(
                "commit.message must contain the {version} placeholder",
            ));
        }
        Ok(self)
    }
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(text).map_err(|e| ReleaseError::config(e.to_string()))?;
    config.validate()
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `wrapper-release.toml` in current directory
/// 3. `wrapper-release/config.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join("wrapper-release").join("config.toml");
        if user_path.exists() {
            user_path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let text = fs::read_to_string(&path)
        .map_err(|e| ReleaseError::config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_config(&text)
}
