use crate::catalog::HostIdentity;
use crate::discovery::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_SCHEME, DiscoveryOptions};
use crate::dispatch::CommandInvoker;
use crate::permission::GrantedPermissions;
use crate::prober::{CommandProberConfig, DEFAULT_ROW_MARKER};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct HostSettings {
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default)]
    pub granted_permissions: Vec<String>,
}

fn default_entry_point() -> String {
    "MainActivity".to_string()
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            granted_permissions: Vec::new(),
        }
    }
}

impl HostSettings {
    pub fn identity(&self) -> HostIdentity {
        HostIdentity {
            entry_point: self.entry_point.clone(),
        }
    }

    pub fn permissions(&self) -> GrantedPermissions {
        GrantedPermissions::new(self.granted_permissions.iter().cloned())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CatalogSettings {
    /// JSON array of package manifests.
    pub manifest_index: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct DiscoverySettings {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub wordlist: Option<PathBuf>,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_progress_interval() -> u64 {
    DEFAULT_PROGRESS_INTERVAL
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("./.ipcscout")
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            progress_interval: default_progress_interval(),
            output_dir: default_output_dir(),
            wordlist: None,
        }
    }
}

impl DiscoverySettings {
    pub fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            scheme: self.scheme.clone(),
            progress_interval: self.progress_interval,
        }
    }

    /// Output file of the job for `authority`. Each authority gets its own
    /// file so jobs against different providers never share one.
    pub fn output_path_for(&self, authority: &str) -> PathBuf {
        let name: String = authority
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.output_dir.join(format!("found_paths_{name}.txt"))
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ProberSettings {
    #[serde(default = "default_query_command")]
    pub command: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_row_marker")]
    pub row_marker: String,
    pub working_dir: Option<PathBuf>,
    /// Quote the identifier for the remote shell `adb shell` hands it to.
    #[serde(default = "default_shell_quote")]
    pub shell_quote: bool,
}

fn default_query_command() -> Vec<String> {
    ["adb", "shell", "content", "query", "--uri", "{}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_row_marker() -> String {
    DEFAULT_ROW_MARKER.to_string()
}

fn default_shell_quote() -> bool {
    true
}

impl Default for ProberSettings {
    fn default() -> Self {
        Self {
            command: default_query_command(),
            timeout_ms: default_timeout_ms(),
            row_marker: default_row_marker(),
            working_dir: None,
            shell_quote: default_shell_quote(),
        }
    }
}

impl ProberSettings {
    pub fn command_config(&self) -> CommandProberConfig {
        CommandProberConfig {
            command: self.command.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            working_dir: self.working_dir.clone(),
            row_marker: self.row_marker.clone(),
            shell_quote: self.shell_quote,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct InvokerSettings {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Quote arguments after the prefix for the remote shell.
    #[serde(default = "default_shell_quote")]
    pub shell_quote: bool,
}

fn default_command_prefix() -> Vec<String> {
    vec!["adb".to_string(), "shell".to_string()]
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            timeout_ms: default_timeout_ms(),
            shell_quote: default_shell_quote(),
        }
    }
}

impl InvokerSettings {
    pub fn invoker(&self) -> CommandInvoker {
        CommandInvoker::new(
            self.command_prefix.clone(),
            Duration::from_millis(self.timeout_ms),
        )
        .shell_quoted(self.shell_quote)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ScoutConfig {
    #[serde(default)]
    pub host: HostSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub prober: ProberSettings,
    #[serde(default)]
    pub invoker: InvokerSettings,
}

impl ScoutConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: ScoutConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }
}
