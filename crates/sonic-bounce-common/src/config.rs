//! Run configuration for intfbounce.
//!
//! Loaded from an optional TOML file; every field has a default so a missing
//! file or a partial file is fine.
//!
//! ```toml
//! [credentials]
//! username = "admin"
//!
//! [pacing]
//! command_delay_ms = 1000
//! link_settle_delay_ms = 10000
//!
//! [ssh]
//! port = 22
//! host_key_policy = "known-hosts"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{BounceError, BounceResult};

/// Environment variable consulted for the shared password.
pub const PASSWORD_ENV: &str = "INTFBOUNCE_PASSWORD";

/// Shared login used for every switch.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name.
    #[serde(default = "default_username")]
    pub username: String,

    /// Login password. Usually supplied through [`PASSWORD_ENV`]; never
    /// written back out.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Returns the password or an error naming the missing field.
    pub fn password(&self) -> BounceResult<&str> {
        self.password.as_deref().ok_or_else(|| {
            BounceError::invalid_config(
                "credentials.password",
                format!("no password configured (set {} or the config file)", PASSWORD_ENV),
            )
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: None,
        }
    }
}

/// Settling pauses between commands.
///
/// The driver does not read device output; these pauses are the only thing
/// giving the device time to act on each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after every command, in milliseconds.
    #[serde(default = "default_command_delay_ms")]
    pub command_delay_ms: u64,

    /// Extra pause after each re-enabled interface, in milliseconds.
    #[serde(default = "default_link_settle_delay_ms")]
    pub link_settle_delay_ms: u64,
}

impl PacingConfig {
    /// Converts to the driver's pacing.
    pub fn pacing(&self) -> Pacing {
        Pacing {
            command_delay: Duration::from_millis(self.command_delay_ms),
            link_settle_delay: Duration::from_millis(self.link_settle_delay_ms),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            command_delay_ms: default_command_delay_ms(),
            link_settle_delay_ms: default_link_settle_delay_ms(),
        }
    }
}

/// Pauses applied by the session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after every command line.
    pub command_delay: Duration,
    /// Extra pause after each interface when re-enabling.
    pub link_settle_delay: Duration,
}

impl Pacing {
    /// No pauses at all; used by dry runs and tests.
    pub fn immediate() -> Self {
        Self {
            command_delay: Duration::ZERO,
            link_settle_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        PacingConfig::default().pacing()
    }
}

/// How presented SSH host keys are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicyKind {
    /// Key must already be listed in a known_hosts file.
    KnownHosts,
    /// Any key is trusted. Must be chosen explicitly.
    AcceptAny,
}

/// Resolved host key policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Verify against the given known_hosts file.
    KnownHosts(PathBuf),
    /// Trust whatever key the switch presents.
    AcceptAny,
}

/// SSH transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// TCP port of the switch SSH service.
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Host key checking mode.
    #[serde(default = "default_host_key_policy")]
    pub host_key_policy: HostKeyPolicyKind,

    /// known_hosts file; defaults to `$HOME/.ssh/known_hosts`.
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    /// Upper bound on connection establishment. Unset means wait as long as
    /// the network stack does.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl SshConfig {
    /// Resolves the policy, filling in the default known_hosts location.
    pub fn resolved_host_key_policy(&self) -> BounceResult<HostKeyPolicy> {
        match self.host_key_policy {
            HostKeyPolicyKind::AcceptAny => Ok(HostKeyPolicy::AcceptAny),
            HostKeyPolicyKind::KnownHosts => {
                if let Some(path) = &self.known_hosts {
                    return Ok(HostKeyPolicy::KnownHosts(path.clone()));
                }
                let home = std::env::var_os("HOME").ok_or_else(|| {
                    BounceError::invalid_config(
                        "ssh.known_hosts",
                        "HOME is not set; configure the known_hosts path explicitly",
                    )
                })?;
                Ok(HostKeyPolicy::KnownHosts(
                    PathBuf::from(home).join(".ssh").join("known_hosts"),
                ))
            }
        }
    }

    /// Connect timeout, if configured.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: default_ssh_port(),
            host_key_policy: default_host_key_policy(),
            known_hosts: None,
            connect_timeout_secs: None,
        }
    }
}

/// Complete intfbounce configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BounceConfig {
    /// Shared login.
    #[serde(default)]
    pub credentials: Credentials,

    /// Settling pauses.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// SSH transport settings.
    #[serde(default)]
    pub ssh: SshConfig,
}

// Default functions
fn default_username() -> String {
    "admin".to_string()
}

fn default_command_delay_ms() -> u64 {
    1000
}

fn default_link_settle_delay_ms() -> u64 {
    10_000
}

fn default_ssh_port() -> u16 {
    22
}

fn default_host_key_policy() -> HostKeyPolicyKind {
    HostKeyPolicyKind::KnownHosts
}

impl BounceConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> BounceResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BounceError::invalid_config("config file", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> BounceResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(BounceError::io(path, e)),
        }
    }

    /// Fills the password from the environment when the file left it unset.
    pub fn with_password_from_env(mut self) -> Self {
        if self.credentials.password.is_none() {
            self.credentials.password = std::env::var(PASSWORD_ENV).ok();
        }
        self
    }

    /// Checks values that serde alone cannot reject.
    pub fn validate(&self) -> BounceResult<()> {
        if self.credentials.username.trim().is_empty() {
            return Err(BounceError::invalid_config(
                "credentials.username",
                "username is empty",
            ));
        }
        if self.ssh.port == 0 {
            return Err(BounceError::invalid_config("ssh.port", "port must be non-zero"));
        }
        if self.ssh.connect_timeout_secs == Some(0) {
            return Err(BounceError::invalid_config(
                "ssh.connect_timeout_secs",
                "timeout must be non-zero when set",
            ));
        }
        Ok(())
    }
}
