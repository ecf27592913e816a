//! Connection profiles loaded from TOML.
//!
//! Bring-up tools point this crate at the same device run after run; a
//! profile keeps the port name, baud rate, and timeout out of their code.
//!
//! Resolution priority (highest to lowest):
//! 1. `LINEPORT_CONFIG` environment variable (explicit path)
//! 2. `./lineport.toml` (current directory)
//! 3. The per-user config directory (`~/.config/lineport/` on Linux)
//! 4. Built-in defaults (no file required)
//!
//! `LINEPORT_PORT` and `LINEPORT_BAUD` override any file value.

use crate::port::{PortSettings, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Config file name.
const CONFIG_FILE_NAME: &str = "lineport.toml";

/// Environment variable for an explicit config path.
const CONFIG_PATH_ENV: &str = "LINEPORT_CONFIG";

/// Environment variable overriding the port name.
const PORT_ENV: &str = "LINEPORT_PORT";

/// Environment variable overriding the baud rate.
const BAUD_ENV: &str = "LINEPORT_BAUD";

/// Errors from loading or interpreting a profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile file exists but could not be read.
    #[error("cannot read profile {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The profile file is not valid TOML for a profile.
    #[error("cannot parse profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An environment override holds a value of the wrong shape.
    #[error("invalid value {value:?} for {variable}: {reason}")]
    InvalidOverride {
        variable: &'static str,
        value: String,
        reason: String,
    },
}

/// Convenient `Result` alias for profile loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

/// A stored connection profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Port to connect to. `None` means the tool picks interactively, e.g.
    /// from [`list_ports`](crate::catalog::list_ports).
    #[serde(default)]
    pub port: Option<String>,

    /// Baud rate, 9600 unless the file says otherwise.
    #[serde(default = "default_baud")]
    pub baud_rate: u32,

    /// Read deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Profile {
    /// Load a profile using the standard resolution order, then apply
    /// environment overrides.
    pub fn load() -> ConfigResult<Self> {
        let mut profile = match resolve_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "loading profile");
                load_from_file(&path)?
            }
            None => Self::default(),
        };
        apply_env_overrides(&mut profile)?;
        Ok(profile)
    }

    /// Load a profile from a specific file, then apply environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let mut profile = load_from_file(path.as_ref())?;
        apply_env_overrides(&mut profile)?;
        Ok(profile)
    }

    /// The port settings this profile describes.
    pub fn settings(&self) -> PortSettings {
        PortSettings {
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn load_from_file(path: &Path) -> ConfigResult<Profile> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find the profile file, if any, in resolution order.
fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(explicit));
    }

    let cwd_candidate = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_candidate.is_file() {
        return Some(cwd_candidate);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "lineport") {
        let candidate = dirs.config_dir().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

fn apply_env_overrides(profile: &mut Profile) -> ConfigResult<()> {
    apply_overrides(
        profile,
        std::env::var(PORT_ENV).ok(),
        std::env::var(BAUD_ENV).ok(),
    )
}

fn apply_overrides(
    profile: &mut Profile,
    port: Option<String>,
    baud: Option<String>,
) -> ConfigResult<()> {
    if let Some(port) = port {
        profile.port = Some(port);
    }

    if let Some(baud) = baud {
        profile.baud_rate = baud
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidOverride {
                variable: BAUD_ENV,
                value: baud.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.port, None);
        assert_eq!(profile.baud_rate, 9600);
        assert_eq!(profile.timeout_ms, 1000);
    }

    #[test]
    fn test_profile_settings_conversion() {
        let profile = Profile {
            port: Some("/dev/ttyACM0".into()),
            baud_rate: 115_200,
            timeout_ms: 250,
        };
        let settings = profile.settings();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"/dev/ttyUSB0\"").unwrap();
        writeln!(file, "baud_rate = 57600").unwrap();
        writeln!(file, "timeout_ms = 2500").unwrap();

        let profile = Profile::load_from(file.path()).unwrap();
        assert_eq!(profile.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(profile.baud_rate, 57_600);
        assert_eq!(profile.timeout_ms, 2500);
    }

    #[test]
    fn test_load_from_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"COM3\"").unwrap();

        let profile = Profile::load_from(file.path()).unwrap();
        assert_eq!(profile.port.as_deref(), Some("COM3"));
        assert_eq!(profile.baud_rate, 9600);
        assert_eq!(profile.timeout_ms, 1000);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Profile::load_from(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud_rate = \"not a number\"").unwrap();

        let result = Profile::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut profile = Profile {
            port: Some("COM3".into()),
            baud_rate: 9600,
            timeout_ms: 1000,
        };
        apply_overrides(
            &mut profile,
            Some("/dev/ttyACM0".into()),
            Some("115200".into()),
        )
        .unwrap();

        assert_eq!(profile.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(profile.baud_rate, 115_200);
        assert_eq!(profile.timeout_ms, 1000);
    }

    #[test]
    fn test_non_numeric_baud_override_is_rejected() {
        let mut profile = Profile::default();
        let result = apply_overrides(&mut profile, None, Some("fast".into()));
        assert!(matches!(result, Err(ConfigError::InvalidOverride { .. })));
    }

    #[test]
    fn test_toml_roundtrip() {
        let profile = Profile {
            port: Some("COM11".into()),
            baud_rate: 9600,
            timeout_ms: 1000,
        };
        let text = toml::to_string(&profile).unwrap();
        let back: Profile = toml::from_str(&text).unwrap();
        assert_eq!(back, profile);
    }
}
