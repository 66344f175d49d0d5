//! TOML-based configuration persistence for MultiMon.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MultiMon\config.toml`
//! - Linux:    `~/.config/multimon/config.toml`
//! - macOS:    `~/Library/Application Support/MultiMon/config.toml`
//!
//! # File layout
//!
//! Displays are listed in physical order, left to right:
//!
//! ```toml
//! [general]
//! tool = "xrandr"
//! log_level = "info"
//!
//! [[displays]]
//! port = "DP-0"
//! resolution = "1920x1080"
//! rate = "60"
//! role = "main"
//!
//! [[displays]]
//! port = "HDMI-0"
//! resolution = "1280x720"
//! rate = "50"
//! role = "tv"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the app to work correctly on first run (before a config file exists).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use multimon_core::{DisplayRecord, DisplayRegistry, RegistryError, Role, DEFAULT_TOOL};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The display setup is not usable.
    #[error("invalid display setup: {0}")]
    Invalid(String),

    /// The displays could not be turned into a registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Physical displays, ordered left to right.
    #[serde(default)]
    pub displays: Vec<DisplayEntry>,
}

/// Engine-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Invocation name (or path) of the display configuration tool.
    #[serde(default = "default_tool")]
    pub tool: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// One physical display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Output name, e.g. `"DP-0"`.
    pub port: String,
    /// Mode in `WxH` form.
    pub resolution: String,
    /// Refresh rate as xrandr expects it.
    pub rate: String,
    /// Role of the display; `empty` when not yet chosen.
    #[serde(default = "default_role")]
    pub role: Role,
}

/// Arrangements only make sense with a second screen to switch to.
const MIN_DISPLAYS: usize = 2;

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_role() -> Role {
    Role::Empty
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            log_level: default_log_level(),
        }
    }
}

// ── Display entries ───────────────────────────────────────────────────────────

impl From<&DisplayEntry> for DisplayRecord {
    fn from(entry: &DisplayEntry) -> Self {
        DisplayRecord::new(
            entry.port.as_str(),
            entry.resolution.as_str(),
            entry.rate.as_str(),
            entry.role,
        )
    }
}

impl FromStr for DisplayEntry {
    type Err = ConfigError;

    /// Parses `PORT:RESOLUTION:RATE:ROLE`, e.g. `DP-0:1920x1080:60:main`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [port, resolution, rate, role] = parts.as_slice() else {
            return Err(ConfigError::Invalid(format!(
                "display {s:?} must be PORT:RESOLUTION:RATE:ROLE"
            )));
        };
        let role = role
            .parse::<Role>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(DisplayEntry {
            port: port.to_string(),
            resolution: resolution.to_string(),
            rate: rate.to_string(),
            role,
        })
    }
}

impl AppConfig {
    /// Checks the display setup before it is used or saved.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when fewer than two displays are
    /// configured, not exactly one `main` display, a display without a role,
    /// or a port used twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.displays.len() < MIN_DISPLAYS {
            return Err(ConfigError::Invalid(format!(
                "at least {MIN_DISPLAYS} displays are needed, {} configured",
                self.displays.len()
            )));
        }

        match self.displays.iter().filter(|d| d.role == Role::Main).count() {
            0 => {
                return Err(ConfigError::Invalid(
                    "you need to select at least one main display".to_string(),
                ))
            }
            1 => {}
            _ => return Err(ConfigError::Invalid("only one main display is allowed".to_string())),
        }

        if let Some(unassigned) = self.displays.iter().find(|d| !d.role.is_assigned()) {
            return Err(ConfigError::Invalid(format!(
                "display {} has no role",
                unassigned.port
            )));
        }

        for (i, display) in self.displays.iter().enumerate() {
            if self.displays[..i].iter().any(|d| d.port == display.port) {
                return Err(ConfigError::Invalid(format!(
                    "port {} is selected for more than one display",
                    display.port
                )));
            }
        }

        Ok(())
    }

    /// Renames repeated `secondary` / `tv` roles to their numbered variants.
    ///
    /// The second `secondary` display becomes `secondary_2`, the second `tv`
    /// becomes `tv_2`, in slot order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a third display of the same kind,
    /// or a role that is already taken.
    pub fn assign_numbered_roles(&mut self) -> Result<(), ConfigError> {
        let mut taken: Vec<Role> = Vec::new();
        for display in &mut self.displays {
            if !display.role.is_assigned() {
                continue;
            }
            if taken.contains(&display.role) {
                let numbered = match display.role {
                    Role::Secondary => Role::Secondary2,
                    Role::Tv => Role::Tv2,
                    other => {
                        return Err(ConfigError::Invalid(format!(
                            "role {other} is assigned to more than one display"
                        )))
                    }
                };
                if taken.contains(&numbered) {
                    return Err(ConfigError::Invalid(format!(
                        "at most two displays can have role {}",
                        display.role
                    )));
                }
                display.role = numbered;
            }
            taken.push(display.role);
        }
        Ok(())
    }

    /// Validates the displays and builds the registry the engine runs on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] or [`ConfigError::Registry`].
    pub fn registry(&self) -> Result<DisplayRegistry, ConfigError> {
        self.validate()?;
        let mut numbered = self.clone();
        numbered.assign_numbered_roles()?;
        let records = numbered.displays.iter().map(DisplayRecord::from).collect();
        Ok(DisplayRegistry::new(records)?)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Replaces the display setup stored at `path` and saves it.
///
/// The general settings of the existing file are kept; `tool` overrides the
/// stored tool when given.  A file that cannot be read or parsed is replaced
/// by defaults so that a broken config can always be rewritten.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the new displays do not validate, and
/// the errors of [`save_config_to`].  Nothing is written on error.
pub fn replace_displays(
    path: &Path,
    displays: Vec<DisplayEntry>,
    tool: Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(path).unwrap_or_else(|e| {
        warn!(
            path = %path.display(),
            error = %e,
            "existing config is unreadable, starting from defaults"
        );
        AppConfig::default()
    });
    if let Some(tool) = tool {
        config.general.tool = tool;
    }
    config.displays = displays;
    config.validate()?;
    config.assign_numbered_roles()?;
    save_config_to(&config, path)?;
    Ok(config)
}

/// Resolves the platform config base directory including the `multimon` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MultiMon"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("multimon"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("MultiMon"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(port: &str, role: Role) -> DisplayEntry {
        DisplayEntry {
            port: port.to_string(),
            resolution: "1920x1080".to_string(),
            rate: "60".to_string(),
            role,
        }
    }

    fn config(displays: Vec<DisplayEntry>) -> AppConfig {
        AppConfig {
            general: GeneralConfig::default(),
            displays,
        }
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_uses_xrandr_and_info_level() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.general.tool, "xrandr");
        assert_eq!(cfg.general.log_level, "info");
        assert!(cfg.displays.is_empty());
    }

    // ── TOML ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let cfg = config(vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Tv2)]);

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
        assert!(toml_str.contains("role = \"tv_2\""));
    }

    #[test]
    fn test_deserialize_minimal_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_display_without_role_is_empty() {
        let toml_str = r#"
[[displays]]
port = "DP-0"
resolution = "1920x1080"
rate = "60"
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize");

        assert_eq!(cfg.displays[0].role, Role::Empty);
    }

    #[test]
    fn test_deserialize_unknown_role_is_parse_error() {
        let toml_str = r#"
[[displays]]
port = "DP-0"
resolution = "1920x1080"
rate = "60"
role = "projector"
"#;
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // ── DisplayEntry::from_str ────────────────────────────────────────────────

    #[test]
    fn test_display_entry_parses_colon_separated_fields() {
        let parsed: DisplayEntry = "HDMI-0:1280x720:50:tv".parse().expect("parse");
        assert_eq!(
            parsed,
            DisplayEntry {
                port: "HDMI-0".to_string(),
                resolution: "1280x720".to_string(),
                rate: "50".to_string(),
                role: Role::Tv,
            }
        );
    }

    #[test]
    fn test_display_entry_rejects_missing_fields() {
        assert!("HDMI-0:1280x720".parse::<DisplayEntry>().is_err());
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_main_and_tv() {
        let cfg = config(vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Tv)]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_main() {
        let cfg = config(vec![entry("DP-0", Role::Secondary), entry("HDMI-0", Role::Tv)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_two_mains() {
        let cfg = config(vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Main)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_display_without_role() {
        let cfg = config(vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Empty)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_ports() {
        let cfg = config(vec![entry("DP-0", Role::Main), entry("DP-0", Role::Tv)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_single_display() {
        let cfg = config(vec![entry("DP-0", Role::Main)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_setup() {
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    // ── assign_numbered_roles ─────────────────────────────────────────────────

    #[test]
    fn test_repeated_roles_get_numbered_in_slot_order() {
        let mut cfg = config(vec![
            entry("DP-0", Role::Tv),
            entry("DP-1", Role::Main),
            entry("DP-2", Role::Tv),
        ]);

        cfg.assign_numbered_roles().expect("numbering");

        let roles: Vec<_> = cfg.displays.iter().map(|d| d.role).collect();
        assert_eq!(roles, [Role::Tv, Role::Main, Role::Tv2]);
    }

    #[test]
    fn test_third_display_of_same_kind_is_rejected() {
        let mut cfg = config(vec![
            entry("DP-0", Role::Secondary),
            entry("DP-1", Role::Secondary),
            entry("DP-2", Role::Secondary),
        ]);
        assert!(cfg.assign_numbered_roles().is_err());
    }

    #[test]
    fn test_registry_applies_numbering() {
        let cfg = config(vec![
            entry("DP-0", Role::Main),
            entry("DP-1", Role::Secondary),
            entry("DP-2", Role::Secondary),
        ]);

        let registry = cfg.registry().expect("registry");

        assert_eq!(registry.port_for_role(Role::Secondary2), Some("DP-2"));
    }

    // ── load / save via temp directory ────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("multimon_test_{}", Uuid::new_v4()));
        let path = dir.join("nested").join("config.toml");
        let mut cfg = config(vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Tv)]);
        cfg.general.log_level = "debug".to_string();

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("multimon_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── replace_displays ──────────────────────────────────────────────────────

    #[test]
    fn test_replace_displays_overwrites_malformed_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("multimon_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ broken").unwrap();
        let displays = vec![entry("DP-0", Role::Main), entry("HDMI-0", Role::Tv)];

        // Act
        let saved = replace_displays(&path, displays.clone(), None).expect("replace");

        // Assert
        assert_eq!(saved.displays, displays);
        assert_eq!(saved.general, GeneralConfig::default());
        assert_eq!(load_config_from(&path).expect("load"), saved);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_replace_displays_keeps_general_settings_and_numbers_roles() {
        let dir = std::env::temp_dir().join(format!("multimon_test_{}", Uuid::new_v4()));
        let path = dir.join("config.toml");
        let mut existing = config(vec![entry("DP-9", Role::Main), entry("DP-8", Role::Tv)]);
        existing.general.log_level = "debug".to_string();
        save_config_to(&existing, &path).expect("save");

        let saved = replace_displays(
            &path,
            vec![
                entry("DP-0", Role::Tv),
                entry("DP-1", Role::Main),
                entry("DP-2", Role::Tv),
            ],
            Some("/opt/xrandr".to_string()),
        )
        .expect("replace");

        assert_eq!(saved.general.log_level, "debug");
        assert_eq!(saved.general.tool, "/opt/xrandr");
        assert_eq!(saved.displays[2].role, Role::Tv2);
        assert_eq!(load_config_from(&path).expect("load"), saved);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_replace_displays_writes_nothing_when_invalid() {
        let dir = std::env::temp_dir().join(format!("multimon_test_{}", Uuid::new_v4()));
        let path = dir.join("config.toml");

        let result = replace_displays(&path, vec![entry("DP-0", Role::Tv)], None);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped CI environment is also acceptable.
    }
}
