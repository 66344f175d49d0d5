//! Display registry domain entity.
//!
//! The registry is the ordered list of physical displays attached to the
//! desktop, left to right, as recorded in the configuration.  It is built once
//! when the engine starts and never mutated afterwards: every arrangement
//! operation reads the same immutable slice.
//!
//! The registry also owns the *identifier resolver*.  Callers may refer to a
//! display by its port (`"HDMI-0"`), by its role (`main`, `tv`, ...) or by its
//! physical slot index (`0`, `1`, ...); [`DisplayRegistry::resolve`] turns any
//! of these into the canonical port string the external tool understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic label of a physical display slot.
///
/// `Secondary2` and `Tv2` are the numbered duplicates used when a setup has
/// more than one secondary monitor or more than one TV.  `Empty` marks a slot
/// without an assigned role; it never matches a role lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Main,
    Secondary,
    #[serde(rename = "secondary_2")]
    Secondary2,
    Tv,
    #[serde(rename = "tv_2")]
    Tv2,
    #[serde(alias = "")]
    Empty,
}

impl Role {
    /// Every role that can be assigned to a display, in canonical order.
    pub const ASSIGNABLE: [Role; 5] = [
        Role::Main,
        Role::Secondary,
        Role::Secondary2,
        Role::Tv,
        Role::Tv2,
    ];

    /// The configuration / label spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Main => "main",
            Role::Secondary => "secondary",
            Role::Secondary2 => "secondary_2",
            Role::Tv => "tv",
            Role::Tv2 => "tv_2",
            Role::Empty => "empty",
        }
    }

    /// Returns `true` for every role except [`Role::Empty`].
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Role::Empty)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown display role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Role::Main),
            "secondary" => Ok(Role::Secondary),
            "secondary_2" => Ok(Role::Secondary2),
            "tv" => Ok(Role::Tv),
            "tv_2" => Ok(Role::Tv2),
            "empty" | "" => Ok(Role::Empty),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// One physical display as recorded in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// Platform identifier of the video output, e.g. `"DP-0"`.
    pub port: String,
    /// Mode in `WxH` form, e.g. `"1920x1080"`.
    pub resolution: String,
    /// Refresh rate as the tool expects it, e.g. `"60"` or `"59.94"`.
    pub rate: String,
    /// Role of the display in the setup.
    pub role: Role,
}

impl DisplayRecord {
    pub fn new(
        port: impl Into<String>,
        resolution: impl Into<String>,
        rate: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            port: port.into(),
            resolution: resolution.into(),
            rate: rate.into(),
            role,
        }
    }
}

/// A symbolic reference to a display, as used by relative placements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// A raw port; passed through unchanged.
    Port(String),
    /// The display holding this role.
    Role(Role),
    /// The display at this physical slot (0 = leftmost).
    Index(usize),
}

impl Reference {
    /// Parses a textual reference.
    ///
    /// A non-negative integer becomes an [`Reference::Index`], a known role
    /// name a [`Reference::Role`], and anything else is kept as a raw
    /// [`Reference::Port`].
    pub fn parse(token: &str) -> Self {
        if let Ok(index) = token.parse::<usize>() {
            return Reference::Index(index);
        }
        match token.parse::<Role>() {
            Ok(role) if role.is_assigned() => Reference::Role(role),
            _ => Reference::Port(token.to_string()),
        }
    }
}

impl From<Role> for Reference {
    fn from(role: Role) -> Self {
        Reference::Role(role)
    }
}

impl From<usize> for Reference {
    fn from(index: usize) -> Self {
        Reference::Index(index)
    }
}

impl From<&str> for Reference {
    fn from(token: &str) -> Self {
        Reference::parse(token)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Port(port) => f.write_str(port),
            Reference::Role(role) => write!(f, "{role}"),
            Reference::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// A symbolic reference could not be mapped to a port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The physical index is past the end of the registry.
    #[error("display index {index} is out of range (registry has {len} displays)")]
    IndexOutOfRange { index: usize, len: usize },

    /// No display in the registry holds the role.
    #[error("no display with role {0} is configured")]
    RoleNotPresent(Role),
}

/// Errors raised while constructing a registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two records name the same port.
    #[error("port {0} is assigned to more than one display")]
    DuplicatePort(String),
}

/// Ordered, immutable list of the desktop's displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayRegistry {
    displays: Vec<DisplayRecord>,
}

impl DisplayRegistry {
    /// Creates a registry from records ordered left to right.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePort`] if two records share a port.
    pub fn new(displays: Vec<DisplayRecord>) -> Result<Self, RegistryError> {
        for (i, display) in displays.iter().enumerate() {
            if displays[..i].iter().any(|d| d.port == display.port) {
                return Err(RegistryError::DuplicatePort(display.port.clone()));
            }
        }
        Ok(Self { displays })
    }

    /// Number of physical display slots.
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Iterates the records in physical order.
    pub fn iter(&self) -> impl Iterator<Item = &DisplayRecord> {
        self.displays.iter()
    }

    /// Returns the slot index of the first display with `role`.
    pub fn index_of_role(&self, role: Role) -> Option<usize> {
        if !role.is_assigned() {
            return None;
        }
        self.displays.iter().position(|d| d.role == role)
    }

    /// Returns the port of the first display with `role`.
    pub fn port_for_role(&self, role: Role) -> Option<&str> {
        self.index_of_role(role)
            .map(|i| self.displays[i].port.as_str())
    }

    /// Maps a reference to the port it designates.
    ///
    /// Index and role lookups fail on a miss; raw ports are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::IndexOutOfRange`] for an index past the end
    /// and [`ResolutionError::RoleNotPresent`] for a role no display holds.
    pub fn resolve(&self, reference: &Reference) -> Result<String, ResolutionError> {
        match reference {
            Reference::Index(index) => self
                .displays
                .get(*index)
                .map(|d| d.port.clone())
                .ok_or(ResolutionError::IndexOutOfRange {
                    index: *index,
                    len: self.displays.len(),
                }),
            Reference::Role(role) => self
                .port_for_role(*role)
                .map(str::to_string)
                .ok_or(ResolutionError::RoleNotPresent(*role)),
            Reference::Port(port) => Ok(port.clone()),
        }
    }
}

impl<'a> IntoIterator for &'a DisplayRegistry {
    type Item = &'a DisplayRecord;
    type IntoIter = std::slice::Iter<'a, DisplayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.displays.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
