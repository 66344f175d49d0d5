//! Arrangement requests and the named arrangements built on top of them.
//!
//! An [`ArrangementRequest`] says what each display should do: be switched
//! off, become the primary output, or be placed relative to another display.
//! Requests come in two addressing modes:
//!
//! - **Positional**: one [`DesiredState`] per physical slot, left to right.
//!   The whole layout is re-specified.
//! - **Role-keyed**: a map from [`Role`] to [`DesiredState`].  Displays whose
//!   role is not in the map are left untouched.
//!
//! The named arrangements (`tv_only`, `secondary_extended`, `all_extended`,
//! ...) are a closed [`Arrangement`] enum.  [`plan`] expands one of them into a
//! request for a concrete registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::display::{DisplayRegistry, Reference, Role};

/// Placement of a display relative to another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    LeftOf,
    RightOf,
    SameAs,
}

impl Direction {
    /// The xrandr flag for this placement.
    pub fn flag(&self) -> &'static str {
        match self {
            Direction::LeftOf => "--left-of",
            Direction::RightOf => "--right-of",
            Direction::SameAs => "--same-as",
        }
    }
}

/// What a single display should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredState {
    /// Disable the output.
    Off,
    /// Enable the output and make it the primary one.
    Primary,
    /// Enable the output next to (or mirroring) the referenced display.
    RelativeTo(Direction, Reference),
}

impl DesiredState {
    pub fn left_of(reference: impl Into<Reference>) -> Self {
        DesiredState::RelativeTo(Direction::LeftOf, reference.into())
    }

    pub fn right_of(reference: impl Into<Reference>) -> Self {
        DesiredState::RelativeTo(Direction::RightOf, reference.into())
    }

    pub fn same_as(reference: impl Into<Reference>) -> Self {
        DesiredState::RelativeTo(Direction::SameAs, reference.into())
    }
}

/// Per-display arrangement request in one of the two addressing modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrangementRequest {
    /// One state per physical slot, in registry order.
    Positional(Vec<DesiredState>),
    /// States keyed by role; unlisted roles are left untouched.
    RoleKeyed(BTreeMap<Role, DesiredState>),
}

impl ArrangementRequest {
    /// Builds a positional request.  Its length must equal the registry size.
    pub fn positional(states: impl IntoIterator<Item = DesiredState>) -> Self {
        ArrangementRequest::Positional(states.into_iter().collect())
    }

    /// Builds a role-keyed request.
    pub fn role_keyed(states: impl IntoIterator<Item = (Role, DesiredState)>) -> Self {
        ArrangementRequest::RoleKeyed(states.into_iter().collect())
    }
}

// ── Named arrangements ────────────────────────────────────────────────────────

/// The named arrangements a user can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrangement {
    MainOnly,
    SecondaryOnly,
    Secondary2Only,
    TvOnly,
    Tv2Only,
    SecondaryExtended,
    Secondary2Extended,
    TvExtended,
    Tv2Extended,
    SecondaryMirror,
    Secondary2Mirror,
    TvMirror,
    Tv2Mirror,
    AllExtended,
}

/// The shape of a named arrangement, independent of the companion role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangementKind {
    /// Only one display is on.
    Only(Role),
    /// Main plus one display, side by side.
    Extended(Role),
    /// Main plus one display showing the same picture.
    Mirror(Role),
    /// Every display on, side by side.
    AllExtended,
}

impl Arrangement {
    /// Every arrangement, in the order they are offered to the user.
    pub const ALL: [Arrangement; 14] = [
        Arrangement::MainOnly,
        Arrangement::SecondaryExtended,
        Arrangement::TvExtended,
        Arrangement::TvOnly,
        Arrangement::AllExtended,
        Arrangement::TvMirror,
        Arrangement::SecondaryMirror,
        Arrangement::SecondaryOnly,
        Arrangement::Secondary2Only,
        Arrangement::Secondary2Extended,
        Arrangement::Secondary2Mirror,
        Arrangement::Tv2Only,
        Arrangement::Tv2Extended,
        Arrangement::Tv2Mirror,
    ];

    pub fn kind(&self) -> ArrangementKind {
        use ArrangementKind::*;
        match self {
            Arrangement::MainOnly => Only(Role::Main),
            Arrangement::SecondaryOnly => Only(Role::Secondary),
            Arrangement::Secondary2Only => Only(Role::Secondary2),
            Arrangement::TvOnly => Only(Role::Tv),
            Arrangement::Tv2Only => Only(Role::Tv2),
            Arrangement::SecondaryExtended => Extended(Role::Secondary),
            Arrangement::Secondary2Extended => Extended(Role::Secondary2),
            Arrangement::TvExtended => Extended(Role::Tv),
            Arrangement::Tv2Extended => Extended(Role::Tv2),
            Arrangement::SecondaryMirror => Mirror(Role::Secondary),
            Arrangement::Secondary2Mirror => Mirror(Role::Secondary2),
            Arrangement::TvMirror => Mirror(Role::Tv),
            Arrangement::Tv2Mirror => Mirror(Role::Tv2),
            Arrangement::AllExtended => AllExtended,
        }
    }

    /// `<role>_only`, if such an arrangement exists.
    pub fn only(role: Role) -> Option<Self> {
        match role {
            Role::Main => Some(Arrangement::MainOnly),
            Role::Secondary => Some(Arrangement::SecondaryOnly),
            Role::Secondary2 => Some(Arrangement::Secondary2Only),
            Role::Tv => Some(Arrangement::TvOnly),
            Role::Tv2 => Some(Arrangement::Tv2Only),
            Role::Empty => None,
        }
    }

    /// `<role>_extended`; there is none for `main`.
    pub fn extended(role: Role) -> Option<Self> {
        match role {
            Role::Secondary => Some(Arrangement::SecondaryExtended),
            Role::Secondary2 => Some(Arrangement::Secondary2Extended),
            Role::Tv => Some(Arrangement::TvExtended),
            Role::Tv2 => Some(Arrangement::Tv2Extended),
            Role::Main | Role::Empty => None,
        }
    }

    /// `<role>_mirror`; there is none for `main`.
    pub fn mirror(role: Role) -> Option<Self> {
        match role {
            Role::Secondary => Some(Arrangement::SecondaryMirror),
            Role::Secondary2 => Some(Arrangement::Secondary2Mirror),
            Role::Tv => Some(Arrangement::TvMirror),
            Role::Tv2 => Some(Arrangement::Tv2Mirror),
            Role::Main | Role::Empty => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Arrangement::MainOnly => "main_only",
            Arrangement::SecondaryOnly => "secondary_only",
            Arrangement::Secondary2Only => "secondary_2_only",
            Arrangement::TvOnly => "tv_only",
            Arrangement::Tv2Only => "tv_2_only",
            Arrangement::SecondaryExtended => "secondary_extended",
            Arrangement::Secondary2Extended => "secondary_2_extended",
            Arrangement::TvExtended => "tv_extended",
            Arrangement::Tv2Extended => "tv_2_extended",
            Arrangement::SecondaryMirror => "secondary_mirror",
            Arrangement::Secondary2Mirror => "secondary_2_mirror",
            Arrangement::TvMirror => "tv_mirror",
            Arrangement::Tv2Mirror => "tv_2_mirror",
            Arrangement::AllExtended => "all_extended",
        }
    }

    /// Human-readable description, as shown in a picker tooltip.
    pub fn description(&self) -> &'static str {
        match self {
            Arrangement::MainOnly => "Main monitor only",
            Arrangement::SecondaryOnly => "Secondary monitor only",
            Arrangement::Secondary2Only => "Secondary 2 monitor only",
            Arrangement::TvOnly => "TV only",
            Arrangement::Tv2Only => "TV 2 only",
            Arrangement::SecondaryExtended => "Extended on secondary monitor",
            Arrangement::Secondary2Extended => "Extended on secondary 2 monitor",
            Arrangement::TvExtended => "Extended on TV",
            Arrangement::Tv2Extended => "Extended on TV 2",
            Arrangement::SecondaryMirror => "Mirror on secondary monitor",
            Arrangement::Secondary2Mirror => "Mirror on secondary 2 monitor",
            Arrangement::TvMirror => "Mirror on TV",
            Arrangement::Tv2Mirror => "Mirror on TV 2",
            Arrangement::AllExtended => "Extended on all screens",
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a label names no arrangement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown arrangement: {0:?}")]
pub struct UnknownArrangement(pub String);

impl FromStr for Arrangement {
    type Err = UnknownArrangement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arrangement::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| UnknownArrangement(s.to_string()))
    }
}

// ── Planning ──────────────────────────────────────────────────────────────────

/// A named arrangement cannot be realised on the current registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The arrangement needs a display with this role.
    #[error("{arrangement} needs a display with role {role}")]
    MissingRole {
        arrangement: Arrangement,
        role: Role,
    },

    /// `all_extended` needs at least three displays.
    #[error("{arrangement} needs at least {required} displays, {available} configured")]
    TooFewDisplays {
        arrangement: Arrangement,
        required: usize,
        available: usize,
    },
}

const ALL_EXTENDED_MIN_DISPLAYS: usize = 3;

/// Expands a named arrangement into a request for `registry`.
///
/// Single-display and two-display arrangements produce role-keyed requests
/// that switch every other role off.  `all_extended` produces a positional
/// request chaining every display outward from the main one.
///
/// # Errors
///
/// Returns [`PlanError::MissingRole`] when a role the arrangement needs is not
/// configured, and [`PlanError::TooFewDisplays`] for `all_extended` on fewer
/// than three displays.
pub fn plan(
    arrangement: Arrangement,
    registry: &DisplayRegistry,
) -> Result<ArrangementRequest, PlanError> {
    let index_of = |role: Role| {
        registry
            .index_of_role(role)
            .ok_or(PlanError::MissingRole { arrangement, role })
    };

    match arrangement.kind() {
        ArrangementKind::Only(role) => {
            index_of(role)?;
            Ok(role_keyed_with(role, DesiredState::Primary, None))
        }
        ArrangementKind::Extended(role) => {
            let main = index_of(Role::Main)?;
            let companion = index_of(role)?;
            let state = if main < companion {
                DesiredState::right_of(Role::Main)
            } else {
                DesiredState::left_of(Role::Main)
            };
            Ok(role_keyed_with(Role::Main, DesiredState::Primary, Some((role, state))))
        }
        ArrangementKind::Mirror(role) => {
            index_of(Role::Main)?;
            index_of(role)?;
            Ok(role_keyed_with(
                Role::Main,
                DesiredState::Primary,
                Some((role, DesiredState::same_as(Role::Main))),
            ))
        }
        ArrangementKind::AllExtended => {
            if registry.len() < ALL_EXTENDED_MIN_DISPLAYS {
                return Err(PlanError::TooFewDisplays {
                    arrangement,
                    required: ALL_EXTENDED_MIN_DISPLAYS,
                    available: registry.len(),
                });
            }
            let main = index_of(Role::Main)?;
            let states = (0..registry.len()).map(|slot| match slot.cmp(&main) {
                std::cmp::Ordering::Less => DesiredState::left_of(slot + 1),
                std::cmp::Ordering::Equal => DesiredState::Primary,
                std::cmp::Ordering::Greater => DesiredState::right_of(slot - 1),
            });
            Ok(ArrangementRequest::positional(states))
        }
    }
}

/// Lists the arrangements that can be planned for `registry`, in offer order.
pub fn available(registry: &DisplayRegistry) -> Vec<Arrangement> {
    Arrangement::ALL
        .into_iter()
        .filter(|a| plan(*a, registry).is_ok())
        .collect()
}

/// Role-keyed request turning every assignable role off except the given ones.
fn role_keyed_with(
    first: Role,
    first_state: DesiredState,
    second: Option<(Role, DesiredState)>,
) -> ArrangementRequest {
    let mut states: BTreeMap<Role, DesiredState> = Role::ASSIGNABLE
        .into_iter()
        .map(|role| (role, DesiredState::Off))
        .collect();
    states.insert(first, first_state);
    if let Some((role, state)) = second {
        states.insert(role, state);
    }
    ArrangementRequest::RoleKeyed(states)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
