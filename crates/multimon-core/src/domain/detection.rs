//! Arrangement detection from live display geometry.
//!
//! The detector answers "which named arrangement is the desktop in right
//! now?" using only what the display server reports about the *active*
//! displays: their ports in left-to-right order, their pixel widths, and the
//! width of the desktop bounding box.
//!
//! # The heuristic
//!
//! - One active display whose port belongs to a role → `<role>_only`.
//! - Two active displays, main first: if the widths add up to the desktop
//!   width the layout is extended; if the desktop is as wide as a single
//!   display the second one mirrors the first.
//! - Three or more active displays whose widths add up to the desktop width
//!   → `all_extended`.
//!
//! Roles are tried in the fixed order `main, secondary, tv, secondary_2,
//! tv_2`; the first match wins.  Vertical stacking, partial overlap and other
//! exotic layouts are not recognised and yield `None`.

use super::arrangement::Arrangement;
use super::display::{DisplayRegistry, Role};

/// Order in which candidate roles are tried.
pub const DETECTION_PRECEDENCE: [Role; 5] = [
    Role::Main,
    Role::Secondary,
    Role::Tv,
    Role::Secondary2,
    Role::Tv2,
];

/// An active display as reported by the display server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDisplay {
    /// Output name, comparable with [`DisplayRecord::port`](super::display::DisplayRecord::port).
    pub port: String,
    /// Width in pixels of the display's area on the desktop.
    pub width: u32,
}

impl ActiveDisplay {
    pub fn new(port: impl Into<String>, width: u32) -> Self {
        Self {
            port: port.into(),
            width,
        }
    }
}

/// Snapshot of the live desktop geometry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveDisplayState {
    /// Active displays, ordered left to right.
    pub active: Vec<ActiveDisplay>,
    /// Width of the bounding box of all active displays.
    pub bounding_width: u32,
}

impl LiveDisplayState {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Sum of the widths of all active displays.
    ///
    /// Summed as `u64` so that no combination of reported widths overflows.
    pub fn total_width(&self) -> u64 {
        self.active.iter().map(|d| u64::from(d.width)).sum()
    }

    fn is_side_by_side(&self) -> bool {
        u64::from(self.bounding_width) == self.total_width()
    }
}

/// Infers the named arrangement currently in effect.
///
/// Returns `None` when no rule matches; this is a normal outcome, e.g. after
/// the layout was changed by another tool.
pub fn detect(registry: &DisplayRegistry, live: &LiveDisplayState) -> Option<Arrangement> {
    let side_by_side = live.is_side_by_side();
    let main_port = registry.port_for_role(Role::Main);

    for role in DETECTION_PRECEDENCE {
        let role_port = registry.port_for_role(role);

        match live.active.as_slice() {
            [only] => {
                if role_port == Some(only.port.as_str()) {
                    return Arrangement::only(role);
                }
            }
            [first, second] => {
                if main_port == Some(first.port.as_str())
                    && role_port == Some(second.port.as_str())
                {
                    if side_by_side {
                        if let Some(arrangement) = Arrangement::extended(role) {
                            return Some(arrangement);
                        }
                    }
                    if live.bounding_width == first.width {
                        if let Some(arrangement) = Arrangement::mirror(role) {
                            return Some(arrangement);
                        }
                    }
                }
            }
            [_, _, _, ..] => {
                if side_by_side {
                    return Some(Arrangement::AllExtended);
                }
            }
            _ => {}
        }
    }

    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
