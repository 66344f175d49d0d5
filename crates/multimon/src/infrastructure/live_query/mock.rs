//! Fixed live display query for tests and offline runs.

use std::sync::Mutex;

use multimon_core::{ActiveDisplay, LiveDisplayState};

use crate::application::detect_arrangement::{LiveDisplayQuery, QueryError};

/// A query that always reports the same geometry.
///
/// The state can be replaced between calls with [`set`](Self::set), which
/// lets a test simulate the user switching arrangements.
#[derive(Default)]
pub struct FixedLiveDisplayQuery {
    state: Mutex<LiveDisplayState>,
}

impl FixedLiveDisplayQuery {
    pub fn new(state: LiveDisplayState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Displays placed side by side, left to right, in the given order.
    pub fn side_by_side(displays: &[(&str, u32)]) -> Self {
        let active: Vec<_> = displays
            .iter()
            .map(|(port, width)| ActiveDisplay::new(*port, *width))
            .collect();
        let bounding_width = active.iter().map(|d| d.width).sum();
        Self::new(LiveDisplayState {
            active,
            bounding_width,
        })
    }

    /// Displays all showing the same picture.
    pub fn mirrored(displays: &[(&str, u32)]) -> Self {
        let active: Vec<_> = displays
            .iter()
            .map(|(port, width)| ActiveDisplay::new(*port, *width))
            .collect();
        let bounding_width = active.iter().map(|d| d.width).max().unwrap_or(0);
        Self::new(LiveDisplayState {
            active,
            bounding_width,
        })
    }

    /// Replaces the reported geometry.
    pub fn set(&self, state: LiveDisplayState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }
}

impl LiveDisplayQuery for FixedLiveDisplayQuery {
    fn query_live_state(&self) -> Result<LiveDisplayState, QueryError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| QueryError::Parse("fixed query state poisoned".to_string()))
    }
}
