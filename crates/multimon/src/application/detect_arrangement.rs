//! DetectArrangementUseCase: reports which named arrangement is active.

use std::sync::Arc;

use multimon_core::{detect, Arrangement, DisplayRegistry, LiveDisplayState};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for live display queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query tool could not be started.
    #[error("failed to query active displays: {0}")]
    Launch(#[from] std::io::Error),

    /// The query output could not be understood.
    #[error("unexpected active display listing: {0}")]
    Parse(String),
}

/// Trait for reading the live active-display geometry.
#[cfg_attr(test, mockall::automock)]
pub trait LiveDisplayQuery: Send + Sync {
    /// Returns the active displays (in platform order) and the desktop width.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the display server cannot be queried.
    fn query_live_state(&self) -> Result<LiveDisplayState, QueryError>;
}

/// The Detect Arrangement use case.
pub struct DetectArrangementUseCase {
    registry: DisplayRegistry,
    query: Arc<dyn LiveDisplayQuery>,
}

impl DetectArrangementUseCase {
    pub fn new(registry: DisplayRegistry, query: Arc<dyn LiveDisplayQuery>) -> Self {
        Self { registry, query }
    }

    /// Detects the current arrangement.
    ///
    /// Never fails: a query error is logged and reported as "no arrangement",
    /// the same as geometry that matches no known arrangement.
    pub fn detect(&self) -> Option<Arrangement> {
        let live = match self.query.query_live_state() {
            Ok(live) => live,
            Err(e) => {
                warn!("cannot detect display arrangement: {e}");
                return None;
            }
        };

        let detected = detect(&self.registry, &live);
        debug!(
            active = live.active_count(),
            bounding_width = live.bounding_width,
            detected = detected.map(|a| a.label()).unwrap_or("none"),
            "detected display arrangement"
        );
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multimon_core::{ActiveDisplay, DisplayRecord, Role};

    fn registry() -> DisplayRegistry {
        DisplayRegistry::new(vec![
            DisplayRecord::new("DP-0", "1920x1080", "60", Role::Main),
            DisplayRecord::new("HDMI-0", "1920x1080", "60", Role::Tv),
        ])
        .unwrap()
    }

    #[test]
    fn test_detect_returns_arrangement_for_matching_geometry() {
        let mut query = MockLiveDisplayQuery::new();
        query.expect_query_live_state().returning(|| {
            Ok(LiveDisplayState {
                active: vec![ActiveDisplay::new("HDMI-0", 1920)],
                bounding_width: 1920,
            })
        });
        let uc = DetectArrangementUseCase::new(registry(), Arc::new(query));

        assert_eq!(uc.detect(), Some(Arrangement::TvOnly));
    }

    #[test]
    fn test_detect_degrades_to_none_when_query_fails() {
        let mut query = MockLiveDisplayQuery::new();
        query
            .expect_query_live_state()
            .returning(|| Err(QueryError::Parse("garbage".to_string())));
        let uc = DetectArrangementUseCase::new(registry(), Arc::new(query));

        assert_eq!(uc.detect(), None);
    }

    #[test]
    fn test_detect_returns_none_for_unrecognised_layout() {
        let mut query = MockLiveDisplayQuery::new();
        query.expect_query_live_state().returning(|| {
            Ok(LiveDisplayState {
                active: vec![ActiveDisplay::new("DP-0", 1920), ActiveDisplay::new("HDMI-0", 1920)],
                bounding_width: 2000,
            })
        });
        let uc = DetectArrangementUseCase::new(registry(), Arc::new(query));

        assert_eq!(uc.detect(), None);
    }
}
