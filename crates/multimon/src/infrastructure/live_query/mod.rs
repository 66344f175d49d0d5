//! Live display geometry via `xrandr --listactivemonitors`.
//!
//! # Output format
//!
//! ```text
//! Monitors: 2
//!  0: +*eDP-1 1920/344x1080/194+0+0  eDP-1
//!  1: +HDMI-1 1280/700x720/390+1920+0  HDMI-1
//! ```
//!
//! Each monitor line carries the geometry `W/mmWxH/mmH+X+Y` and ends with the
//! output (port) name.  Monitors defined with `xrandr --setmonitor ... none`
//! have no output column; they count towards the header but are otherwise
//! ignored, since no port can be matched against them.  Monitors are kept in the order xrandr lists them,
//! which puts the primary monitor first.  The desktop bounding width is
//! `max(X + W) - min(X)`.

use std::sync::Arc;

use multimon_core::{ActiveDisplay, Command, LiveDisplayState};

use crate::application::apply_arrangement::CommandRunner;
use crate::application::detect_arrangement::{LiveDisplayQuery, QueryError};

pub mod mock;

/// Flag that makes xrandr list only the active monitors.
const LIST_ACTIVE_MONITORS: &str = "--listactivemonitors";

/// Queries live geometry by running the display tool.
pub struct XrandrLiveQuery {
    tool: String,
    runner: Arc<dyn CommandRunner>,
}

impl XrandrLiveQuery {
    pub fn new(tool: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: tool.into(),
            runner,
        }
    }
}

impl LiveDisplayQuery for XrandrLiveQuery {
    fn query_live_state(&self) -> Result<LiveDisplayState, QueryError> {
        let mut command = Command::new(self.tool.as_str());
        command.arg(LIST_ACTIVE_MONITORS);
        let output = self.runner.run(&command)?;
        parse_active_monitors(&output)
    }
}

/// One monitor line after parsing.
struct MonitorLine {
    port: String,
    x: i64,
    width: u32,
}

/// Parses the output of `xrandr --listactivemonitors`.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] if the header is missing, a monitor line is
/// malformed, or the monitor count disagrees with the header.
pub fn parse_active_monitors(output: &str) -> Result<LiveDisplayState, QueryError> {
    let mut lines = output.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| QueryError::Parse("empty output".to_string()))?;
    let expected: usize = header
        .trim()
        .strip_prefix("Monitors:")
        .and_then(|n| n.trim().parse().ok())
        .ok_or_else(|| QueryError::Parse(format!("bad header: {header:?}")))?;

    let listed = lines
        .map(parse_monitor_line)
        .collect::<Result<Vec<_>, _>>()?;

    if listed.len() != expected {
        return Err(QueryError::Parse(format!(
            "header announces {expected} monitors but {} are listed",
            listed.len()
        )));
    }
    let monitors: Vec<MonitorLine> = listed.into_iter().flatten().collect();

    let left = monitors.iter().map(|m| m.x).min().unwrap_or(0);
    let right = monitors
        .iter()
        .map(|m| m.x + i64::from(m.width))
        .max()
        .unwrap_or(0);
    let bounding_width = u32::try_from(right - left)
        .map_err(|_| QueryError::Parse("desktop width out of range".to_string()))?;

    Ok(LiveDisplayState {
        active: monitors
            .into_iter()
            .map(|m| ActiveDisplay::new(m.port, m.width))
            .collect(),
        bounding_width,
    })
}

/// Parses one monitor line; `None` for a monitor without an output.
fn parse_monitor_line(line: &str) -> Result<Option<MonitorLine>, QueryError> {
    let bad = || QueryError::Parse(format!("bad monitor line: {line:?}"));

    // " 0: +*eDP-1 1920/344x1080/194+0+0  eDP-1"
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (geometry, port) = match fields.as_slice() {
        [_index, _name, geometry] => (*geometry, None),
        [_index, _name, geometry, .., port] => (*geometry, Some(*port)),
        _ => return Err(bad()),
    };

    let (size, position) = geometry.split_once('+').ok_or_else(bad)?;
    let width = size
        .split_once('/')
        .and_then(|(w, _)| w.parse::<u32>().ok())
        .ok_or_else(bad)?;
    // xrandr prints negative offsets as "+-1920".
    let x = position
        .split('+')
        .next()
        .and_then(|x| x.parse::<i64>().ok())
        .ok_or_else(bad)?;

    Ok(port.map(|port| MonitorLine {
        port: port.to_string(),
        x,
        width,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
