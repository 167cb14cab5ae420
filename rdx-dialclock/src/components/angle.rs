//! Maps a position around the clock face to a hand rotation.

use serde::Deserialize;

/// Keeps the one-second mark of the logarithmic sweep from collapsing onto
/// the twelve o'clock position.
const LOG_TWEAK: f64 = 3.0;

/// Quarter turn that moves position 0 from the +x axis to twelve o'clock.
const BASE_ANGLE: f64 = -0.25;

/// How face positions are spread around the dial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    /// Even spacing.
    #[default]
    Linear,
    /// Fast near the top of the minute, compressing toward the next minute.
    Log,
    /// The mirrored sweep: slow first, fast at the end.
    ReverseLog,
}

/// Converts a face position (0 up to 60) into a fraction of a full turn.
///
/// The result is pre-offset by a quarter turn so that position 0 points at
/// twelve o'clock. Multiply by 360 for degrees.
pub fn tick_angle(position: f64, mode: AngleMode) -> f64 {
    match mode {
        AngleMode::Linear => BASE_ANGLE + position / 60.0,
        AngleMode::Log => BASE_ANGLE + log_ratio(position),
        AngleMode::ReverseLog => {
            let folded = (60.0 - position) % 60.0;
            BASE_ANGLE + (1.0 - log_ratio(folded))
        }
    }
}

fn log_ratio(position: f64) -> f64 {
    if position == 0.0 {
        0.0
    } else {
        (position * LOG_TWEAK).ln() / (60.0 * LOG_TWEAK).ln()
    }
}
