//! Parsing of declarative clock placeholders.
//!
//! A placeholder declares a clock through the first token of its class
//! attribute, a colon-delimited list whose trailing fields are optional:
//!
//! ```text
//! Marker:skinId:displayRadius:secondHandMode:gmtOffset:digitalFlag:angleMode
//! ```
//!
//! - `secondHandMode`: `noSeconds` hides the second hand.
//! - `gmtOffset`: hours from UTC (fractional allowed, at most 24 either way);
//!   empty or out of range follows local time.
//! - `digitalFlag`: `showDigital` adds a digital readout.
//! - `angleMode`: `logClock` or `logClockRev`; anything else is linear.

use crate::common::ElementId;
use crate::components::angle::AngleMode;
use crate::components::face::ClockOptions;
use thiserror::Error;

/// Offsets beyond a day either way are treated as unset.
const MAX_GMT_OFFSET_HOURS: f64 = 24.0;

/// Why a class attribute did not yield a clock.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    /// The first class token does not start with the clock marker. Such
    /// elements are not placeholders at all.
    #[error("class does not start with the '{0}' marker")]
    NotAClock(String),
    /// The placeholder names no radius field.
    #[error("placeholder has no radius field")]
    MissingRadius,
    /// The radius field is not a finite number.
    #[error("radius '{0}' is not a number")]
    InvalidRadius(String),
}

/// The typed content of a clock placeholder token.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderToken {
    pub skin: Option<String>,
    pub radius: Option<f64>,
    pub show_seconds: bool,
    pub gmt_offset: Option<f64>,
    pub show_digital: bool,
    pub angle_mode: AngleMode,
}

impl PlaceholderToken {
    /// Parses the class attribute of a candidate element.
    ///
    /// Only the first whitespace-separated class token is considered. An empty
    /// radius field selects the default radius; a missing or non-numeric one is
    /// an error, which discovery treats as "skip this element".
    pub fn parse(class: &str, marker: &str) -> Result<Self, TokenError> {
        let first = class.split_whitespace().next().unwrap_or_default();
        let mut fields = first.split(':');
        if fields.next() != Some(marker) {
            return Err(TokenError::NotAClock(marker.to_string()));
        }

        let skin = fields.next().filter(|skin| !skin.is_empty()).map(str::to_string);
        let radius = match fields.next().map(str::trim) {
            None => return Err(TokenError::MissingRadius),
            Some("") => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(radius) if radius.is_finite() => Some(radius),
                _ => return Err(TokenError::InvalidRadius(raw.to_string())),
            },
        };
        let show_seconds = fields.next() != Some("noSeconds");
        let gmt_offset = fields
            .next()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|hours| hours.abs() <= MAX_GMT_OFFSET_HOURS);
        let show_digital = fields.next() == Some("showDigital");
        let angle_mode = match fields.next() {
            Some("logClock") => AngleMode::Log,
            Some("logClockRev") => AngleMode::ReverseLog,
            _ => AngleMode::Linear,
        };

        Ok(Self {
            skin,
            radius,
            show_seconds,
            gmt_offset,
            show_digital,
            angle_mode,
        })
    }

    /// Whether the first class token carries the clock marker.
    pub fn is_placeholder(class: &str, marker: &str) -> bool {
        !matches!(Self::parse(class, marker), Err(TokenError::NotAClock(_)))
    }

    /// Binds the token to a host element.
    pub fn into_options(self, element: ElementId) -> ClockOptions {
        ClockOptions {
            element,
            skin: self.skin,
            radius: self.radius,
            show_seconds: self.show_seconds,
            gmt_offset: self.gmt_offset,
            show_digital: self.show_digital,
            angle_mode: self.angle_mode,
        }
    }
}
