//! Defines the process-wide configuration for dialclock.
//!
//! The struct is deserialized with `serde` through the `config` crate, so it can
//! be assembled from an optional TOML file plus `DIALCLOCK_*` environment
//! variables. Every field has a default, so an empty source yields a working
//! configuration.

use crate::surface::Font;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The top-level configuration shared by every clock face an engine drives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialclockConfig {
    /// Skin used when a face asks for no skin or an unknown one.
    pub default_skin: String,

    /// Display radius used when a face does not specify one (or specifies 0).
    pub default_radius: f64,

    /// Radius of the reference coordinate system all skin geometry is
    /// authored in.
    pub render_radius: f64,

    /// Delay between ticks for faces that show a second hand.
    pub tick_delay_ms: u64,

    /// Delay between ticks for faces without a second hand.
    pub long_tick_delay_ms: u64,

    /// Whether the digital readout uses a 12-hour clock with an am/pm suffix.
    pub show_am_pm: bool,

    /// Whether the digital readout includes seconds.
    pub show_secs: bool,

    /// First field of a placeholder token that marks it as a clock.
    pub marker: String,

    /// Prefix for identifiers assigned to placeholders that have none.
    pub auto_id_prefix: String,

    /// Font used for the digital readout.
    pub digital_font: Font,

    /// Additional skin files to merge into the built-in skins at startup.
    pub skin_files: Vec<PathBuf>,
}

impl DialclockConfig {
    /// Loads the configuration from an optional TOML file, then applies
    /// `DIALCLOCK_*` environment overrides (e.g. `DIALCLOCK_DEFAULT_SKIN`).
    /// Nested fields use a double underscore: `DIALCLOCK_DIGITAL_FONT__FAMILY`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("DIALCLOCK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Delay before the next tick, depending on whether seconds are shown.
    pub fn tick_delay(&self, show_seconds: bool) -> Duration {
        if show_seconds {
            Duration::from_millis(self.tick_delay_ms)
        } else {
            Duration::from_millis(self.long_tick_delay_ms)
        }
    }
}

impl Default for DialclockConfig {
    fn default() -> Self {
        Self {
            default_skin: "swissRail".to_string(),
            default_radius: 85.0,
            render_radius: 100.0,
            tick_delay_ms: 1000,
            long_tick_delay_ms: 15000,
            show_am_pm: true,
            show_secs: true,
            marker: "DialClock".to_string(),
            auto_id_prefix: "_dialclock_auto_id_".to_string(),
            digital_font: Font::default(),
            skin_files: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = DialclockConfig::from_toml_str("").unwrap();
        assert_eq!(config.default_skin, "swissRail");
        assert_eq!(config.render_radius, 100.0);
        assert_eq!(config.tick_delay(true), Duration::from_millis(1000));
        assert_eq!(config.tick_delay(false), Duration::from_millis(15000));
        assert_eq!(config.digital_font, Font::default());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = DialclockConfig::from_toml_str(
            r#"
            default_skin = "fancy"
            show_am_pm = false
            tick_delay_ms = 250

            [digital_font]
            size = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.default_skin, "fancy");
        assert!(!config.show_am_pm);
        assert!(config.show_secs);
        assert_eq!(config.tick_delay(true), Duration::from_millis(250));
        assert_eq!(config.digital_font.size, 20.0);
        assert_eq!(config.digital_font.family, "Arial, Helvetica, sans-serif");
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("DIALCLOCK_DEFAULT_SKIN", "fancy");
        std::env::set_var("DIALCLOCK_DIGITAL_FONT__FAMILY", "monospace");
        let config = DialclockConfig::load(None);
        std::env::remove_var("DIALCLOCK_DEFAULT_SKIN");
        std::env::remove_var("DIALCLOCK_DIGITAL_FONT__FAMILY");

        let config = config.unwrap();
        assert_eq!(config.default_skin, "fancy");
        assert_eq!(config.digital_font.family, "monospace");
        assert_eq!(config.digital_font.size, 15.0);
    }
}
