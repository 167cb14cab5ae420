//! Skin definitions and the registry that maps skin ids to them.
//!
//! A skin describes one clock-face style: the outer border, the two kinds of
//! tick marks, and the hands. Every element is optional; a missing element is
//! simply not drawn. Geometry is authored against the configured render radius
//! and scaled to each face's display radius.
//!
//! Skins are loaded from TOML documents made of `[[skins]]` tables. The
//! built-in set is embedded in the binary; skin files listed in the
//! configuration extend it at startup.

use crate::config::DialclockConfig;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const BUILTIN_SKINS: &str = include_str!("../skins/builtin.toml");

/// A named bundle of visual parameters for one clock face style.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SkinDefinition {
    pub outer_border: Option<OuterBorder>,
    pub small_indicator: Option<SkinElement>,
    pub large_indicator: Option<SkinElement>,
    pub hour_hand: Option<SkinElement>,
    pub minute_hand: Option<SkinElement>,
    pub second_hand: Option<SkinElement>,
    pub second_decoration: Option<SkinElement>,
}

/// The circle drawn around the face.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OuterBorder {
    pub radius: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    pub color: Option<String>,
    pub fill_color: Option<String>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Tint the background by time of day instead of using a fixed fill.
    #[serde(default)]
    pub auto_fill: bool,
}

/// A tick mark or hand, positioned along the axis running out of the face
/// center.
///
/// The two shapes are told apart solely by the presence of `radius`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SkinElement {
    Dot(DotElement),
    Line(LineElement),
}

/// A circle centered `start_at` units out from the face center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DotElement {
    pub radius: f64,
    #[serde(default)]
    pub start_at: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_color")]
    pub color: String,
    pub fill_color: Option<String>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

/// A straight segment from `start_at` to `end_at` along the axis.
///
/// `start_at` may be negative to draw through the center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineElement {
    pub start_at: f64,
    pub end_at: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl SkinElement {
    pub fn line_width(&self) -> f64 {
        match self {
            Self::Dot(dot) => dot.line_width,
            Self::Line(line) => line.line_width,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Self::Dot(dot) => &dot.color,
            Self::Line(line) => &line.color,
        }
    }

    pub fn alpha(&self) -> f64 {
        match self {
            Self::Dot(dot) => dot.alpha,
            Self::Line(line) => line.alpha,
        }
    }
}

// --- Default value functions for serde ---

fn default_line_width() -> f64 {
    1.0
}

fn default_alpha() -> f64 {
    1.0
}

fn default_color() -> String {
    "black".to_string()
}

#[derive(Debug, Deserialize)]
struct SkinFile {
    #[serde(default)]
    skins: Vec<SkinEntry>,
}

#[derive(Debug, Deserialize)]
struct SkinEntry {
    id: String,
    #[serde(flatten)]
    definition: SkinDefinition,
}

/// Used when neither the requested skin nor the fallback exists.
static EMPTY_SKIN: SkinDefinition = SkinDefinition {
    outer_border: None,
    small_indicator: None,
    large_indicator: None,
    hour_hand: None,
    minute_hand: None,
    second_hand: None,
    second_decoration: None,
};

/// A skin looked up in the registry, together with the id it was found under.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSkin<'a> {
    pub id: &'a str,
    pub skin: &'a SkinDefinition,
}

/// Maps skin ids to skin definitions.
///
/// The registry is populated at startup and then shared read-only; the
/// renderer never mutates it.
#[derive(Debug, Clone, Default)]
pub struct SkinRegistry {
    skins: HashMap<String, SkinDefinition>,
}

impl SkinRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in skins.
    pub fn builtin() -> anyhow::Result<Self> {
        let mut registry = Self::new();
        registry.extend_from_toml_str(BUILTIN_SKINS)?;
        Ok(registry)
    }

    /// Creates a registry with the built-in skins plus every skin file named in
    /// the configuration, in order. Later files override earlier ids.
    pub fn from_config(config: &DialclockConfig) -> anyhow::Result<Self> {
        let mut registry = Self::builtin()?;
        for path in &config.skin_files {
            registry.extend_from_file(path)?;
        }
        Ok(registry)
    }

    /// Adds or replaces a skin, returning the previous definition if any.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        skin: SkinDefinition,
    ) -> Option<SkinDefinition> {
        self.skins.insert(id.into(), skin)
    }

    /// Merges every `[[skins]]` table of a TOML document into the registry.
    ///
    /// Returns the number of skins read.
    pub fn extend_from_toml_str(&mut self, source: &str) -> anyhow::Result<usize> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Ok(self.absorb(settings.try_deserialize()?))
    }

    /// Merges a skin file into the registry. The format is inferred from the
    /// file extension.
    pub fn extend_from_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let settings = Config::builder().add_source(File::from(path)).build()?;
        let count = self.absorb(settings.try_deserialize()?);
        debug!("Loaded {} skins from {}", count, path.display());
        Ok(count)
    }

    fn absorb(&mut self, file: SkinFile) -> usize {
        let count = file.skins.len();
        for entry in file.skins {
            self.skins.insert(entry.id, entry.definition);
        }
        count
    }

    pub fn get(&self, id: &str) -> Option<&SkinDefinition> {
        self.skins.get(id)
    }

    /// Looks up `requested`, falling back to `fallback` when it is absent or
    /// unknown. Never fails: if the fallback is missing too, an empty skin
    /// (which draws nothing) is returned.
    pub fn resolve<'a>(
        &'a self,
        requested: Option<&'a str>,
        fallback: &'a str,
    ) -> ResolvedSkin<'a> {
        if let Some(id) = requested {
            if let Some(skin) = self.skins.get(id) {
                return ResolvedSkin { id, skin };
            }
            debug!("Unknown skin '{}', falling back to '{}'", id, fallback);
        }
        let skin = self.skins.get(fallback).unwrap_or(&EMPTY_SKIN);
        ResolvedSkin { id: fallback, skin }
    }

    /// Returns all registered skin ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.skins.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}
