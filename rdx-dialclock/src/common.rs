//! Contains common, primitive types shared across the crate.
//!
//! Clock faces and drawing primitives live in arenas and are addressed by
//! slotmap keys. Host elements are addressed by the string identifier the
//! host document knows them by.

use serde::Deserialize;
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Uniquely and safely identifies a clock face tracked by the engine.
    ///
    /// Keys are never reused, so a timer that fires for a face that has since
    /// been replaced resolves to nothing instead of driving the wrong face.
    pub struct ClockId;

    /// Identifies one primitive (circle, line or text) on a drawing surface.
    pub struct PrimitiveId;
}

/// The identifier of a host element that a clock face is attached to.
///
/// This is stable for the lifetime of the face and is what the engine uses to
/// check whether the face is still mounted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
