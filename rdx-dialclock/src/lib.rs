//! # Dialclock
//!
//! Skin-driven analog clock faces with a self-scheduling refresh loop.
//!
//! Dialclock turns a declarative skin (colors, stroke widths, hand lengths,
//! tick styles) plus the wall-clock time into a set of retained drawing
//! primitives, and keeps every face in step with real time.
//!
//! ## Core Concepts
//!
//! - **Skins**: named bundles of face geometry held in a `SkinRegistry`, seeded
//!   with built-in skins and extendable from TOML files.
//! - **Faces**: each `ClockFace` draws its border and ticks once, then only
//!   moves its hands (and, optionally, re-tints its background and redraws a
//!   digital readout) on every refresh.
//! - **Angle modes**: hands sweep linearly, logarithmically, or in the mirrored
//!   logarithmic sweep.
//! - **Timer chains**: a face's refresh loop is a chain of one-shot timers that
//!   re-arm only while the face is active and its host element still exists.
//! - **Capabilities**: drawing and document access go through the
//!   `DrawingSurface` and `HostDocument` traits; in-memory implementations are
//!   included.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dialclock::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Load configuration and skins.
//!     let config = DialclockConfig::load(None)?;
//!     let skins = SkinRegistry::from_config(&config)?;
//!
//!     // 2. Describe the host document.
//!     let mut document = MemoryDocument::new();
//!     document.insert("DialClock:chunkySwissOnBlack:120::::logClock");
//!
//!     // 3. Create the engine and discover the placeholders.
//!     let engine = DialclockEngine::new(config, skins, RecordingSurface::new(), document);
//!     engine.discover().await;
//!
//!     // 4. Keep the faces ticking until Ctrl+C.
//!     engine.run().await?;
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Dial Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod discovery;
pub mod document;
pub mod engine;
pub mod events;
pub mod skin;
pub mod surface;
pub mod time;

/// A prelude module for easy importing of the most common dialclock types.
pub mod prelude {
    pub use crate::common::{ClockId, ElementId, PrimitiveId};
    pub use crate::components::angle::AngleMode;
    pub use crate::components::face::{ClockFace, ClockOptions};
    pub use crate::components::tracker::ClockTracker;
    pub use crate::config::DialclockConfig;
    pub use crate::document::{HostDocument, MemoryDocument};
    pub use crate::engine::DialclockEngine;
    pub use crate::events::ClockEvent;
    pub use crate::skin::SkinRegistry;
    pub use crate::surface::{DrawingSurface, RecordingSurface};
    pub use crate::time::{FixedTimeSource, SystemTimeSource, TimeSource, WallTime};
}
