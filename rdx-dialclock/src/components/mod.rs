//! Contains the building blocks of a clock face.
//!
//! This module provides the pure mappings (hand angles, day/night tint,
//! digital readout) and the stateful pieces built on them: the face itself and
//! the tracker that owns every face. The `DialclockEngine` drives these
//! components on a timer.

pub mod angle;
pub mod daynight;
pub mod digital;
pub mod face;
pub mod tracker;
