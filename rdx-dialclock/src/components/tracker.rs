//! The registry of clock faces known to an engine.

use crate::common::{ClockId, ElementId};
use crate::components::face::ClockFace;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Owns every clock face and indexes it by host element.
///
/// Faces are never removed: a face whose element disappeared, or that was
/// stopped, stays tracked but inert. Tracking a new face for an element that
/// already has one points the element at the new face and stops the old one,
/// so a replaced face is never driven again.
#[derive(Debug, Default)]
pub struct ClockTracker {
    faces: SlotMap<ClockId, ClockFace>,
    by_element: HashMap<ElementId, ClockId>,
}

impl ClockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn track(&mut self, face: ClockFace) -> ClockId {
        let element = face.element().clone();
        let id = self.faces.insert(face);
        if let Some(replaced) = self.by_element.insert(element, id) {
            if let Some(old) = self.faces.get_mut(replaced) {
                old.stop();
            }
        }
        id
    }

    pub fn get(&self, id: ClockId) -> Option<&ClockFace> {
        self.faces.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ClockId) -> Option<&mut ClockFace> {
        self.faces.get_mut(id)
    }

    /// The id of the face currently mounted in `element`.
    pub fn lookup(&self, element: &ElementId) -> Option<ClockId> {
        self.by_element.get(element).copied()
    }

    /// The face currently mounted in `element`.
    pub fn find(&self, element: &ElementId) -> Option<&ClockFace> {
        self.lookup(element).and_then(|id| self.faces.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClockId, &ClockFace)> + '_ {
        self.faces.iter()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::face::ClockOptions;
    use crate::config::DialclockConfig;
    use crate::skin::SkinRegistry;
    use crate::surface::RecordingSurface;
    use crate::time::WallTime;

    fn face(element: &str) -> ClockFace {
        ClockFace::build(
            ClockOptions::new(element),
            &SkinRegistry::builtin().unwrap(),
            &DialclockConfig::default(),
            &mut RecordingSurface::new(),
            WallTime::new(0, 0, 0),
        )
    }

    #[test]
    fn lookup_by_element() {
        let mut tracker = ClockTracker::new();
        let a = tracker.track(face("a"));
        let b = tracker.track(face("b"));

        assert_ne!(a, b);
        assert_eq!(tracker.lookup(&"a".into()), Some(a));
        assert_eq!(tracker.find(&"b".into()).unwrap().element().as_str(), "b");
        assert!(tracker.lookup(&"c".into()).is_none());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn replacing_stops_the_old_face() {
        let mut tracker = ClockTracker::new();
        let old = tracker.track(face("a"));
        let new = tracker.track(face("a"));

        assert_eq!(tracker.lookup(&"a".into()), Some(new));
        assert!(!tracker.get(old).unwrap().is_active());
        assert!(tracker.get(new).unwrap().is_active());
        assert_eq!(tracker.len(), 2);
    }
}
