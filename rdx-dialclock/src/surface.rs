//! The drawing-surface capability the clock faces render into.
//!
//! A surface holds retained primitives (circles, lines and text) that can be
//! created, mutated, transformed and removed. Transforms are absolute and
//! repeatable: setting a rotation replaces the previous rotation rather than
//! accumulating onto it.
//!
//! Transform order: a primitive's geometry is first scaled about the scale
//! origin, then rotated about the rotation pivot. Clock faces author their
//! geometry in render space, scale it about the origin into display space, and
//! rotate hands about the display-space center.
//!
//! [`RecordingSurface`] is an in-memory implementation that keeps the scene
//! inspectable and can serialize it as SVG.

use crate::common::PrimitiveId;
use kurbo::{Affine, Point};
use serde::Deserialize;
use slotmap::SlotMap;
use std::fmt::Write as _;

/// Paint attributes shared by every primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub stroke: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            stroke: None,
            fill: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Font attributes of a text primitive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Font {
    pub size: f64,
    pub family: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            size: 15.0,
            family: "Arial, Helvetica, sans-serif".to_string(),
        }
    }
}

/// The geometry of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { center: Point, radius: f64 },
    Line { from: Point, to: Point },
    Text { at: Point, content: String, font: Font },
}

/// A rotation in degrees about a pivot point. Positive is clockwise on a
/// y-down surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub degrees: f64,
    pub pivot: Point,
}

/// A uniform scale about an origin point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub factor: f64,
    pub origin: Point,
}

/// The transforms currently applied to a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub rotation: Option<Rotation>,
    pub scale: Option<Scaling>,
}

impl Transform {
    /// The combined affine map: scale first, then rotation.
    pub fn affine(&self) -> Affine {
        let scale = match self.scale {
            Some(Scaling { factor, origin }) => {
                Affine::translate(origin.to_vec2())
                    * Affine::scale(factor)
                    * Affine::translate(-origin.to_vec2())
            }
            None => Affine::IDENTITY,
        };
        let rotation = match self.rotation {
            Some(Rotation { degrees, pivot }) => Affine::rotate_about(degrees.to_radians(), pivot),
            None => Affine::IDENTITY,
        };
        rotation * scale
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale.map_or(1.0, |scale| scale.factor)
    }
}

/// One retained primitive on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub attributes: Attributes,
    pub transform: Transform,
}

impl Primitive {
    /// Returns the shape with the current transform applied to its geometry.
    ///
    /// Stroke widths are left as authored.
    pub fn resolved(&self) -> Shape {
        let affine = self.transform.affine();
        let factor = self.transform.scale_factor();
        match &self.shape {
            Shape::Circle { center, radius } => Shape::Circle {
                center: affine * *center,
                radius: radius * factor,
            },
            Shape::Line { from, to } => Shape::Line {
                from: affine * *from,
                to: affine * *to,
            },
            Shape::Text { at, content, font } => Shape::Text {
                at: affine * *at,
                content: content.clone(),
                font: Font {
                    size: font.size * factor,
                    family: font.family.clone(),
                },
            },
        }
    }
}

/// A 2D vector-drawing surface.
///
/// Operations on an id that no longer exists are ignored.
pub trait DrawingSurface: Send + Sync {
    /// Creates a circle.
    fn circle(&mut self, center: Point, radius: f64, attributes: Attributes) -> PrimitiveId;

    /// Creates a straight line path between two points.
    fn line(&mut self, from: Point, to: Point, attributes: Attributes) -> PrimitiveId;

    /// Creates a text primitive centered on `at`.
    fn text(&mut self, at: Point, content: &str, font: &Font) -> PrimitiveId;

    /// Replaces the fill color of an existing primitive.
    fn set_fill(&mut self, id: PrimitiveId, fill: &str);

    /// Sets the rotation of a primitive, replacing any previous rotation.
    fn rotate(&mut self, id: PrimitiveId, degrees: f64, pivot: Point);

    /// Sets the scale of a primitive, replacing any previous scale.
    fn scale(&mut self, id: PrimitiveId, factor: f64, origin: Point);

    /// Removes a primitive from the surface.
    fn remove(&mut self, id: PrimitiveId);
}

/// An in-memory surface that records the scene it is asked to draw.
///
/// Every mutation bumps [`revision`](Self::revision), which makes it easy to
/// observe whether anything was drawn between two points in time.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    primitives: SlotMap<PrimitiveId, Primitive>,
    order: Vec<PrimitiveId>,
    revision: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id)
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Monotonic counter of mutations applied to the surface.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Iterates over live primitives in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.primitives.get(*id).map(|primitive| (*id, primitive)))
    }

    /// Serializes the resolved scene as a standalone SVG document.
    pub fn to_svg(&self, width: f64, height: f64) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.2}" height="{:.2}">"#,
            width, height
        );
        for (_, primitive) in self.iter() {
            let paint = paint_attributes(&primitive.attributes);
            let _ = match primitive.resolved() {
                Shape::Circle { center, radius } => writeln!(
                    out,
                    r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" {}/>"#,
                    center.x, center.y, radius, paint
                ),
                Shape::Line { from, to } => writeln!(
                    out,
                    r#"  <path d="M{:.2} {:.2}L{:.2} {:.2}" {}/>"#,
                    from.x, from.y, to.x, to.y, paint
                ),
                Shape::Text { at, content, font } => writeln!(
                    out,
                    r#"  <text x="{:.2}" y="{:.2}" {} {} {}>{}</text>"#,
                    at.x,
                    at.y,
                    font_attributes(&font),
                    TEXT_ANCHOR,
                    paint,
                    escape(&content)
                ),
            };
        }
        out.push_str("</svg>\n");
        out
    }

    fn insert(&mut self, shape: Shape, attributes: Attributes) -> PrimitiveId {
        let id = self.primitives.insert(Primitive {
            shape,
            attributes,
            transform: Transform::default(),
        });
        self.order.push(id);
        self.revision += 1;
        id
    }

    fn modify(&mut self, id: PrimitiveId, change: impl FnOnce(&mut Primitive)) {
        if let Some(primitive) = self.primitives.get_mut(id) {
            change(primitive);
            self.revision += 1;
        }
    }
}

impl DrawingSurface for RecordingSurface {
    fn circle(&mut self, center: Point, radius: f64, attributes: Attributes) -> PrimitiveId {
        self.insert(Shape::Circle { center, radius }, attributes)
    }

    fn line(&mut self, from: Point, to: Point, attributes: Attributes) -> PrimitiveId {
        self.insert(Shape::Line { from, to }, attributes)
    }

    fn text(&mut self, at: Point, content: &str, font: &Font) -> PrimitiveId {
        let attributes = Attributes {
            fill: Some("black".to_string()),
            ..Attributes::default()
        };
        let shape = Shape::Text {
            at,
            content: content.to_string(),
            font: font.clone(),
        };
        self.insert(shape, attributes)
    }

    fn set_fill(&mut self, id: PrimitiveId, fill: &str) {
        self.modify(id, |primitive| primitive.attributes.fill = Some(fill.to_string()));
    }

    fn rotate(&mut self, id: PrimitiveId, degrees: f64, pivot: Point) {
        self.modify(id, |primitive| {
            primitive.transform.rotation = Some(Rotation { degrees, pivot });
        });
    }

    fn scale(&mut self, id: PrimitiveId, factor: f64, origin: Point) {
        self.modify(id, |primitive| {
            primitive.transform.scale = Some(Scaling { factor, origin });
        });
    }

    fn remove(&mut self, id: PrimitiveId) {
        if self.primitives.remove(id).is_some() {
            self.order.retain(|other| *other != id);
            self.revision += 1;
        }
    }
}

const TEXT_ANCHOR: &str = r#"text-anchor="middle" dominant-baseline="middle""#;

fn font_attributes(font: &Font) -> String {
    format!(
        r#"font-size="{:.2}" font-family="{}""#,
        font.size,
        escape(&font.family)
    )
}

fn paint_attributes(attributes: &Attributes) -> String {
    format!(
        r#"stroke="{}" fill="{}" stroke-width="{:.2}" opacity="{:.2}""#,
        escape(attributes.stroke.as_deref().unwrap_or("none")),
        escape(attributes.fill.as_deref().unwrap_or("none")),
        attributes.stroke_width,
        attributes.opacity
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
