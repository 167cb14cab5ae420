//! A single rendered clock face.
//!
//! A face draws its static geometry (border and tick marks) once, keeps handles
//! to the primitives it must move on every refresh (hands, digital text), and
//! carries the run state the engine consults when a timer fires.

use crate::common::{ElementId, PrimitiveId};
use crate::components::angle::{tick_angle, AngleMode};
use crate::components::daynight::fill_color;
use crate::components::digital::format_time;
use crate::config::DialclockConfig;
use crate::skin::{OuterBorder, SkinElement, SkinRegistry};
use crate::surface::{Attributes, DrawingSurface};
use crate::time::WallTime;
use kurbo::Point;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Per-face settings, fixed once the face is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockOptions {
    /// The host element the face is mounted in.
    pub element: ElementId,
    /// Requested skin; the configured default is used when unset or unknown.
    pub skin: Option<String>,
    /// Requested display radius; the configured default is used when unset
    /// or zero.
    pub radius: Option<f64>,
    pub show_seconds: bool,
    /// Fixed offset from UTC in hours. `None` follows local time.
    pub gmt_offset: Option<f64>,
    pub show_digital: bool,
    pub angle_mode: AngleMode,
}

impl ClockOptions {
    /// Options for a face with the default skin and radius, a second hand,
    /// local time, no digital readout and linear hands.
    pub fn new(element: impl Into<ElementId>) -> Self {
        Self {
            element: element.into(),
            skin: None,
            radius: None,
            show_seconds: true,
            gmt_offset: None,
            show_digital: false,
            angle_mode: AngleMode::Linear,
        }
    }

    pub fn with_skin(mut self, skin: impl Into<String>) -> Self {
        self.skin = Some(skin.into());
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_seconds(mut self, show_seconds: bool) -> Self {
        self.show_seconds = show_seconds;
        self
    }

    pub fn with_gmt_offset(mut self, hours: f64) -> Self {
        self.gmt_offset = Some(hours);
        self
    }

    pub fn with_digital(mut self, show_digital: bool) -> Self {
        self.show_digital = show_digital;
        self
    }

    pub fn with_angle_mode(mut self, angle_mode: AngleMode) -> Self {
        self.angle_mode = angle_mode;
        self
    }
}

/// Authors skin geometry in render space.
#[derive(Debug, Clone, Copy)]
struct Painter {
    render_radius: f64,
    scale: f64,
}

impl Painter {
    fn center(&self) -> Point {
        Point::new(self.render_radius, self.render_radius)
    }

    fn border<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        border: &OuterBorder,
    ) -> PrimitiveId {
        let attributes = Attributes {
            stroke: border.color.clone(),
            fill: border.fill_color.clone(),
            stroke_width: border.line_width * self.scale,
            opacity: border.alpha,
        };
        surface.circle(self.center(), border.radius, attributes)
    }

    /// Draws an element lying along the +x axis out of the face center.
    fn radial<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        element: &SkinElement,
    ) -> PrimitiveId {
        let mut attributes = Attributes {
            stroke: Some(element.color().to_string()),
            fill: None,
            stroke_width: element.line_width() * self.scale,
            opacity: element.alpha(),
        };
        let r = self.render_radius;
        match element {
            SkinElement::Dot(dot) => {
                attributes.fill = dot.fill_color.clone();
                surface.circle(Point::new(r + dot.start_at, r), dot.radius, attributes)
            }
            SkinElement::Line(line) => surface.line(
                Point::new(r + line.start_at, r),
                Point::new(r + line.end_at, r),
                attributes,
            ),
        }
    }
}

/// One clock face mounted in a host element.
#[derive(Debug)]
pub struct ClockFace {
    options: ClockOptions,
    skin_id: String,
    display_radius: f64,
    render_radius: f64,
    scale: f64,
    tick_delay: Duration,
    auto_fill: bool,
    outer_border: Option<PrimitiveId>,
    ticks: Vec<PrimitiveId>,
    digital_text: Option<PrimitiveId>,
    hour_hand: Option<PrimitiveId>,
    minute_hand: Option<PrimitiveId>,
    second_hand: Option<PrimitiveId>,
    second_decoration: Option<PrimitiveId>,
    active: bool,
    pending: Option<AbortHandle>,
    renders: u64,
}

impl ClockFace {
    /// Resolves the skin and draws the face's primitives.
    ///
    /// Hands are created without a rotation; the first [`render`](Self::render)
    /// positions them. The face starts out active.
    pub(crate) fn build<S: DrawingSurface + ?Sized>(
        options: ClockOptions,
        skins: &SkinRegistry,
        config: &DialclockConfig,
        surface: &mut S,
        now: WallTime,
    ) -> Self {
        let resolved = skins.resolve(options.skin.as_deref(), &config.default_skin);
        let skin = resolved.skin;
        let display_radius = match options.radius {
            Some(radius) if radius != 0.0 && radius.is_finite() => radius,
            _ => config.default_radius,
        };
        let render_radius = config.render_radius;
        let scale = display_radius / render_radius;
        let painter = Painter { render_radius, scale };
        let display_center = Point::new(display_radius, display_radius);

        let outer_border = skin
            .outer_border
            .as_ref()
            .map(|border| painter.border(surface, border));
        let auto_fill = skin.outer_border.as_ref().is_some_and(|border| border.auto_fill);

        // Every fifth tick is a large one.
        let mut ticks = Vec::new();
        for i in 0..60u32 {
            let style = if i % 5 == 0 {
                &skin.large_indicator
            } else {
                &skin.small_indicator
            };
            if let Some(element) = style {
                let tick = painter.radial(surface, element);
                surface.rotate(tick, f64::from(i * 6), display_center);
                ticks.push(tick);
            }
        }

        let hour_hand = skin.hour_hand.as_ref().map(|e| painter.radial(surface, e));
        let minute_hand = skin.minute_hand.as_ref().map(|e| painter.radial(surface, e));
        let (second_hand, second_decoration) = if options.show_seconds {
            (
                skin.second_hand.as_ref().map(|e| painter.radial(surface, e)),
                skin.second_decoration.as_ref().map(|e| painter.radial(surface, e)),
            )
        } else {
            (None, None)
        };

        let statics = outer_border.iter().chain(ticks.iter());
        let hands = [hour_hand, minute_hand, second_hand, second_decoration];
        for id in statics.chain(hands.iter().flatten()) {
            surface.scale(*id, scale, Point::ORIGIN);
        }

        let mut face = Self {
            skin_id: resolved.id.to_string(),
            tick_delay: config.tick_delay(options.show_seconds),
            options,
            display_radius,
            render_radius,
            scale,
            auto_fill,
            outer_border,
            ticks,
            digital_text: None,
            hour_hand,
            minute_hand,
            second_hand,
            second_decoration,
            active: true,
            pending: None,
            renders: 0,
        };
        if face.options.show_digital {
            face.digital_text = Some(face.draw_digital(now, config, surface));
        }
        face
    }

    /// Redraws the parts of the face that change with time.
    ///
    /// Border and ticks are never repositioned; the border fill is refreshed
    /// when the skin asks for auto-fill.
    pub(crate) fn render<S: DrawingSurface + ?Sized>(
        &mut self,
        time: WallTime,
        config: &DialclockConfig,
        surface: &mut S,
    ) {
        if self.auto_fill {
            if let Some(border) = self.outer_border {
                surface.set_fill(border, &fill_color(time.minute_of_day()));
            }
        }

        if self.options.show_digital {
            if let Some(previous) = self.digital_text.take() {
                surface.remove(previous);
            }
            self.digital_text = Some(self.draw_digital(time, config, surface));
        }

        let hour = f64::from(time.hour % 12) * 5.0 + f64::from(time.minute) / 12.0;
        let minute = f64::from(time.minute) + f64::from(time.second) / 60.0;
        let second = f64::from(time.second);
        self.point(surface, self.hour_hand, hour);
        self.point(surface, self.minute_hand, minute);
        self.point(surface, self.second_hand, second);
        self.point(surface, self.second_decoration, second);

        self.renders += 1;
    }

    fn point<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        hand: Option<PrimitiveId>,
        position: f64,
    ) {
        if let Some(hand) = hand {
            let degrees = tick_angle(position, self.options.angle_mode) * 360.0;
            surface.rotate(hand, degrees, self.display_center());
        }
    }

    fn draw_digital<S: DrawingSurface + ?Sized>(
        &self,
        time: WallTime,
        config: &DialclockConfig,
        surface: &mut S,
    ) -> PrimitiveId {
        let content = format_time(
            time.hour,
            time.minute,
            time.second,
            config.show_am_pm,
            config.show_secs,
        );
        let at = Point::new(self.render_radius, self.render_radius * 1.5);
        let text = surface.text(at, &content, &config.digital_font);
        surface.scale(text, self.scale, Point::ORIGIN);
        text
    }

    /// Marks the face inactive and cancels its pending timer.
    pub(crate) fn stop(&mut self) {
        self.active = false;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub(crate) fn set_active(&mut self) {
        self.active = true;
    }

    /// Holds the timer for the next tick, cancelling any previous one.
    pub(crate) fn arm(&mut self, pending: AbortHandle) {
        if let Some(previous) = self.pending.replace(pending) {
            previous.abort();
        }
    }

    pub fn element(&self) -> &ElementId {
        &self.options.element
    }

    pub fn options(&self) -> &ClockOptions {
        &self.options
    }

    /// The skin id the face was actually drawn with.
    pub fn skin_id(&self) -> &str {
        &self.skin_id
    }

    pub fn display_radius(&self) -> f64 {
        self.display_radius
    }

    /// Ratio of display radius to render radius.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn display_center(&self) -> Point {
        Point::new(self.display_radius, self.display_radius)
    }

    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a timer for the next tick is armed and has not fired yet.
    pub fn is_scheduled(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
    }

    /// Number of renders performed so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn outer_border(&self) -> Option<PrimitiveId> {
        self.outer_border
    }

    pub fn ticks(&self) -> &[PrimitiveId] {
        &self.ticks
    }

    pub fn digital_text(&self) -> Option<PrimitiveId> {
        self.digital_text
    }

    pub fn hour_hand(&self) -> Option<PrimitiveId> {
        self.hour_hand
    }

    pub fn minute_hand(&self) -> Option<PrimitiveId> {
        self.minute_hand
    }

    pub fn second_hand(&self) -> Option<PrimitiveId> {
        self.second_hand
    }

    pub fn second_decoration(&self) -> Option<PrimitiveId> {
        self.second_decoration
    }
}
