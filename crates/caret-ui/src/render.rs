//! Drawing primitives.
//!
//! Widgets never talk to a graphics API. They draw through [`Painter`], which a host backs with
//! whatever it renders with; [`DrawList`] records the calls for off-screen surfaces and tests.

use crate::geometry::{Point, Rect};
use caret_core::Rgba;

/// Fill and outline of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    /// Fill colour.
    pub background: Rgba,
    /// Outline colour.
    pub border: Rgba,
    /// Outline width in pixels; zero draws no outline.
    pub border_width: f64,
    /// Corner radius in pixels.
    pub radius: f64,
}

impl RectStyle {
    /// A plain filled rectangle.
    pub const fn filled(background: Rgba) -> Self {
        Self {
            background,
            border: Rgba::TRANSPARENT,
            border_width: 0.0,
            radius: 0.0,
        }
    }

    /// The same style with rounded corners.
    pub const fn rounded(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// The same style with an outline.
    pub const fn bordered(mut self, border: Rgba, width: f64) -> Self {
        self.border = border;
        self.border_width = width;
        self
    }

    /// Returns `true` if drawing this style would produce nothing.
    pub fn is_invisible(&self) -> bool {
        self.background.a <= 0.0 && (self.border_width <= 0.0 || self.border.a <= 0.0)
    }
}

impl Default for RectStyle {
    fn default() -> Self {
        Self::filled(Rgba::TRANSPARENT)
    }
}

/// Handle of an off-screen surface owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Text style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Host font id.
    pub font: u32,
    /// Size in pixels.
    pub size: f64,
    /// Colour.
    pub color: Rgba,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: 0,
            size: 14.0,
            color: Rgba::new(0.85, 0.85, 0.85, 1.0),
        }
    }
}

/// The three primitives a host has to provide.
pub trait Painter {
    /// Draw a styled rectangle.
    fn rect(&mut self, rect: Rect, style: &RectStyle);
    /// Draw an off-screen surface into `rect`.
    fn textured_rect(&mut self, rect: Rect, surface: SurfaceId);
    /// Draw `text` with its baseline-left corner at `at`.
    fn text(&mut self, at: Point, style: &TextStyle, text: &str);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// [`Painter::rect`].
    Rect {
        /// Target rectangle.
        rect: Rect,
        /// Style.
        style: RectStyle,
    },
    /// [`Painter::textured_rect`].
    Textured {
        /// Target rectangle.
        rect: Rect,
        /// Surface drawn.
        surface: SurfaceId,
    },
    /// [`Painter::text`].
    Text {
        /// Baseline-left corner.
        at: Point,
        /// Style.
        style: TextStyle,
        /// The string.
        text: String,
    },
}

/// A [`Painter`] that records what it is asked to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands, in call order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replay the recorded calls on another painter.
    pub fn replay(&self, painter: &mut dyn Painter) {
        for command in &self.commands {
            match command {
                DrawCommand::Rect { rect, style } => painter.rect(*rect, style),
                DrawCommand::Textured { rect, surface } => painter.textured_rect(*rect, *surface),
                DrawCommand::Text { at, style, text } => painter.text(*at, style, text),
            }
        }
    }

    /// Strings drawn, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Painter for DrawList {
    fn rect(&mut self, rect: Rect, style: &RectStyle) {
        if style.is_invisible() || rect.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Rect {
            rect,
            style: *style,
        });
    }

    fn textured_rect(&mut self, rect: Rect, surface: SurfaceId) {
        self.commands.push(DrawCommand::Textured { rect, surface });
    }

    fn text(&mut self, at: Point, style: &TextStyle, text: &str) {
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text {
            at,
            style: *style,
            text: text.to_string(),
        });
    }
}
