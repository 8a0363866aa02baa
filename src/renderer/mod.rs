//! 2D rendering contract
//!
//! The game draws through [`RenderTarget`] only: rectangles, circles,
//! lines, text and sprite blits. Hosts implement it over whatever surface
//! they have; [`DrawList`] records the calls instead, for headless runs and
//! tests.

pub mod scene;

use glam::Vec2;

use crate::Rect;
use crate::assets::Handle;

pub use scene::draw_frame;

/// RGBA, each channel 0..=1
pub type Color = [f32; 4];

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = [0.388, 0.380, 0.443, 1.0];
    pub const TEXT: Color = [0.0, 0.0, 0.0, 1.0];
    pub const BOUNDARY: Color = [0.6, 0.6, 0.6, 1.0];
    pub const LASER: Color = [0.443, 0.792, 0.208, 1.0];
    pub const OUTLINE: Color = [0.867, 0.867, 0.867, 1.0];
    pub const ATTACKER: Color = [0.0, 1.0, 0.0, 1.0];
    pub const BUTTON: Color = [0.431, 0.537, 0.541, 1.0];
    pub const BUTTON_HOVER: Color = [0.533, 0.729, 0.733, 1.0];
    pub const SLIDER_TRACK: Color = [0.0, 0.333, 1.0, 1.0];
    pub const SLIDER_KNOB: Color = [0.0, 0.0, 0.0, 1.0];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

pub trait RenderTarget {
    /// Surface size in field units
    fn size(&self) -> Vec2;
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);
    fn circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool);
    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
    /// `pos` is the baseline anchor
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color, align: Align);
    /// Draw a loaded sprite stretched over `dest`
    fn blit(&mut self, sprite: &Handle, dest: Rect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color, width: f32 },
    Circle { center: Vec2, radius: f32, color: Color, filled: bool },
    Line { from: Vec2, to: Vec2, color: Color, width: f32 },
    Text { text: String, pos: Vec2, size: f32, color: Color, align: Align },
    Blit { path: String, dest: Rect },
}

/// Render target that records every call
#[derive(Debug, Clone)]
pub struct DrawList {
    size: Vec2,
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            cmds: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    /// Paths of every sprite blitted, in order
    pub fn blits(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Blit { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }
}

impl RenderTarget for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.cmds.push(DrawCmd::StrokeRect { rect, color, width });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            filled,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color, align: Align) {
        self.cmds.push(DrawCmd::Text {
            text: text.to_string(),
            pos,
            size,
            color,
            align,
        });
    }

    fn blit(&mut self, sprite: &Handle, dest: Rect) {
        self.cmds.push(DrawCmd::Blit {
            path: sprite.path.clone(),
            dest,
        });
    }
}
