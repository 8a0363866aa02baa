//! Clickable buttons and horizontal value sliders

use glam::Vec2;

use crate::Rect;

/// Gap between a slider's label line and its track
pub const TRACK_OFFSET: f32 = 20.0;
/// Width assumed per label character when sizing buttons
const CHAR_WIDTH: f32 = 10.0;
const BUTTON_PAD: Vec2 = Vec2::new(25.0, 18.0);

/// Approximate rendered width of `text`
pub fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_WIDTH
}

/// Text button with a padded hit box
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub rect: Rect,
    pub hover: bool,
}

impl Button {
    /// Button whose text box starts at `pos`
    pub fn new(label: impl Into<String>, pos: Vec2, text_height: f32) -> Self {
        let label = label.into();
        let text = Vec2::new(text_width(&label), text_height);
        Self {
            rect: Rect::from_pos_size(pos - Vec2::new(10.0, 0.0), text + BUTTON_PAD),
            label,
            hover: false,
        }
    }

    /// Button of the given label anchored by its right edge at `right`
    pub fn right_aligned(label: impl Into<String>, right: f32, y: f32, text_height: f32) -> Self {
        let label = label.into();
        let width = text_width(&label);
        Self::new(label, Vec2::new(right - width, y), text_height)
    }

    pub fn hit(&self, p: Vec2) -> bool {
        self.rect.contains(p)
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}

/// Horizontal slider mapping a knob position onto `[min, max]`
///
/// `step` quantizes the displayed value; 0 means continuous.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub label: &'static str,
    pub units: &'static str,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    knob_x: f32,
    value: f32,
    display: f32,
}

impl Slider {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        label: &'static str,
        units: &'static str,
        pos: Vec2,
        width: f32,
        height: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> Self {
        Self {
            label,
            units,
            pos,
            width,
            height,
            min,
            max,
            step,
            knob_x: pos.x,
            value: min,
            display: min,
        }
    }

    /// Continuous value under the knob
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value snapped to the nearest step
    pub fn display_value(&self) -> f32 {
        self.display
    }

    /// Center of the knob
    pub fn knob(&self) -> Vec2 {
        Vec2::new(self.knob_x, self.pos.y + TRACK_OFFSET)
    }

    pub fn radius(&self) -> f32 {
        self.height / 2.0
    }

    /// Move the knob to `value`; out-of-range values are ignored
    pub fn set_value(&mut self, value: f32) -> bool {
        if !(self.min..=self.max).contains(&value) {
            log::warn!("{}: ignoring out of range value {}", self.label, value);
            return false;
        }
        self.knob_x = self.width * ((value - self.min) / (self.max - self.min)) + self.pos.x;
        self.value = value;
        self.update_display();
        true
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
        self.set_value(self.value);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_pos(self.pos + delta);
    }

    /// Drag the knob horizontally, clamped to the track; returns the
    /// snapped value
    pub fn slide(&mut self, dx: f32) -> f32 {
        self.knob_x = (self.knob_x + dx).clamp(self.pos.x, self.pos.x + self.width);
        self.value = (self.max - self.min) * ((self.knob_x - self.pos.x) / self.width) + self.min;
        self.update_display();
        self.display
    }

    /// Whether `p` grabs the knob
    pub fn hit(&self, p: Vec2) -> bool {
        let k = self.knob();
        let r = self.radius();
        p.x > k.x - r && p.x < k.x + r && p.y > k.y - r && p.y < k.y + r
    }

    fn update_display(&mut self) {
        if self.step == 0.0 {
            self.display = self.value;
            return;
        }
        let floor = self.min + self.step * ((self.value - self.min) / self.step).floor();
        self.display = if self.value - floor > self.step / 2.0 {
            floor + self.step
        } else {
            floor
        };
    }
}
