//! Draw primitives recorded by [`PaintContext`](super::PaintContext).
//!
//! The crate records what to draw; a rendering backend consumes the recorded
//! primitives after each paint pass.

use crate::widgets::{Color, Rect};

/// A solid rounded rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub rect: Rect,
    pub color: Color,
    pub corner_radius: f32,
    /// Clip applied when the shape was recorded, in view space
    pub clip_rect: Option<Rect>,
}

impl RoundedRect {
    pub fn new(rect: Rect, color: Color, corner_radius: f32) -> Self {
        Self {
            rect,
            color,
            corner_radius,
            clip_rect: None,
        }
    }
}

/// A filled pie slice anchored at 12 o'clock.
///
/// `sweep_angle` is in radians; negative values sweep counter-clockwise,
/// which is the direction the progress indicator fills in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Start angle in radians, measured from the positive x axis
    pub start_angle: f32,
    /// Signed sweep in radians from the start angle
    pub sweep_angle: f32,
    pub color: Color,
    pub clip_rect: Option<Rect>,
}

/// A text run positioned inside a rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub text: String,
    pub rect: Rect,
    pub color: Color,
    pub font_size: f32,
    pub clip_rect: Option<Rect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_records_no_clip() {
        let shape = RoundedRect::new(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE, 2.0);
        assert!(shape.clip_rect.is_none());
        assert_eq!(shape.corner_radius, 2.0);
    }
}
