//! Paint recording.
//!
//! Widgets paint into a [`PaintContext`], which records primitives in draw
//! order together with the clip in effect when they were recorded. A backend
//! (or a test) walks the recorded lists after the paint pass.

pub mod primitives;

use crate::widgets::{Color, Rect};

use primitives::{PieSlice, RoundedRect, TextEntry};

pub struct PaintContext {
    shapes: Vec<RoundedRect>,
    pies: Vec<PieSlice>,
    texts: Vec<TextEntry>,
    /// Clip stack for clipping children to container bounds
    clip_stack: Vec<Rect>,
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintContext {
    pub fn new() -> Self {
        Self {
            shapes: Vec::with_capacity(64),
            pies: Vec::with_capacity(4),
            texts: Vec::with_capacity(32),
            clip_stack: Vec::with_capacity(4),
        }
    }

    /// Clear all buffers for reuse, preserving allocated capacity
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.pies.clear();
        self.texts.clear();
        self.clip_stack.clear();
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.draw_rounded_rect(rect, color, 0.0);
    }

    pub fn draw_rounded_rect(&mut self, rect: Rect, color: Color, radius: f32) {
        let clip_rect = self.intersected_clip_rect();
        self.shapes.push(RoundedRect {
            rect,
            color,
            corner_radius: radius,
            clip_rect,
        });
    }

    /// Draw a filled pie slice, used by the progress indicator.
    pub fn draw_pie_slice(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
    ) {
        let clip_rect = self.intersected_clip_rect();
        self.pies.push(PieSlice {
            center_x,
            center_y,
            radius,
            start_angle,
            sweep_angle,
            color,
            clip_rect,
        });
    }

    pub fn draw_text(&mut self, text: &str, rect: Rect, color: Color, font_size: f32) {
        let clip_rect = self.intersected_clip_rect();
        self.texts.push(TextEntry {
            text: text.to_string(),
            rect,
            color,
            font_size,
            clip_rect,
        });
    }

    /// Push a clip region onto the stack.
    /// Everything drawn after this is clipped to the given bounds.
    pub fn push_clip(&mut self, rect: Rect) {
        self.clip_stack.push(rect);
    }

    /// Pop a clip region from the stack
    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    /// Intersection of all clips currently on the stack, if any
    fn intersected_clip_rect(&self) -> Option<Rect> {
        let mut iter = self.clip_stack.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, clip| acc.intersection(clip)))
    }

    /// Recorded rectangle shapes, in draw order
    pub fn shapes(&self) -> &[RoundedRect] {
        &self.shapes
    }

    /// Recorded pie slices, in draw order
    pub fn pies(&self) -> &[PieSlice] {
        &self.pies
    }

    /// Recorded text entries, in draw order
    pub fn texts(&self) -> &[TextEntry] {
        &self.texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_outside_clip_records_clip() {
        let mut ctx = PaintContext::new();
        ctx.push_clip(Rect::new(0.0, 10.0, 100.0, 50.0));
        ctx.draw_rect(Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE);
        ctx.pop_clip();
        ctx.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);

        assert_eq!(ctx.shapes().len(), 2);
        assert_eq!(
            ctx.shapes()[0].clip_rect,
            Some(Rect::new(0.0, 10.0, 100.0, 50.0))
        );
        assert!(ctx.shapes()[1].clip_rect.is_none());
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut ctx = PaintContext::new();
        ctx.push_clip(Rect::new(0.0, 0.0, 100.0, 100.0));
        ctx.push_clip(Rect::new(50.0, 50.0, 100.0, 100.0));
        ctx.draw_rect(Rect::new(0.0, 0.0, 200.0, 200.0), Color::WHITE);

        let clip = ctx.shapes()[0].clip_rect.unwrap();
        assert_eq!(clip, Rect::new(50.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn test_clear_preserves_nothing() {
        let mut ctx = PaintContext::new();
        ctx.draw_text("hello", Rect::new(0.0, 0.0, 50.0, 20.0), Color::WHITE, 13.0);
        ctx.draw_pie_slice(10.0, 10.0, 8.0, 0.0, -1.0, Color::WHITE);
        ctx.clear();
        assert!(ctx.shapes().is_empty());
        assert!(ctx.pies().is_empty());
        assert!(ctx.texts().is_empty());
    }
}
