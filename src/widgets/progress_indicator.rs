//! Circular progress indicator driven by the refresh control.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Instant;

use crate::invalidation::{request_frame, ChangeFlags, WidgetId};
use crate::layout::{Constraints, Size};
use crate::render::PaintContext;
use crate::widgets::widget::{Color, Rect, Widget};

/// Size class for the indicator, mapping to a diameter in points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlSize {
    Mini,
    #[default]
    Small,
    Regular,
}

impl ControlSize {
    pub fn diameter(&self) -> f32 {
        match self {
            ControlSize::Mini => 12.0,
            ControlSize::Small => 16.0,
            ControlSize::Regular => 32.0,
        }
    }
}

/// Angular velocity of the indeterminate spin, in radians per second
const SPIN_RATE: f32 = 1.5 * TAU;
/// Visible sweep while spinning, as a fraction of the full circle
const SPIN_SWEEP: f32 = 0.75;

/// A circular progress/spinner view.
///
/// The visible sweep is a pie slice from 12 o'clock, growing
/// counter-clockwise with the 0–1 progress value. While spinning, a partial
/// slice rotates at a fixed rate instead.
pub struct ProgressIndicator {
    widget_id: WidgetId,
    dirty_flags: ChangeFlags,
    progress: f32,
    spinning: bool,
    spin_started: Option<Instant>,
    control_size: ControlSize,
    color: Color,
    hidden: bool,
    bounds: Rect,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self {
            widget_id: WidgetId::next(),
            dirty_flags: ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT,
            progress: 0.0,
            spinning: false,
            spin_started: None,
            control_size: ControlSize::Small,
            color: Color::rgba(1.0, 1.0, 1.0, 0.85),
            hidden: false,
            bounds: Rect::default(),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.widget_id
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Set the progress value, clamped to [0, 1].
    /// Any change marks the indicator paint-dirty and requests a frame.
    pub fn set_progress(&mut self, progress: f32) {
        let clamped = progress.clamp(0.0, 1.0);
        if clamped != self.progress {
            self.progress = clamped;
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Begin the indeterminate spin animation
    pub fn start_animation(&mut self) {
        if !self.spinning {
            self.spinning = true;
            self.spin_started = Some(Instant::now());
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    /// Stop the indeterminate spin animation
    pub fn stop_animation(&mut self) {
        if self.spinning {
            self.spinning = false;
            self.spin_started = None;
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    pub fn control_size(&self) -> ControlSize {
        self.control_size
    }

    pub fn set_control_size(&mut self, size: ControlSize) {
        if size != self.control_size {
            self.control_size = size;
            self.dirty_flags |= ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if color != self.color {
            self.color = color;
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden != self.hidden {
            self.hidden = hidden;
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current rotation of the spin animation, in radians
    fn spin_rotation(&self) -> f32 {
        self.spin_started
            .map(|started| started.elapsed().as_secs_f32() * SPIN_RATE)
            .unwrap_or(0.0)
    }
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for ProgressIndicator {
    fn advance_animations(&mut self) -> bool {
        if self.spinning {
            self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
            request_frame();
        }
        self.spinning
    }

    fn layout(&mut self, constraints: Constraints) -> Size {
        let diameter = self.control_size.diameter();
        let size = constraints.constrain(Size::new(diameter, diameter));
        self.bounds.width = size.width;
        self.bounds.height = size.height;
        self.dirty_flags.remove(ChangeFlags::NEEDS_LAYOUT);
        size
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    fn paint(&self, ctx: &mut PaintContext) {
        if self.hidden {
            return;
        }

        let center_x = self.bounds.x + self.bounds.width / 2.0;
        let center_y = self.bounds.y + self.bounds.height / 2.0;
        let radius = self.bounds.width.min(self.bounds.height) / 2.0;

        // 12 o'clock, sweeping counter-clockwise
        let (start_angle, sweep_angle) = if self.spinning {
            (
                -FRAC_PI_2 + self.spin_rotation(),
                -(SPIN_SWEEP * TAU),
            )
        } else {
            (-FRAC_PI_2, -(self.progress * TAU))
        };

        if sweep_angle != 0.0 {
            ctx.draw_pie_slice(center_x, center_y, radius, start_angle, sweep_angle, self.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invalidation::take_frame_request;

    fn laid_out_indicator() -> ProgressIndicator {
        let mut indicator = ProgressIndicator::new();
        indicator.layout(Constraints::loose(Size::new(100.0, 100.0)));
        indicator.set_origin(42.0, 10.0);
        indicator
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut indicator = ProgressIndicator::new();
        indicator.set_progress(1.5);
        assert_eq!(indicator.progress(), 1.0);
        indicator.set_progress(-0.5);
        assert_eq!(indicator.progress(), 0.0);
    }

    #[test]
    fn test_progress_change_requests_frame() {
        let mut indicator = ProgressIndicator::new();
        take_frame_request();
        indicator.set_progress(0.5);
        assert!(take_frame_request());

        // Same value again: the widget itself stays clean
        let flags_before = indicator.dirty_flags;
        indicator.dirty_flags = ChangeFlags::empty();
        indicator.set_progress(0.5);
        assert_eq!(indicator.dirty_flags, ChangeFlags::empty());
        indicator.dirty_flags = flags_before;
    }

    #[test]
    fn test_layout_uses_control_size_diameter() {
        let mut indicator = ProgressIndicator::new();
        indicator.set_control_size(ControlSize::Regular);
        let size = indicator.layout(Constraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(size, Size::new(32.0, 32.0));
    }

    #[test]
    fn test_paint_records_partial_sweep() {
        let mut indicator = laid_out_indicator();
        indicator.set_progress(0.5);

        let mut ctx = PaintContext::new();
        indicator.paint(&mut ctx);

        assert_eq!(ctx.pies().len(), 1);
        let pie = &ctx.pies()[0];
        assert_eq!(pie.start_angle, -FRAC_PI_2);
        assert!((pie.sweep_angle - (-(0.5 * TAU))).abs() < 1e-6);
        assert_eq!(pie.center_x, 50.0);
        assert_eq!(pie.center_y, 18.0);
    }

    #[test]
    fn test_paint_skips_zero_progress() {
        let indicator = laid_out_indicator();
        let mut ctx = PaintContext::new();
        indicator.paint(&mut ctx);
        assert!(ctx.pies().is_empty());
    }

    #[test]
    fn test_hidden_paints_nothing() {
        let mut indicator = laid_out_indicator();
        indicator.set_progress(1.0);
        indicator.set_hidden(true);

        let mut ctx = PaintContext::new();
        indicator.paint(&mut ctx);
        assert!(ctx.pies().is_empty());
    }

    #[test]
    fn test_spin_advances_until_stopped() {
        let mut indicator = laid_out_indicator();
        indicator.start_animation();
        assert!(indicator.advance_animations());
        indicator.stop_animation();
        assert!(!indicator.advance_animations());
    }
}
