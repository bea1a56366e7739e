//! Scrollable container hosting a document widget and an optional
//! pull-to-refresh control.

use std::time::{Duration, Instant};

use crate::animation::{AdvanceResult, AnimationState, Transition};
use crate::invalidation::{request_frame, ChangeFlags, WidgetId};
use crate::layout::{Constraints, Insets, Size};
use crate::render::PaintContext;
use crate::widgets::refresh_control::RefreshControl;
use crate::widgets::widget::{Event, EventResponse, Rect, ScrollSource, Widget};

/// Gap between scroll events that separates one gesture from the next
const GESTURE_GAP: Duration = Duration::from_millis(150);

/// Live scroll geometry of a [`ScrollView`].
///
/// `origin` is the document-space y coordinate at the top of the viewport.
/// The rest position is `-content_insets.top`; values below it mean the
/// content has been pulled past the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollGeometry {
    pub content_insets: Insets,
    pub safe_area_insets: Insets,
    pub origin: f32,
    pub content_size: Size,
    pub viewport: Size,
}

impl ScrollGeometry {
    pub fn new(safe_area_insets: Insets) -> Self {
        Self {
            content_insets: safe_area_insets,
            safe_area_insets,
            origin: -safe_area_insets.top,
            content_size: Size::zero(),
            viewport: Size::zero(),
        }
    }

    /// Origin when the content sits at the top rest position
    pub fn rest_origin(&self) -> f32 {
        -self.content_insets.top
    }

    /// Largest origin reachable by scrolling to the bottom
    pub fn max_origin(&self) -> f32 {
        (self.content_size.height + self.content_insets.bottom - self.viewport.height)
            .max(self.rest_origin())
    }

    /// Signed distance of the viewport top past the content top:
    /// zero at rest, negative when pulled beyond it
    pub fn offset_from_top(&self) -> f32 {
        self.origin + self.content_insets.top
    }
}

impl Default for ScrollGeometry {
    fn default() -> Self {
        Self::new(Insets::default())
    }
}

/// A vertically scrollable container.
///
/// Owns one document widget and an optional [`RefreshControl`]. Scroll
/// input moves the visible origin 1:1, overscrolling freely past the top;
/// once the gesture ends, an eased settle animation returns the origin to
/// the rest position. Every geometry change is forwarded to the refresh
/// control.
pub struct ScrollView {
    widget_id: WidgetId,
    dirty_flags: ChangeFlags,
    content: Box<dyn Widget>,
    geometry: ScrollGeometry,
    refresh_control: Option<RefreshControl>,
    bounds: Rect,
    settle: Option<AnimationState<f32>>,
    last_scroll_time: Option<Instant>,
    /// Last top inset applied by the layout pass, to skip redundant writes
    applied_inset_top: f32,
}

/// Create a scroll view hosting the given document widget
pub fn scroll_view(content: impl Widget + 'static) -> ScrollView {
    ScrollView::new(content)
}

impl ScrollView {
    pub fn new(content: impl Widget + 'static) -> Self {
        let geometry = ScrollGeometry::default();
        let applied_inset_top = geometry.content_insets.top;
        Self {
            widget_id: WidgetId::next(),
            dirty_flags: ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT,
            content: Box::new(content),
            geometry,
            refresh_control: None,
            bounds: Rect::default(),
            settle: None,
            last_scroll_time: None,
            applied_inset_top,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.widget_id
    }

    /// Set the safe-area insets; the content insets are re-seeded from them
    pub fn safe_area_insets(mut self, insets: Insets) -> Self {
        self.geometry = ScrollGeometry::new(insets);
        self.applied_inset_top = insets.top;
        self
    }

    /// Attach a refresh control
    pub fn refresh_control(mut self, control: RefreshControl) -> Self {
        self.set_refresh_control(Some(control));
        self
    }

    /// Replace the refresh control. The previous control is torn down.
    pub fn set_refresh_control(&mut self, control: Option<RefreshControl>) {
        self.refresh_control = control;
        self.dirty_flags |= ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT;
        request_frame();
    }

    pub fn control(&self) -> Option<&RefreshControl> {
        self.refresh_control.as_ref()
    }

    pub fn control_mut(&mut self) -> Option<&mut RefreshControl> {
        self.refresh_control.as_mut()
    }

    pub fn geometry(&self) -> &ScrollGeometry {
        &self.geometry
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_control
            .as_ref()
            .is_some_and(|control| control.is_refreshing())
    }

    /// Begin refreshing programmatically, supplying the container geometry
    pub fn begin_refreshing(&mut self, reveal_control: bool) {
        if let Some(control) = &mut self.refresh_control {
            control.begin_refreshing(Some(&mut self.geometry), reveal_control);
        }
    }

    /// End an active refresh
    pub fn end_refreshing(&mut self) {
        if let Some(control) = &mut self.refresh_control {
            control.end_refreshing(Some(&mut self.geometry));
        }
    }

    /// Apply a scroll delta, as if from an input event
    pub fn scroll_by(&mut self, delta_y: f32) {
        self.handle_scroll(delta_y, ScrollSource::Finger);
    }

    fn handle_scroll(&mut self, delta_y: f32, _source: ScrollSource) {
        let now = Instant::now();
        let new_gesture = self
            .last_scroll_time
            .map_or(true, |last| now.duration_since(last) > GESTURE_GAP);
        self.last_scroll_time = Some(now);

        // User input interrupts the settle animation
        self.settle = None;

        if new_gesture {
            log::trace!("live scroll began at origin {}", self.geometry.origin);
            if let Some(control) = &mut self.refresh_control {
                control.scroll_began(&self.geometry);
            }
        }

        // 1:1 movement, free overscroll past the top, clamped at the bottom
        self.geometry.origin = (self.geometry.origin + delta_y).min(self.geometry.max_origin());
        self.bounds_changed();
    }

    fn bounds_changed(&mut self) {
        if let Some(control) = &mut self.refresh_control {
            control.bounds_changed(&mut self.geometry);
        }
        self.dirty_flags |= ChangeFlags::NEEDS_PAINT;
        request_frame();
    }

    fn position_children(&mut self) {
        let doc_top = self.bounds.y - self.geometry.origin;
        self.content.set_origin(self.bounds.x, doc_top);

        if let Some(control) = &mut self.refresh_control {
            let height = control.layout_height();
            control.set_origin(self.bounds.x, doc_top - height);
        }
    }
}

impl Widget for ScrollView {
    fn advance_animations(&mut self) -> bool {
        let mut animating = false;

        // Pending deactivations resume here, on the frame loop
        if let Some(control) = &mut self.refresh_control {
            if control.advance(&mut self.geometry) {
                animating = true;
            }
        }

        // Settle back to the rest position once the gesture has ended
        let rest = self.geometry.rest_origin();
        let gesture_active = self
            .last_scroll_time
            .is_some_and(|last| last.elapsed() <= GESTURE_GAP);

        if !gesture_active && self.geometry.origin < rest {
            let origin = self.geometry.origin;
            let settle = self
                .settle
                .get_or_insert_with(|| AnimationState::new(origin, Transition::default()));
            settle.animate_to(rest);

            if let AdvanceResult::Changed(new_origin) = settle.advance() {
                self.geometry.origin = new_origin;
                self.bounds_changed();
            }

            if self.settle.as_ref().is_some_and(|s| !s.is_animating()) {
                self.settle = None;
            } else {
                animating = true;
                request_frame();
            }
        } else if self.geometry.origin >= rest {
            self.settle = None;
        }

        if self.content.advance_animations() {
            animating = true;
        }

        animating
    }

    fn layout(&mut self, constraints: Constraints) -> Size {
        let size = constraints.constrain(Size::new(constraints.max_width, constraints.max_height));
        self.geometry.viewport = size;

        // Recompute the top inset from the safe area on every pass, adding
        // the control height while a lock holds the control revealed; the
        // cache skips redundant writes.
        let desired_top = match &self.refresh_control {
            Some(control) if control.is_locked() => {
                self.geometry.safe_area_insets.top + control.layout_height()
            }
            _ => self.geometry.safe_area_insets.top,
        };
        if self.applied_inset_top != desired_top {
            self.geometry.content_insets.top = desired_top;
            self.applied_inset_top = desired_top;
            self.bounds_changed();
        }

        let content_constraints = Constraints::new(size.width, 0.0, size.width, f32::INFINITY);
        let content_size = self.content.layout(content_constraints);
        if content_size != self.geometry.content_size {
            self.geometry.content_size = content_size;
        }

        if let Some(control) = &mut self.refresh_control {
            let height = control.layout_height();
            Widget::layout(control, Constraints::tight(Size::new(size.width, height)));
        }

        self.position_children();
        self.dirty_flags.remove(ChangeFlags::NEEDS_LAYOUT);
        size
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
        self.position_children();
    }

    fn paint(&self, ctx: &mut PaintContext) {
        ctx.push_clip(self.bounds);
        self.content.paint(ctx);
        if let Some(control) = &self.refresh_control {
            control.paint(ctx);
        }
        ctx.pop_clip();
    }

    fn event(&mut self, event: &Event) -> EventResponse {
        match event {
            Event::Scroll {
                delta_y, source, ..
            } => {
                self.handle_scroll(*delta_y, *source);
                EventResponse::Handled
            }
            _ => self.content.event(event),
        }
    }
}
