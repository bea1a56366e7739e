//! Pull-to-refresh control.
//!
//! The control observes the scroll geometry of its enclosing scroll view and
//! classifies the offset past the content top into interaction states. The
//! scroll view owns the control and passes its geometry into every
//! notification; a control that never receives geometry is inert.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::invalidation::{request_frame, ChangeFlags, WidgetId};
use crate::layout::{Constraints, Size};
use crate::render::PaintContext;
use crate::runtime;
use crate::widgets::progress_indicator::{ControlSize, ProgressIndicator};
use crate::widgets::scroll_view::ScrollGeometry;
use crate::widgets::widget::{Event, EventResponse, Rect, Widget};

/// Default layout height of the control, in points
pub const DEFAULT_HEIGHT: f32 = 60.0;

/// Cool-down after a deactivation completes before the control may
/// activate again.
const MAXIMUM_ACTIVATION_INTERVAL: Duration = Duration::from_secs(1);

/// Interaction state of a [`RefreshControl`].
///
/// Exactly one state is current at any time. Transitions are driven by the
/// scroll-offset classification or by the explicit begin/end calls.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshState {
    Idle,
    Triggering { progress: f32 },
    Activated,
    Deactivating,
}

impl RefreshState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RefreshState::Idle)
    }

    pub fn is_triggering(&self) -> bool {
        matches!(self, RefreshState::Triggering { .. })
    }

    pub fn is_activated(&self) -> bool {
        matches!(self, RefreshState::Activated)
    }

    pub fn is_deactivating(&self) -> bool {
        matches!(self, RefreshState::Deactivating)
    }
}

/// How the control reserves layout space while it is revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealStrategy {
    /// Raise the top content inset by the control height on activation,
    /// pushing document content downward; restore the recorded inset on
    /// deactivation.
    InsetPush,
    /// Overlay the content and pin the top inset to
    /// `safe_area_insets.top + height` once the control is fully revealed
    /// (or revealed programmatically); restore the safe-area insets on
    /// deactivation.
    #[default]
    Overlay,
}

/// Callback invoked when the activation threshold is crossed
pub type ActionCallback = Box<dyn FnMut()>;
/// Callback invoked on every observable state transition
pub type StateChangeCallback = Box<dyn FnMut(&RefreshState, &RefreshState)>;
/// Future awaited before a deactivation completes
pub type DeactivationFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
/// Hook producing the future awaited before a deactivation completes
pub type WillDeactivateCallback = Box<dyn FnMut() -> DeactivationFuture>;

enum PendingDeactivation {
    /// No hook installed: completes on the next frame
    Immediate { previous: RefreshState },
    /// Hook in flight on the background runtime
    Awaiting {
        previous: RefreshState,
        done: oneshot::Receiver<()>,
    },
}

pub struct RefreshControl {
    widget_id: WidgetId,
    dirty_flags: ChangeFlags,
    state: RefreshState,
    enabled: bool,
    height: f32,
    reveal_strategy: RevealStrategy,
    masks_to_safe_area: bool,
    indicator: ProgressIndicator,
    action: Option<ActionCallback>,
    will_deactivate: Option<WillDeactivateCallback>,
    on_state_change: Option<StateChangeCallback>,
    /// Whether the most recent live scroll began within a third of the
    /// content height from the top
    began_scroll_near_top: bool,
    last_deactivation: Option<Instant>,
    control_locked: bool,
    /// Top inset recorded when an `InsetPush` lock was taken
    prior_inset_top: f32,
    /// Origin recorded at the most recent bounds-change notification
    last_origin: f32,
    pending: Option<PendingDeactivation>,
    /// Visible portion of the control in control-local coordinates, when
    /// `masks_to_safe_area` clipping is active
    clip_rect: Option<Rect>,
    bounds: Rect,
}

impl RefreshControl {
    pub fn new() -> Self {
        Self {
            widget_id: WidgetId::next(),
            dirty_flags: ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT,
            state: RefreshState::Idle,
            enabled: true,
            height: DEFAULT_HEIGHT,
            reveal_strategy: RevealStrategy::default(),
            masks_to_safe_area: false,
            indicator: ProgressIndicator::new(),
            action: None,
            will_deactivate: None,
            on_state_change: None,
            began_scroll_near_top: true,
            last_deactivation: None,
            control_locked: false,
            prior_inset_top: 0.0,
            last_origin: 0.0,
            pending: None,
            clip_rect: None,
            bounds: Rect::default(),
        }
    }

    /// Create a control with an action invoked on threshold crossing
    pub fn with_action(action: impl FnMut() + 'static) -> Self {
        Self::new().action(action)
    }

    pub fn id(&self) -> WidgetId {
        self.widget_id
    }

    /// Set the action invoked when the activation threshold is crossed
    pub fn action(mut self, action: impl FnMut() + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Set the hook awaited before a deactivation completes.
    ///
    /// The hook runs on a background thread and may delay completion
    /// arbitrarily; the control stays in [`RefreshState::Deactivating`] until
    /// the returned future resolves. A hook that never resolves leaves the
    /// control deactivating indefinitely.
    pub fn will_deactivate(
        mut self,
        hook: impl FnMut() -> DeactivationFuture + 'static,
    ) -> Self {
        self.will_deactivate = Some(Box::new(hook));
        self
    }

    /// Set a hook observing every state transition, called after the
    /// built-in indicator update
    pub fn on_state_change(
        mut self,
        hook: impl FnMut(&RefreshState, &RefreshState) + 'static,
    ) -> Self {
        self.on_state_change = Some(Box::new(hook));
        self
    }

    pub fn reveal_strategy(mut self, strategy: RevealStrategy) -> Self {
        self.reveal_strategy = strategy;
        self
    }

    /// Clip the control's visible portion to the area below the safe-area
    /// top (overlay strategy)
    pub fn masks_to_safe_area(mut self, masks: bool) -> Self {
        self.masks_to_safe_area = masks;
        self
    }

    /// Toggle safe-area clipping at runtime
    pub fn set_masks_to_safe_area(&mut self, masks: bool) {
        self.masks_to_safe_area = masks;
        if !masks {
            self.clip_rect = None;
        }
    }

    pub fn control_size(mut self, size: ControlSize) -> Self {
        self.indicator.set_control_size(size);
        self
    }

    pub fn set_control_size(&mut self, size: ControlSize) {
        self.indicator.set_control_size(size);
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.is_activated()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the control. A disabled control hides its
    /// indicator and absorbs begin/end calls as no-ops.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.indicator.set_hidden(!enabled);
    }

    pub fn layout_height(&self) -> f32 {
        self.height
    }

    pub fn indicator(&self) -> &ProgressIndicator {
        &self.indicator
    }

    /// Whether the control may activate: the current scroll gesture began
    /// near the content top and the cool-down since the previous
    /// deactivation has elapsed.
    pub fn can_refresh(&self) -> bool {
        if !self.began_scroll_near_top {
            return false;
        }

        match self.last_deactivation {
            None => true,
            Some(completed) => completed.elapsed() > MAXIMUM_ACTIVATION_INTERVAL,
        }
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.control_locked
    }

    /// Force the control into the activated state.
    ///
    /// No-op if the control is disabled or already activated. With
    /// `reveal_control`, layout space is reserved immediately instead of
    /// waiting for the user to scroll the control into view. The bound
    /// action fires.
    pub fn begin_refreshing(
        &mut self,
        geometry: Option<&mut ScrollGeometry>,
        reveal_control: bool,
    ) {
        if !self.enabled || self.state.is_activated() {
            return;
        }

        match geometry {
            Some(geometry) => {
                self.update_clipping_mask(geometry);
                self.set_state(RefreshState::Activated, true);
                if reveal_control {
                    self.lock_control_in_view(geometry);
                }
                if let Some(action) = &mut self.action {
                    action();
                }
            }
            None => self.set_state(RefreshState::Activated, false),
        }
    }

    /// Transition out of the activated state.
    ///
    /// No-op if the control is disabled or not activated. The deactivation
    /// completes asynchronously: the `will_deactivate` hook is awaited off
    /// the UI thread, then the next [`advance`](Self::advance) restores the
    /// geometry and returns the control to idle.
    pub fn end_refreshing(&mut self, geometry: Option<&mut ScrollGeometry>) {
        if !self.enabled || !self.state.is_activated() {
            return;
        }

        self.set_state(RefreshState::Deactivating, geometry.is_some());
    }

    /// Live-scroll-start notification from the enclosing scroll view
    pub(crate) fn scroll_began(&mut self, geometry: &ScrollGeometry) {
        self.update_clipping_mask(geometry);

        let offset = geometry.origin + geometry.content_insets.top;
        self.began_scroll_near_top = offset < geometry.content_size.height / 3.0;
        log::trace!(
            "scroll began at offset {offset}, near top: {}",
            self.began_scroll_near_top
        );
    }

    /// Bounds-change notification from the enclosing scroll view
    pub(crate) fn bounds_changed(&mut self, geometry: &mut ScrollGeometry) {
        self.last_origin = geometry.origin;
        self.update_clipping_mask(geometry);

        match self.state {
            RefreshState::Deactivating => {}
            RefreshState::Activated => {
                if !self.control_locked {
                    self.lock_control_if_fully_revealed(geometry);
                }
            }
            RefreshState::Triggering { .. } | RefreshState::Idle => {
                self.update_state_after_scroll(geometry);
            }
        }
    }

    /// Per-frame hook: finish a pending deactivation whose hook has
    /// resolved and advance the indicator. Returns true while more frames
    /// are needed.
    pub fn advance(&mut self, geometry: &mut ScrollGeometry) -> bool {
        if self.state.is_deactivating() {
            if let Some(pending) = self.pending.take() {
                match pending {
                    PendingDeactivation::Immediate { previous } => {
                        self.finish_deactivation(previous, geometry);
                    }
                    PendingDeactivation::Awaiting { previous, mut done } => {
                        match done.try_recv() {
                            Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                                self.finish_deactivation(previous, geometry);
                            }
                            Err(oneshot::error::TryRecvError::Empty) => {
                                self.pending =
                                    Some(PendingDeactivation::Awaiting { previous, done });
                            }
                        }
                    }
                }
            }
        }

        let spinning = self.indicator.advance_animations();
        spinning || self.pending.is_some()
    }

    fn set_state(&mut self, next: RefreshState, attached: bool) {
        let previous = std::mem::replace(&mut self.state, next);
        if !attached {
            return;
        }

        let current = self.state.clone();
        match current {
            RefreshState::Activated => {
                if !previous.is_activated() {
                    self.state_did_change(&previous, &current);
                }
            }
            RefreshState::Deactivating => {
                if previous.is_activated() {
                    self.schedule_deactivation(previous);
                }
            }
            _ => {
                if previous != current {
                    self.state_did_change(&previous, &current);
                }
            }
        }
    }

    /// Visual update for a transition: drive the indicator, then the
    /// caller's hook
    fn state_did_change(&mut self, previous: &RefreshState, new: &RefreshState) {
        log::debug!("refresh state {previous:?} -> {new:?}");

        match new {
            RefreshState::Idle => self.indicator.set_progress(0.0),
            RefreshState::Triggering { progress } => self.indicator.set_progress(*progress),
            RefreshState::Activated => {
                self.indicator.set_progress(1.0);
                self.indicator.start_animation();
            }
            RefreshState::Deactivating => {
                self.indicator.stop_animation();
                self.indicator.set_progress(0.0);
            }
        }
        self.dirty_flags |= ChangeFlags::NEEDS_PAINT;

        if let Some(hook) = &mut self.on_state_change {
            hook(previous, new);
        }
    }

    fn schedule_deactivation(&mut self, previous: RefreshState) {
        match &mut self.will_deactivate {
            Some(hook) => {
                let future = hook();
                let (tx, rx) = oneshot::channel();
                runtime::spawn(async move {
                    future.await;
                    let _ = tx.send(());
                });
                self.pending = Some(PendingDeactivation::Awaiting {
                    previous,
                    done: rx,
                });
            }
            None => self.pending = Some(PendingDeactivation::Immediate { previous }),
        }
        request_frame();
    }

    /// Deliver the deferred deactivating notification, then restore the
    /// geometry and return to idle
    fn finish_deactivation(&mut self, previous: RefreshState, geometry: &mut ScrollGeometry) {
        self.state_did_change(&previous, &RefreshState::Deactivating);
        self.complete_deactivation(geometry);
    }

    fn complete_deactivation(&mut self, geometry: &mut ScrollGeometry) {
        let restore_top = match self.reveal_strategy {
            RevealStrategy::InsetPush => self.prior_inset_top,
            RevealStrategy::Overlay => geometry.safe_area_insets.top,
        };

        // Inset writes never reposition the viewport here; the scroll
        // view's settle animation collapses the offset left behind.
        match self.reveal_strategy {
            RevealStrategy::InsetPush => {
                geometry.content_insets.top = restore_top;
            }
            RevealStrategy::Overlay => {
                geometry.content_insets = geometry.safe_area_insets;
            }
        }

        self.last_origin = 0.0;
        self.control_locked = false;
        self.set_state(RefreshState::Idle, true);
        self.last_deactivation = Some(Instant::now());
        log::debug!("refresh deactivation complete, top inset restored to {restore_top}");
    }

    fn lock_control_in_view(&mut self, geometry: &mut ScrollGeometry) {
        match self.reveal_strategy {
            RevealStrategy::InsetPush => {
                if !self.control_locked {
                    self.prior_inset_top = geometry.content_insets.top;
                    geometry.content_insets.top = self.prior_inset_top + self.height;
                }
            }
            RevealStrategy::Overlay => {
                geometry.content_insets.top = geometry.safe_area_insets.top + self.height;
            }
        }

        self.control_locked = true;
        log::trace!("control locked, top inset {}", geometry.content_insets.top);
    }

    fn lock_control_if_fully_revealed(&mut self, geometry: &mut ScrollGeometry) {
        let distance = self.last_origin + geometry.content_insets.top;
        if distance < -self.height {
            self.lock_control_in_view(geometry);
        }
    }

    fn update_state_after_scroll(&mut self, geometry: &mut ScrollGeometry) {
        let distance = self.last_origin + geometry.content_insets.top;

        if distance < -self.height && self.enabled && self.can_refresh() {
            self.set_state(RefreshState::Activated, true);
            self.lock_control_in_view(geometry);
            if let Some(action) = &mut self.action {
                action();
            }
            log::debug!("refresh activated at offset {distance}");
        } else if distance < 0.0 {
            let mut progress = (-distance / self.height).clamp(0.0, 1.0);
            if !self.can_refresh() {
                progress = progress.min(0.5);
            }
            self.set_state(RefreshState::Triggering { progress }, true);
        } else {
            self.set_state(RefreshState::Idle, true);
        }
    }

    fn update_clipping_mask(&mut self, geometry: &ScrollGeometry) {
        if !self.masks_to_safe_area {
            self.clip_rect = None;
            return;
        }

        // Control frame in view space: bottom edge pinned to the document top
        let frame_min_y = -geometry.origin - self.height;
        let frame_max_y = frame_min_y + self.height;

        let visible_top = frame_min_y.max(geometry.safe_area_insets.top);
        let visible_height = (frame_max_y - visible_top).max(0.0);

        self.clip_rect = Some(Rect::new(
            0.0,
            visible_top - frame_min_y,
            self.bounds.width,
            visible_height,
        ));
    }
}

impl Default for RefreshControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for RefreshControl {
    fn advance_animations(&mut self) -> bool {
        self.indicator.advance_animations()
    }

    fn layout(&mut self, constraints: Constraints) -> Size {
        let size = constraints.constrain(Size::new(constraints.max_width, self.height));
        self.bounds.width = size.width;
        self.bounds.height = size.height;
        self.indicator
            .layout(Constraints::loose(Size::new(size.width, size.height)));
        self.dirty_flags.remove(ChangeFlags::NEEDS_LAYOUT);
        size
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;

        // Center the indicator inside the control
        let indicator_size = self.indicator.bounds();
        self.indicator.set_origin(
            x + (self.bounds.width - indicator_size.width) / 2.0,
            y + (self.bounds.height - indicator_size.height) / 2.0,
        );
    }

    fn paint(&self, ctx: &mut PaintContext) {
        match self.clip_rect {
            Some(clip) => {
                ctx.push_clip(Rect::new(
                    self.bounds.x + clip.x,
                    self.bounds.y + clip.y,
                    clip.width,
                    clip.height,
                ));
                self.indicator.paint(ctx);
                ctx.pop_clip();
            }
            None => self.indicator.paint(ctx),
        }
    }

    fn event(&mut self, _event: &Event) -> EventResponse {
        EventResponse::Ignored
    }
}
