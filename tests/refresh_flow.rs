use std::cell::{Cell, RefCell};
use std::f32::consts::PI;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use refreshable_scroll::prelude::*;

struct TallContent {
    height: f32,
}

impl TallContent {
    fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Widget for TallContent {
    fn layout(&mut self, constraints: Constraints) -> Size {
        constraints.constrain(Size::new(constraints.max_width, self.height))
    }

    fn set_origin(&mut self, _x: f32, _y: f32) {}

    fn paint(&self, _ctx: &mut PaintContext) {}
}

/// One frame of the embedding loop
fn frame(view: &mut ScrollView) {
    view.advance_animations();
    view.layout(Constraints::tight(Size::new(400.0, 600.0)));
    view.set_origin(0.0, 0.0);
}

/// A pull gesture delivered as a run of small scroll deltas
fn pull(view: &mut ScrollView, total: f32) {
    let steps = 10;
    for _ in 0..steps {
        view.scroll_by(total / steps as f32);
    }
}

/// Let the current gesture end
fn end_gesture() {
    thread::sleep(Duration::from_millis(200));
}

fn wait_until_idle(view: &mut ScrollView) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        frame(view);
        if view.control().map(|c| c.state().is_idle()).unwrap_or(true) {
            break;
        }
        assert!(Instant::now() < deadline, "control never returned to idle");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn pull_gesture_activates_and_fires_action_once() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let control = RefreshControl::with_action(move || counter.set(counter.get() + 1));
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);

    pull(&mut view, -61.0);
    assert!(view.is_refreshing());
    assert_eq!(fired.get(), 1);
    assert_eq!(view.geometry().content_insets.top, 60.0);
    assert!((view.geometry().origin - (-61.0)).abs() < 1e-3);

    // Keep pulling: no re-fire
    pull(&mut view, -20.0);
    assert_eq!(fired.get(), 1);
}

#[test]
fn threshold_offsets_drive_progress_and_activation() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let control = RefreshControl::with_action(move || counter.set(counter.get() + 1));
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);

    view.scroll_by(-30.0);
    match view.control().unwrap().state() {
        RefreshState::Triggering { progress } => assert!((progress - 0.5).abs() < 1e-6),
        other => panic!("expected Triggering, got {other:?}"),
    }

    view.scroll_by(-31.0);
    assert!(view.is_refreshing());
    assert_eq!(fired.get(), 1);
    assert_eq!(view.geometry().content_insets.top, 60.0);
}

#[test]
fn full_cycle_restores_inset_and_settles_to_rest() {
    let control = RefreshControl::new();
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);
    let inset_before = view.geometry().content_insets.top;

    pull(&mut view, -61.0);
    assert!(view.is_refreshing());

    view.end_refreshing();
    wait_until_idle(&mut view);
    assert!((view.geometry().content_insets.top - inset_before).abs() < 1e-6);

    // The settle animation walks the origin back to the rest position
    end_gesture();
    let deadline = Instant::now() + Duration::from_secs(2);
    while (view.geometry().origin - view.geometry().rest_origin()).abs() > 0.01 {
        assert!(Instant::now() < deadline, "origin never settled");
        frame(&mut view);
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn gesture_starting_deep_in_document_cannot_activate() {
    let control = RefreshControl::new();
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);

    // Scroll deep into the document, then release
    view.scroll_by(900.0);
    end_gesture();

    // A single gesture dragging all the way past the top: gated
    view.scroll_by(-961.0);
    assert!(!view.is_refreshing());
    match view.control().unwrap().state() {
        RefreshState::Triggering { progress } => assert!(*progress <= 0.5),
        other => panic!("expected gated Triggering, got {other:?}"),
    }

    // A fresh gesture starting near the top activates
    end_gesture();
    view.scroll_by(-1.0);
    assert!(view.is_refreshing());
}

#[test]
fn programmatic_cycle_awaits_hook_and_skips_triggering() {
    let hook_finished = Arc::new(AtomicBool::new(false));
    let flag = hook_finished.clone();
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = transitions.clone();

    let control = RefreshControl::new()
        .will_deactivate(move || {
            let flag = flag.clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
            })
        })
        .on_state_change(move |from, to| {
            sink.borrow_mut().push((from.clone(), to.clone()));
        });

    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);

    view.begin_refreshing(true);
    assert!(view.is_refreshing());
    assert_eq!(view.geometry().content_insets.top, 60.0);

    view.end_refreshing();
    wait_until_idle(&mut view);
    assert!(hook_finished.load(Ordering::SeqCst));

    let recorded = transitions.borrow();
    assert_eq!(
        *recorded,
        vec![
            (RefreshState::Idle, RefreshState::Activated),
            (RefreshState::Activated, RefreshState::Deactivating),
            (RefreshState::Deactivating, RefreshState::Idle),
        ]
    );
}

#[test]
fn pulled_indicator_paints_half_sweep() {
    let control = RefreshControl::new();
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(control);
    frame(&mut view);

    view.scroll_by(-30.0);
    frame(&mut view);

    let mut ctx = PaintContext::new();
    view.paint(&mut ctx);

    assert_eq!(ctx.pies().len(), 1);
    let pie = &ctx.pies()[0];
    assert!((pie.sweep_angle - (-PI)).abs() < 1e-5);
}

#[test]
fn overlay_mask_clips_indicator_to_safe_area() {
    let control = RefreshControl::new().masks_to_safe_area(true);
    let mut view = scroll_view(TallContent::new(2000.0))
        .safe_area_insets(Insets::top(20.0))
        .refresh_control(control);
    frame(&mut view);

    // Rest origin is -20; pull 30 more points into overscroll
    view.scroll_by(-30.0);
    frame(&mut view);

    let mut ctx = PaintContext::new();
    view.paint(&mut ctx);

    assert_eq!(ctx.pies().len(), 1);
    // The control sits at view-space y = -10; only [20, 50) is visible
    let clip = ctx.pies()[0].clip_rect.expect("indicator should be clipped");
    assert_eq!(clip, Rect::new(0.0, 20.0, 400.0, 30.0));
}

#[test]
fn replacing_the_control_tears_down_the_old_one() {
    let first = RefreshControl::new();
    let mut view = scroll_view(TallContent::new(2000.0)).refresh_control(first);
    frame(&mut view);

    view.begin_refreshing(true);
    assert!(view.is_refreshing());

    let second_fired = Rc::new(Cell::new(0));
    let counter = second_fired.clone();
    view.set_refresh_control(Some(RefreshControl::with_action(move || {
        counter.set(counter.get() + 1)
    })));
    frame(&mut view);
    assert!(!view.is_refreshing());

    pull(&mut view, -61.0);
    assert!(view.is_refreshing());
    assert_eq!(second_fired.get(), 1);
}
