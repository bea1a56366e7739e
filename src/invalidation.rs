//! Dirty tracking and frame scheduling.
//!
//! Widgets mark themselves dirty through [`ChangeFlags`] and request a new
//! frame from the embedding loop with [`request_frame`]. The loop drains the
//! request with [`take_frame_request`] once per iteration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Flags indicating what aspects of rendering need to be updated
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// Widget needs layout recalculation (size/position may change)
        const NEEDS_LAYOUT = 0b01;
        /// Widget needs repainting (visual appearance changed)
        const NEEDS_PAINT  = 0b10;
    }
}

/// Unique identifier for a widget
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WidgetId(u64);

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

impl WidgetId {
    /// Generate a new unique widget ID
    pub fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

static FRAME_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Request that the embedding loop schedule another frame.
pub fn request_frame() {
    FRAME_REQUESTED.store(true, Ordering::Release);
}

/// Take the pending frame request, clearing it.
///
/// Returns true if a frame was requested since the last call.
pub fn take_frame_request() -> bool {
    FRAME_REQUESTED.swap(false, Ordering::AcqRel)
}
