//! Pull-to-refresh for scrollable views.
//!
//! A [`ScrollView`](widgets::ScrollView) hosts a document widget and an
//! optional [`RefreshControl`](widgets::RefreshControl). The control watches
//! the scroll offset past the content top and walks through
//! idle → triggering → activated → deactivating, reserving layout space for
//! itself while a refresh is running and driving a circular progress
//! indicator from the pull distance.
//!
//! The crate records paint output into a
//! [`PaintContext`](render::PaintContext) instead of owning a rendering
//! backend; the embedding drives events, frames, and presentation.
//!
//! ```ignore
//! use refreshable_scroll::prelude::*;
//!
//! let control = RefreshControl::with_action(|| {
//!     // kick off the reload, then call end_refreshing() when done
//! });
//! let mut view = scroll_view(my_list).refresh_control(control);
//!
//! // each frame:
//! view.advance_animations();
//! view.layout(Constraints::tight(viewport));
//! view.set_origin(0.0, 0.0);
//! view.paint(&mut ctx);
//! ```

pub mod animation;
pub mod invalidation;
pub mod layout;
pub mod render;
pub mod widgets;

mod runtime;

pub mod prelude {
    pub use crate::animation::{AnimationState, TimingFunction, Transition};
    pub use crate::invalidation::{request_frame, take_frame_request, ChangeFlags, WidgetId};
    pub use crate::layout::{Constraints, Insets, Size};
    pub use crate::render::PaintContext;
    pub use crate::widgets::{
        scroll_view, Color, ControlSize, Event, EventResponse, MouseButton, ProgressIndicator,
        Rect, RefreshControl, RefreshState, RevealStrategy, ScrollGeometry, ScrollSource,
        ScrollView, Widget,
    };
}
