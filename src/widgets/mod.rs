pub mod progress_indicator;
pub mod refresh_control;
pub mod scroll_view;
pub mod widget;

pub use progress_indicator::{ControlSize, ProgressIndicator};
pub use refresh_control::{RefreshControl, RefreshState, RevealStrategy, DEFAULT_HEIGHT};
pub use scroll_view::{scroll_view, ScrollGeometry, ScrollView};
pub use widget::{Color, Event, EventResponse, MouseButton, Rect, ScrollSource, Widget};
