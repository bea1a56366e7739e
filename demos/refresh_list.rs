//! Example exercising the pull-to-refresh control.
//!
//! There is no windowing here: a scripted pull gesture is fed into the
//! scroll view and the frame loop runs for a few seconds. Each refresh
//! simulates a two-second network reload on a background thread, prepends
//! an item, and ends the refresh. Run with `RUST_LOG=debug` to watch the
//! state machine.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use refreshable_scroll::prelude::*;

const PALETTE: [Color; 7] = [
    Color::from_hex(0x007AFF), // blue
    Color::from_hex(0x28CD41), // green
    Color::from_hex(0xFF9500), // orange
    Color::from_hex(0xAF52DE), // purple
    Color::from_hex(0xFF3B30), // red
    Color::from_hex(0x59ADC4), // teal
    Color::from_hex(0xFFCC00), // yellow
];

const ROW_HEIGHT: f32 = 64.0;

#[derive(Clone)]
struct Item {
    title: String,
    subtitle: String,
    color: Color,
}

impl Item {
    fn numbered(n: usize) -> Self {
        Self {
            title: format!("Item {n}"),
            subtitle: format!("Generated item {n}"),
            color: PALETTE[n % PALETTE.len()],
        }
    }
}

/// Flat list of colored rows; the item store is shared with the app so a
/// refresh can prepend rows while the scroll view owns the widget.
struct ItemList {
    items: Rc<RefCell<Vec<Item>>>,
    bounds: Rect,
}

impl ItemList {
    fn new(items: Rc<RefCell<Vec<Item>>>) -> Self {
        Self {
            items,
            bounds: Rect::default(),
        }
    }
}

impl Widget for ItemList {
    fn layout(&mut self, constraints: Constraints) -> Size {
        let height = self.items.borrow().len() as f32 * ROW_HEIGHT;
        let size = constraints.constrain(Size::new(constraints.max_width, height));
        self.bounds.width = size.width;
        self.bounds.height = size.height;
        size
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    fn paint(&self, ctx: &mut PaintContext) {
        for (index, item) in self.items.borrow().iter().enumerate() {
            let row = Rect::new(
                self.bounds.x + 4.0,
                self.bounds.y + index as f32 * ROW_HEIGHT + 4.0,
                self.bounds.width - 8.0,
                ROW_HEIGHT - 8.0,
            );
            ctx.draw_rounded_rect(row, item.color, 8.0);
            ctx.draw_text(
                &item.title,
                Rect::new(row.x + 12.0, row.y + 10.0, row.width - 24.0, 18.0),
                Color::WHITE,
                13.0,
            );
            ctx.draw_text(
                &item.subtitle,
                Rect::new(row.x + 12.0, row.y + 32.0, row.width - 24.0, 14.0),
                Color::rgba(1.0, 1.0, 1.0, 0.7),
                11.0,
            );
        }
    }
}

fn main() {
    env_logger::init();

    let items: Rc<RefCell<Vec<Item>>> = Rc::new(RefCell::new(
        (1..=6).map(Item::numbered).collect(),
    ));

    // The control's action only signals the app; the app owns the reload
    let (refresh_tx, refresh_rx) = mpsc::channel();
    let control = RefreshControl::with_action(move || {
        let _ = refresh_tx.send(());
    })
    .control_size(ControlSize::Regular)
    .on_state_change(|from, to| {
        log::info!("refresh control: {from:?} -> {to:?}");
    });

    let mut view = scroll_view(ItemList::new(items.clone())).refresh_control(control);

    // Simulated network reloads complete on this channel
    let (done_tx, done_rx) = mpsc::channel();

    let mut paint_ctx = PaintContext::new();
    let mut did_programmatic_refresh = false;
    let start = Instant::now();

    while start.elapsed() < Duration::from_secs(8) {
        let t = start.elapsed().as_secs_f32();

        // Kick off a reload for each activation
        while refresh_rx.try_recv().is_ok() {
            let done_tx = done_tx.clone();
            let next_number = items.borrow().len() + 1;
            thread::spawn(move || {
                thread::sleep(Duration::from_secs(2));
                let _ = done_tx.send(Item::numbered(next_number));
            });
        }

        // Finish reloads: prepend the new item, then end the refresh
        while let Ok(item) = done_rx.try_recv() {
            log::info!("reload finished: {}", item.title);
            items.borrow_mut().insert(0, item);
            view.end_refreshing();
        }

        // Scripted pull gesture shortly after startup
        if (0.5..0.8).contains(&t) {
            view.event(&Event::Scroll {
                x: 240.0,
                y: 320.0,
                delta_x: 0.0,
                delta_y: -5.0,
                source: ScrollSource::Finger,
            });
        }

        // A second, programmatic refresh once the first has settled
        if t > 4.5 && !did_programmatic_refresh && !view.is_refreshing() {
            did_programmatic_refresh = true;
            log::info!("beginning programmatic refresh");
            view.begin_refreshing(true);
        }

        view.advance_animations();
        view.layout(Constraints::tight(Size::new(480.0, 640.0)));
        view.set_origin(0.0, 0.0);

        paint_ctx.clear();
        view.paint(&mut paint_ctx);
        let _ = take_frame_request();

        thread::sleep(Duration::from_millis(16));
    }

    println!(
        "done: {} items, control state {:?}",
        items.borrow().len(),
        view.control().map(|control| control.state())
    );
}
