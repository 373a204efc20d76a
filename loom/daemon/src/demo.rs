//! Demo application served when no other content is linked in
//!
//! Two tabs: a click counter with an "about" popup, and a canvas that is
//! redrawn whenever the browser reports a new size.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use loom_core::events::{EventListener, MouseEvent, CLICK_EVENT};
use loom_core::properties::names;
use loom_core::{Canvas, Color, Session, SessionContent, SizeUnit, ViewId, ViewKind};

/// Content of every demo session
#[derive(Default)]
pub struct Demo {
    clicks: Arc<AtomicUsize>,
}

impl Demo {
    fn counter_page(&self, session: &mut Session) -> ViewId {
        let page = session.create_view(ViewKind::ListLayout);
        session.set(&page, names::TITLE, "Counter");
        session.set(&page, names::ORIENTATION, "vertical");
        session.set(&page, names::PADDING, "16px");

        let label = session.create_view(ViewKind::TextView);
        session.set(&label, names::TEXT, "Not clicked yet");

        let button = session.create_view(ViewKind::Button);
        session.set(&button, names::TEXT, "Click me");
        let clicks = Arc::clone(&self.clicks);
        let target = label.clone();
        session.set(
            &button,
            CLICK_EVENT,
            EventListener::<MouseEvent>::view_only(move |session, _| {
                let count = clicks.fetch_add(1, Ordering::Relaxed) + 1;
                session.set(&target, names::TEXT, format!("Clicked {count} times").as_str());
            }),
        );

        let about = session.create_view(ViewKind::Button);
        session.set(&about, names::TEXT, "About");
        session.set(
            &about,
            CLICK_EVENT,
            EventListener::<MouseEvent>::view_only(|session, _| {
                session.show_message("Loom", "Every pixel of this page is driven by the server.");
            }),
        );

        for child in [&label, &button, &about] {
            session.append(&page, child);
        }
        page
    }

    fn canvas_page(session: &mut Session) -> ViewId {
        let canvas = session.create_view(ViewKind::CanvasView);
        session.set(&canvas, names::TITLE, "Canvas");
        session.set_draw_handler(&canvas, Some(Arc::new(draw)));
        canvas
    }
}

fn draw(canvas: &mut Canvas) {
    let (width, height) = (canvas.width(), canvas.height());
    canvas.set_fill_color(Color(0xFF1A_74E8));
    canvas.fill_rounded_rect(16.0, 16.0, (width - 32.0).max(0.0), (height - 32.0).max(0.0), 12.0);
    canvas.set_fill_color(Color(0xFFFF_FFFF));
    canvas.set_font("system-ui", SizeUnit::px(24.0));
    canvas.fill_text(32.0, 56.0, &format!("{width:.0} x {height:.0}"));
}

impl SessionContent for Demo {
    fn create_root_view(&mut self, session: &mut Session) -> Option<ViewId> {
        let tabs = session.create_view(ViewKind::TabsLayout);
        let counter = self.counter_page(session);
        let canvas = Self::canvas_page(session);
        session.append(&tabs, &counter);
        session.append(&tabs, &canvas);
        Some(tabs)
    }

    fn on_start(&mut self, session: &mut Session) {
        tracing::info!(session = session.id(), "demo session started");
    }

    fn on_finish(&mut self, session: &mut Session) {
        tracing::info!(
            session = session.id(),
            clicks = self.clicks.load(Ordering::Relaxed),
            "demo session finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loom_core::Resources;

    use super::*;

    #[test]
    fn test_root_is_tabs_with_two_pages() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let root = Demo::default().create_root_view(&mut session).unwrap();
        assert_eq!(session.view_kind(&root), Some(ViewKind::TabsLayout));
        assert_eq!(session.view(&root).map(|view| view.children().len()), Some(2));
    }
}
