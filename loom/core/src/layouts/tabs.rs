//! TabsLayout: tab bar plus one visible page

use std::fmt::Write;

use crate::error::{LoomError, LoomResult};
use crate::events::{CURRENT_TAB_CHANGED, TAB_CLOSE_EVENT};
use crate::properties::enums;
use crate::properties::names;
use crate::properties::resolve::{bool_value, enum_value, int_value};
use crate::properties::PropertyValue;
use crate::session::Session;
use crate::style::CssBuilder;
use crate::view::{escape_html, ViewId};

/// Where the tab bar sits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabsPosition {
    /// Above the pages
    #[default]
    Top,
    /// Below the pages
    Bottom,
    /// Left, titles rotated
    Left,
    /// Right, titles rotated
    Right,
    /// Left, as a list
    LeftList,
    /// Right, as a list
    RightList,
    /// No tab bar
    Hidden,
}

impl TabsPosition {
    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Bottom,
            2 => Self::Left,
            3 => Self::Right,
            4 => Self::LeftList,
            5 => Self::RightList,
            6 => Self::Hidden,
            _ => Self::Top,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    fn bar_cell(self) -> &'static str {
        match self {
            Self::Right | Self::RightList => "grid-row: 1 / 2; grid-column: 2 / 3;",
            Self::Bottom => "grid-row: 2 / 3; grid-column: 1 / 2;",
            _ => "grid-row: 1 / 2; grid-column: 1 / 2;",
        }
    }

    fn page_cell(self) -> &'static str {
        match self {
            Self::Left | Self::LeftList => "grid-row: 1 / 2; grid-column: 2 / 3;",
            Self::Top => "grid-row: 2 / 3; grid-column: 1 / 2;",
            _ => "grid-row: 1 / 2; grid-column: 1 / 2;",
        }
    }

    fn tab_style(self) -> &'static str {
        match self {
            Self::Left | Self::Right => {
                "display: grid; grid-template-rows: auto 1fr auto; align-items: center; justify-items: center; grid-row-gap: 8px;"
            }
            Self::LeftList | Self::RightList => {
                "display: grid; grid-template-columns: auto 1fr auto; align-items: center; justify-items: start; grid-column-gap: 8px;"
            }
            _ => {
                "display: grid; grid-template-columns: auto 1fr auto; align-items: center; justify-items: center; grid-column-gap: 8px;"
            }
        }
    }

    fn title_style(self) -> &'static str {
        match self {
            Self::Left => "writing-mode: vertical-lr; transform: rotate(180deg); grid-row: 2 / 3; grid-column: 1 / 2;",
            Self::Right => "writing-mode: vertical-lr; grid-row: 2 / 3; grid-column: 1 / 2;",
            _ => "grid-row: 1 / 2; grid-column: 2 / 3;",
        }
    }

    fn icon_cell(self) -> &'static str {
        match self {
            Self::Left => "grid-row: 3 / 4; grid-column: 1 / 2;",
            _ => "grid-row: 1 / 2; grid-column: 1 / 2;",
        }
    }

    fn close_cell(self) -> &'static str {
        match self {
            Self::Left => "grid-row: 1 / 2; grid-column: 1 / 2;",
            Self::Right => "grid-row: 3 / 4; grid-column: 1 / 2;",
            _ => "grid-row: 1 / 2; grid-column: 3 / 4;",
        }
    }
}

fn index_of(n: i64) -> Option<usize> {
    usize::try_from(n).ok()
}

impl Session {
    /// Tab bar position of a tabs layout
    #[must_use]
    pub fn tabs_position(&self, id: &ViewId) -> TabsPosition {
        self.style_value(id, names::TABS)
            .and_then(|v| enum_value(&v, &enums::TABS, &self.resolver()))
            .map_or(TabsPosition::Top, TabsPosition::from_index)
    }

    fn inactive_tab_class(&self, id: &ViewId) -> String {
        self.get_resolved(id, names::TAB_STYLE).unwrap_or_else(|| {
            if self.tabs_position(id).is_vertical() { "ruiVerticalTab" } else { "ruiTab" }.to_string()
        })
    }

    fn active_tab_class(&self, id: &ViewId) -> String {
        self.get_resolved(id, names::CURRENT_TAB_STYLE).unwrap_or_else(|| {
            if self.tabs_position(id).is_vertical() { "ruiCurrentVerticalTab" } else { "ruiCurrentTab" }.to_string()
        })
    }

    fn tab_count(&self, id: &ViewId) -> usize {
        self.views.get(id).map_or(0, |view| view.children.len())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Grid template of the layout element
    pub(crate) fn tabs_css(&self, id: &ViewId, css: &mut CssBuilder) {
        match self.tabs_position(id) {
            TabsPosition::Top => css.add("grid-template-rows", "auto 1fr"),
            TabsPosition::Bottom => css.add("grid-template-rows", "1fr auto"),
            TabsPosition::Left | TabsPosition::LeftList => css.add("grid-template-columns", "auto 1fr"),
            TabsPosition::Right | TabsPosition::RightList => css.add("grid-template-columns", "1fr auto"),
            TabsPosition::Hidden => {}
        }
    }

    /// Tab classes the client swaps on activation
    pub(crate) fn write_tabs_attributes(&self, id: &ViewId, out: &mut String) {
        let _ = write!(
            out,
            " data-inactiveTabStyle=\"{}\" data-activeTabStyle=\"{}\" data-current=\"{id}-{}\"",
            escape_html(&self.inactive_tab_class(id)),
            escape_html(&self.active_tab_class(id)),
            self.get_current(id)
        );
    }

    pub(crate) fn write_tabs(&mut self, id: &ViewId, out: &mut String) {
        let children = self.views.get(id).map(|view| view.children.clone()).unwrap_or_default();
        let current = self.get_current(id);
        let position = self.tabs_position(id);

        if position != TabsPosition::Hidden {
            let flow = if matches!(
                position,
                TabsPosition::Left | TabsPosition::LeftList | TabsPosition::Right | TabsPosition::RightList
            ) {
                "column"
            } else {
                "row"
            };
            let _ = write!(
                out,
                "<div class=\"ruiTabBar\" style=\"display: flex; {} flex-flow: {flow} nowrap; justify-content: flex-start; align-items: stretch;\">",
                position.bar_cell()
            );

            let inactive = self.inactive_tab_class(id);
            let active = self.active_tab_class(id);
            let layout_close = self.get_flag(id, names::TAB_CLOSE_BUTTON);
            let resolver = self.resolver();

            for (n, child) in children.iter().enumerate() {
                let class = if n == current { &active } else { &inactive };
                let _ = write!(
                    out,
                    "<div id=\"{id}-{n}\" class=\"{}\" tabindex=\"0\" \
                     onclick=\"tabClickEvent(this, '{id}', {n}, event)\" \
                     onkeydown=\"tabKeyClickEvent('{id}', {n}, event)\" \
                     style=\"{}\" data-container=\"{id}\" data-view=\"{id}-page{n}\">",
                    escape_html(class),
                    position.tab_style()
                );
                if let Some(icon) = self.get_resolved(child, names::ICON) {
                    let _ = write!(
                        out,
                        "<img style=\"{}\" src=\"{}\">",
                        position.icon_cell(),
                        escape_html(&icon)
                    );
                }
                let title = self
                    .get_resolved(child, names::TITLE)
                    .map(|title| self.get_string(&title))
                    .unwrap_or_default();
                let _ = write!(out, "<div style=\"{}\">{}</div>", position.title_style(), escape_html(&title));

                let close = self
                    .style_value(child, names::TAB_CLOSE_BUTTON)
                    .and_then(|v| bool_value(&v, &resolver))
                    .unwrap_or(layout_close);
                if close {
                    let _ = write!(
                        out,
                        "<div class=\"ruiTabCloseButton\" tabindex=\"0\" \
                         onclick=\"tabCloseClickEvent(this, '{id}', {n}, event)\" \
                         onkeydown=\"tabCloseKeyClickEvent('{id}', {n}, event)\" \
                         style=\"display: grid; {}\">✕</div>",
                        position.close_cell()
                    );
                }
                out.push_str("</div>");
            }
            out.push_str("</div>");
        }

        for (n, child) in children.iter().enumerate() {
            let hidden = if n == current { "" } else { " display: none;" };
            let _ = write!(
                out,
                "<div id=\"{id}-page{n}\" class=\"ruiTabsPage\" style=\"position: relative; {}{hidden}\">",
                position.page_cell()
            );
            self.write_view_html(child, out);
            out.push_str("</div>");
        }
    }

    // ========================================================================
    // Current tab
    // ========================================================================

    fn store_current(&mut self, id: &ViewId, current: Option<usize>) {
        let value = current.and_then(|n| i64::try_from(n).ok()).map(PropertyValue::Int);
        if let Some(view) = self.views.get_mut(id) {
            if let Err(e) = view.bag.apply(names::CURRENT, value) {
                e.log();
            }
        }
    }

    /// Select a tab; fires `current-tab-changed` with `(new, old)`
    ///
    /// A negative value or `None` clears the selection back to the first tab.
    pub(crate) fn set_tabs_current(&mut self, id: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let old = self.get_current(id);
        let count = self.tab_count(id);
        let new = match &value {
            None => None,
            Some(v) => {
                let n = int_value(v, &self.resolver()).ok_or_else(|| LoomError::incompatible(names::CURRENT, v))?;
                match index_of(n) {
                    None => None,
                    Some(index) if count == 0 || index < count => Some(index),
                    Some(_) => {
                        return Err(LoomError::OutOfRange {
                            tag: names::CURRENT.to_string(),
                            index: n,
                            len: count,
                        })
                    }
                }
            }
        };
        self.store_current(id, new);
        let current = new.unwrap_or(0);
        if current != old {
            if self.is_on_screen(id) {
                self.command("activateTab", |bridge| {
                    bridge.call_func("activateTab", &[id.as_str().into(), current.into()]);
                });
            }
            self.fire(id, CURRENT_TAB_CHANGED, &(current, old));
        }
        self.property_changed(id, &[names::CURRENT.to_string()]);
        Ok(())
    }

    /// The user picked tab `index`; the page is already switched in the browser
    pub(crate) fn tab_clicked(&mut self, id: &ViewId, index: usize) {
        let old = self.get_current(id);
        if index == old {
            return;
        }
        if index >= self.tab_count(id) {
            tracing::warn!(view = %id, index, "click on a tab that does not exist");
            return;
        }
        self.without_updates(|session| {
            session.store_current(id, Some(index));
            session.property_changed(id, &[names::CURRENT.to_string()]);
        });
        self.fire(id, CURRENT_TAB_CHANGED, &(index, old));
    }

    /// The user clicked the close button of tab `index`
    pub(crate) fn tab_close_clicked(&mut self, id: &ViewId, index: usize) {
        if self.fire(id, TAB_CLOSE_EVENT, &index) == 0 {
            tracing::debug!(view = %id, index, "tab close without listeners");
        }
    }

    // ========================================================================
    // Child bookkeeping
    // ========================================================================

    /// Keep the same page current after an insert at `index`
    pub(crate) fn tabs_child_inserted(&mut self, id: &ViewId, index: usize) {
        let count = self.tab_count(id);
        let current = self.get_current(id);
        if count > 1 && index <= current {
            self.store_current(id, Some(current + 1));
        }
    }

    /// Move the current page after the removal of `index`
    pub(crate) fn tabs_child_removed(&mut self, id: &ViewId, index: usize) {
        let old = self.get_current(id);
        let count = self.tab_count(id);
        let current = if index < old || (index == old && old > 0) { old - 1 } else { old };
        let current = current.min(count.saturating_sub(1));
        self.store_current(id, (count > 0).then_some(current));
        if index == old && count > 0 {
            self.fire(id, CURRENT_TAB_CHANGED, &(current, old));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::data::DataObject;
    use crate::events::EventListener;
    use crate::session::test_support::{connected_session, drain};
    use crate::view::ViewKind;

    fn tabs(session: &mut Session, count: usize) -> (ViewId, Vec<ViewId>) {
        let tabs = session.create_view(ViewKind::TabsLayout);
        let mut pages = Vec::new();
        for n in 0..count {
            let page = session.create_view(ViewKind::TextView);
            session.set(&page, names::TITLE, format!("Tab {n}"));
            session.append(&tabs, &page);
            pages.push(page);
        }
        (tabs, pages)
    }

    fn changes(session: &mut Session, tabs: &ViewId) -> Arc<Mutex<Vec<(usize, usize)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set(
            tabs,
            CURRENT_TAB_CHANGED,
            EventListener::<(usize, usize)>::event_only(move |change| sink.lock().push(*change)),
        );
        seen
    }

    #[test]
    fn test_renders_bar_and_pages() {
        let (mut session, mut rx) = connected_session();
        let (tabs, _) = tabs(&mut session, 2);
        session.set(&tabs, names::TAB_CLOSE_BUTTON, true);
        session.set_root_view(&tabs);
        let out = drain(&mut rx);
        assert!(out.contains("grid-template-rows: auto 1fr"), "{out}");
        assert!(out.contains("<div id=\"id000001-0\" class=\"ruiCurrentTab\""), "{out}");
        assert!(out.contains("<div id=\"id000001-1\" class=\"ruiTab\""), "{out}");
        assert!(out.contains(">Tab 1</div>"), "{out}");
        assert!(out.contains("tabCloseClickEvent(this, \\'id000001\\', 1, event)"), "{out}");
        assert!(out.contains("id=\"id000001-page1\" class=\"ruiTabsPage\" style=\"position: relative; grid-row: 2 / 3; grid-column: 1 / 2; display: none;\""), "{out}");
        assert!(out.contains("data-current=\"id000001-0\""), "{out}");
    }

    #[test]
    fn test_set_current_fires_change() {
        let (mut session, mut rx) = connected_session();
        let (tabs, _) = tabs(&mut session, 3);
        let seen = changes(&mut session, &tabs);
        session.set_root_view(&tabs);
        drain(&mut rx);

        assert!(session.set(&tabs, names::CURRENT, 2));
        assert_eq!(session.get_current(&tabs), 2);
        assert_eq!(drain(&mut rx), "activateTab('id000001', 2);");
        assert!(!session.set(&tabs, names::CURRENT, 7));
        assert!(session.set(&tabs, names::CURRENT, 2));
        assert_eq!(*seen.lock(), vec![(2, 0)]);
    }

    #[test]
    fn test_click_and_close_messages() {
        let (mut session, mut rx) = connected_session();
        let (tabs, _) = tabs(&mut session, 3);
        let seen = changes(&mut session, &tabs);
        let closed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&closed);
        session.set(
            &tabs,
            TAB_CLOSE_EVENT,
            EventListener::<usize>::event_only(move |index| sink.lock().push(*index)),
        );
        session.set_root_view(&tabs);
        drain(&mut rx);

        session.handle_message(&DataObject::parse("tabClick{id=id000001, number=1}").unwrap());
        assert_eq!(session.get_current(&tabs), 1);
        assert_eq!(*seen.lock(), vec![(1, 0)]);
        assert_eq!(drain(&mut rx), "");

        session.handle_message(&DataObject::parse("tabCloseClick{id=id000001, number=2}").unwrap());
        assert_eq!(*closed.lock(), vec![2]);
    }

    #[test]
    fn test_removal_keeps_a_page_current() {
        let (mut session, _rx) = connected_session();
        let (tabs, pages) = tabs(&mut session, 3);
        session.set(&tabs, names::CURRENT, 2);
        session.remove_view(&tabs, 0);
        assert_eq!(session.get_current(&tabs), 1);

        let inserted = session.create_view(ViewKind::TextView);
        session.insert(&tabs, &inserted, 0);
        assert_eq!(session.get_current(&tabs), 2);
        assert_eq!(session.view(&tabs).unwrap().children()[2], pages[2]);
    }
}
