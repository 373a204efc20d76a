//! Bootstrap document
//!
//! The page a tab loads before its socket opens. It carries the browser
//! runtime ([`LOOM_JS`]), the structural style sheet ([`LOOM_CSS`]) and the
//! empty elements the session fills: the theme `<style>`, `ruiRootView`,
//! `ruiPopupLayer` and the `ruiAnimations` keyframes sheet.
//!
//! Serving the document over HTTP is left to the embedding server.

use std::fmt::Write;

use crate::config::AppParams;
use crate::view::escape_html;

/// Browser runtime executed by every tab
pub const LOOM_JS: &str = include_str!("../resources/loom.js");

/// Layout rules that do not depend on the theme
pub const LOOM_CSS: &str = include_str!("../resources/loom.css");

/// Render the bootstrap page for `params`
///
/// The first `<style>` element is left empty: the initial script of every
/// session writes the theme style sheet into it.
#[must_use]
pub fn bootstrap_html(params: &AppParams) -> String {
    let mut html = String::with_capacity(LOOM_JS.len() + LOOM_CSS.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&params.title));
    if !params.icon.is_empty() {
        let _ = writeln!(html, "<link rel=\"icon\" href=\"{}\">", escape_html(&params.icon));
    }
    html.push_str("<style></style>\n");
    let _ = writeln!(html, "<style id=\"ruiBase\">\n{LOOM_CSS}</style>");
    html.push_str("<style id=\"ruiAnimations\"></style>\n");
    let _ = writeln!(html, "<script>\n{LOOM_JS}</script>");
    html.push_str("</head>\n<body>\n");
    html.push_str("<div id=\"ruiRoot\" class=\"ruiRoot\">\n<div id=\"ruiRootView\"></div>\n</div>\n");
    html.push_str(
        "<div id=\"ruiPopupLayer\" class=\"ruiPopupLayer\" onclick=\"clickEvent(this, event)\"></div>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_layout() {
        let html = bootstrap_html(&AppParams::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Loom</title>"));
        assert!(!html.contains("rel=\"icon\""));

        let theme = html.find("<style></style>").unwrap();
        let base = html.find("<style id=\"ruiBase\">").unwrap();
        let animations = html.find("<style id=\"ruiAnimations\">").unwrap();
        assert!(theme < base && base < animations);

        assert!(html.contains("<div id=\"ruiRootView\"></div>"));
        assert!(html.contains("id=\"ruiPopupLayer\""));
    }

    #[test]
    fn test_title_and_icon_are_escaped() {
        let params = AppParams {
            title: "Tom & \"Jerry\"".to_string(),
            icon: "/icon.png".to_string(),
            ..AppParams::default()
        };
        let html = bootstrap_html(&params);
        assert!(html.contains("<title>Tom &amp; &quot;Jerry&quot;</title>"), "{html}");
        assert!(html.contains("<link rel=\"icon\" href=\"/icon.png\">"));
    }

    #[test]
    fn test_runtime_defines_every_server_call() {
        let calls = [
            "updateInnerHTML",
            "appendToInnerHTML",
            "updateCSSProperty",
            "updateProperty",
            "removeProperty",
            "removeView",
            "setInputValue",
            "scanElementsSize",
            "activateTab",
            "loadImage",
            "canvasTextMetrics",
            "getPropertyValue",
            "mediaPlay",
            "mediaPause",
            "mediaSetSetCurrentTime",
            "mediaSetPlaybackRate",
            "mediaSetVolume",
            "startTimer",
            "stopTimer",
            "localStorageSet",
            "localStorageRemove",
            "localStorageClear",
            "setTitle",
            "setTitleColor",
            "openURL",
            "closeSocket",
            "focus",
            "blur",
            "popupCloseClick",
            "popupButtonClick",
            "stackTransitionEndEvent",
            "tabClickEvent",
            "tabCloseClickEvent",
            "dropDownListEvent",
            "selectDropDownListItem",
            "setTableCurrent",
            "tableCellClickEvent",
            "tableRowClickEvent",
            "clickEvent",
            "editViewInputEvent",
            "playerEvent",
        ];
        for name in calls {
            assert!(LOOM_JS.contains(&format!("function {name}(")), "{name}");
        }
    }

    #[test]
    fn test_handler_table_matches_runtime() {
        let handlers = crate::events::JS_HANDLERS.iter().chain(crate::events::FOCUS_HANDLERS);
        for handler in handlers {
            assert!(LOOM_JS.contains(&format!("function {}(", handler.js_func)), "{}", handler.js_func);
        }
        for binding in crate::media::EVENT_BINDINGS {
            let handler = binding.handler();
            let func = handler.split('(').next().unwrap_or_default();
            assert!(LOOM_JS.contains(&format!("function {func}(")), "{func}");
        }
    }
}
