//! View graph
//!
//! Views live in the session's id index; a view refers to its parent and
//! children by [`ViewId`], never by pointer, so unlinking a subtree is enough
//! to make it unreachable.
//!
//! # Design Philosophy
//!
//! - One [`View`] struct for every kind; per-kind behavior is a match on
//!   [`ViewKind`] plus a small [`KindState`] for the kinds that keep more
//!   than properties (stack page moves, canvas drawers, custom wrappers)
//! - The `created` bit separates "mutate memory only" from "mutate memory and
//!   patch the browser"; it flips when the view's HTML is first emitted
//! - All operations that touch more than one view are session methods (see
//!   `tree.rs`, `html.rs`, `diff.rs`) because only the session can reach both

mod build;
mod diff;
mod getters;
mod html;
mod tree;

pub use getters::{CheckboxAlign, Visibility};
pub use html::escape_html;
pub(crate) use html::write_attr;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::animation::Animation;
use crate::canvas::Canvas;
use crate::controls::TableState;
use crate::properties::PropertyBag;
use crate::session::Session;
use crate::style::CssBuilder;
use crate::values::{Frame, Scroll};

// ============================================================================
// Identity
// ============================================================================

/// Session-unique html id of a view, `id` followed by six digits
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(String);

impl ViewId {
    /// Id of the `n`-th view of a session
    #[must_use]
    pub fn from_counter(n: u64) -> Self {
        Self(format!("id{n:06}"))
    }

    /// Html id text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ViewId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ViewId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Kinds
// ============================================================================

/// Variant of a view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Plain block
    View,
    /// Ordered children without layout of its own
    ViewsContainer,
    /// Flex list
    ListLayout,
    /// CSS grid
    GridLayout,
    /// Multi-column flow
    ColumnLayout,
    /// Absolutely positioned children
    AbsoluteLayout,
    /// Page stack with animated push/pop
    StackLayout,
    /// Tab bar plus one visible page
    TabsLayout,
    /// Text block
    TextView,
    /// Clickable text
    Button,
    /// Check mark plus text
    Checkbox,
    /// Text input
    EditView,
    /// `<select>` with one visible row
    DropDownList,
    /// Number editor or slider
    NumberPicker,
    /// `<table>` fed by a [`TableAdapter`](crate::controls::TableAdapter)
    TableView,
    /// Image
    ImageView,
    /// `<audio>` element
    AudioPlayer,
    /// `<video>` element
    VideoPlayer,
    /// `<canvas>` with a server-side drawer
    CanvasView,
    /// Wrapper forwarding to an inner view
    Custom,
}

const ALL_KINDS: [ViewKind; 20] = [
    ViewKind::View,
    ViewKind::ViewsContainer,
    ViewKind::ListLayout,
    ViewKind::GridLayout,
    ViewKind::ColumnLayout,
    ViewKind::AbsoluteLayout,
    ViewKind::StackLayout,
    ViewKind::TabsLayout,
    ViewKind::TextView,
    ViewKind::Button,
    ViewKind::Checkbox,
    ViewKind::EditView,
    ViewKind::DropDownList,
    ViewKind::NumberPicker,
    ViewKind::TableView,
    ViewKind::ImageView,
    ViewKind::AudioPlayer,
    ViewKind::VideoPlayer,
    ViewKind::CanvasView,
    ViewKind::Custom,
];

impl ViewKind {
    /// Name used in `.rui` view objects
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::ViewsContainer => "ViewsContainer",
            Self::ListLayout => "ListLayout",
            Self::GridLayout => "GridLayout",
            Self::ColumnLayout => "ColumnLayout",
            Self::AbsoluteLayout => "AbsoluteLayout",
            Self::StackLayout => "StackLayout",
            Self::TabsLayout => "TabsLayout",
            Self::TextView => "TextView",
            Self::Button => "Button",
            Self::Checkbox => "Checkbox",
            Self::EditView => "EditView",
            Self::DropDownList => "DropDownList",
            Self::NumberPicker => "NumberPicker",
            Self::TableView => "TableView",
            Self::ImageView => "ImageView",
            Self::AudioPlayer => "AudioPlayer",
            Self::VideoPlayer => "VideoPlayer",
            Self::CanvasView => "CanvasView",
            Self::Custom => "Custom",
        }
    }

    /// Kind of a `.rui` object tag (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_KINDS
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether the kind owns ordered children
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::ViewsContainer
                | Self::ListLayout
                | Self::GridLayout
                | Self::ColumnLayout
                | Self::AbsoluteLayout
                | Self::StackLayout
                | Self::TabsLayout
        )
    }

    /// Whether the kind is an `<audio>` / `<video>` element
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, Self::AudioPlayer | Self::VideoPlayer)
    }

    /// Class the framework puts before the user style
    #[must_use]
    pub fn system_class(self) -> &'static str {
        match self {
            Self::ListLayout => "ruiListLayout",
            Self::GridLayout => "ruiGridLayout",
            Self::ColumnLayout => "ruiColumnLayout",
            Self::AbsoluteLayout => "ruiAbsoluteLayout",
            Self::StackLayout => "ruiStackLayout",
            Self::TabsLayout => "ruiTabsLayout",
            Self::Button => "ruiButton",
            Self::Checkbox => "ruiCheckbox",
            Self::EditView => "ruiEditView",
            Self::DropDownList => "ruiDropDownList",
            Self::NumberPicker => "ruiNumberPicker",
            Self::TableView => "ruiTableView",
            Self::ImageView => "ruiImageView",
            _ => "",
        }
    }

    /// Element name
    #[must_use]
    pub fn html_tag(self) -> &'static str {
        match self {
            Self::EditView | Self::NumberPicker => "input",
            Self::DropDownList => "select",
            Self::TableView => "table",
            Self::ImageView => "img",
            Self::AudioPlayer => "audio",
            Self::VideoPlayer => "video",
            Self::CanvasView => "canvas",
            _ => "div",
        }
    }

    /// Whether the element has no closing tag
    #[must_use]
    pub fn is_void_element(self) -> bool {
        matches!(self, Self::EditView | Self::NumberPicker | Self::ImageView)
    }

    /// Whether the view takes focus unless `focusable` says otherwise
    #[must_use]
    pub fn default_focusable(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Checkbox | Self::EditView | Self::DropDownList | Self::NumberPicker | Self::TableView
        )
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Per-kind state
// ============================================================================

/// Called when a push finishes
pub type PushFinished = Box<dyn FnOnce(&mut Session) + Send>;

/// Called with the popped view when a pop finishes
pub type PopFinished = Box<dyn FnOnce(&mut Session, &ViewId) + Send>;

/// Server-side drawer of a canvas view
pub type DrawHandler = Arc<dyn Fn(&mut Canvas) + Send + Sync>;

/// Page move of a stack layout waiting for its transition end
pub enum StackMove {
    /// `view` slides in as the new top page
    Push {
        /// Pushed view
        view: ViewId,
        /// Completion callback
        on_finish: Option<PushFinished>,
    },
    /// `view` slides out
    Pop {
        /// Popped view
        view: ViewId,
        /// Completion callback
        on_finish: Option<PopFinished>,
    },
}

/// Stack layout bookkeeping
#[derive(Default)]
pub struct StackState {
    /// Index of the visible page
    pub peek: usize,
    /// Move in flight
    pub pending: Option<StackMove>,
}

/// State of the kinds that keep more than properties
#[derive(Default)]
pub enum KindState {
    /// Properties only
    #[default]
    Plain,
    /// Stack layout pages
    Stack(StackState),
    /// Canvas drawer
    Canvas(Option<DrawHandler>),
    /// Table rows and selection
    Table(TableState),
    /// Wrapped view
    Custom(ViewId),
}

// ============================================================================
// View
// ============================================================================

/// One node of the view graph
pub struct View {
    pub(crate) id: ViewId,
    pub(crate) kind: ViewKind,
    pub(crate) bag: PropertyBag,
    pub(crate) parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    pub(crate) created: bool,
    pub(crate) frame: Frame,
    pub(crate) scroll: Scroll,
    pub(crate) has_focus: bool,
    /// Single-shot transitions of `set_animated`, layered over `transition`
    pub(crate) animated: BTreeMap<String, Animation>,
    /// Keyframe names this view holds a reference on
    pub(crate) keyframes: Vec<String>,
    /// Inline CSS last sent to the browser
    pub(crate) css: CssBuilder,
    /// A `<datalist>` element was written after the input
    pub(crate) data_list: bool,
    pub(crate) state: KindState,
}

impl View {
    pub(crate) fn new(id: ViewId, kind: ViewKind) -> Self {
        let state = match kind {
            ViewKind::StackLayout => KindState::Stack(StackState::default()),
            ViewKind::CanvasView => KindState::Canvas(None),
            ViewKind::TableView => KindState::Table(TableState::default()),
            _ => KindState::Plain,
        };
        Self {
            id,
            kind,
            bag: PropertyBag::new(),
            parent: None,
            children: Vec::new(),
            created: false,
            frame: Frame::default(),
            scroll: Scroll::default(),
            has_focus: false,
            animated: BTreeMap::new(),
            keyframes: Vec::new(),
            css: CssBuilder::new(),
            data_list: false,
            state,
        }
    }

    /// Html id
    #[must_use]
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Variant
    #[must_use]
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Property bag
    #[must_use]
    pub fn bag(&self) -> &PropertyBag {
        &self.bag
    }

    /// Parent, `None` for the root and detached views
    #[must_use]
    pub fn parent(&self) -> Option<&ViewId> {
        self.parent.as_ref()
    }

    /// Children in order
    #[must_use]
    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    /// Whether the view's HTML has been emitted
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Last geometry reported by the browser
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Last scroll geometry reported by the browser
    #[must_use]
    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// Whether the browser reported focus on the view
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub(crate) fn stack(&self) -> Option<&StackState> {
        match &self.state {
            KindState::Stack(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn stack_mut(&mut self) -> Option<&mut StackState> {
        match &mut self.state {
            KindState::Stack(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn table(&self) -> Option<&TableState> {
        match &self.state {
            KindState::Table(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn table_mut(&mut self) -> Option<&mut TableState> {
        match &mut self.state {
            KindState::Table(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn custom_inner(&self) -> Option<&ViewId> {
        match &self.state {
            KindState::Custom(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("created", &self.created)
            .field("bag", &self.bag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_id_format() {
        assert_eq!(ViewId::from_counter(1).as_str(), "id000001");
        assert_eq!(ViewId::from_counter(1234567).to_string(), "id1234567");
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(ViewKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ViewKind::from_name("listlayout"), Some(ViewKind::ListLayout));
        assert_eq!(ViewKind::from_name("Spinner"), None);
    }

    #[test]
    fn test_kind_traits() {
        assert!(ViewKind::StackLayout.is_container());
        assert!(!ViewKind::Button.is_container());
        assert_eq!(ViewKind::EditView.html_tag(), "input");
        assert!(ViewKind::ImageView.is_void_element());
        assert_eq!(ViewKind::Button.system_class(), "ruiButton");
        assert!(ViewKind::Checkbox.default_focusable());
        assert_eq!(ViewKind::DropDownList.html_tag(), "select");
        assert!(ViewKind::NumberPicker.is_void_element());
        assert!(!ViewKind::TableView.is_void_element());
        assert_eq!(ViewKind::from_name("tableview"), Some(ViewKind::TableView));
    }
}
