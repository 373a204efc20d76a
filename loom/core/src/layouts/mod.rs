//! Page layouts
//!
//! `StackLayout` and `TabsLayout` show one child at a time. Both wrap every
//! child in a page element owned by the layout (`<id>page<n>` for stacks,
//! `<id>-page<n>` for tabs), so switching pages is a CSS change on the
//! wrappers and never touches the children's own elements.
//!
//! # Design Philosophy
//!
//! - The page index lives on the server; the browser is told, not asked
//! - Stack moves are two-phase: the start state is emitted at once, the
//!   bookkeeping completes when the browser reports the transition end
//! - A layout that is not on screen completes every move immediately

mod stack;
mod tabs;

pub use stack::StackAnimation;
pub use tabs::TabsPosition;
