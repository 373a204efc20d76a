//! Form controls and tables
//!
//! `DropDownList`, `NumberPicker` and `TableView` are plain form elements in
//! the browser. The browser owns the widget state while the user interacts
//! with it and reports the result (`itemSelected`, `textChanged`,
//! `cellClick`, ...); the session stores the new value without echoing it
//! back and fires the kind's event.
//!
//! # Design Philosophy
//!
//! - Values set from code are validated against the control (item count,
//!   number range) before they are stored
//! - Only the changed piece is patched: the selected index, the input value,
//!   the `<datalist>` options; structural changes re-render the element body

mod data_list;
mod drop_down;
mod number_picker;
mod table;

pub use number_picker::NumberPickerType;
pub use table::{SelectionMode, TableAdapter, TableState, TextTableAdapter};

pub(crate) use data_list::accepts_data_list;
