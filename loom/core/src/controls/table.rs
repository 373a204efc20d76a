//! TableView: rows of text cells with optional cell or row selection
//!
//! Cells are addressed in the page as `<id>-<row>-<column>`, rows as
//! `<id>-<row>`. The first `head-height` rows form the `<thead>`, the last
//! `foot-height` rows the `<tfoot>`; only body rows are clickable.

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::bridge::ScriptArg;
use crate::error::{LoomError, LoomResult};
use crate::events::{
    CellIndex, TABLE_CELL_CLICKED_EVENT, TABLE_CELL_SELECTED_EVENT, TABLE_ROW_CLICKED_EVENT,
    TABLE_ROW_SELECTED_EVENT,
};
use crate::properties::enums;
use crate::properties::names;
use crate::properties::resolve::{enum_value, int_value};
use crate::properties::PropertyValue;
use crate::session::Session;
use crate::view::{escape_html, ViewId};

/// Class of the selected cell or row
const CURRENT_CLASS: &str = "ruiCurrentTableCell";

/// Source of the cell texts of a table
pub trait TableAdapter: Send + Sync {
    /// Number of rows, head and foot included
    fn row_count(&self) -> usize;

    /// Number of columns
    fn column_count(&self) -> usize;

    /// Text of one cell; empty outside the table
    fn cell(&self, row: usize, column: usize) -> String;
}

/// Table over rows of texts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextTableAdapter {
    rows: Vec<Vec<String>>,
}

impl TextTableAdapter {
    /// Adapter over `rows`; short rows read as empty cells
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// One row per line, cells separated by commas
    #[must_use]
    pub fn from_lines(lines: &[String]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
                .collect(),
        )
    }
}

impl TableAdapter for TextTableAdapter {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> String {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_default()
    }
}

/// What a click selects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Nothing
    #[default]
    None,
    /// One cell
    Cell,
    /// A whole row
    Row,
}

impl SelectionMode {
    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Cell,
            2 => Self::Row,
            _ => Self::None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cell => "cell",
            Self::Row => "row",
        }
    }
}

/// Rows and selection of a table view
#[derive(Default)]
pub struct TableState {
    adapter: Option<Arc<dyn TableAdapter>>,
    current: Option<CellIndex>,
}

impl fmt::Debug for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("rows", &self.adapter.as_ref().map(|adapter| adapter.row_count()))
            .field("current", &self.current)
            .finish()
    }
}

impl Session {
    fn table_adapter(&self, id: &ViewId) -> Option<Arc<dyn TableAdapter>> {
        self.views.get(id).and_then(|view| view.table()).and_then(|table| table.adapter.clone())
    }

    /// Install the cell source of a table view and re-render its rows
    pub fn set_table_content(&mut self, id: &ViewId, adapter: Option<Arc<dyn TableAdapter>>) {
        let id = self.forward(id);
        match self.view_mut(&id).and_then(|view| view.table_mut()) {
            Some(table) => {
                table.adapter = adapter;
                table.current = None;
            }
            None => {
                tracing::warn!(view = %id, "table content on a view that is not a table");
                return;
            }
        }
        self.property_changed(&id, &[names::CONTENT.to_string()]);
    }

    /// `content` of a table: one text per row, cells separated by commas
    pub(crate) fn set_table_value(&mut self, id: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let adapter: Option<Arc<dyn TableAdapter>> = match value {
            None => None,
            Some(PropertyValue::Texts(lines)) => Some(Arc::new(TextTableAdapter::from_lines(&lines))),
            Some(PropertyValue::Text(line)) => Some(Arc::new(TextTableAdapter::from_lines(&[line]))),
            Some(other) => return Err(LoomError::incompatible(names::CONTENT, &other)),
        };
        self.set_table_content(id, adapter);
        Ok(())
    }

    /// Number of rows, head and foot included
    #[must_use]
    pub fn get_table_row_count(&self, id: &ViewId) -> usize {
        self.table_adapter(&self.forward(id)).map_or(0, |adapter| adapter.row_count())
    }

    /// What a click on the table selects
    #[must_use]
    pub fn get_selection_mode(&self, id: &ViewId) -> SelectionMode {
        self.style_value(id, names::SELECTION_MODE)
            .and_then(|v| enum_value(&v, &enums::SELECTION_MODE, &self.resolver()))
            .map_or(SelectionMode::None, SelectionMode::from_index)
    }

    /// Selected cell; the column is `0` in row mode
    #[must_use]
    pub fn get_table_current(&self, id: &ViewId) -> Option<CellIndex> {
        let id = self.forward(id);
        self.views.get(&id).and_then(|view| view.table()).and_then(|table| table.current)
    }

    fn table_rows(&self, id: &ViewId, tag: &str) -> usize {
        self.style_value(id, tag)
            .and_then(|v| int_value(&v, &self.resolver()))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Html id of the selected element
    fn table_current_id(&self, id: &ViewId, current: CellIndex) -> String {
        match self.get_selection_mode(id) {
            SelectionMode::Row => format!("{id}-{}", current.row),
            _ => format!("{id}-{}-{}", current.row, current.column),
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub(crate) fn write_table_attributes(&self, id: &ViewId, out: &mut String) {
        let mode = self.get_selection_mode(id);
        let _ = write!(out, " data-selection=\"{}\"", mode.name());
        if let Some(current) = self.get_table_current(id).filter(|_| mode != SelectionMode::None) {
            let _ = write!(out, " data-current=\"{}\"", self.table_current_id(id, current));
        }
    }

    pub(crate) fn write_table_rows(&self, id: &ViewId, out: &mut String) {
        let Some(adapter) = self.table_adapter(id) else {
            return;
        };
        let rows = adapter.row_count();
        let columns = adapter.column_count();
        let head = self.table_rows(id, names::HEAD_HEIGHT).min(rows);
        let foot = self.table_rows(id, names::FOOT_HEIGHT).min(rows - head);
        let mode = self.get_selection_mode(id);
        let current = self.get_table_current(id);
        let cell_click = mode == SelectionMode::Cell || self.has_listeners(id, TABLE_CELL_CLICKED_EVENT);
        let row_click = mode == SelectionMode::Row || self.has_listeners(id, TABLE_ROW_CLICKED_EVENT);

        let sections = [
            ("thead", "th", 0..head),
            ("tbody", "td", head..rows - foot),
            ("tfoot", "th", rows - foot..rows),
        ];
        for (section, cell_tag, range) in sections {
            if range.is_empty() {
                continue;
            }
            let body = section == "tbody";
            let _ = write!(out, "<{section}>");
            for row in range {
                let _ = write!(out, "<tr id=\"{id}-{row}\"");
                if body && row_click {
                    out.push_str(" onclick=\"tableRowClickEvent(this, event)\"");
                }
                if mode == SelectionMode::Row && current.is_some_and(|c| c.row == row) {
                    let _ = write!(out, " class=\"{CURRENT_CLASS}\"");
                }
                out.push('>');
                for column in 0..columns {
                    let _ = write!(out, "<{cell_tag} id=\"{id}-{row}-{column}\"");
                    if body && cell_click {
                        out.push_str(" onclick=\"tableCellClickEvent(this, event)\"");
                    }
                    if mode == SelectionMode::Cell && current == Some(CellIndex { row, column }) {
                        let _ = write!(out, " class=\"{CURRENT_CLASS}\"");
                    }
                    let _ = write!(out, ">{}</{cell_tag}>", escape_html(&adapter.cell(row, column)));
                }
                out.push_str("</tr>");
            }
            let _ = write!(out, "</{section}>");
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn store_table_current(&mut self, id: &ViewId, current: Option<CellIndex>) {
        if let Some(table) = self.view_mut(id).and_then(|view| view.table_mut()) {
            table.current = current;
        }
    }

    fn fire_table_selected(&mut self, id: &ViewId, mode: SelectionMode, current: CellIndex) {
        match mode {
            SelectionMode::Cell => {
                self.fire(id, TABLE_CELL_SELECTED_EVENT, &current);
            }
            SelectionMode::Row => {
                self.fire(id, TABLE_ROW_SELECTED_EVENT, &current.row);
            }
            SelectionMode::None => {}
        }
    }

    /// Select a cell (or in row mode its row) from code
    ///
    /// `None` clears the selection. Ignored while `selection-mode` is `none`.
    pub fn set_table_current(&mut self, id: &ViewId, current: Option<CellIndex>) {
        let id = self.forward(id);
        let mode = self.get_selection_mode(&id);
        if mode == SelectionMode::None {
            tracing::warn!(view = %id, "table selection while selection-mode is none");
            return;
        }
        let current = current.map(|cell| match mode {
            SelectionMode::Row => CellIndex { column: 0, ..cell },
            _ => cell,
        });
        if let Some(cell) = current {
            let Some(adapter) = self.table_adapter(&id) else {
                tracing::warn!(view = %id, "table selection without content");
                return;
            };
            if cell.row >= adapter.row_count() || cell.column >= adapter.column_count().max(1) {
                tracing::warn!(view = %id, row = cell.row, column = cell.column, "selection outside the table");
                return;
            }
        }
        if current == self.get_table_current(&id) {
            return;
        }

        self.store_table_current(&id, current);
        if self.is_on_screen(&id) {
            let element = current.map(|cell| self.table_current_id(&id, cell)).unwrap_or_default();
            self.emit(|bridge| {
                bridge.call_func("setTableCurrent", &[ScriptArg::from(id.as_str()), ScriptArg::from(element)]);
            });
        }
        if let Some(cell) = current {
            self.fire_table_selected(&id, mode, cell);
        }
    }

    /// The user clicked a body cell; the browser already moved the selection
    pub(crate) fn table_cell_clicked(&mut self, id: &ViewId, cell: CellIndex) {
        let Some(adapter) = self.table_adapter(id) else {
            return;
        };
        if cell.row >= adapter.row_count() || cell.column >= adapter.column_count() {
            tracing::warn!(view = %id, row = cell.row, column = cell.column, "click outside the table");
            return;
        }
        if self.get_selection_mode(id) == SelectionMode::Cell && self.get_table_current(id) != Some(cell) {
            self.store_table_current(id, Some(cell));
            self.fire(id, TABLE_CELL_SELECTED_EVENT, &cell);
        }
        self.fire(id, TABLE_CELL_CLICKED_EVENT, &cell);
    }

    /// The user clicked a body row; the browser already moved the selection
    pub(crate) fn table_row_clicked(&mut self, id: &ViewId, row: usize) {
        if row >= self.get_table_row_count(id) {
            tracing::warn!(view = %id, row, "click below the table");
            return;
        }
        let cell = CellIndex { row, column: 0 };
        if self.get_selection_mode(id) == SelectionMode::Row && self.get_table_current(id) != Some(cell) {
            self.store_table_current(id, Some(cell));
            self.fire(id, TABLE_ROW_SELECTED_EVENT, &row);
        }
        self.fire(id, TABLE_ROW_CLICKED_EVENT, &row);
    }
}
