// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Searchable, paginated projection over a record slice.
//!
//! [`DataTable`] stores only the page number and the search term. The
//! filtered set and the visible page are recomputed from the records on
//! every call, so they cannot drift from the source list.

use std::fmt;
use std::sync::Arc;

pub const NO_DATA_LABEL: &str = "No data available";
pub const SERIAL_LABEL: &str = "SR";
pub const SEARCH_PLACEHOLDER: &str = "Search...";

/// Field access used by raw (unrendered) columns and by search.
pub trait TableRecord {
    fn row_key(&self) -> String;
    fn field_text(&self, key: &str) -> Option<String>;
}

pub type RenderFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

pub enum ColumnRender<T> {
    Field,
    Custom(RenderFn<T>),
    Actions(Vec<RowAction>),
}

impl<T> Clone for ColumnRender<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Field => Self::Field,
            Self::Custom(render) => Self::Custom(Arc::clone(render)),
            Self::Actions(actions) => Self::Actions(actions.clone()),
        }
    }
}

impl<T> fmt::Debug for ColumnRender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => f.write_str("Field"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Actions(actions) => f.debug_tuple("Actions").field(actions).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDescriptor<T> {
    pub key: String,
    pub label: String,
    pub render: ColumnRender<T>,
}

impl<T: TableRecord> ColumnDescriptor<T> {
    pub fn field(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            render: ColumnRender::Field,
        }
    }

    pub fn custom(
        key: impl Into<String>,
        label: impl Into<String>,
        render: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            render: ColumnRender::Custom(Arc::new(render)),
        }
    }

    pub fn actions(
        key: impl Into<String>,
        label: impl Into<String>,
        actions: Vec<RowAction>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            render: ColumnRender::Actions(actions),
        }
    }

    pub fn display(&self, record: &T) -> String {
        match &self.render {
            ColumnRender::Field => record.field_text(&self.key).unwrap_or_default(),
            ColumnRender::Custom(render) => render(record),
            ColumnRender::Actions(actions) => actions
                .iter()
                .map(|action| format!("[{}]", action.label()))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn is_searchable(&self) -> bool {
        !matches!(self.render, ColumnRender::Actions(_))
    }

    fn row_actions(&self) -> &[RowAction] {
        match &self.render {
            ColumnRender::Actions(actions) => actions,
            ColumnRender::Field | ColumnRender::Custom(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub page: usize,
    pub search: String,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub number: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowView {
    pub key: String,
    pub serial: usize,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub search: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRowView>,
    pub empty_message: Option<&'static str>,
    pub page: usize,
    pub page_count: usize,
    pub pages: Vec<PageControl>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub filtered_count: usize,
    pub total_count: usize,
}

/// Number of pages for `filtered` rows; never below one so an empty table
/// still reads "page 1 of 1".
pub fn page_count(filtered: usize, page_size: usize) -> usize {
    filtered.div_ceil(page_size.max(1)).max(1)
}

// Lowers per character: `str::to_lowercase` turns a word-final Σ into ς,
// which would make a term fold differently from its own prefix.
fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone)]
pub struct DataTable<T> {
    columns: Vec<ColumnDescriptor<T>>,
    page_size: usize,
    state: TableState,
}

impl<T: TableRecord> DataTable<T> {
    pub fn new(columns: Vec<ColumnDescriptor<T>>, page_size: usize) -> Self {
        Self {
            columns,
            page_size: page_size.max(1),
            state: TableState::default(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn matches(&self, record: &T, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = fold_case(needle);
        self.columns
            .iter()
            .filter(|column| column.is_searchable())
            .any(|column| fold_case(&column.display(record)).contains(&needle))
    }

    pub fn filtered<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records
            .iter()
            .filter(|record| self.matches(record, &self.state.search))
            .collect()
    }

    pub fn page_count(&self, records: &[T]) -> usize {
        page_count(self.filtered(records).len(), self.page_size)
    }

    /// Updates the search term, keeping the current page unless it no longer
    /// exists for the narrowed set.
    pub fn set_search(&mut self, term: impl Into<String>, records: &[T]) {
        self.state.search = term.into();
        self.clamp(records);
    }

    /// Re-applies the page bounds after the underlying records changed.
    pub fn clamp(&mut self, records: &[T]) {
        let pages = self.page_count(records);
        self.state.page = self.state.page.clamp(1, pages);
    }

    /// Jumps to `page`; out-of-range requests are ignored.
    pub fn go_to_page(&mut self, page: usize, records: &[T]) -> bool {
        let pages = self.page_count(records);
        if page == 0 || page > pages || page == self.state.page {
            self.clamp(records);
            return false;
        }
        self.state.page = page;
        true
    }

    pub fn next_page(&mut self, records: &[T]) -> bool {
        self.go_to_page(self.state.page.saturating_add(1), records)
    }

    pub fn prev_page(&mut self, records: &[T]) -> bool {
        self.go_to_page(self.state.page.saturating_sub(1), records)
    }

    pub fn view(&self, records: &[T]) -> TableView {
        let filtered = self.filtered(records);
        let pages = page_count(filtered.len(), self.page_size);
        let page = self.state.page.clamp(1, pages);
        let start = (page - 1) * self.page_size;

        let rows = filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .enumerate()
            .map(|(index, record)| TableRowView {
                key: record.row_key(),
                serial: start + index + 1,
                cells: self
                    .columns
                    .iter()
                    .map(|column| column.display(record))
                    .collect(),
                actions: self
                    .columns
                    .iter()
                    .flat_map(|column| column.row_actions().iter().copied())
                    .collect(),
            })
            .collect::<Vec<_>>();

        let mut headers = Vec::with_capacity(self.columns.len() + 1);
        headers.push(SERIAL_LABEL.to_owned());
        headers.extend(self.columns.iter().map(|column| column.label.clone()));

        TableView {
            search: self.state.search.clone(),
            headers,
            empty_message: rows.is_empty().then_some(NO_DATA_LABEL),
            rows,
            page,
            page_count: pages,
            pages: (1..=pages)
                .map(|number| PageControl {
                    number,
                    active: number == page,
                })
                .collect(),
            prev_enabled: page > 1,
            next_enabled: page < pages,
            filtered_count: filtered.len(),
            total_count: records.len(),
        }
    }
}
