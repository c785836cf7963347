// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap};
use taskdesk_app::{AppState, Form, SEARCH_PLACEHOLDER, TableView, ViewKind};

use crate::ViewData;
use crate::pages::{Focus, FormSlot};

const FOCUS_MARK: &str = ">";
const MASK_CHAR: char = '*';

pub(crate) fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, layout[0], state);

    if state.view == ViewKind::Login {
        render_login(frame, layout[1], view_data);
    } else {
        render_page(frame, layout[1], state.view, view_data);
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);
}

fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let block = Block::default().title("taskdesk").borders(Borders::ALL);
    if !state.authenticated {
        frame.render_widget(Paragraph::new("sign in to continue").block(block), area);
        return;
    }
    let selected = ViewKind::NAV
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let tabs = Tabs::new(ViewKind::NAV.iter().map(|view| view.label()).collect::<Vec<_>>())
        .block(block)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, area);
}

fn render_login(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let area = centered_rect(60, 70, area);
    let mut text = String::new();
    if let Some(error) = view_data
        .pages
        .banner(ViewKind::Login, &view_data.dashboard)
    {
        text.push_str(&format!("! {error}\n\n"));
    }
    text.push_str(&render_form_text(
        &view_data.pages.login,
        view_data.pages.focus(),
        FormSlot::Main,
        &view_data
            .pages
            .submit_caption(ViewKind::Login, FormSlot::Main, &view_data.dashboard),
    ));
    let form = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Log In").borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn render_page(frame: &mut ratatui::Frame<'_>, area: Rect, view: ViewKind, view_data: &ViewData) {
    let pages = &view_data.pages;
    let dashboard = &view_data.dashboard;

    let mut form_text = String::new();
    if let Some(error) = pages.banner(view, dashboard) {
        form_text.push_str(&format!("! {error}\n\n"));
    }
    if let Some(form) = pages.form(view, FormSlot::Main) {
        form_text.push_str(&render_form_text(
            form,
            pages.focus(),
            FormSlot::Main,
            &pages.submit_caption(view, FormSlot::Main, dashboard),
        ));
    }
    if let Some(filter) = pages.form(view, FormSlot::Filter) {
        form_text.push('\n');
        form_text.push_str(&render_form_text(
            filter,
            pages.focus(),
            FormSlot::Filter,
            &pages.submit_caption(view, FormSlot::Filter, dashboard),
        ));
    }
    let form_height = (form_text.lines().count() as u16).saturating_add(2);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let form = Paragraph::new(form_text).block(
        Block::default()
            .title(form_heading(view, view_data))
            .borders(Borders::ALL),
    );
    frame.render_widget(form, layout[0]);

    let search = pages.search(view);
    let search_text = if search.is_empty() {
        SEARCH_PLACEHOLDER.to_owned()
    } else {
        search.to_owned()
    };
    let search_style = if pages.focus() == Focus::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search_widget = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().title("search").borders(Borders::ALL));
    frame.render_widget(search_widget, layout[1]);

    let Some(table) = pages.table_view(view, dashboard) else {
        return;
    };
    render_table(frame, layout[2], view, &table, view_data);
    frame.render_widget(Paragraph::new(pagination_line(&table)), layout[3]);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: ViewKind,
    table: &TableView,
    view_data: &ViewData,
) {
    let title = list_heading(view);
    let block = Block::default().title(title).borders(Borders::ALL);

    if let Some(empty) = table.empty_message {
        frame.render_widget(Paragraph::new(empty).block(block), area);
        return;
    }

    let header = Row::new(table.headers.iter().map(|label| {
        Cell::from(label.clone()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows_focused = view_data.pages.focus() == Focus::Rows;
    let cursor = view_data.pages.cursor();
    let rows = table.rows.iter().enumerate().map(|(index, row)| {
        let mut cells = Vec::with_capacity(row.cells.len() + 1);
        cells.push(Cell::from(row.serial.to_string()));
        cells.extend(row.cells.iter().map(|cell| Cell::from(cell.clone())));
        let mut style = Style::default();
        if rows_focused && index == cursor.min(table.rows.len().saturating_sub(1)) {
            style = style.bg(Color::DarkGray);
        }
        Row::new(cells).style(style)
    });

    let mut widths = vec![Constraint::Length(4)];
    widths.extend(
        table
            .headers
            .iter()
            .skip(1)
            .map(|_| Constraint::Min(8)),
    );

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(widget, area);
}

fn form_heading(view: ViewKind, view_data: &ViewData) -> &'static str {
    match view {
        ViewKind::Login => "Log In",
        ViewKind::Users => "Add User",
        ViewKind::Projects => "Add Project",
        ViewKind::Tasks if view_data.dashboard.tasks.editing().is_some() => "Update Task",
        ViewKind::Tasks => "Add Task",
    }
}

fn list_heading(view: ViewKind) -> &'static str {
    match view {
        ViewKind::Login => "",
        ViewKind::Users => "List User",
        ViewKind::Projects => "List Project",
        ViewKind::Tasks => "List Task",
    }
}

/// One line per field, an indented error line under failing fields, and
/// the submit button last.
pub(crate) fn render_form_text(form: &Form, focus: Focus, slot: FormSlot, caption: &str) -> String {
    let mut lines = Vec::new();
    for (index, field) in form.view().into_iter().enumerate() {
        let mark = if focus == Focus::Field(slot, index) {
            FOCUS_MARK
        } else {
            " "
        };
        let required = if field.required { "*" } else { "" };
        let shown = if !field.options.is_empty() {
            let label = field
                .options
                .iter()
                .find(|option| option.value == field.value)
                .map_or(field.value.as_str(), |option| option.label.as_str());
            format!("< {label} >")
        } else if field.value.is_empty() {
            field
                .placeholder
                .as_deref()
                .map(|placeholder| format!("({placeholder})"))
                .unwrap_or_default()
        } else if field.kind == "password" {
            MASK_CHAR.to_string().repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        lines.push(format!("{mark} {}{required}: {shown}", field.label));
        if let Some(error) = field.error {
            lines.push(format!("    ! {error}"));
        }
    }
    let mark = if focus == Focus::Submit(slot) {
        FOCUS_MARK
    } else {
        " "
    };
    lines.push(format!("{mark} [ {caption} ]"));
    lines.join("\n")
}

/// Page controls: the active page in brackets. `Previous` and `Next` are
/// always shown and dimmed when there is nowhere to go.
pub(crate) fn pagination_line(table: &TableView) -> Line<'static> {
    let edge = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Span::styled(label, style)
    };

    let mut spans = Vec::with_capacity(table.pages.len() * 2 + 4);
    spans.push(edge("Previous", table.prev_enabled));
    for control in &table.pages {
        spans.push(Span::raw(" "));
        if control.active {
            spans.push(Span::styled(
                format!("[{}]", control.number),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(control.number.to_string()));
        }
    }
    spans.push(Span::raw(" "));
    spans.push(edge("Next", table.next_enabled));

    let counts = if table.filtered_count == table.total_count {
        format!("{} rows", table.total_count)
    } else {
        format!("{} of {} rows", table.filtered_count, table.total_count)
    };
    spans.push(Span::raw(format!("  ({counts})")));
    Line::from(spans)
}

pub(crate) fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let view = state.view.label().to_uppercase();
    let hints = match view_data.pages.focus() {
        Focus::Rows if state.view == ViewKind::Tasks => {
            "↑/↓ row | ←/→ page | e edit | d delete | tab focus"
        }
        Focus::Rows => "↑/↓ row | ←/→ page | d delete | tab focus",
        Focus::Search => "type to search | tab focus",
        Focus::Field(..) if view_data.pages.focused_is_select(state.view) => {
            "←/→ choose | tab next | enter submit"
        }
        Focus::Field(..) | Focus::Submit(_) => "tab next | enter submit",
    };
    let session = if state.authenticated {
        " | ctrl+n/p view | ctrl+r reload | ctrl+l logout"
    } else {
        ""
    };
    let busy = if view_data.dashboard.loading() {
        " | loading..."
    } else {
        ""
    };
    let default = format!("{hints}{session} | ctrl+q{busy}");
    match &state.status_line {
        Some(status) => format!("{view} | {status} | {default}"),
        None => format!("{view} | {default}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
