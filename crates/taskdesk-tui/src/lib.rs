// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod pages;
mod render;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use taskdesk_api::ApiError;
use taskdesk_app::{AppCommand, AppEvent, AppState, ViewKind};
use taskdesk_store::{Dashboard, Outcome, Request, Ticket, rejected};
use tracing::{debug, warn};

use pages::{Focus, FormSlot, Pages};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Where backend calls run. The default `spawn_request` answers on the
/// calling thread; real runtimes hand the call to a worker and report back
/// through `tx`.
pub trait AppRuntime {
    fn perform(&mut self, request: Request) -> Outcome;
    fn spawn_request(
        &mut self,
        ticket: Ticket,
        request: Request,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = self.perform(request);
        tx.send(InternalEvent::Settled { ticket, outcome })
            .map_err(|_| anyhow::anyhow!("request event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Settled { ticket: Ticket, outcome: Outcome },
}

#[derive(Debug)]
struct ViewData {
    dashboard: Dashboard,
    pages: Pages,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    dashboard: Dashboard,
    runtime: &mut R,
    page_size: usize,
) -> Result<()> {
    let pages = Pages::new(page_size).context("build page forms")?;
    let mut view_data = ViewData {
        dashboard,
        pages,
        status_token: 0,
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let initial = state.view;
    for request in view_data.pages.enter(initial) {
        send_request(runtime, &mut view_data, &internal_tx, request);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render::render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Settled { ticket, outcome } => {
                settle_outcome(state, runtime, view_data, tx, ticket, outcome);
            }
        }
    }
}

fn settle_outcome<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    ticket: Ticket,
    outcome: Outcome,
) {
    let op = outcome.operation();
    let result = view_data.dashboard.settle(ticket, outcome);
    if let Err(error) = &result {
        debug!(operation = ?op, message = %error.message, "request failed");
    }

    let reaction = view_data
        .pages
        .on_settled(&view_data.dashboard, op, &result);
    if reaction.logged_in {
        let events = state.dispatch(AppCommand::LoginSucceeded);
        apply_app_events(runtime, view_data, tx, events);
    }
    if let Some(notice) = reaction.notice {
        emit_status(state, view_data, tx, notice);
    }
    for request in reaction.follow_up {
        send_request(runtime, view_data, tx, request);
    }
}

fn send_request<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request: Request,
) {
    let op = request.operation();
    let ticket = view_data.dashboard.dispatch(&request);
    debug!(operation = ?op, "dispatch request");
    if let Err(error) = runtime.spawn_request(ticket, request.clone(), tx.clone()) {
        warn!(operation = ?op, error = %format!("{error:#}"), "spawn request");
        let outcome = rejected(request, ApiError::transport(op));
        if tx.send(InternalEvent::Settled { ticket, outcome }).is_err() {
            warn!(operation = ?op, "request event channel closed");
        }
    }
}

fn apply_app_events<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: Vec<AppEvent>,
) {
    for event in events {
        match event {
            AppEvent::ViewChanged(view) => {
                for request in view_data.pages.enter(view) {
                    send_request(runtime, view_data, tx, request);
                }
            }
            AppEvent::StatusUpdated(_) => bump_status_token(view_data, tx),
            AppEvent::RedirectedToLogin | AppEvent::SessionChanged(_) | AppEvent::StatusCleared => {
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn navigate<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    apply_app_events(runtime, view_data, tx, events);
}

fn logout<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !state.authenticated {
        return;
    }
    let cleared = view_data.dashboard.auth.logout();
    view_data.dashboard.tasks.stop_editing();
    navigate(state, runtime, view_data, tx, AppCommand::LoggedOut);
    if let Err(error) = cleared {
        warn!(error = %format!("{error:#}"), "clear stored token");
        emit_status(
            state,
            view_data,
            tx,
            format!("logged out, but the saved token could not be removed: {error:#}"),
        );
    }
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    slot: FormSlot,
) {
    let view = state.view;
    if view_data.pages.busy(view, slot, &view_data.dashboard) {
        return;
    }
    match view_data.pages.submit(view, slot, &view_data.dashboard) {
        Ok(Some(request)) => send_request(runtime, view_data, tx, request),
        Ok(None) => {}
        Err(blocked) => emit_status(state, view_data, tx, blocked.to_string()),
    }
}

fn delete_selected<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if let Some(request) = view_data
        .pages
        .delete_selected(state.view, &view_data.dashboard)
    {
        send_request(runtime, view_data, tx, request);
    }
}

fn edit_selected(state: &mut AppState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    if state.view != ViewKind::Tasks {
        return;
    }
    if !view_data.pages.edit_selected(&mut view_data.dashboard) {
        emit_status(state, view_data, tx, "no task selected");
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => return true,
            KeyCode::Char('n') => {
                navigate(state, runtime, view_data, internal_tx, AppCommand::NextView);
            }
            KeyCode::Char('p') => {
                navigate(state, runtime, view_data, internal_tx, AppCommand::PrevView);
            }
            KeyCode::Char('l') => logout(state, runtime, view_data, internal_tx),
            KeyCode::Char('r') => {
                for request in Pages::refresh(state.view) {
                    send_request(runtime, view_data, internal_tx, request);
                }
            }
            _ => {}
        }
        return false;
    }

    let view = state.view;
    let focus = view_data.pages.focus();
    match key.code {
        KeyCode::Tab => view_data.pages.move_focus(view, 1),
        KeyCode::BackTab => view_data.pages.move_focus(view, -1),
        KeyCode::Esc => {
            if view == ViewKind::Tasks && view_data.pages.cancel_edit(&mut view_data.dashboard) {
                emit_status(state, view_data, internal_tx, "edit cancelled");
            }
        }
        KeyCode::Enter => match focus {
            Focus::Field(slot, _) | Focus::Submit(slot) => {
                submit_form(state, runtime, view_data, internal_tx, slot);
            }
            Focus::Rows => edit_selected(state, view_data, internal_tx),
            Focus::Search => {}
        },
        KeyCode::Backspace => view_data.pages.backspace(view, &view_data.dashboard),
        KeyCode::Up | KeyCode::Down => {
            let delta = if key.code == KeyCode::Up { -1 } else { 1 };
            if !view_data.pages.cycle_select(view, delta) && focus == Focus::Rows {
                view_data
                    .pages
                    .move_cursor(view, &view_data.dashboard, delta);
            }
        }
        KeyCode::Left | KeyCode::Right => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            if !view_data.pages.cycle_select(view, delta) && focus == Focus::Rows {
                view_data
                    .pages
                    .turn_page(view, &view_data.dashboard, delta);
            }
        }
        KeyCode::PageUp if focus == Focus::Rows => {
            view_data.pages.turn_page(view, &view_data.dashboard, -1);
        }
        KeyCode::PageDown if focus == Focus::Rows => {
            view_data.pages.turn_page(view, &view_data.dashboard, 1);
        }
        KeyCode::Delete if focus == Focus::Rows => {
            delete_selected(state, runtime, view_data, internal_tx);
        }
        KeyCode::Char(ch) if focus == Focus::Rows => match ch {
            'd' => delete_selected(state, runtime, view_data, internal_tx),
            'e' => edit_selected(state, view_data, internal_tx),
            'j' => view_data.pages.move_cursor(view, &view_data.dashboard, 1),
            'k' => view_data.pages.move_cursor(view, &view_data.dashboard, -1),
            digit if digit.is_ascii_digit() => {
                let page = digit.to_digit(10).unwrap_or(0) as usize;
                view_data
                    .pages
                    .go_to_page(view, &view_data.dashboard, page);
            }
            _ => {}
        },
        KeyCode::Char(ch) => view_data.pages.type_char(view, &view_data.dashboard, ch),
        _ => {}
    }
    false
}
