// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ViewKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewKind,
    pub authenticated: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: ViewKind::Login,
            authenticated: false,
            status_line: None,
        }
    }
}

impl AppState {
    /// Starting state for a session that may already hold a token.
    pub fn with_session(authenticated: bool) -> Self {
        Self {
            view: if authenticated {
                ViewKind::Users
            } else {
                ViewKind::Login
            },
            authenticated,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(ViewKind),
    NextView,
    PrevView,
    LoginSucceeded,
    LoggedOut,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    RedirectedToLogin,
    SessionChanged(bool),
    StatusUpdated(String),
    StatusCleared,
}

pub const LOGIN_NOTICE: &str = "Login successful!";
pub const LOGOUT_NOTICE: &str = "User logout successful!";

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(view) => self.navigate(view),
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::LoginSucceeded => {
                self.authenticated = true;
                let mut events = vec![AppEvent::SessionChanged(true)];
                events.extend(self.navigate(ViewKind::Users));
                events.push(self.set_status(LOGIN_NOTICE));
                events
            }
            AppCommand::LoggedOut => {
                self.authenticated = false;
                self.view = ViewKind::Login;
                vec![
                    AppEvent::SessionChanged(false),
                    AppEvent::ViewChanged(ViewKind::Login),
                    self.set_status(LOGOUT_NOTICE),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn navigate(&mut self, view: ViewKind) -> Vec<AppEvent> {
        if view.requires_auth() && !self.authenticated {
            self.view = ViewKind::Login;
            return vec![
                AppEvent::RedirectedToLogin,
                AppEvent::ViewChanged(ViewKind::Login),
            ];
        }
        if self.view == view {
            return Vec::new();
        }
        self.view = view;
        vec![AppEvent::ViewChanged(view)]
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::NAV;
        let Some(current) = views.iter().position(|view| *view == self.view) else {
            return self.navigate(ViewKind::Users);
        };
        let len = views.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        self.navigate(views[next])
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, LOGIN_NOTICE, LOGOUT_NOTICE};
    use crate::ViewKind;

    #[test]
    fn protected_views_redirect_without_session() {
        let mut state = AppState::default();

        for view in ViewKind::NAV {
            let events = state.dispatch(AppCommand::Navigate(view));
            assert_eq!(state.view, ViewKind::Login);
            assert_eq!(
                events,
                vec![
                    AppEvent::RedirectedToLogin,
                    AppEvent::ViewChanged(ViewKind::Login),
                ],
            );
        }
    }

    #[test]
    fn login_lands_on_users_with_notice() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::LoginSucceeded);
        assert!(state.authenticated);
        assert_eq!(state.view, ViewKind::Users);
        assert_eq!(state.status_line.as_deref(), Some(LOGIN_NOTICE));
        assert_eq!(
            events,
            vec![
                AppEvent::SessionChanged(true),
                AppEvent::ViewChanged(ViewKind::Users),
                AppEvent::StatusUpdated(LOGIN_NOTICE.to_owned()),
            ],
        );
    }

    #[test]
    fn view_rotation_wraps_within_nav() {
        let mut state = AppState::with_session(true);
        state.dispatch(AppCommand::Navigate(ViewKind::Tasks));

        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(state.view, ViewKind::Users);
        assert_eq!(events, vec![AppEvent::ViewChanged(ViewKind::Users)]);

        state.dispatch(AppCommand::PrevView);
        assert_eq!(state.view, ViewKind::Tasks);
    }

    #[test]
    fn logout_returns_to_login() {
        let mut state = AppState::with_session(true);

        let events = state.dispatch(AppCommand::LoggedOut);
        assert!(!state.authenticated);
        assert_eq!(state.view, ViewKind::Login);
        assert_eq!(events.last(), Some(&AppEvent::StatusUpdated(LOGOUT_NOTICE.to_owned())));

        state.dispatch(AppCommand::Navigate(ViewKind::Projects));
        assert_eq!(state.view, ViewKind::Login);
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("saved".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("saved"));

        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
    }
}
