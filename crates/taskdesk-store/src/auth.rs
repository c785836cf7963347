// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use taskdesk_api::{ApiError, ApiResult, Operation, TokenStore};
use taskdesk_app::Credentials;
use tracing::{info, warn};

use crate::{Backend, OperationKind, OperationStatus, StatusBoard, Ticket};

/// The session: one bearer token mirrored between memory and durable storage.
pub struct AuthStore {
    tokens: Arc<dyn TokenStore>,
    token: Option<String>,
    status: StatusBoard,
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStore")
            .field("authenticated", &self.is_authenticated())
            .field("status", &self.status)
            .finish()
    }
}

impl AuthStore {
    /// Seeds the session from durable storage. An unreadable token file is
    /// logged and treated as signed out.
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let token = match tokens.load() {
            Ok(token) => token,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "load stored token");
                None
            }
        };
        Self {
            tokens,
            token,
            status: StatusBoard::default(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn status(&self) -> OperationStatus {
        self.status.status(OperationKind::Login)
    }

    pub fn loading(&self) -> bool {
        self.status.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub fn begin_login(&mut self) -> Ticket {
        self.status.begin(OperationKind::Login)
    }

    /// Persists the token before marking the session authenticated, so the
    /// very next request already carries it.
    pub fn settle_login(&mut self, ticket: Ticket, result: ApiResult<String>) -> ApiResult<()> {
        let outcome = result.and_then(|token| {
            self.tokens.save(&token).map_err(|error| {
                warn!(error = %format!("{error:#}"), "persist token");
                ApiError::new(
                    Operation::Login,
                    None,
                    "Could not save the session token; check the token path and retry.",
                )
            })?;
            Ok(token)
        });

        match outcome {
            Ok(token) => {
                self.token = Some(token);
                self.status.finish(ticket, None);
                info!("login succeeded");
                Ok(())
            }
            Err(error) => {
                self.status.finish(ticket, Some(&error));
                warn!(message = %error.message, "login rejected");
                Err(error)
            }
        }
    }

    pub fn login(&mut self, backend: &dyn Backend, credentials: &Credentials) -> ApiResult<()> {
        let ticket = self.begin_login();
        self.settle_login(ticket, backend.login(credentials))
    }

    /// Drops the token from memory and storage before returning.
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.status.clear_error();
        self.tokens.clear()?;
        info!("logged out");
        Ok(())
    }
}
