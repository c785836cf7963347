// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use taskdesk_api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    Fetch,
    Add,
    Delete,
    Update,
    Login,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Login => "login",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected(String),
}

/// Handle for one dispatched call, returned when it goes pending and handed
/// back when its outcome is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub kind: OperationKind,
    pub seq: u64,
}

/// Per-operation lifecycle for one store.
///
/// Each kind moves `Idle -> Pending -> Fulfilled | Rejected` independently.
/// The banner error is the most recent rejection and is cleared whenever any
/// new operation starts.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    settled: BTreeMap<OperationKind, OperationStatus>,
    in_flight: BTreeMap<OperationKind, usize>,
    error: Option<String>,
    next_seq: u64,
}

impl StatusBoard {
    pub fn begin(&mut self, kind: OperationKind) -> Ticket {
        *self.in_flight.entry(kind).or_default() += 1;
        self.error = None;
        self.next_seq += 1;
        Ticket {
            kind,
            seq: self.next_seq,
        }
    }

    pub fn finish(&mut self, ticket: Ticket, error: Option<&ApiError>) {
        if let Some(count) = self.in_flight.get_mut(&ticket.kind) {
            *count = count.saturating_sub(1);
        }
        let status = match error {
            Some(error) => {
                self.error = Some(error.message.clone());
                OperationStatus::Rejected(error.message.clone())
            }
            None => OperationStatus::Fulfilled,
        };
        self.settled.insert(ticket.kind, status);
    }

    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        if self.is_pending(kind) {
            return OperationStatus::Pending;
        }
        self.settled.get(&kind).cloned().unwrap_or_default()
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.in_flight.get(&kind).is_some_and(|count| *count > 0)
    }

    pub fn loading(&self) -> bool {
        self.in_flight.values().any(|count| *count > 0)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{OperationKind, OperationStatus, StatusBoard};
    use taskdesk_api::{ApiError, Operation};

    #[test]
    fn kinds_progress_independently() {
        let mut board = StatusBoard::default();
        assert_eq!(board.status(OperationKind::Fetch), OperationStatus::Idle);

        let fetch = board.begin(OperationKind::Fetch);
        let delete = board.begin(OperationKind::Delete);
        assert!(board.loading());

        board.finish(fetch, None);
        assert_eq!(board.status(OperationKind::Fetch), OperationStatus::Fulfilled);
        assert_eq!(board.status(OperationKind::Delete), OperationStatus::Pending);
        assert!(board.loading());

        let error = ApiError::transport(Operation::DeleteProject);
        board.finish(delete, Some(&error));
        assert!(!board.loading());
        assert_eq!(
            board.status(OperationKind::Delete),
            OperationStatus::Rejected(error.message.clone())
        );
        assert_eq!(board.error(), Some(error.message.as_str()));
    }

    #[test]
    fn starting_an_operation_clears_the_banner() {
        let mut board = StatusBoard::default();
        let ticket = board.begin(OperationKind::Add);
        board.finish(ticket, Some(&ApiError::transport(Operation::AddUser)));
        assert!(board.error().is_some());

        let next = board.begin(OperationKind::Fetch);
        assert_eq!(board.error(), None);
        assert_ne!(next.seq, ticket.seq);
    }

    #[test]
    fn overlapping_calls_of_one_kind_stay_pending_until_all_settle() {
        let mut board = StatusBoard::default();
        let first = board.begin(OperationKind::Fetch);
        let second = board.begin(OperationKind::Fetch);

        board.finish(first, None);
        assert!(board.is_pending(OperationKind::Fetch));
        board.finish(second, None);
        assert!(!board.is_pending(OperationKind::Fetch));
    }
}
