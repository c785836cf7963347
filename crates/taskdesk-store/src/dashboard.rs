// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use taskdesk_api::{ApiError, ApiResult, Operation, TokenStore};
use taskdesk_app::{
    Credentials, NewProject, NewTask, NewUser, Project, ProjectId, Task, TaskId, User, UserId,
};

use crate::{AuthStore, Backend, OperationKind, ProjectStore, TaskStore, Ticket, UserStore};

/// One backend call, as dispatched from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Login(Credentials),
    FetchUsers,
    AddUser(NewUser),
    DeleteUser(UserId),
    FetchProjects,
    AddProject(NewProject),
    DeleteProject(ProjectId),
    FetchTasks,
    AddTask(NewTask),
    UpdateTask(TaskId, NewTask),
    DeleteTask(TaskId),
}

impl Request {
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Login(_) => Operation::Login,
            Self::FetchUsers => Operation::FetchUsers,
            Self::AddUser(_) => Operation::AddUser,
            Self::DeleteUser(_) => Operation::DeleteUser,
            Self::FetchProjects => Operation::FetchProjects,
            Self::AddProject(_) => Operation::AddProject,
            Self::DeleteProject(_) => Operation::DeleteProject,
            Self::FetchTasks => Operation::FetchTasks,
            Self::AddTask(_) => Operation::AddTask,
            Self::UpdateTask(..) => Operation::UpdateTask,
            Self::DeleteTask(_) => Operation::DeleteTask,
        }
    }

    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Login(_) => OperationKind::Login,
            Self::FetchUsers | Self::FetchProjects | Self::FetchTasks => OperationKind::Fetch,
            Self::AddUser(_) | Self::AddProject(_) | Self::AddTask(_) => OperationKind::Add,
            Self::DeleteUser(_) | Self::DeleteProject(_) | Self::DeleteTask(_) => {
                OperationKind::Delete
            }
            Self::UpdateTask(..) => OperationKind::Update,
        }
    }
}

/// The raw answer to a [`Request`], not yet applied to any store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    LoggedIn(ApiResult<String>),
    FetchedUsers(ApiResult<Vec<User>>),
    AddedUser(ApiResult<User>),
    DeletedUser(UserId, ApiResult<()>),
    FetchedProjects(ApiResult<Vec<Project>>),
    AddedProject(ApiResult<Project>),
    DeletedProject(ProjectId, ApiResult<()>),
    FetchedTasks(ApiResult<Vec<Task>>),
    AddedTask(ApiResult<Task>),
    UpdatedTask(ApiResult<Task>),
    DeletedTask(TaskId, ApiResult<()>),
}

impl Outcome {
    pub fn operation(&self) -> Operation {
        match self {
            Self::LoggedIn(_) => Operation::Login,
            Self::FetchedUsers(_) => Operation::FetchUsers,
            Self::AddedUser(_) => Operation::AddUser,
            Self::DeletedUser(..) => Operation::DeleteUser,
            Self::FetchedProjects(_) => Operation::FetchProjects,
            Self::AddedProject(_) => Operation::AddProject,
            Self::DeletedProject(..) => Operation::DeleteProject,
            Self::FetchedTasks(_) => Operation::FetchTasks,
            Self::AddedTask(_) => Operation::AddTask,
            Self::UpdatedTask(_) => Operation::UpdateTask,
            Self::DeletedTask(..) => Operation::DeleteTask,
        }
    }
}

/// Runs `request` against `backend`. Safe to call off the UI thread; it
/// touches no store.
pub fn perform(backend: &dyn Backend, request: Request) -> Outcome {
    match request {
        Request::Login(credentials) => Outcome::LoggedIn(backend.login(&credentials)),
        Request::FetchUsers => Outcome::FetchedUsers(backend.list_users()),
        Request::AddUser(user) => Outcome::AddedUser(backend.add_user(&user)),
        Request::DeleteUser(id) => {
            let result = backend.delete_user(&id);
            Outcome::DeletedUser(id, result)
        }
        Request::FetchProjects => Outcome::FetchedProjects(backend.list_projects()),
        Request::AddProject(project) => Outcome::AddedProject(backend.add_project(&project)),
        Request::DeleteProject(id) => {
            let result = backend.delete_project(&id);
            Outcome::DeletedProject(id, result)
        }
        Request::FetchTasks => Outcome::FetchedTasks(backend.list_tasks()),
        Request::AddTask(task) => Outcome::AddedTask(backend.add_task(&task)),
        Request::UpdateTask(id, task) => Outcome::UpdatedTask(backend.update_task(&id, &task)),
        Request::DeleteTask(id) => {
            let result = backend.delete_task(&id);
            Outcome::DeletedTask(id, result)
        }
    }
}

/// The outcome `request` would have had if it failed with `error` before
/// reaching the backend.
pub fn rejected(request: Request, error: ApiError) -> Outcome {
    match request {
        Request::Login(_) => Outcome::LoggedIn(Err(error)),
        Request::FetchUsers => Outcome::FetchedUsers(Err(error)),
        Request::AddUser(_) => Outcome::AddedUser(Err(error)),
        Request::DeleteUser(id) => Outcome::DeletedUser(id, Err(error)),
        Request::FetchProjects => Outcome::FetchedProjects(Err(error)),
        Request::AddProject(_) => Outcome::AddedProject(Err(error)),
        Request::DeleteProject(id) => Outcome::DeletedProject(id, Err(error)),
        Request::FetchTasks => Outcome::FetchedTasks(Err(error)),
        Request::AddTask(_) => Outcome::AddedTask(Err(error)),
        Request::UpdateTask(..) => Outcome::UpdatedTask(Err(error)),
        Request::DeleteTask(id) => Outcome::DeletedTask(id, Err(error)),
    }
}

/// All client-side state, owned by the UI thread.
#[derive(Debug)]
pub struct Dashboard {
    pub auth: AuthStore,
    pub users: UserStore,
    pub projects: ProjectStore,
    pub tasks: TaskStore,
}

impl Dashboard {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            auth: AuthStore::new(tokens),
            users: UserStore::default(),
            projects: ProjectStore::default(),
            tasks: TaskStore::default(),
        }
    }

    /// Marks the owning store pending for `request`.
    pub fn dispatch(&mut self, request: &Request) -> Ticket {
        let kind = request.kind();
        match request {
            Request::Login(_) => self.auth.begin_login(),
            Request::FetchUsers | Request::AddUser(_) | Request::DeleteUser(_) => {
                self.users.begin(kind)
            }
            Request::FetchProjects | Request::AddProject(_) | Request::DeleteProject(_) => {
                self.projects.begin(kind)
            }
            Request::FetchTasks
            | Request::AddTask(_)
            | Request::UpdateTask(..)
            | Request::DeleteTask(_) => self.tasks.begin(kind),
        }
    }

    /// Applies an outcome. Outcomes are applied in whatever order they are
    /// handed in, including after the page that asked for them is gone.
    pub fn settle(&mut self, ticket: Ticket, outcome: Outcome) -> ApiResult<()> {
        match outcome {
            Outcome::LoggedIn(result) => self.auth.settle_login(ticket, result),
            Outcome::FetchedUsers(result) => self.users.settle_fetch(ticket, result),
            Outcome::AddedUser(result) => self.users.settle_add(ticket, result),
            Outcome::DeletedUser(id, result) => self.users.settle_delete(ticket, &id, result),
            Outcome::FetchedProjects(result) => self.projects.settle_fetch(ticket, result),
            Outcome::AddedProject(result) => self.projects.settle_add(ticket, result),
            Outcome::DeletedProject(id, result) => {
                self.projects.settle_delete(ticket, &id, result)
            }
            Outcome::FetchedTasks(result) => self.tasks.settle_fetch(ticket, result),
            Outcome::AddedTask(result) => self.tasks.settle_add(ticket, result),
            Outcome::UpdatedTask(result) => self.tasks.settle_update(ticket, result),
            Outcome::DeletedTask(id, result) => self.tasks.settle_delete(ticket, &id, result),
        }
    }

    /// Dispatches and settles on the calling thread.
    pub fn run(&mut self, backend: &dyn Backend, request: Request) -> ApiResult<()> {
        let ticket = self.dispatch(&request);
        let outcome = perform(backend, request);
        self.settle(ticket, outcome)
    }

    pub fn loading(&self) -> bool {
        self.auth.loading() || self.users.loading() || self.projects.loading() || self.tasks.loading()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dashboard, Outcome, Request, perform};
    use crate::{MemoryBackend, OperationKind};
    use std::sync::Arc;
    use taskdesk_api::MemoryTokenStore;
    use taskdesk_app::{NewProject, ProjectId};

    #[test]
    fn outcomes_apply_in_settlement_order() {
        let backend = MemoryBackend::default();
        let mut dashboard = Dashboard::new(Arc::new(MemoryTokenStore::new(Some("tok"))));

        let add = Request::AddProject(NewProject {
            name: "Late".to_owned(),
            description: "Arrives second".to_owned(),
        });
        let add_ticket = dashboard.dispatch(&add);
        let fetch_ticket = dashboard.dispatch(&Request::FetchProjects);
        assert!(dashboard.loading());

        let fetched = perform(&backend, Request::FetchProjects);
        let added = perform(&backend, add);

        dashboard
            .settle(fetch_ticket, fetched)
            .expect("fetch should settle");
        assert!(dashboard.projects.items().is_empty());
        assert!(dashboard.projects.loading());

        dashboard.settle(add_ticket, added).expect("add should settle");
        assert_eq!(dashboard.projects.items().len(), 1);
        assert!(!dashboard.loading());
    }

    #[test]
    fn request_kinds_route_to_operation_status() {
        let mut dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));
        let ticket = dashboard.dispatch(&Request::DeleteProject(ProjectId::new("p1")));
        assert_eq!(ticket.kind, OperationKind::Delete);
        assert!(dashboard.projects.loading());
        assert!(!dashboard.tasks.loading());
    }

    #[test]
    fn outcome_names_its_operation() {
        let backend = MemoryBackend::default();
        let outcome = perform(&backend, Request::DeleteProject(ProjectId::new("p1")));
        assert!(matches!(outcome, Outcome::DeletedProject(_, Err(_))));
        assert_eq!(outcome.operation(), taskdesk_api::Operation::DeleteProject);
    }
}
