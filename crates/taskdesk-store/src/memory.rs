// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use taskdesk_api::{ApiError, ApiResult, Operation};
use taskdesk_app::{
    Credentials, NewProject, NewTask, NewUser, Project, ProjectId, Related, RelatedSummary, Task,
    TaskId, User, UserId,
};
use tracing::debug;

use crate::Backend;

pub const DEMO_TOKEN: &str = "demo-token";

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoginRule {
    Accept(String),
    Reject(String),
}

#[derive(Debug)]
struct MemoryState {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    next_id: u64,
    login: LoginRule,
    offline: bool,
    failures: HashMap<Operation, VecDeque<ApiError>>,
    calls: Vec<Operation>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            projects: Vec::new(),
            tasks: Vec::new(),
            next_id: 0,
            login: LoginRule::Accept(DEMO_TOKEN.to_owned()),
            offline: false,
            failures: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

impl MemoryState {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:06x}", self.next_id)
    }

    fn embed(&self, task: &Task) -> Task {
        let mut task = task.clone();
        task.project = task.project.map(|related| {
            let id = related.id().clone();
            match self.projects.iter().find(|project| project.id == id) {
                Some(project) => Related::Embedded(RelatedSummary {
                    id,
                    name: project.name.clone(),
                }),
                None => Related::Id(id),
            }
        });
        task.assignee = task.assignee.map(|related| {
            let id = related.id().clone();
            match self.users.iter().find(|user| user.id == id) {
                Some(user) => Related::Embedded(RelatedSummary {
                    id,
                    name: user.name.clone(),
                }),
                None => Related::Id(id),
            }
        });
        task
    }
}

/// A process-local stand-in for the REST server with scripted failures.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn with_records(users: Vec<User>, projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        let next_id = (users.len() + projects.len() + tasks.len()) as u64;
        Self {
            state: Mutex::new(MemoryState {
                users,
                projects,
                tasks,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    pub fn with_login_token(self, token: &str) -> Self {
        self.lock().login = LoginRule::Accept(token.to_owned());
        self
    }

    pub fn reject_login(&self, message: &str) {
        self.lock().login = LoginRule::Reject(message.to_owned());
    }

    /// Every call fails as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Queues `error` as the answer to the next call of `op`.
    pub fn fail_next(&self, op: Operation, error: ApiError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn call<R>(
        &self,
        op: Operation,
        body: impl FnOnce(&mut MemoryState) -> ApiResult<R>,
    ) -> ApiResult<R> {
        let mut state = self.lock();
        state.calls.push(op);
        debug!(operation = ?op, "memory backend call");
        if state.offline {
            return Err(ApiError::transport(op));
        }
        if let Some(error) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        body(&mut *state)
    }
}

fn not_found(op: Operation, noun: &str) -> ApiError {
    ApiError::new(op, Some(404), format!("{noun} not found"))
}

fn to_task(id: TaskId, new: &NewTask) -> Task {
    Task {
        id,
        title: new.title.clone(),
        description: new.description.clone(),
        assignee: (!new.assignee.is_empty()).then(|| Related::Id(new.assignee.clone())),
        project: (!new.project.is_empty()).then(|| Related::Id(new.project.clone())),
        priority: new.priority.clone(),
        due_date: new.due_date.clone(),
        status: new.task_status.clone(),
    }
}

impl Backend for MemoryBackend {
    fn login(&self, _credentials: &Credentials) -> ApiResult<String> {
        self.call(Operation::Login, |state| match &state.login {
            LoginRule::Accept(token) => Ok(token.clone()),
            LoginRule::Reject(message) => {
                Err(ApiError::new(Operation::Login, Some(401), message.clone()))
            }
        })
    }

    fn list_users(&self) -> ApiResult<Vec<User>> {
        self.call(Operation::FetchUsers, |state| Ok(state.users.clone()))
    }

    fn add_user(&self, user: &NewUser) -> ApiResult<User> {
        self.call(Operation::AddUser, |state| {
            if state.users.iter().any(|existing| existing.email == user.email) {
                return Err(ApiError::new(
                    Operation::AddUser,
                    Some(409),
                    "Email already exists",
                ));
            }
            let created = User {
                id: UserId::new(state.mint("u")),
                email: user.email.clone(),
                name: user.name.clone(),
            };
            state.users.push(created.clone());
            Ok(created)
        })
    }

    fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        self.call(Operation::DeleteUser, |state| {
            let before = state.users.len();
            state.users.retain(|user| &user.id != id);
            if state.users.len() == before {
                return Err(not_found(Operation::DeleteUser, "User"));
            }
            Ok(())
        })
    }

    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.call(Operation::FetchProjects, |state| Ok(state.projects.clone()))
    }

    fn add_project(&self, project: &NewProject) -> ApiResult<Project> {
        self.call(Operation::AddProject, |state| {
            let created = Project {
                id: ProjectId::new(state.mint("p")),
                name: project.name.clone(),
                description: project.description.clone(),
            };
            state.projects.push(created.clone());
            Ok(created)
        })
    }

    fn delete_project(&self, id: &ProjectId) -> ApiResult<()> {
        self.call(Operation::DeleteProject, |state| {
            let before = state.projects.len();
            state.projects.retain(|project| &project.id != id);
            if state.projects.len() == before {
                return Err(not_found(Operation::DeleteProject, "Project"));
            }
            Ok(())
        })
    }

    fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        self.call(Operation::FetchTasks, |state| {
            Ok(state.tasks.iter().map(|task| state.embed(task)).collect())
        })
    }

    fn add_task(&self, task: &NewTask) -> ApiResult<Task> {
        self.call(Operation::AddTask, |state| {
            let created = to_task(TaskId::new(state.mint("t")), task);
            state.tasks.push(created.clone());
            Ok(created)
        })
    }

    fn update_task(&self, id: &TaskId, task: &NewTask) -> ApiResult<Task> {
        self.call(Operation::UpdateTask, |state| {
            let Some(slot) = state.tasks.iter_mut().find(|existing| &existing.id == id) else {
                return Err(not_found(Operation::UpdateTask, "Task"));
            };
            *slot = to_task(id.clone(), task);
            Ok(slot.clone())
        })
    }

    fn delete_task(&self, id: &TaskId) -> ApiResult<()> {
        self.call(Operation::DeleteTask, |state| {
            let before = state.tasks.len();
            state.tasks.retain(|task| &task.id != id);
            if state.tasks.len() == before {
                return Err(not_found(Operation::DeleteTask, "Task"));
            }
            Ok(())
        })
    }
}
