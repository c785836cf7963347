// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side caches of server state for projects, users, tasks and the
//! session, plus the backend seam they talk through.

pub mod auth;
pub mod collection;
pub mod dashboard;
pub mod memory;
pub mod status;

pub use auth::*;
pub use collection::*;
pub use dashboard::*;
pub use memory::*;
pub use status::*;

use taskdesk_api::{ApiResult, Client};
use taskdesk_app::{
    Credentials, NewProject, NewTask, NewUser, Project, ProjectId, Task, TaskId, User, UserId,
};

/// Everything the stores need from the server. Implemented by the HTTP
/// client and by [`MemoryBackend`].
pub trait Backend: Send + Sync {
    fn login(&self, credentials: &Credentials) -> ApiResult<String>;

    fn list_users(&self) -> ApiResult<Vec<User>>;
    fn add_user(&self, user: &NewUser) -> ApiResult<User>;
    fn delete_user(&self, id: &UserId) -> ApiResult<()>;

    fn list_projects(&self) -> ApiResult<Vec<Project>>;
    fn add_project(&self, project: &NewProject) -> ApiResult<Project>;
    fn delete_project(&self, id: &ProjectId) -> ApiResult<()>;

    fn list_tasks(&self) -> ApiResult<Vec<Task>>;
    fn add_task(&self, task: &NewTask) -> ApiResult<Task>;
    fn update_task(&self, id: &TaskId, task: &NewTask) -> ApiResult<Task>;
    fn delete_task(&self, id: &TaskId) -> ApiResult<()>;
}

impl Backend for Client {
    fn login(&self, credentials: &Credentials) -> ApiResult<String> {
        Client::login(self, credentials)
    }

    fn list_users(&self) -> ApiResult<Vec<User>> {
        Client::list_users(self)
    }

    fn add_user(&self, user: &NewUser) -> ApiResult<User> {
        Client::add_user(self, user)
    }

    fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        Client::delete_user(self, id)
    }

    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        Client::list_projects(self)
    }

    fn add_project(&self, project: &NewProject) -> ApiResult<Project> {
        Client::add_project(self, project)
    }

    fn delete_project(&self, id: &ProjectId) -> ApiResult<()> {
        Client::delete_project(self, id)
    }

    fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        Client::list_tasks(self)
    }

    fn add_task(&self, task: &NewTask) -> ApiResult<Task> {
        Client::add_task(self, task)
    }

    fn update_task(&self, id: &TaskId, task: &NewTask) -> ApiResult<Task> {
        Client::update_task(self, id, task)
    }

    fn delete_task(&self, id: &TaskId) -> ApiResult<()> {
        Client::delete_task(self, id)
    }
}
