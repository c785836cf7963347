// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod token;

pub use token::*;

use anyhow::{Context, Result, bail};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use taskdesk_app::{
    Credentials, NewProject, NewTask, NewUser, Project, ProjectId, Task, TaskId, User, UserId,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    AddUser,
    FetchUsers,
    DeleteUser,
    AddProject,
    FetchProjects,
    DeleteProject,
    AddTask,
    FetchTasks,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    /// Fallback when the server answered with an error but no message.
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Login => "Failed to login.",
            Self::AddUser => "Failed to add user.",
            Self::FetchUsers => "Failed to fetch users.",
            Self::DeleteUser => "Failed to delete user.",
            Self::AddProject => "Failed to add project.",
            Self::FetchProjects => "Failed to fetch projects.",
            Self::DeleteProject => "Failed to delete project.",
            Self::AddTask => "Failed to add task.",
            Self::FetchTasks => "Failed to fetch tasks.",
            Self::UpdateTask => "Failed to update task.",
            Self::DeleteTask => "Failed to delete task.",
        }
    }

    /// Fallback when no response arrived at all.
    pub const fn transport_message(self) -> &'static str {
        match self {
            Self::Login => "Something went wrong while logging in.",
            Self::AddUser => "Something went wrong while adding the user.",
            Self::FetchUsers => "Something went wrong while fetching the users.",
            Self::DeleteUser => "Something went wrong while deleting the user.",
            Self::AddProject => "Something went wrong while adding the project.",
            Self::FetchProjects => "Something went wrong while fetching the projects.",
            Self::DeleteProject => "Something went wrong while deleting the project.",
            Self::AddTask => "Something went wrong while adding the task.",
            Self::FetchTasks => "Something went wrong while fetching the tasks.",
            Self::UpdateTask => "Something went wrong while updating the task.",
            Self::DeleteTask => "Something went wrong while deleting the task.",
        }
    }
}

/// A failed backend call reduced to the one message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub operation: Operation,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(operation: Operation, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn http(operation: Operation, status: u16, body: &str) -> Self {
        let message =
            server_message(body).unwrap_or_else(|| operation.failure_message().to_owned());
        Self::new(operation, Some(status), message)
    }

    pub fn transport(operation: Operation) -> Self {
        Self::new(operation, None, operation.transport_message())
    }

    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub struct Client {
    base_url: Url,
    http: HttpClient,
    tokens: Arc<dyn TokenStore>,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(trimmed).with_context(|| {
            format!("api.base_url {trimmed:?} is not a valid URL -- use a form like {DEFAULT_BASE_URL}")
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url {trimmed:?} must use http or https -- use a form like {DEFAULT_BASE_URL}"
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Exchanges credentials for an access token. Persisting it is the
    /// caller's job.
    pub fn login(&self, credentials: &Credentials) -> ApiResult<String> {
        let op = Operation::Login;
        let response = self.send(
            op,
            self.request(Method::POST, &["auth", "login"]).json(credentials),
        )?;
        let body: LoginResponse = decode(op, response)?;
        Ok(body.access_token)
    }

    /// Registers a user through the signup endpoint.
    pub fn add_user(&self, user: &NewUser) -> ApiResult<User> {
        let op = Operation::AddUser;
        let response = self.send(
            op,
            self.request(Method::POST, &["auth", "signup"]).json(user),
        )?;
        decode(op, response)
    }

    pub fn list_users(&self) -> ApiResult<Vec<User>> {
        let op = Operation::FetchUsers;
        decode(op, self.send(op, self.request(Method::GET, &["users"]))?)
    }

    pub fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        let op = Operation::DeleteUser;
        self.send(op, self.request(Method::DELETE, &["users", id.as_str()]))?;
        Ok(())
    }

    pub fn add_project(&self, project: &NewProject) -> ApiResult<Project> {
        let op = Operation::AddProject;
        let response = self.send(op, self.request(Method::POST, &["projects"]).json(project))?;
        decode(op, response)
    }

    pub fn list_projects(&self) -> ApiResult<Vec<Project>> {
        let op = Operation::FetchProjects;
        decode(op, self.send(op, self.request(Method::GET, &["projects"]))?)
    }

    pub fn delete_project(&self, id: &ProjectId) -> ApiResult<()> {
        let op = Operation::DeleteProject;
        self.send(op, self.request(Method::DELETE, &["projects", id.as_str()]))?;
        Ok(())
    }

    pub fn add_task(&self, task: &NewTask) -> ApiResult<Task> {
        let op = Operation::AddTask;
        let response = self.send(op, self.request(Method::POST, &["tasks"]).json(task))?;
        decode(op, response)
    }

    pub fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let op = Operation::FetchTasks;
        decode(op, self.send(op, self.request(Method::GET, &["tasks"]))?)
    }

    pub fn update_task(&self, id: &TaskId, task: &NewTask) -> ApiResult<Task> {
        let op = Operation::UpdateTask;
        let response = self.send(
            op,
            self.request(Method::PATCH, &["tasks", id.as_str()]).json(task),
        )?;
        decode(op, response)
    }

    pub fn delete_task(&self, id: &TaskId) -> ApiResult<()> {
        let op = Operation::DeleteTask;
        self.send(op, self.request(Method::DELETE, &["tasks", id.as_str()]))?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        match self.tokens.load() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "read bearer token");
                builder
            }
        }
    }

    fn send(&self, op: Operation, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().map_err(|error| {
            warn!(operation = ?op, %error, "transport failure");
            ApiError::transport(op)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = ApiError::http(op, status.as_u16(), &body);
            warn!(operation = ?op, status = status.as_u16(), message = %error.message, "request rejected");
            return Err(error);
        }
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(op: Operation, response: Response) -> ApiResult<T> {
    let status = response.status().as_u16();
    let body = response.text().map_err(|error| {
        warn!(operation = ?op, %error, "read response body");
        ApiError::transport(op)
    })?;
    parse_body(&body).map_err(|error| {
        warn!(operation = ?op, %error, "decode response body");
        ApiError::new(op, Some(status), op.failure_message())
    })
}

/// Accepts both `{"data": ...}` and the bare payload.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    serde_json::from_str::<Envelope<T>>(body).map(Envelope::into_inner)
}

/// The server's own explanation, if it sent a non-empty one. Validation
/// failures arrive as a list of messages and are joined.
pub fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = match parsed.message? {
        ServerMessage::One(message) => message,
        ServerMessage::Many(messages) => messages
            .into_iter()
            .filter(|message| !message.trim().is_empty())
            .collect::<Vec<_>>()
            .join("; "),
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_owned())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<ServerMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServerMessage {
    One(String),
    Many(Vec<String>),
}
