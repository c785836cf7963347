// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use taskdesk_api::ApiResult;
use taskdesk_app::{
    NewProject, NewTask, NewUser, Project, Record, Task, TaskId, TaskStatus, User,
};
use tracing::debug;

use crate::{Backend, OperationKind, OperationStatus, StatusBoard, Ticket};

/// A record kind the server lists, creates and deletes.
pub trait Entity: Record + Clone + fmt::Debug {
    type New: fmt::Debug;

    const NAME: &'static str;

    fn list(backend: &dyn Backend) -> ApiResult<Vec<Self>>;
    fn add(backend: &dyn Backend, new: &Self::New) -> ApiResult<Self>;
    fn delete(backend: &dyn Backend, id: &Self::Id) -> ApiResult<()>;
}

impl Entity for Project {
    type New = NewProject;

    const NAME: &'static str = "projects";

    fn list(backend: &dyn Backend) -> ApiResult<Vec<Self>> {
        backend.list_projects()
    }

    fn add(backend: &dyn Backend, new: &NewProject) -> ApiResult<Self> {
        backend.add_project(new)
    }

    fn delete(backend: &dyn Backend, id: &Self::Id) -> ApiResult<()> {
        backend.delete_project(id)
    }
}

impl Entity for User {
    type New = NewUser;

    const NAME: &'static str = "users";

    fn list(backend: &dyn Backend) -> ApiResult<Vec<Self>> {
        backend.list_users()
    }

    fn add(backend: &dyn Backend, new: &NewUser) -> ApiResult<Self> {
        backend.add_user(new)
    }

    fn delete(backend: &dyn Backend, id: &Self::Id) -> ApiResult<()> {
        backend.delete_user(id)
    }
}

impl Entity for Task {
    type New = NewTask;

    const NAME: &'static str = "tasks";

    fn list(backend: &dyn Backend) -> ApiResult<Vec<Self>> {
        backend.list_tasks()
    }

    fn add(backend: &dyn Backend, new: &NewTask) -> ApiResult<Self> {
        backend.add_task(new)
    }

    fn delete(backend: &dyn Backend, id: &Self::Id) -> ApiResult<()> {
        backend.delete_task(id)
    }
}

/// Fetched records of one kind plus the status of calls against them.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    status: StatusBoard,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: StatusBoard::default(),
        }
    }
}

pub type ProjectStore = Collection<Project>;
pub type UserStore = Collection<User>;

impl<T: Entity> Collection<T> {
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items,
            status: StatusBoard::default(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        self.status.status(kind)
    }

    pub fn loading(&self) -> bool {
        self.status.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    pub fn begin(&mut self, kind: OperationKind) -> Ticket {
        debug!(store = T::NAME, op = kind.as_str(), "operation pending");
        self.status.begin(kind)
    }

    pub fn settle_fetch(&mut self, ticket: Ticket, result: ApiResult<Vec<T>>) -> ApiResult<()> {
        self.apply(ticket, result, |items, fetched| *items = fetched)
    }

    pub fn settle_add(&mut self, ticket: Ticket, result: ApiResult<T>) -> ApiResult<()> {
        self.apply(ticket, result, |items, created| items.push(created))
    }

    /// Removes `id` on success. An identity that is already gone leaves the
    /// collection as it was.
    pub fn settle_delete(
        &mut self,
        ticket: Ticket,
        id: &T::Id,
        result: ApiResult<()>,
    ) -> ApiResult<()> {
        self.apply(ticket, result, |items, ()| items.retain(|item| item.id() != id))
    }

    pub fn fetch(&mut self, backend: &dyn Backend) -> ApiResult<()> {
        let ticket = self.begin(OperationKind::Fetch);
        self.settle_fetch(ticket, T::list(backend))
    }

    pub fn add(&mut self, backend: &dyn Backend, new: &T::New) -> ApiResult<()> {
        let ticket = self.begin(OperationKind::Add);
        self.settle_add(ticket, T::add(backend, new))
    }

    pub fn delete(&mut self, backend: &dyn Backend, id: &T::Id) -> ApiResult<()> {
        let ticket = self.begin(OperationKind::Delete);
        self.settle_delete(ticket, id, T::delete(backend, id))
    }

    fn apply<R>(
        &mut self,
        ticket: Ticket,
        result: ApiResult<R>,
        on_success: impl FnOnce(&mut Vec<T>, R),
    ) -> ApiResult<()> {
        match result {
            Ok(value) => {
                on_success(&mut self.items, value);
                self.status.finish(ticket, None);
                debug!(
                    store = T::NAME,
                    op = ticket.kind.as_str(),
                    count = self.items.len(),
                    "operation fulfilled"
                );
                Ok(())
            }
            Err(error) => {
                self.status.finish(ticket, Some(&error));
                debug!(
                    store = T::NAME,
                    op = ticket.kind.as_str(),
                    message = %error.message,
                    "operation rejected"
                );
                Err(error)
            }
        }
    }
}

/// Tasks plus the pointer to the one currently loaded into the edit form.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Collection<Task>,
    editing: Option<TaskId>,
}

impl TaskStore {
    pub fn with_items(items: Vec<Task>) -> Self {
        Self {
            tasks: Collection::with_items(items),
            editing: None,
        }
    }

    pub fn items(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        self.tasks.status(kind)
    }

    pub fn loading(&self) -> bool {
        self.tasks.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.tasks.error()
    }

    pub fn clear_error(&mut self) {
        self.tasks.clear_error();
    }

    /// Tasks with exactly `status`, or all of them when `None`.
    pub fn with_status(&self, status: Option<TaskStatus>) -> Vec<Task> {
        self.items()
            .iter()
            .filter(|task| status.as_ref().is_none_or(|wanted| task.status == *wanted))
            .cloned()
            .collect()
    }

    pub fn editing(&self) -> Option<&TaskId> {
        self.editing.as_ref()
    }

    pub fn editing_task(&self) -> Option<&Task> {
        self.editing.as_ref().and_then(|id| self.get(id))
    }

    /// Points the editor at `id`; unknown identities are refused.
    pub fn start_editing(&mut self, id: &TaskId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.editing = Some(id.clone());
        true
    }

    pub fn stop_editing(&mut self) {
        self.editing = None;
    }

    pub fn begin(&mut self, kind: OperationKind) -> Ticket {
        self.tasks.begin(kind)
    }

    pub fn settle_fetch(&mut self, ticket: Ticket, result: ApiResult<Vec<Task>>) -> ApiResult<()> {
        self.tasks.settle_fetch(ticket, result)
    }

    pub fn settle_add(&mut self, ticket: Ticket, result: ApiResult<Task>) -> ApiResult<()> {
        self.tasks.settle_add(ticket, result)
    }

    pub fn settle_delete(
        &mut self,
        ticket: Ticket,
        id: &TaskId,
        result: ApiResult<()>,
    ) -> ApiResult<()> {
        self.tasks.settle_delete(ticket, id, result)?;
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Swaps the server's copy in at the same position and closes the editor.
    /// Failure leaves both the list and the editing pointer alone.
    pub fn settle_update(&mut self, ticket: Ticket, result: ApiResult<Task>) -> ApiResult<()> {
        let editing = &mut self.editing;
        self.tasks.apply(ticket, result, |items, updated| {
            match items.iter_mut().find(|task| task.id == updated.id) {
                Some(slot) => *slot = updated,
                None => debug!(id = %updated.id, "updated task not in cache"),
            }
            *editing = None;
        })
    }

    pub fn fetch(&mut self, backend: &dyn Backend) -> ApiResult<()> {
        self.tasks.fetch(backend)
    }

    pub fn add(&mut self, backend: &dyn Backend, new: &NewTask) -> ApiResult<()> {
        self.tasks.add(backend, new)
    }

    pub fn delete(&mut self, backend: &dyn Backend, id: &TaskId) -> ApiResult<()> {
        let ticket = self.begin(OperationKind::Delete);
        self.settle_delete(ticket, id, backend.delete_task(id))
    }

    pub fn update(&mut self, backend: &dyn Backend, id: &TaskId, task: &NewTask) -> ApiResult<()> {
        let ticket = self.begin(OperationKind::Update);
        self.settle_update(ticket, backend.update_task(id, task))
    }
}

#[cfg(test)]
mod tests {
    use super::{Collection, ProjectStore, TaskStore};
    use crate::{OperationKind, OperationStatus};
    use taskdesk_api::{ApiError, Operation};
    use taskdesk_app::{Priority, Project, ProjectId, Task, TaskId, TaskStatus};

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: ProjectId::new(id),
            name: name.to_owned(),
            description: format!("{name} description"),
        }
    }

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(id),
            title: format!("Task {id}"),
            description: String::new(),
            assignee: None,
            project: None,
            priority: Priority::Medium,
            due_date: "2026-06-01".to_owned(),
            status,
        }
    }

    #[test]
    fn fetch_failure_keeps_previous_items() {
        let mut store: ProjectStore = Collection::with_items(vec![project("p1", "Kept")]);
        let ticket = store.begin(OperationKind::Fetch);
        assert!(store.loading());

        let result = store.settle_fetch(ticket, Err(ApiError::transport(Operation::FetchProjects)));
        assert!(result.is_err());
        assert_eq!(store.items().len(), 1);
        assert_eq!(
            store.error(),
            Some("Something went wrong while fetching the projects.")
        );
        assert!(!store.loading());
    }

    #[test]
    fn add_appends_only_on_success() {
        let mut store = ProjectStore::default();
        let failed = store.begin(OperationKind::Add);
        let _ = store.settle_add(failed, Err(ApiError::http(Operation::AddProject, 500, "")));
        assert!(store.items().is_empty());

        let ok = store.begin(OperationKind::Add);
        store
            .settle_add(ok, Ok(project("p9", "New")))
            .expect("add should settle");
        assert_eq!(store.items()[0].id, ProjectId::new("p9"));
        assert_eq!(store.status(OperationKind::Add), OperationStatus::Fulfilled);
        assert_eq!(store.error(), None);
    }

    #[test]
    fn delete_of_absent_identity_is_a_no_op() {
        let mut store = ProjectStore::with_items(vec![project("p1", "A"), project("p2", "B")]);
        let ticket = store.begin(OperationKind::Delete);
        store
            .settle_delete(ticket, &ProjectId::new("missing"), Ok(()))
            .expect("delete should settle");
        assert_eq!(store.items().len(), 2);

        let ticket = store.begin(OperationKind::Delete);
        let _ = store.settle_delete(
            ticket,
            &ProjectId::new("missing"),
            Err(ApiError::http(Operation::DeleteProject, 404, "")),
        );
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn update_replaces_in_place_and_closes_editor() {
        let mut store = TaskStore::with_items(vec![
            task("t1", TaskStatus::ToDo),
            task("t2", TaskStatus::ToDo),
            task("t3", TaskStatus::ToDo),
        ]);
        assert!(store.start_editing(&TaskId::new("t2")));

        let ticket = store.begin(OperationKind::Update);
        store
            .settle_update(ticket, Ok(task("t2", TaskStatus::Completed)))
            .expect("update should settle");
        assert_eq!(store.items()[1].status, TaskStatus::Completed);
        assert_eq!(store.items().len(), 3);
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn failed_update_leaves_editor_and_items() {
        let mut store = TaskStore::with_items(vec![task("t1", TaskStatus::ToDo)]);
        store.start_editing(&TaskId::new("t1"));

        let ticket = store.begin(OperationKind::Update);
        let error = store
            .settle_update(ticket, Err(ApiError::http(Operation::UpdateTask, 400, "")))
            .expect_err("update should fail");
        assert_eq!(error.message, "Failed to update task.");
        assert_eq!(store.editing(), Some(&TaskId::new("t1")));
        assert_eq!(store.items()[0].status, TaskStatus::ToDo);
    }

    #[test]
    fn editor_refuses_unknown_tasks_and_follows_deletes() {
        let mut store = TaskStore::with_items(vec![task("t1", TaskStatus::InProgress)]);
        assert!(!store.start_editing(&TaskId::new("nope")));
        assert!(store.start_editing(&TaskId::new("t1")));
        assert_eq!(store.editing_task().map(|task| task.status.clone()), Some(TaskStatus::InProgress));

        let ticket = store.begin(OperationKind::Delete);
        store
            .settle_delete(ticket, &TaskId::new("t1"), Ok(()))
            .expect("delete should settle");
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn status_filter_is_exact() {
        let store = TaskStore::with_items(vec![
            task("t1", TaskStatus::ToDo),
            task("t2", TaskStatus::Completed),
            task("t3", TaskStatus::InProgress),
        ]);
        assert_eq!(store.with_status(None).len(), 3);
        let completed = store.with_status(Some(TaskStatus::Completed));
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, TaskId::new("t2"));
    }
}
