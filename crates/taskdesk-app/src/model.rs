// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::*;
use crate::table::TableRecord;
use crate::validation::date_part;

/// A record the backend assigns an identity to.
pub trait Record {
    type Id: Clone + PartialEq + fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Task progress. Labels the server sends outside the known set are kept
/// verbatim in `Other` so one odd record does not sink the whole list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(untagged)]
    Other(String),
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::ToDo, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Other(label) => label,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "To Do" => Some(Self::ToDo),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    #[serde(untagged)]
    Other(String),
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(label) => label,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSummary<Id> {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default)]
    pub name: String,
}

/// A task's link to a project or user. List endpoints embed the related
/// record; write endpoints echo the bare identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<Id> {
    Embedded(RelatedSummary<Id>),
    Id(Id),
}

impl<Id> Related<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Self::Embedded(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded(summary) if !summary.name.is_empty() => Some(&summary.name),
            Self::Embedded(_) | Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<Related<UserId>>,
    #[serde(default)]
    pub project: Option<Related<ProjectId>>,
    pub priority: Priority,
    #[serde(rename = "dueDate", default)]
    pub due_date: String,
    #[serde(rename = "taskStatus")]
    pub status: TaskStatus,
}

impl Task {
    /// The write payload that reproduces this task, with relations reduced to
    /// bare identities.
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            project: self
                .project
                .as_ref()
                .map(|related| related.id().clone())
                .unwrap_or_else(|| ProjectId::new("")),
            assignee: self
                .assignee
                .as_ref()
                .map(|related| related.id().clone())
                .unwrap_or_else(|| UserId::new("")),
            priority: self.priority.clone(),
            due_date: date_part(&self.due_date).to_owned(),
            task_status: self.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub project: ProjectId,
    pub assignee: UserId,
    pub priority: Priority,
    pub due_date: String,
    pub task_status: TaskStatus,
}

impl Record for Project {
    type Id = ProjectId;

    fn id(&self) -> &ProjectId {
        &self.id
    }
}

impl Record for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Record for Task {
    type Id = TaskId;

    fn id(&self) -> &TaskId {
        &self.id
    }
}

impl TableRecord for Project {
    fn row_key(&self) -> String {
        self.id.to_string()
    }

    fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "_id" => Some(self.id.to_string()),
            "name" => Some(self.name.clone()),
            "description" => Some(self.description.clone()),
            _ => None,
        }
    }
}

impl TableRecord for User {
    fn row_key(&self) -> String {
        self.id.to_string()
    }

    fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "_id" => Some(self.id.to_string()),
            "email" => Some(self.email.clone()),
            "name" => Some(self.name.clone()),
            _ => None,
        }
    }
}

impl TableRecord for Task {
    fn row_key(&self) -> String {
        self.id.to_string()
    }

    fn field_text(&self, key: &str) -> Option<String> {
        let related_text = |name: Option<&str>, id: &str| name.unwrap_or(id).to_owned();
        match key {
            "_id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            "description" => Some(self.description.clone()),
            "assignee" => self
                .assignee
                .as_ref()
                .map(|related| related_text(related.name(), related.id().as_str())),
            "project" => self
                .project
                .as_ref()
                .map(|related| related_text(related.name(), related.id().as_str())),
            "priority" => Some(self.priority.as_str().to_owned()),
            "dueDate" => Some(self.due_date.clone()),
            "taskStatus" => Some(self.status.as_str().to_owned()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Login,
    Users,
    Projects,
    Tasks,
}

impl ViewKind {
    /// Views reachable from the navigation bar, in display order.
    pub const NAV: [Self; 3] = [Self::Users, Self::Projects, Self::Tasks];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Users => "users",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
        }
    }

    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Priority, Related, Task, TaskStatus};
    use crate::table::TableRecord;
    use crate::{ProjectId, TaskId, UserId};
    use anyhow::Result;

    #[test]
    fn task_decodes_embedded_relations() -> Result<()> {
        let task: Task = serde_json::from_str(
            r#"{
                "_id": "t1",
                "title": "Ship",
                "description": "Ship it",
                "assignee": {"_id": "u1", "name": "Avery"},
                "project": {"_id": "p1", "name": "Launch"},
                "priority": "High",
                "dueDate": "2026-03-01T00:00:00.000Z",
                "taskStatus": "In Progress"
            }"#,
        )?;
        assert_eq!(task.id, TaskId::new("t1"));
        assert_eq!(task.status, TaskStatus::InProgress);
        let assignee = task.assignee.as_ref().expect("assignee present");
        assert_eq!(assignee.id(), &UserId::new("u1"));
        assert_eq!(assignee.name(), Some("Avery"));
        Ok(())
    }

    #[test]
    fn task_decodes_bare_relation_ids() -> Result<()> {
        let task: Task = serde_json::from_str(
            r#"{"_id":"t2","title":"Plan","assignee":"u9","project":"p9",
                "priority":"Low","dueDate":"2026-03-02","taskStatus":"To Do"}"#,
        )?;
        assert_eq!(task.project, Some(Related::Id(ProjectId::new("p9"))));
        assert_eq!(task.assignee.as_ref().and_then(Related::name), None);
        Ok(())
    }

    #[test]
    fn new_task_uses_camel_case_wire_names() -> Result<()> {
        let payload = NewTask {
            title: "Write docs".to_owned(),
            description: "All of them".to_owned(),
            project: ProjectId::new("p1"),
            assignee: UserId::new("u1"),
            priority: Priority::Medium,
            due_date: "2026-04-01".to_owned(),
            task_status: TaskStatus::ToDo,
        };
        let value = serde_json::to_value(&payload)?;
        assert_eq!(value["dueDate"], "2026-04-01");
        assert_eq!(value["taskStatus"], "To Do");
        assert_eq!(value["project"], "p1");
        Ok(())
    }

    #[test]
    fn to_new_task_truncates_due_date_and_flattens_relations() -> Result<()> {
        let task: Task = serde_json::from_str(
            r#"{"_id":"t3","title":"Fix","assignee":{"_id":"u2","name":"Kai"},
                "project":"p4","priority":"Medium",
                "dueDate":"2026-05-09T00:00:00.000Z","taskStatus":"Completed"}"#,
        )?;
        let payload = task.to_new_task();
        assert_eq!(payload.due_date, "2026-05-09");
        assert_eq!(payload.assignee, UserId::new("u2"));
        assert_eq!(payload.project, ProjectId::new("p4"));
        Ok(())
    }

    #[test]
    fn unknown_labels_keep_the_list_and_their_text() -> Result<()> {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[
                {"_id":"t1","title":"Odd","priority":"Urgent","taskStatus":"Blocked"},
                {"_id":"t2","title":"Plain","priority":"Low","taskStatus":"To Do"}
            ]"#,
        )?;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].priority, Priority::Other("Urgent".to_owned()));
        assert_eq!(tasks[0].status, TaskStatus::Other("Blocked".to_owned()));
        assert_eq!(tasks[0].field_text("taskStatus").as_deref(), Some("Blocked"));
        assert_eq!(tasks[0].field_text("priority").as_deref(), Some("Urgent"));
        assert_eq!(tasks[1].status, TaskStatus::ToDo);

        let echoed = serde_json::to_value(tasks[0].to_new_task())?;
        assert_eq!(echoed["taskStatus"], "Blocked");
        assert_eq!(TaskStatus::parse("Blocked"), None);
        Ok(())
    }

    #[test]
    fn status_and_priority_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        for priority in Priority::ALL {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(TaskStatus::parse("Done"), None);
    }
}
