// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-view compositions: which fields and columns each page shows, what a
//! submit sends, and how a page reacts when a call settles.

use taskdesk_api::{ApiResult, Operation};
use taskdesk_app::{
    ColumnDescriptor, Credentials, DataTable, FieldDescriptor, Form, FormError, FormValues,
    InputKind, NewProject, NewTask, NewUser, Priority, Project, ProjectId, RowAction, Rule,
    SelectOption, SubmitBlocked, TableRecord, TableView, Task, TaskId, TaskStatus, User, UserId,
    ViewKind, date_part, display_date, format_date, parse_date,
};
use taskdesk_store::{Dashboard, Request};
use tracing::warn;

pub const PROJECT_ADDED: &str = "Project added successfully!";
pub const PROJECT_SAVE_FAILED: &str = "Failed to save project.";
pub const PROJECT_DELETED: &str = "Project deleted successfully!";
pub const PROJECT_DELETE_FAILED: &str = "Failed to delete project.";
pub const USER_ADDED: &str = "User added successfully!";
pub const USER_SAVE_FAILED: &str = "Failed to save user.";
pub const USER_DELETED: &str = "User deleted successfully!";
pub const USER_DELETE_FAILED: &str = "Failed to delete user.";
pub const TASK_ADDED: &str = "Task added successfully!";
pub const TASK_UPDATED: &str = "Task updated successfully!";
pub const TASK_SAVE_FAILED: &str = "Failed to add task.";
pub const TASK_DELETED: &str = "Task deleted successfully!";
pub const TASK_DELETE_FAILED: &str = "Failed to delete task.";

pub const LOGIN_LABEL: &str = "Log In";
pub const LOGGING_IN_LABEL: &str = "Logging in...";
pub const SAVING_LABEL: &str = "Saving...";
pub const ADD_PROJECT_LABEL: &str = "Add Project";
pub const ADD_USER_LABEL: &str = "Add User";
pub const ADD_TASK_LABEL: &str = "Add Task";
pub const UPDATE_TASK_LABEL: &str = "Update Task";
pub const FILTER_LABEL: &str = "Filter";
pub const ALL_TASKS_LABEL: &str = "All Tasks";
pub const UNASSIGNED_LABEL: &str = "Unassigned";

pub const STATUS_FILTER_FIELD: &str = "taskStatusFilter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Main,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FormSlot, usize),
    Submit(FormSlot),
    Search,
    Rows,
}

/// What the shell should do after a call settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub notice: Option<String>,
    pub follow_up: Vec<Request>,
    pub logged_in: bool,
}

impl Reaction {
    fn notice(message: &str) -> Self {
        Self {
            notice: Some(message.to_owned()),
            ..Self::default()
        }
    }

    fn then(mut self, request: Request) -> Self {
        self.follow_up.push(request);
        self
    }
}

pub fn login_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::email("email", "Email")
            .placeholder("Enter your email")
            .rule(Rule::required("Email is required"))
            .rule(Rule::email("Invalid email")),
        FieldDescriptor::password("password", "Password")
            .placeholder("Enter your password")
            .rule(Rule::required("Password is required"))
            .rule(Rule::min_length(4, "Password must be at least 4 characters")),
    ]
}

pub fn project_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Project Name")
            .placeholder("Enter project name")
            .rule(Rule::required("Project name is required")),
        FieldDescriptor::textarea("description", "Description")
            .placeholder("Enter project description")
            .rule(Rule::required("Description is required")),
    ]
}

pub fn user_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::email("email", "Email")
            .placeholder("Enter user email")
            .rule(Rule::required("Email is required"))
            .rule(Rule::email("Invalid email")),
        FieldDescriptor::text("name", "Name")
            .placeholder("Enter user name")
            .rule(Rule::required("Name is required")),
    ]
}

/// Task fields; the project and assignee choices come from whatever the
/// stores currently hold.
pub fn task_fields(projects: &[Project], users: &[User]) -> Vec<FieldDescriptor> {
    let project_options = projects
        .iter()
        .filter(|project| !project.id.is_empty())
        .map(|project| SelectOption::new(project.id.as_str(), project.name.as_str()))
        .collect();
    let user_options = users
        .iter()
        .filter(|user| !user.id.is_empty())
        .map(|user| SelectOption::new(user.id.as_str(), user.name.as_str()))
        .collect();
    let priority_options = Priority::ALL
        .iter()
        .map(|priority| SelectOption::new(priority.as_str(), priority.as_str()))
        .collect();

    vec![
        FieldDescriptor::text("title", "Title")
            .placeholder("Enter task title")
            .rule(Rule::required("Title is required"))
            .layout("third"),
        FieldDescriptor::text("description", "Description")
            .placeholder("Enter task description")
            .rule(Rule::required("Description is required"))
            .layout("third"),
        FieldDescriptor::select("project", "Project", project_options)
            .rule(Rule::required("Project is required"))
            .layout("third"),
        FieldDescriptor::select("assignee", "Assignee", user_options)
            .rule(Rule::required("Assignee is required"))
            .layout("third"),
        FieldDescriptor::select("priority", "Priority", priority_options)
            .rule(Rule::required("Priority is required"))
            .layout("third"),
        FieldDescriptor::select("taskStatus", "Status", status_options())
            .rule(Rule::required("Task status is required"))
            .layout("third"),
        FieldDescriptor::date("dueDate", "Due Date")
            .rule(Rule::required("Due date is required"))
            .rule(Rule::date("Due date must be a valid date (YYYY-MM-DD)"))
            .layout("third"),
    ]
}

pub fn status_filter_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::select(STATUS_FILTER_FIELD, "Filter by Status", status_options())
            .placeholder(ALL_TASKS_LABEL),
    ]
}

fn status_options() -> Vec<SelectOption> {
    TaskStatus::ALL
        .iter()
        .map(|status| SelectOption::new(status.as_str(), status.as_str()))
        .collect()
}

pub fn project_columns() -> Vec<ColumnDescriptor<Project>> {
    vec![
        ColumnDescriptor::field("name", "Project Name"),
        ColumnDescriptor::field("description", "Description"),
        ColumnDescriptor::actions("actions", "Actions", vec![RowAction::Delete]),
    ]
}

pub fn user_columns() -> Vec<ColumnDescriptor<User>> {
    vec![
        ColumnDescriptor::field("email", "Email"),
        ColumnDescriptor::field("name", "Name"),
        ColumnDescriptor::actions("actions", "Actions", vec![RowAction::Delete]),
    ]
}

pub fn task_columns() -> Vec<ColumnDescriptor<Task>> {
    vec![
        ColumnDescriptor::field("title", "Title"),
        ColumnDescriptor::field("description", "Description"),
        ColumnDescriptor::custom("assignee", "Assignee", |task: &Task| {
            relation_label(
                task.assignee
                    .as_ref()
                    .map(|related| (related.name(), related.id().as_str())),
            )
        }),
        ColumnDescriptor::custom("project", "Project Name", |task: &Task| {
            relation_label(
                task.project
                    .as_ref()
                    .map(|related| (related.name(), related.id().as_str())),
            )
        }),
        ColumnDescriptor::field("priority", "Priority"),
        ColumnDescriptor::custom("dueDate", "Due Date", |task: &Task| {
            display_date(&task.due_date)
        }),
        ColumnDescriptor::field("taskStatus", "Status"),
        ColumnDescriptor::actions(
            "actions",
            "Actions",
            vec![RowAction::Edit, RowAction::Delete],
        ),
    ]
}

// A relation that arrived as a bare id (fresh from a write) shows the id
// until the next fetch embeds the name.
fn relation_label(relation: Option<(Option<&str>, &str)>) -> String {
    match relation {
        Some((Some(name), _)) => name.to_owned(),
        Some((None, id)) if !id.is_empty() => id.to_owned(),
        Some(_) | None => UNASSIGNED_LABEL.to_owned(),
    }
}

fn value<'a>(values: &'a FormValues, key: &str) -> &'a str {
    values.get(key).map_or("", String::as_str)
}

pub fn credentials_from(values: &FormValues) -> Credentials {
    Credentials {
        email: value(values, "email").trim().to_owned(),
        password: value(values, "password").to_owned(),
    }
}

pub fn project_from(values: &FormValues) -> NewProject {
    NewProject {
        name: value(values, "name").to_owned(),
        description: value(values, "description").to_owned(),
    }
}

pub fn user_from(values: &FormValues) -> NewUser {
    NewUser {
        email: value(values, "email").trim().to_owned(),
        name: value(values, "name").to_owned(),
    }
}

/// `None` when a select or date holds something outside its domain.
pub fn task_from(values: &FormValues) -> Option<NewTask> {
    Some(NewTask {
        title: value(values, "title").to_owned(),
        description: value(values, "description").to_owned(),
        project: ProjectId::new(value(values, "project")),
        assignee: UserId::new(value(values, "assignee")),
        priority: Priority::parse(value(values, "priority"))?,
        due_date: format_date(parse_date(value(values, "dueDate")).ok()?),
        task_status: TaskStatus::parse(value(values, "taskStatus"))?,
    })
}

/// Form values that reproduce `task` in the editor. A priority or status
/// outside the known set starts unselected, so the editor asks for one.
pub fn task_values(task: &Task) -> FormValues {
    let payload = task.to_new_task();
    let priority = match &payload.priority {
        Priority::Other(_) => "",
        known => known.as_str(),
    };
    let status = match &payload.task_status {
        TaskStatus::Other(_) => "",
        known => known.as_str(),
    };
    FormValues::from([
        ("title".to_owned(), payload.title),
        ("description".to_owned(), payload.description),
        ("project".to_owned(), payload.project.to_string()),
        ("assignee".to_owned(), payload.assignee.to_string()),
        ("priority".to_owned(), priority.to_owned()),
        ("taskStatus".to_owned(), status.to_owned()),
        ("dueDate".to_owned(), date_part(&task.due_date).to_owned()),
    ])
}

#[derive(Debug)]
pub struct ProjectsPage {
    pub form: Form,
    pub table: DataTable<Project>,
}

#[derive(Debug)]
pub struct UsersPage {
    pub form: Form,
    pub table: DataTable<User>,
}

#[derive(Debug)]
pub struct TasksPage {
    pub form: Form,
    pub filter: Form,
    pub status: Option<TaskStatus>,
    pub table: DataTable<Task>,
}

impl TasksPage {
    /// Tasks after the status filter, before search.
    pub fn rows(&self, dashboard: &Dashboard) -> Vec<Task> {
        dashboard.tasks.with_status(self.status.clone())
    }

    fn refresh_options(&mut self, dashboard: &Dashboard) {
        let fields = task_fields(dashboard.projects.items(), dashboard.users.items());
        if let Err(error) = self.form.replace_fields(fields) {
            warn!(%error, "refresh task form options");
        }
    }

    fn reset_form(&mut self) {
        self.form.remount(&FormValues::new());
        self.form.set_submit_label(ADD_TASK_LABEL);
    }
}

#[derive(Debug)]
pub struct Pages {
    pub login: Form,
    pub projects: ProjectsPage,
    pub users: UsersPage,
    pub tasks: TasksPage,
    focus: Focus,
    cursor: usize,
}

impl Pages {
    pub fn new(page_size: usize) -> Result<Self, FormError> {
        let empty = FormValues::new();

        let mut login = Form::new(login_fields(), &empty)?;
        login.set_submit_label(LOGIN_LABEL);
        let mut project_form = Form::new(project_fields(), &empty)?;
        project_form.set_submit_label(ADD_PROJECT_LABEL);
        let mut user_form = Form::new(user_fields(), &empty)?;
        user_form.set_submit_label(ADD_USER_LABEL);
        let mut task_form = Form::new(task_fields(&[], &[]), &empty)?;
        task_form.set_submit_label(ADD_TASK_LABEL);
        let mut filter = Form::new(status_filter_fields(), &empty)?;
        filter.set_submit_label(FILTER_LABEL);

        Ok(Self {
            login,
            projects: ProjectsPage {
                form: project_form,
                table: DataTable::new(project_columns(), page_size),
            },
            users: UsersPage {
                form: user_form,
                table: DataTable::new(user_columns(), page_size),
            },
            tasks: TasksPage {
                form: task_form,
                filter,
                status: None,
                table: DataTable::new(task_columns(), page_size),
            },
            focus: Focus::Field(FormSlot::Main, 0),
            cursor: 0,
        })
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn form(&self, view: ViewKind, slot: FormSlot) -> Option<&Form> {
        match (view, slot) {
            (ViewKind::Login, FormSlot::Main) => Some(&self.login),
            (ViewKind::Projects, FormSlot::Main) => Some(&self.projects.form),
            (ViewKind::Users, FormSlot::Main) => Some(&self.users.form),
            (ViewKind::Tasks, FormSlot::Main) => Some(&self.tasks.form),
            (ViewKind::Tasks, FormSlot::Filter) => Some(&self.tasks.filter),
            _ => None,
        }
    }

    pub fn form_mut(&mut self, view: ViewKind, slot: FormSlot) -> Option<&mut Form> {
        match (view, slot) {
            (ViewKind::Login, FormSlot::Main) => Some(&mut self.login),
            (ViewKind::Projects, FormSlot::Main) => Some(&mut self.projects.form),
            (ViewKind::Users, FormSlot::Main) => Some(&mut self.users.form),
            (ViewKind::Tasks, FormSlot::Main) => Some(&mut self.tasks.form),
            (ViewKind::Tasks, FormSlot::Filter) => Some(&mut self.tasks.filter),
            _ => None,
        }
    }

    /// Tab order for `view`: each form's fields then its submit button,
    /// then the search box and the rows.
    pub fn focus_order(&self, view: ViewKind) -> Vec<Focus> {
        let mut order = Vec::new();
        for slot in [FormSlot::Main, FormSlot::Filter] {
            if let Some(form) = self.form(view, slot) {
                order.extend((0..form.fields().len()).map(|index| Focus::Field(slot, index)));
                order.push(Focus::Submit(slot));
            }
        }
        if view != ViewKind::Login {
            order.push(Focus::Search);
            order.push(Focus::Rows);
        }
        order
    }

    pub fn reset_focus(&mut self, view: ViewKind) {
        self.focus = self
            .focus_order(view)
            .first()
            .copied()
            .unwrap_or(Focus::Rows);
        self.cursor = 0;
    }

    pub fn set_focus(&mut self, view: ViewKind, focus: Focus) -> bool {
        if !self.focus_order(view).contains(&focus) {
            return false;
        }
        self.blur_current(view);
        self.focus = focus;
        true
    }

    /// Moves focus `delta` stops, blurring the field being left.
    pub fn move_focus(&mut self, view: ViewKind, delta: isize) {
        let order = self.focus_order(view);
        if order.is_empty() {
            return;
        }
        self.blur_current(view);
        let current = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(order.len() as isize) as usize;
        self.focus = order[next];
    }

    /// Requests a view issues when it is entered.
    pub fn enter(&mut self, view: ViewKind) -> Vec<Request> {
        self.reset_focus(view);
        Self::refresh(view)
    }

    pub fn refresh(view: ViewKind) -> Vec<Request> {
        match view {
            ViewKind::Login => Vec::new(),
            ViewKind::Users => vec![Request::FetchUsers],
            ViewKind::Projects => vec![Request::FetchProjects],
            ViewKind::Tasks => vec![
                Request::FetchUsers,
                Request::FetchProjects,
                Request::FetchTasks,
            ],
        }
    }

    pub fn focused_field(&self, view: ViewKind) -> Option<(FormSlot, String)> {
        let Focus::Field(slot, index) = self.focus else {
            return None;
        };
        let form = self.form(view, slot)?;
        form.fields()
            .get(index)
            .map(|field| (slot, field.name.clone()))
    }

    pub fn focused_is_select(&self, view: ViewKind) -> bool {
        let Focus::Field(slot, index) = self.focus else {
            return false;
        };
        self.form(view, slot)
            .and_then(|form| form.fields().get(index))
            .is_some_and(|field| matches!(field.kind, InputKind::Select(_)))
    }

    fn blur_current(&mut self, view: ViewKind) {
        let Some((slot, name)) = self.focused_field(view) else {
            return;
        };
        if let Some(form) = self.form_mut(view, slot)
            && let Err(error) = form.blur(&name)
        {
            warn!(%error, "blur field");
        }
    }

    pub fn type_char(&mut self, view: ViewKind, dashboard: &Dashboard, ch: char) {
        match self.focus {
            Focus::Field(..) => {
                if self.focused_is_select(view) {
                    return;
                }
                self.edit_focused(view, |value| value.push(ch));
            }
            Focus::Search => {
                let term = format!("{}{ch}", self.search(view));
                self.set_search(view, dashboard, term);
            }
            Focus::Submit(_) | Focus::Rows => {}
        }
    }

    pub fn backspace(&mut self, view: ViewKind, dashboard: &Dashboard) {
        match self.focus {
            Focus::Field(..) => {
                if self.focused_is_select(view) {
                    return;
                }
                self.edit_focused(view, |value| {
                    value.pop();
                });
            }
            Focus::Search => {
                let mut term = self.search(view).to_owned();
                term.pop();
                self.set_search(view, dashboard, term);
            }
            Focus::Submit(_) | Focus::Rows => {}
        }
    }

    fn edit_focused(&mut self, view: ViewKind, edit: impl FnOnce(&mut String)) {
        let Some((slot, name)) = self.focused_field(view) else {
            return;
        };
        let Some(form) = self.form_mut(view, slot) else {
            return;
        };
        let mut value = form.value(&name).to_owned();
        edit(&mut value);
        if let Err(error) = form.set_value(&name, value) {
            warn!(%error, "edit field");
        }
    }

    /// Steps the focused select through its options. Returns whether a
    /// select had focus.
    pub fn cycle_select(&mut self, view: ViewKind, delta: isize) -> bool {
        if !self.focused_is_select(view) {
            return false;
        }
        let Some((slot, name)) = self.focused_field(view) else {
            return false;
        };
        if let Some(form) = self.form_mut(view, slot)
            && let Err(error) = form.cycle_option(&name, delta)
        {
            warn!(%error, "cycle select");
        }
        true
    }

    pub fn search(&self, view: ViewKind) -> &str {
        match view {
            ViewKind::Login => "",
            ViewKind::Projects => &self.projects.table.state().search,
            ViewKind::Users => &self.users.table.state().search,
            ViewKind::Tasks => &self.tasks.table.state().search,
        }
    }

    pub fn set_search(&mut self, view: ViewKind, dashboard: &Dashboard, term: String) {
        match view {
            ViewKind::Login => return,
            ViewKind::Projects => self
                .projects
                .table
                .set_search(term, dashboard.projects.items()),
            ViewKind::Users => self.users.table.set_search(term, dashboard.users.items()),
            ViewKind::Tasks => {
                let rows = self.tasks.rows(dashboard);
                self.tasks.table.set_search(term, &rows);
            }
        }
        self.cursor = 0;
    }

    /// Steps one page back (`delta < 0`) or forward.
    pub fn turn_page(&mut self, view: ViewKind, dashboard: &Dashboard, delta: isize) -> bool {
        fn step<T: TableRecord>(table: &mut DataTable<T>, records: &[T], back: bool) -> bool {
            if back {
                table.prev_page(records)
            } else {
                table.next_page(records)
            }
        }

        let back = delta < 0;
        let moved = match view {
            ViewKind::Login => false,
            ViewKind::Projects => step(&mut self.projects.table, dashboard.projects.items(), back),
            ViewKind::Users => step(&mut self.users.table, dashboard.users.items(), back),
            ViewKind::Tasks => {
                let rows = self.tasks.rows(dashboard);
                step(&mut self.tasks.table, &rows, back)
            }
        };
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub fn go_to_page(&mut self, view: ViewKind, dashboard: &Dashboard, page: usize) -> bool {
        let moved = match view {
            ViewKind::Login => false,
            ViewKind::Projects => self
                .projects
                .table
                .go_to_page(page, dashboard.projects.items()),
            ViewKind::Users => self.users.table.go_to_page(page, dashboard.users.items()),
            ViewKind::Tasks => {
                let rows = self.tasks.rows(dashboard);
                self.tasks.table.go_to_page(page, &rows)
            }
        };
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub fn move_cursor(&mut self, view: ViewKind, dashboard: &Dashboard, delta: isize) {
        let rows = self
            .table_view(view, dashboard)
            .map_or(0, |table| table.rows.len());
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        let current = self.cursor.min(rows - 1) as isize;
        self.cursor = (current + delta).clamp(0, rows as isize - 1) as usize;
    }

    pub fn table_view(&self, view: ViewKind, dashboard: &Dashboard) -> Option<TableView> {
        match view {
            ViewKind::Login => None,
            ViewKind::Projects => Some(self.projects.table.view(dashboard.projects.items())),
            ViewKind::Users => Some(self.users.table.view(dashboard.users.items())),
            ViewKind::Tasks => Some(self.tasks.table.view(&self.tasks.rows(dashboard))),
        }
    }

    pub fn clamp_tables(&mut self, dashboard: &Dashboard) {
        self.projects.table.clamp(dashboard.projects.items());
        self.users.table.clamp(dashboard.users.items());
        let rows = self.tasks.rows(dashboard);
        self.tasks.table.clamp(&rows);
    }

    pub fn selected_key(&self, view: ViewKind, dashboard: &Dashboard) -> Option<String> {
        let table = self.table_view(view, dashboard)?;
        let last = table.rows.len().checked_sub(1)?;
        table
            .rows
            .get(self.cursor.min(last))
            .map(|row| row.key.clone())
    }

    pub fn delete_selected(&self, view: ViewKind, dashboard: &Dashboard) -> Option<Request> {
        let key = self.selected_key(view, dashboard)?;
        match view {
            ViewKind::Login => None,
            ViewKind::Projects => Some(Request::DeleteProject(ProjectId::new(key))),
            ViewKind::Users => Some(Request::DeleteUser(UserId::new(key))),
            ViewKind::Tasks => Some(Request::DeleteTask(TaskId::new(key))),
        }
    }

    pub fn edit_selected(&mut self, dashboard: &mut Dashboard) -> bool {
        let Some(key) = self.selected_key(ViewKind::Tasks, dashboard) else {
            return false;
        };
        self.start_edit(dashboard, &TaskId::new(key))
    }

    /// Points the store at `id` and remounts the task form with its values.
    pub fn start_edit(&mut self, dashboard: &mut Dashboard, id: &TaskId) -> bool {
        if !dashboard.tasks.start_editing(id) {
            return false;
        }
        let Some(task) = dashboard.tasks.editing_task() else {
            return false;
        };
        self.tasks.form.remount(&task_values(task));
        self.tasks.form.set_submit_label(UPDATE_TASK_LABEL);
        self.focus = Focus::Field(FormSlot::Main, 0);
        true
    }

    pub fn cancel_edit(&mut self, dashboard: &mut Dashboard) -> bool {
        if dashboard.tasks.editing().is_none() {
            return false;
        }
        dashboard.tasks.stop_editing();
        self.tasks.reset_form();
        true
    }

    /// Validates the form in `slot` and turns its values into a request.
    /// The status filter applies locally and sends nothing.
    pub fn submit(
        &mut self,
        view: ViewKind,
        slot: FormSlot,
        dashboard: &Dashboard,
    ) -> Result<Option<Request>, SubmitBlocked> {
        self.blur_current(view);
        match (view, slot) {
            (ViewKind::Login, FormSlot::Main) => self
                .login
                .submit(|values| Some(Request::Login(credentials_from(&values)))),
            (ViewKind::Projects, FormSlot::Main) => self
                .projects
                .form
                .submit(|values| Some(Request::AddProject(project_from(&values)))),
            (ViewKind::Users, FormSlot::Main) => self
                .users
                .form
                .submit(|values| Some(Request::AddUser(user_from(&values)))),
            (ViewKind::Tasks, FormSlot::Main) => {
                let editing = dashboard.tasks.editing().cloned();
                self.tasks.form.submit(|values| {
                    let task = task_from(&values)?;
                    Some(match editing {
                        Some(id) => Request::UpdateTask(id, task),
                        None => Request::AddTask(task),
                    })
                })
            }
            (ViewKind::Tasks, FormSlot::Filter) => {
                let status = self
                    .tasks
                    .filter
                    .submit(|values| TaskStatus::parse(value(&values, STATUS_FILTER_FIELD)))?;
                self.tasks.status = status;
                let rows = self.tasks.rows(dashboard);
                self.tasks.table.clamp(&rows);
                self.cursor = 0;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Whether the store behind the form in `slot` has a call in flight.
    /// Busy forms do not submit.
    pub fn busy(&self, view: ViewKind, slot: FormSlot, dashboard: &Dashboard) -> bool {
        match (view, slot) {
            (ViewKind::Login, FormSlot::Main) => dashboard.auth.loading(),
            (ViewKind::Projects, FormSlot::Main) => dashboard.projects.loading(),
            (ViewKind::Users, FormSlot::Main) => dashboard.users.loading(),
            (ViewKind::Tasks, FormSlot::Main) => dashboard.tasks.loading(),
            _ => false,
        }
    }

    pub fn submit_caption(&self, view: ViewKind, slot: FormSlot, dashboard: &Dashboard) -> String {
        if self.busy(view, slot, dashboard) {
            let caption = if view == ViewKind::Login {
                LOGGING_IN_LABEL
            } else {
                SAVING_LABEL
            };
            return caption.to_owned();
        }
        self.form(view, slot)
            .map(|form| form.submit_label().to_owned())
            .unwrap_or_default()
    }

    /// Inline error for the page: the owning store's latest failure.
    pub fn banner<'a>(&self, view: ViewKind, dashboard: &'a Dashboard) -> Option<&'a str> {
        match view {
            ViewKind::Login => dashboard.auth.error(),
            ViewKind::Projects => dashboard.projects.error(),
            ViewKind::Users => dashboard.users.error(),
            ViewKind::Tasks => dashboard.tasks.error(),
        }
    }

    /// Page-level follow-up once `op` has been applied to the stores.
    pub fn on_settled(
        &mut self,
        dashboard: &Dashboard,
        op: Operation,
        result: &ApiResult<()>,
    ) -> Reaction {
        let ok = result.is_ok();
        let reaction = match op {
            Operation::Login => {
                if ok {
                    self.login.remount(&FormValues::new());
                }
                Reaction {
                    logged_in: ok,
                    ..Reaction::default()
                }
            }
            Operation::AddProject if ok => {
                self.projects.form.reset();
                Reaction::notice(PROJECT_ADDED).then(Request::FetchProjects)
            }
            Operation::AddProject => Reaction::notice(PROJECT_SAVE_FAILED),
            Operation::DeleteProject if ok => {
                Reaction::notice(PROJECT_DELETED).then(Request::FetchProjects)
            }
            Operation::DeleteProject => Reaction::notice(PROJECT_DELETE_FAILED),
            Operation::AddUser if ok => {
                self.users.form.reset();
                Reaction::notice(USER_ADDED).then(Request::FetchUsers)
            }
            Operation::AddUser => Reaction::notice(USER_SAVE_FAILED),
            Operation::DeleteUser if ok => Reaction::notice(USER_DELETED).then(Request::FetchUsers),
            Operation::DeleteUser => Reaction::notice(USER_DELETE_FAILED),
            Operation::AddTask | Operation::UpdateTask if ok => {
                self.tasks.reset_form();
                let notice = if op == Operation::UpdateTask {
                    TASK_UPDATED
                } else {
                    TASK_ADDED
                };
                Reaction::notice(notice).then(Request::FetchTasks)
            }
            Operation::AddTask | Operation::UpdateTask => Reaction::notice(TASK_SAVE_FAILED),
            Operation::DeleteTask if ok => Reaction::notice(TASK_DELETED).then(Request::FetchTasks),
            Operation::DeleteTask => Reaction::notice(TASK_DELETE_FAILED),
            Operation::FetchProjects | Operation::FetchUsers => {
                if ok {
                    self.tasks.refresh_options(dashboard);
                }
                Reaction::default()
            }
            Operation::FetchTasks => Reaction::default(),
        };
        self.clamp_tables(dashboard);
        reaction
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ALL_TASKS_LABEL, Focus, FormSlot, PROJECT_ADDED, PROJECT_SAVE_FAILED, Pages,
        STATUS_FILTER_FIELD, TASK_UPDATED, UNASSIGNED_LABEL, UPDATE_TASK_LABEL, task_columns,
        task_values,
    };
    use std::sync::Arc;
    use taskdesk_api::{ApiError, MemoryTokenStore, Operation};
    use taskdesk_app::{
        ColumnDescriptor, Priority, Related, Task, TaskId, TaskStatus, ViewKind,
    };
    use taskdesk_store::{Dashboard, MemoryBackend, Request, TaskStore};
    use taskdesk_testkit::DeskFaker;

    fn seeded() -> (MemoryBackend, Dashboard) {
        let data = DeskFaker::new(11).dataset(4, 3, 12);
        let backend = MemoryBackend::with_records(data.users, data.projects, data.tasks);
        let mut dashboard = Dashboard::new(Arc::new(MemoryTokenStore::new(Some("tok"))));
        for request in [Request::FetchUsers, Request::FetchProjects, Request::FetchTasks] {
            dashboard
                .run(&backend, request)
                .expect("seeded fetch should succeed");
        }
        (backend, dashboard)
    }

    fn pages() -> Pages {
        Pages::new(10).expect("page descriptors are valid")
    }

    #[test]
    fn empty_login_is_blocked_with_every_error() {
        let mut pages = pages();
        let dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));

        let blocked = pages
            .submit(ViewKind::Login, FormSlot::Main, &dashboard)
            .expect_err("empty login must not submit");
        assert_eq!(blocked.errors["email"], "Email is required");
        assert_eq!(blocked.errors["password"], "Password is required");
    }

    #[test]
    fn short_password_reports_min_length() {
        let mut pages = pages();
        let dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));
        pages.login.set_value("email", "a@b.com").expect("field exists");
        pages.login.set_value("password", "abc").expect("field exists");

        let blocked = pages
            .submit(ViewKind::Login, FormSlot::Main, &dashboard)
            .expect_err("short password must not submit");
        assert_eq!(
            blocked.errors["password"],
            "Password must be at least 4 characters"
        );
        assert!(!blocked.errors.contains_key("email"));
    }

    #[test]
    fn project_submit_builds_add_request() {
        let mut pages = pages();
        let dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));
        pages.projects.form.set_value("name", "Launch").expect("field exists");
        pages
            .projects
            .form
            .set_value("description", "Go live")
            .expect("field exists");

        let request = pages
            .submit(ViewKind::Projects, FormSlot::Main, &dashboard)
            .expect("valid project submits");
        match request {
            Some(Request::AddProject(project)) => {
                assert_eq!(project.name, "Launch");
                assert_eq!(project.description, "Go live");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn task_options_follow_fetched_records() {
        let (_backend, dashboard) = seeded();
        let mut pages = pages();
        pages.on_settled(&dashboard, Operation::FetchProjects, &Ok(()));

        let view = pages.tasks.form.view();
        let project = view
            .iter()
            .find(|field| field.name == "project")
            .expect("project field");
        assert_eq!(project.options.len(), dashboard.projects.items().len() + 1);
        assert_eq!(project.options[0].value, "");
    }

    #[test]
    fn edit_remounts_and_submit_sends_update() {
        let (_backend, mut dashboard) = seeded();
        let mut pages = pages();
        pages.on_settled(&dashboard, Operation::FetchUsers, &Ok(()));
        let task = dashboard.tasks.items()[0].clone();
        let key_before = pages.tasks.form.key();

        assert!(pages.start_edit(&mut dashboard, &task.id));
        assert_ne!(pages.tasks.form.key(), key_before);
        assert_eq!(pages.tasks.form.submit_label(), UPDATE_TASK_LABEL);
        assert_eq!(pages.tasks.form.value("dueDate").len(), 10);

        pages
            .tasks
            .form
            .set_value("taskStatus", TaskStatus::Completed.as_str())
            .expect("field exists");
        let request = pages
            .submit(ViewKind::Tasks, FormSlot::Main, &dashboard)
            .expect("loaded task is valid");
        match request {
            Some(Request::UpdateTask(id, payload)) => {
                assert_eq!(id, task.id);
                assert_eq!(payload.task_status, TaskStatus::Completed);
                assert!(!payload.due_date.contains('T'));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn page_turns_stop_at_either_edge() {
        let (_backend, dashboard) = seeded();
        let mut pages = pages();
        assert!(!pages.turn_page(ViewKind::Tasks, &dashboard, -1));
        assert!(pages.turn_page(ViewKind::Tasks, &dashboard, 1));
        assert_eq!(pages.table_view(ViewKind::Tasks, &dashboard).map(|t| t.page), Some(2));
        assert!(!pages.turn_page(ViewKind::Tasks, &dashboard, 1));
        assert!(pages.turn_page(ViewKind::Tasks, &dashboard, -1));
        assert!(!pages.turn_page(ViewKind::Login, &dashboard, 1));
    }

    #[test]
    fn unknown_labels_start_unselected_in_the_editor() {
        let (_backend, mut dashboard) = seeded();
        let mut pages = pages();
        let mut odd = dashboard.tasks.items()[0].clone();
        odd.status = TaskStatus::Other("Blocked".to_owned());
        odd.priority = Priority::Other("Urgent".to_owned());
        assert_eq!(task_values(&odd)["taskStatus"], "");
        assert_eq!(task_values(&odd)["priority"], "");

        dashboard.tasks = TaskStore::with_items(vec![odd.clone()]);
        assert!(pages.start_edit(&mut dashboard, &odd.id));
        let blocked = pages
            .submit(ViewKind::Tasks, FormSlot::Main, &dashboard)
            .expect_err("a status must be picked");
        assert_eq!(blocked.errors["taskStatus"], "Task status is required");
        assert_eq!(blocked.errors["priority"], "Priority is required");

        let table = pages
            .table_view(ViewKind::Tasks, &dashboard)
            .expect("tasks table");
        assert!(table.rows[0].cells.contains(&"Blocked".to_owned()));
    }

    #[test]
    fn update_success_resets_form_and_refetches() {
        let (_backend, mut dashboard) = seeded();
        let mut pages = pages();
        let id = dashboard.tasks.items()[0].id.clone();
        pages.start_edit(&mut dashboard, &id);
        dashboard.tasks.stop_editing();

        let reaction = pages.on_settled(&dashboard, Operation::UpdateTask, &Ok(()));
        assert_eq!(reaction.notice.as_deref(), Some(TASK_UPDATED));
        assert_eq!(reaction.follow_up, vec![Request::FetchTasks]);
        assert_eq!(pages.tasks.form.value("title"), "");
        assert_eq!(pages.tasks.form.submit_label(), "Add Task");
    }

    #[test]
    fn project_reactions_follow_outcome() {
        let dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));
        let mut pages = pages();
        pages.projects.form.set_value("name", "Draft").expect("field exists");

        let ok = pages.on_settled(&dashboard, Operation::AddProject, &Ok(()));
        assert_eq!(ok.notice.as_deref(), Some(PROJECT_ADDED));
        assert_eq!(ok.follow_up, vec![Request::FetchProjects]);
        assert_eq!(pages.projects.form.value("name"), "");

        let failed = pages.on_settled(
            &dashboard,
            Operation::AddProject,
            &Err(ApiError::transport(Operation::AddProject)),
        );
        assert_eq!(failed.notice.as_deref(), Some(PROJECT_SAVE_FAILED));
        assert!(failed.follow_up.is_empty());
    }

    #[test]
    fn status_filter_narrows_rows() {
        let (_backend, dashboard) = seeded();
        let mut pages = pages();
        let placeholder = pages.tasks.filter.view()[0].options[0].label.clone();
        assert_eq!(placeholder, ALL_TASKS_LABEL);

        pages
            .tasks
            .filter
            .set_value(STATUS_FILTER_FIELD, "Completed")
            .expect("field exists");
        let sent = pages
            .submit(ViewKind::Tasks, FormSlot::Filter, &dashboard)
            .expect("filter always submits");
        assert_eq!(sent, None);

        let table = pages
            .table_view(ViewKind::Tasks, &dashboard)
            .expect("tasks table");
        let expected = dashboard
            .tasks
            .items()
            .iter()
            .filter(|task| task.status == TaskStatus::Completed)
            .count();
        assert_eq!(table.filtered_count, expected);
    }

    #[test]
    fn delete_selected_targets_cursor_row() {
        let (_backend, dashboard) = seeded();
        let mut pages = pages();
        pages.reset_focus(ViewKind::Projects);
        pages.move_cursor(ViewKind::Projects, &dashboard, 1);

        let request = pages.delete_selected(ViewKind::Projects, &dashboard);
        let expected = dashboard.projects.items()[1].id.clone();
        assert_eq!(request, Some(Request::DeleteProject(expected)));
    }

    #[test]
    fn focus_order_walks_both_task_forms() {
        let pages = pages();
        let order = pages.focus_order(ViewKind::Tasks);
        assert_eq!(order.first(), Some(&Focus::Field(FormSlot::Main, 0)));
        assert!(order.contains(&Focus::Submit(FormSlot::Main)));
        assert!(order.contains(&Focus::Field(FormSlot::Filter, 0)));
        assert_eq!(order.last(), Some(&Focus::Rows));

        assert_eq!(
            pages.focus_order(ViewKind::Login),
            vec![
                Focus::Field(FormSlot::Main, 0),
                Focus::Field(FormSlot::Main, 1),
                Focus::Submit(FormSlot::Main),
            ]
        );
    }

    #[test]
    fn relation_columns_fall_back_to_unassigned() {
        let columns: Vec<ColumnDescriptor<Task>> = task_columns();
        let task = Task {
            id: TaskId::new("t1"),
            title: "Loose".to_owned(),
            description: String::new(),
            assignee: None,
            project: Some(Related::Id("p1".into())),
            priority: Priority::Low,
            due_date: "2026-03-01T00:00:00.000Z".to_owned(),
            status: TaskStatus::ToDo,
        };
        assert_eq!(columns[2].display(&task), UNASSIGNED_LABEL);
        assert_eq!(columns[3].display(&task), "p1");
        assert_eq!(columns[5].display(&task), "2026-03-01");
    }
}
