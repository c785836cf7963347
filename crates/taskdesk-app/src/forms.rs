// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Descriptor-driven forms.
//!
//! A [`Form`] owns the per-field values, errors and touched flags for one
//! mount. Callers describe fields with [`FieldDescriptor`], feed keystrokes
//! through [`Form::set_value`] and [`Form::blur`], and get the collected
//! values only from a successful [`Form::submit`].

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::validation::{check_email, parse_date};

pub const SELECT_PLACEHOLDER_LABEL: &str = "Select an option";
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";

pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Password,
    Date,
    TextArea,
    Select(Vec<SelectOption>),
}

impl InputKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Date => "date",
            Self::TextArea => "textarea",
            Self::Select(_) => "select",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required(String),
    MinLength { min: usize, message: String },
    Email(String),
    Date(String),
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required(message.into())
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email(message.into())
    }

    pub fn date(message: impl Into<String>) -> Self {
        Self::Date(message.into())
    }

    /// Email and date shape checks pass on blank input; presence is the
    /// job of [`Rule::Required`].
    pub fn check(&self, value: &str) -> Result<(), &str> {
        match self {
            Self::Required(message) => {
                if value.trim().is_empty() {
                    return Err(message.as_str());
                }
            }
            Self::MinLength { min, message } => {
                if value.chars().count() < *min {
                    return Err(message.as_str());
                }
            }
            Self::Email(message) => {
                if !value.trim().is_empty() && check_email(value).is_err() {
                    return Err(message.as_str());
                }
            }
            Self::Date(message) => {
                if !value.trim().is_empty() && parse_date(value).is_err() {
                    return Err(message.as_str());
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub placeholder: Option<String>,
    pub rules: Vec<Rule>,
    pub layout: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            placeholder: None,
            rules: Vec::new(),
            layout: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, InputKind::Text)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, InputKind::Email)
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, InputKind::Password)
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, InputKind::Date)
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, InputKind::TextArea)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(name, label, InputKind::Select(options))
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// First failing rule's message, in declaration order.
    pub fn validate(&self, value: &str) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.check(value).err())
            .map(str::to_owned)
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, Rule::Required(_)))
    }

    /// Options as rendered, led by the empty placeholder entry. Empty for
    /// non-select kinds.
    pub fn rendered_options(&self) -> Vec<SelectOption> {
        let InputKind::Select(options) = &self.kind else {
            return Vec::new();
        };
        let placeholder = self
            .placeholder
            .clone()
            .unwrap_or_else(|| SELECT_PLACEHOLDER_LABEL.to_owned());
        let mut rendered = Vec::with_capacity(options.len() + 1);
        rendered.push(SelectOption::new("", placeholder));
        rendered.extend(options.iter().cloned());
        rendered
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form field {0:?} is declared more than once; field names must be unique")]
    DuplicateField(String),
    #[error(
        "select field {0:?} has an option with an empty value; the empty value is reserved for the placeholder"
    )]
    EmptyOptionValue(String),
    #[error("form has no field named {0:?}")]
    UnknownField(String),
}

/// Returned when a submit is refused; holds every failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) need attention before submitting", .errors.len())]
pub struct SubmitBlocked {
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub values: FormValues,
    pub errors: BTreeMap<String, String>,
    pub touched: BTreeSet<String>,
}

impl FormState {
    fn seeded(fields: &[FieldDescriptor], initial: &FormValues) -> Self {
        let values = fields
            .iter()
            .map(|field| {
                let value = initial.get(&field.name).cloned().unwrap_or_default();
                (field.name.clone(), value)
            })
            .collect();
        Self {
            values,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub kind: &'static str,
    pub value: String,
    pub placeholder: Option<String>,
    pub error: Option<String>,
    pub options: Vec<SelectOption>,
    pub layout: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    key: u64,
    fields: Vec<FieldDescriptor>,
    initial: FormValues,
    state: FormState,
    submit_label: String,
}

impl Form {
    pub fn new(fields: Vec<FieldDescriptor>, initial: &FormValues) -> Result<Self, FormError> {
        check_descriptors(&fields)?;
        let state = FormState::seeded(&fields, initial);
        Ok(Self {
            key: 0,
            fields,
            initial: initial.clone(),
            state,
            submit_label: DEFAULT_SUBMIT_LABEL.to_owned(),
        })
    }

    /// Identity of the current mount. Changes only on [`Form::remount`].
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn value(&self, name: &str) -> &str {
        self.state.values.get(name).map_or("", String::as_str)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.state.errors.get(name).map(String::as_str)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.state.touched.contains(name)
    }

    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    pub fn set_submit_label(&mut self, label: impl Into<String>) {
        self.submit_label = label.into();
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.field_index(name)?;
        self.state.values.insert(name.to_owned(), value.into());
        if self.is_touched(name) {
            self.revalidate(name)?;
        }
        Ok(())
    }

    pub fn blur(&mut self, name: &str) -> Result<(), FormError> {
        self.field_index(name)?;
        self.state.touched.insert(name.to_owned());
        self.revalidate(name)
    }

    /// Moves a select field `delta` steps through its rendered options,
    /// placeholder included, wrapping at either end.
    pub fn cycle_option(&mut self, name: &str, delta: isize) -> Result<(), FormError> {
        let index = self.field_index(name)?;
        let options = self.fields[index].rendered_options();
        if options.is_empty() {
            return Ok(());
        }
        let current = options
            .iter()
            .position(|option| option.value == self.value(name))
            .unwrap_or(0) as isize;
        let len = options.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        let value = options[next].value.clone();
        self.set_value(name, value)
    }

    /// Validates every field and hands the values to `on_submit` only when
    /// none fail. A refused submit marks all fields touched so every error
    /// is visible at once.
    pub fn submit<R>(&mut self, on_submit: impl FnOnce(FormValues) -> R) -> Result<R, SubmitBlocked> {
        let mut errors = BTreeMap::new();
        for field in &self.fields {
            self.state.touched.insert(field.name.clone());
            let value = self.state.values.get(&field.name).map_or("", String::as_str);
            if let Some(message) = field.validate(value) {
                errors.insert(field.name.clone(), message);
            }
        }
        self.state.errors = errors.clone();
        if !errors.is_empty() {
            return Err(SubmitBlocked { errors });
        }
        Ok(on_submit(self.state.values.clone()))
    }

    /// Restores the initial values of the current mount.
    pub fn reset(&mut self) {
        self.state = FormState::seeded(&self.fields, &self.initial);
    }

    /// Starts a fresh mount: new identity, state seeded only from `initial`.
    pub fn remount(&mut self, initial: &FormValues) {
        self.key = self.key.wrapping_add(1);
        self.initial = initial.clone();
        self.state = FormState::seeded(&self.fields, initial);
    }

    /// Swaps descriptors between render passes (for example when select
    /// options arrive). Values of surviving fields are kept.
    pub fn replace_fields(&mut self, fields: Vec<FieldDescriptor>) -> Result<(), FormError> {
        check_descriptors(&fields)?;
        let mut values = FormValues::new();
        for field in &fields {
            let value = self
                .state
                .values
                .get(&field.name)
                .or_else(|| self.initial.get(&field.name))
                .cloned()
                .unwrap_or_default();
            values.insert(field.name.clone(), value);
        }
        self.state
            .errors
            .retain(|name, _| values.contains_key(name));
        self.state.touched.retain(|name| values.contains_key(name));
        self.state.values = values;
        self.fields = fields;
        Ok(())
    }

    pub fn view(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|field| FieldView {
                name: field.name.clone(),
                label: field.label.clone(),
                kind: field.kind.as_str(),
                value: self.value(&field.name).to_owned(),
                placeholder: field.placeholder.clone(),
                error: self.error(&field.name).map(str::to_owned),
                options: field.rendered_options(),
                layout: field.layout.clone(),
                required: field.is_required(),
            })
            .collect()
    }

    fn field_index(&self, name: &str) -> Result<usize, FormError> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_owned()))
    }

    fn revalidate(&mut self, name: &str) -> Result<(), FormError> {
        let index = self.field_index(name)?;
        match self.fields[index].validate(self.value(name)) {
            Some(message) => {
                self.state.errors.insert(name.to_owned(), message);
            }
            None => {
                self.state.errors.remove(name);
            }
        }
        Ok(())
    }
}

fn check_descriptors(fields: &[FieldDescriptor]) -> Result<(), FormError> {
    let mut seen = BTreeSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(FormError::DuplicateField(field.name.clone()));
        }
        if let InputKind::Select(options) = &field.kind
            && options.iter().any(|option| option.value.is_empty())
        {
            return Err(FormError::EmptyOptionValue(field.name.clone()));
        }
    }
    Ok(())
}
