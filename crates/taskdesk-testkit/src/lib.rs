// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use taskdesk_app::{
    Priority, Project, ProjectId, Related, RelatedSummary, Task, TaskId, TaskStatus, User, UserId,
    format_date,
};
use time::{Date, Duration, Month};

const FIRST_NAMES: [&str; 16] = [
    "Amara", "Bilal", "Chen", "Dalia", "Emeka", "Farah", "Goran", "Hana", "Imani", "Joaquin",
    "Keiko", "Lars", "Mei", "Nadia", "Omar", "Priya",
];
const LAST_NAMES: [&str; 18] = [
    "Okafor", "Lindqvist", "Haddad", "Moreau", "Tanaka", "Kowalski", "Mensah", "Iyer", "Novak",
    "Castillo", "Osei", "Petrov", "Rahman", "Schmidt", "Vargas", "Weller", "Yilmaz", "Zhou",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "example.org",
    "acme.test",
    "northwind.test",
    "contoso.test",
];

const PROJECT_NAMES: [&str; 12] = [
    "Website Redesign",
    "Mobile App",
    "Billing Migration",
    "Customer Portal",
    "Data Warehouse",
    "Onboarding Flow",
    "Search Revamp",
    "Support Chatbot",
    "Release Pipeline",
    "Analytics Dashboard",
    "Security Audit",
    "Partner API",
];

const TASK_VERBS: [&str; 10] = [
    "Draft", "Review", "Implement", "Test", "Document", "Refactor", "Deploy", "Triage", "Design",
    "Estimate",
];
const TASK_OBJECTS: [&str; 12] = [
    "login screen",
    "invoice export",
    "error handling",
    "search index",
    "release notes",
    "database schema",
    "notification emails",
    "access controls",
    "usage metrics",
    "landing page",
    "rate limits",
    "backup job",
];

const WORDS: [&str; 24] = [
    "scope", "deliver", "stakeholders", "milestone", "feedback", "iteration", "quality",
    "coverage", "handoff", "timeline", "budget", "risks", "design", "review", "metrics",
    "launch", "customers", "backlog", "polish", "rollout", "support", "integration",
    "performance", "alignment",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible dashboard records.
#[derive(Debug, Clone)]
pub struct DeskFaker {
    rng: DeterministicRng,
    minted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl DeskFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            minted: 0,
        }
    }

    pub fn user(&mut self) -> User {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        let id = self.mint("u");
        User {
            email: format!(
                "{}.{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                id.trim_start_matches('u')
            ),
            name: format!("{first} {last}"),
            id: UserId::new(id),
        }
    }

    pub fn project(&mut self) -> Project {
        let name = self.pick(&PROJECT_NAMES).to_owned();
        Project {
            id: ProjectId::new(self.mint("p")),
            description: self.sentence(6, 14),
            name,
        }
    }

    /// A task linked to one of `projects` and `users`, with relations
    /// embedded the way list endpoints return them.
    pub fn task(&mut self, projects: &[Project], users: &[User]) -> Task {
        let title = format!("{} {}", self.pick(&TASK_VERBS), self.pick(&TASK_OBJECTS));
        let project = (!projects.is_empty()).then(|| {
            let project = &projects[self.rng.int_n(projects.len())];
            Related::Embedded(RelatedSummary {
                id: project.id.clone(),
                name: project.name.clone(),
            })
        });
        let assignee = (!users.is_empty()).then(|| {
            let user = &users[self.rng.int_n(users.len())];
            Related::Embedded(RelatedSummary {
                id: user.id.clone(),
                name: user.name.clone(),
            })
        });
        Task {
            id: TaskId::new(self.mint("t")),
            title,
            description: self.sentence(8, 18),
            assignee,
            project,
            priority: Priority::ALL[self.rng.int_n(Priority::ALL.len())].clone(),
            due_date: format!("{}T00:00:00.000Z", format_date(self.due_date())),
            status: TaskStatus::ALL[self.rng.int_n(TaskStatus::ALL.len())].clone(),
        }
    }

    pub fn dataset(&mut self, users: usize, projects: usize, tasks: usize) -> Dataset {
        let users: Vec<User> = (0..users).map(|_| self.user()).collect();
        let projects: Vec<Project> = (0..projects).map(|_| self.project()).collect();
        let tasks = (0..tasks).map(|_| self.task(&projects, &users)).collect();
        Dataset {
            users,
            projects,
            tasks,
        }
    }

    pub fn due_date(&mut self) -> Date {
        let offset = self.rng.int_n(365) as i64;
        reference_date() + Duration::days(offset)
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let span = max_words.saturating_sub(min_words) + 1;
        let count = min_words + self.rng.int_n(span);
        let mut words: Vec<String> = (0..count)
            .map(|_| self.pick(&WORDS).to_owned())
            .collect();
        if let Some(first) = words.first_mut() {
            let mut chars = first.chars();
            if let Some(head) = chars.next() {
                *first = head.to_uppercase().chain(chars).collect();
            }
        }
        format!("{}.", words.join(" "))
    }

    fn mint(&mut self, prefix: &str) -> String {
        self.minted += 1;
        format!("{prefix}{:04}", self.minted)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// The seeded records `--demo` starts with.
pub fn demo_dataset() -> Dataset {
    DeskFaker::new(7).dataset(8, 5, 24)
}

pub fn temp_token_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("token");
    Ok((dir, path))
}

pub fn fixture_date() -> &'static str {
    "2026-02-19"
}

fn reference_date() -> Date {
    Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1).unwrap_or(Date::MIN)
}
