// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use taskdesk_store::{Backend, MemoryBackend, Outcome, Request, Ticket, perform};
use taskdesk_testkit::demo_dataset;
use taskdesk_tui::{AppRuntime, InternalEvent};
use tracing::debug;

/// Runs each backend call on its own worker thread so the UI keeps drawing
/// while requests are in flight.
pub struct ThreadRuntime {
    backend: Arc<dyn Backend>,
}

impl ThreadRuntime {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl AppRuntime for ThreadRuntime {
    fn perform(&mut self, request: Request) -> Outcome {
        perform(self.backend.as_ref(), request)
    }

    fn spawn_request(
        &mut self,
        ticket: Ticket,
        request: Request,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let op = request.operation();
        thread::Builder::new()
            .name(format!("taskdesk-{op:?}").to_lowercase())
            .spawn(move || {
                let outcome = perform(backend.as_ref(), request);
                if tx.send(InternalEvent::Settled { ticket, outcome }).is_err() {
                    debug!(operation = ?op, "ui exited before request settled");
                }
            })
            .with_context(|| format!("spawn worker for {op:?}"))?;
        Ok(())
    }
}

/// In-process backend seeded with the demo records.
pub fn demo_backend() -> MemoryBackend {
    let data = demo_dataset();
    MemoryBackend::with_records(data.users, data.projects, data.tasks)
}

#[cfg(test)]
mod tests {
    use super::{ThreadRuntime, demo_backend};
    use anyhow::Result;
    use std::io::Read;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use taskdesk_api::{Client, MemoryTokenStore};
    use taskdesk_store::{Dashboard, Outcome, Request};
    use taskdesk_tui::{AppRuntime, InternalEvent};

    #[test]
    fn worker_reports_outcome_over_channel() -> Result<()> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|error| anyhow::anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || -> Option<String> {
            let mut request = server.recv().ok()?;
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).ok()?;
            let auth = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_owned());
            let response = tiny_http::Response::from_string(
                r#"{"data":[{"_id":"p1","name":"Launch","description":"Go live"}]}"#,
            )
            .with_header(
                tiny_http::Header::from_bytes("Content-Type", "application/json").ok()?,
            );
            request.respond(response).ok()?;
            auth
        });

        let tokens = Arc::new(MemoryTokenStore::new(Some("tok123")));
        let client = Client::new(&base_url, Duration::from_secs(5), tokens.clone())?;
        let mut dashboard = Dashboard::new(tokens);
        let mut runtime = ThreadRuntime::new(Arc::new(client));

        let (tx, rx) = mpsc::channel();
        let ticket = dashboard.dispatch(&Request::FetchProjects);
        runtime.spawn_request(ticket, Request::FetchProjects, tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        let InternalEvent::Settled { ticket, outcome } = event else {
            panic!("expected a settled request, got {event:?}");
        };
        assert!(matches!(outcome, Outcome::FetchedProjects(Ok(ref projects)) if projects.len() == 1));
        dashboard.settle(ticket, outcome)?;
        assert_eq!(dashboard.projects.items()[0].name, "Launch");

        let auth = handle
            .join()
            .map_err(|_| anyhow::anyhow!("mock server thread panicked"))?;
        assert_eq!(auth.as_deref(), Some("Bearer tok123"));
        Ok(())
    }

    #[test]
    fn demo_backend_serves_seeded_records() -> Result<()> {
        let backend = demo_backend();
        let mut dashboard = Dashboard::new(Arc::new(MemoryTokenStore::default()));
        let mut runtime = ThreadRuntime::new(Arc::new(backend));

        for request in [Request::FetchUsers, Request::FetchProjects, Request::FetchTasks] {
            let ticket = dashboard.dispatch(&request);
            let outcome = runtime.perform(request);
            dashboard.settle(ticket, outcome)?;
        }
        assert_eq!(dashboard.users.items().len(), 8);
        assert_eq!(dashboard.projects.items().len(), 5);
        assert_eq!(dashboard.tasks.items().len(), 24);
        assert!(
            dashboard
                .tasks
                .items()
                .iter()
                .all(|task| task.project.as_ref().and_then(|p| p.name()).is_some())
        );
        Ok(())
    }
}
