//! Shared fixtures for controller tests: a transport that replays scripted
//! responses and a notifier that records what the user would have seen.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use posts_core::{
    ApiError, ControllerConfig, HttpMethod, HttpRequest, HttpResponse, Notifier, Post,
    PostController, PostDraft, Severity, Transport, ValidDraft,
};
use tokio::sync::Notify;

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransport {
    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn respond_json<T: serde::Serialize>(&self, status: u16, value: &T) {
        self.respond(status, &serde_json::to_string(value).unwrap());
    }

    pub fn no_response(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::NoResponse("connection refused".to_string())));
    }

    /// The next request blocks after being recorded until the returned
    /// handle is notified.
    pub fn hold_next(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(release.clone());
        release
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<HttpMethod> {
        self.requests().iter().map(|r| r.method).collect()
    }

    pub fn body_of(&self, index: usize) -> serde_json::Value {
        let requests = self.requests();
        serde_json::from_str(requests[index].body.as_deref().unwrap()).unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        let hold = self.hold.lock().unwrap().take();
        if let Some(release) = hold {
            release.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request to {path}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Note>>>);

impl Recorder {
    pub fn notes(&self) -> Vec<Note> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Note {
        self.notes().last().cloned().expect("no notification fired")
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.notes().iter().filter(|n| n.severity == severity).count()
    }
}

impl Notifier for Recorder {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        self.0.lock().unwrap().push(Note {
            severity,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

pub type TestController = PostController<Arc<ScriptedTransport>, Recorder>;

pub struct Harness {
    pub controller: Arc<TestController>,
    pub transport: Arc<ScriptedTransport>,
    pub notes: Recorder,
}

pub fn config() -> ControllerConfig {
    ControllerConfig::default()
        .with_base_url("http://mock.test")
        .with_load_retries(0, Duration::ZERO)
}

pub fn harness() -> Harness {
    harness_with(config())
}

pub fn harness_with(config: ControllerConfig) -> Harness {
    let transport = Arc::new(ScriptedTransport::default());
    let notes = Recorder::default();
    let controller = Arc::new(PostController::new(config, transport.clone(), notes.clone()));
    Harness {
        controller,
        transport,
        notes,
    }
}

pub fn post(id: u64, title: &str, body: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        body: body.to_string(),
        user_id: 1,
    }
}

pub fn posts(ids: &[u64]) -> Vec<Post> {
    ids.iter()
        .map(|&id| post(id, &format!("title {id}"), &format!("body {id}")))
        .collect()
}

pub fn valid(title: &str, body: &str) -> ValidDraft {
    ValidDraft::try_from(PostDraft::new(title, body)).unwrap()
}

pub fn ids(posts: &[Post]) -> Vec<u64> {
    posts.iter().map(|p| p.id).collect()
}
