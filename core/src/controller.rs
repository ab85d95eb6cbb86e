//! The post collection controller.
//!
//! # Design
//! The controller owns the only authoritative copy of the collection. The
//! backend answers writes but never keeps them, so the controller applies
//! every mutation locally and uses `classify` to decide whether a failed
//! call still counts as done.
//!
//! State lives inside a `watch` channel: readers take a snapshot or
//! subscribe, and only the operation methods below call `send_modify`.
//!
//! Operations are serialized through `writer`, a FIFO async mutex. Each
//! operation registers itself in `pending` before it queues, so the busy
//! flag is visible for as long as anything is outstanding, and operations
//! apply to the collection strictly in the order they were called.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::classify::{classify, Disposition, Operation};
use crate::client::PostClient;
use crate::config::ControllerConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{Notifier, Severity};
use crate::session::{EditSession, SessionMode};
use crate::transport::Transport;
use crate::types::{NewPost, Post, PostDraft, PostId, UserId};
use crate::validation::{ValidDraft, ValidationError};

/// Collection handed over by the page when the view mounts.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub posts: Vec<Post>,
    /// Error the page hit while preparing `posts`, if any.
    pub error: Option<String>,
}

impl Seed {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self { posts, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            error: Some(error.into()),
        }
    }

    fn needs_fetch(&self) -> bool {
        self.posts.is_empty() || self.error.is_some()
    }
}

/// An operation that has been called and has not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperation {
    pub ticket: u64,
    pub operation: Operation,
    pub target: Option<PostId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionState {
    pub posts: Vec<Post>,
    pub pending: Vec<PendingOperation>,
    pub last_load_error: Option<String>,
}

impl CollectionState {
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}

/// Everything the rendering layer needs to draw the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub collection: CollectionState,
    pub session: EditSession,
}

/// How an operation ended, as seen by the local collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The call succeeded and the change was applied.
    Applied,
    /// The call failed in a known way and the change was applied anyway.
    Simulated,
    /// Nothing changed locally; `message` is what the user was shown.
    Failed { message: String },
    /// No request was needed.
    Skipped,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied | Outcome::Simulated)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("no edit session is open")]
    NoOpenSession,
}

pub struct PostController<T, N> {
    client: PostClient,
    config: ControllerConfig,
    transport: T,
    notifier: N,
    state: watch::Sender<ViewState>,
    writer: Mutex<()>,
    next_ticket: AtomicU64,
}

/// Removes its operation from `pending` when dropped, including when the
/// operation future is dropped before completion.
struct PendingGuard<'a> {
    state: &'a watch::Sender<ViewState>,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let ticket = self.ticket;
        self.state
            .send_modify(|s| s.collection.pending.retain(|p| p.ticket != ticket));
    }
}

impl<T: Transport, N: Notifier> PostController<T, N> {
    pub fn new(config: ControllerConfig, transport: T, notifier: N) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            client: PostClient::new(&config.base_url),
            config,
            transport,
            notifier,
            state,
            writer: Mutex::new(()),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.borrow().collection.posts.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().collection.is_busy()
    }

    pub fn session(&self) -> EditSession {
        self.state.borrow().session.clone()
    }

    // -----------------------------------------------------------------------
    // Edit session callbacks
    // -----------------------------------------------------------------------

    pub fn open_for_create(&self) {
        self.state.send_modify(|s| s.session.open_for_create());
    }

    pub fn open_for_edit(&self, post: &Post) {
        self.state.send_modify(|s| s.session.open_for_edit(post));
    }

    pub fn cancel(&self) {
        self.state.send_modify(|s| s.session.cancel());
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.state.send_modify(|s| s.session.set_title(title));
    }

    pub fn set_body(&self, body: impl Into<String>) {
        let body = body.into();
        self.state.send_modify(|s| s.session.set_body(body));
    }

    pub fn set_draft(&self, draft: PostDraft) {
        self.state.send_modify(|s| s.session.set_draft(draft));
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Install the page's seed and fetch the collection unless the seed is a
    /// usable, error-free, non-empty collection.
    #[instrument(skip_all, fields(seeded = seed.posts.len(), seed_error = seed.error.is_some()))]
    pub async fn activate(&self, seed: Seed) -> Outcome {
        let _pending = self.begin(Operation::Load, None);
        let _writer = self.writer.lock().await;

        let needs_fetch = seed.needs_fetch();
        let announce = seed.error.is_some();
        let posts = dedupe(seed.posts);
        self.state.send_modify(|s| {
            s.collection.posts = posts;
            s.collection.last_load_error = seed.error;
        });

        if !needs_fetch {
            debug!("using seeded collection");
            return Outcome::Skipped;
        }
        self.fetch_all(announce).await
    }

    /// Replace the collection with a fresh server snapshot. Announces
    /// success when it clears an earlier load error.
    #[instrument(skip_all)]
    pub async fn load_all(&self) -> Outcome {
        let _pending = self.begin(Operation::Load, None);
        let _writer = self.writer.lock().await;

        let announce = self.state.borrow().collection.last_load_error.is_some();
        self.fetch_all(announce).await
    }

    #[instrument(skip_all)]
    pub async fn create(&self, draft: ValidDraft) -> Outcome {
        let _pending = self.begin(Operation::Create, None);
        let _writer = self.writer.lock().await;

        let payload = NewPost::from_draft(draft.as_draft(), self.config.default_user_id);
        match self.request_create(&payload).await {
            Ok(created) => {
                self.state.send_modify(|s| {
                    let post = with_unique_id(&s.collection.posts, created);
                    info!(id = post.id, "post created");
                    s.collection.posts.insert(0, post);
                    if s.session.mode() == Some(SessionMode::Create) {
                        s.session.close_on_success();
                    }
                });
                self.notifier
                    .notify(Severity::Success, "Post Created", "Post created successfully");
                Outcome::Applied
            }
            Err(error) => self.reject(Operation::Create, error),
        }
    }

    /// Update the post `id`. The author sent to the server is the one
    /// currently stored for `id`.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: PostId, draft: ValidDraft) -> Outcome {
        self.update_as(id, None, draft).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: PostId) -> Outcome {
        let _pending = self.begin(Operation::Delete, Some(id));
        let _writer = self.writer.lock().await;

        let simulated = match self.request_delete(id).await {
            Ok(()) => false,
            Err(error) => match classify(Operation::Delete, &error) {
                Disposition::SimulateSuccess => {
                    warn!(error = %error, "delete failed remotely; removing locally");
                    true
                }
                Disposition::Retry | Disposition::Fail => {
                    return self.reject(Operation::Delete, error)
                }
            },
        };

        self.state.send_modify(|s| {
            s.collection.posts.retain(|p| p.id != id);
            if s.session.mode() == Some(SessionMode::Update(id)) {
                s.session.cancel();
            }
        });
        if simulated {
            self.notifier.notify(
                Severity::Success,
                "Post Deleted",
                "Post deleted successfully (simulated)",
            );
            Outcome::Simulated
        } else {
            self.notifier
                .notify(Severity::Success, "Post Deleted", "Post deleted successfully");
            Outcome::Applied
        }
    }

    /// Validate the open session's draft and route it to create or update
    /// depending on the session target.
    pub async fn submit(&self) -> Result<Outcome, SubmitError> {
        let session = self.session();
        if !session.is_open() {
            return Err(SubmitError::NoOpenSession);
        }

        let draft = match ValidDraft::try_from(session.draft().clone()) {
            Ok(draft) => draft,
            Err(error) => {
                debug!(%error, kind = ?error.kind(), "rejected submission");
                self.notifier.notify(
                    Severity::Warning,
                    "Validation Error",
                    &format!("Please fill in all required fields ({error})"),
                );
                return Err(error.into());
            }
        };

        let outcome = match session.target() {
            None => self.create(draft).await,
            Some(target) => self.update_as(target.id, Some(target.user_id), draft).await,
        };
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn begin(&self, operation: Operation, target: Option<PostId>) -> PendingGuard<'_> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.state.send_modify(|s| {
            s.collection.pending.push(PendingOperation {
                ticket,
                operation,
                target,
            })
        });
        PendingGuard {
            state: &self.state,
            ticket,
        }
    }

    async fn update_as(&self, id: PostId, author: Option<UserId>, draft: ValidDraft) -> Outcome {
        let _pending = self.begin(Operation::Update, Some(id));
        let _writer = self.writer.lock().await;

        let user_id = match author {
            Some(user_id) => user_id,
            None => self
                .state
                .borrow()
                .collection
                .get(id)
                .map(|p| p.user_id)
                .unwrap_or(self.config.default_user_id),
        };
        let draft = draft.into_draft();
        let payload = Post {
            id,
            title: draft.title.clone(),
            body: draft.body.clone(),
            user_id,
        };

        let simulated = match self.request_update(&payload).await {
            Ok(()) => false,
            Err(error) => match classify(Operation::Update, &error) {
                Disposition::SimulateSuccess => {
                    warn!(error = %error, "update failed remotely; applying locally");
                    true
                }
                Disposition::Retry | Disposition::Fail => {
                    return self.reject(Operation::Update, error)
                }
            },
        };

        self.state.send_modify(|s| {
            if let Some(post) = s.collection.posts.iter_mut().find(|p| p.id == id) {
                *post = post.merged(&draft);
            }
            if s.session.mode() == Some(SessionMode::Update(id)) {
                s.session.close_on_success();
            }
        });
        if simulated {
            self.notifier.notify(
                Severity::Success,
                "Post Updated",
                "Post updated successfully (simulated)",
            );
            Outcome::Simulated
        } else {
            self.notifier
                .notify(Severity::Success, "Post Updated", "Post updated successfully");
            Outcome::Applied
        }
    }

    async fn fetch_all(&self, announce: bool) -> Outcome {
        let mut attempt = 0;
        let result = loop {
            match self.request_list().await {
                Err(error)
                    if classify(Operation::Load, &error) == Disposition::Retry
                        && attempt < self.config.load_retries =>
                {
                    attempt += 1;
                    warn!(attempt, error = %error, "load got no response; retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                other => break other,
            }
        };

        match result {
            Ok(posts) => {
                let posts = dedupe(posts);
                info!(count = posts.len(), "loaded posts");
                self.state.send_modify(|s| {
                    s.collection.posts = posts;
                    s.collection.last_load_error = None;
                });
                if announce {
                    self.notifier
                        .notify(Severity::Success, "Data Loaded", "Posts loaded successfully");
                }
                Outcome::Applied
            }
            Err(error) => {
                let message = error.user_message();
                self.state
                    .send_modify(|s| s.collection.last_load_error = Some(message.clone()));
                self.reject(Operation::Load, error)
            }
        }
    }

    fn reject(&self, operation: Operation, error: ApiError) -> Outcome {
        let message = error.user_message();
        warn!(operation = operation.as_str(), error = %error, "operation failed");
        let title = match operation {
            Operation::Load => "Error Loading Posts",
            Operation::Create => "Create Failed",
            Operation::Update => "Update Failed",
            Operation::Delete => "Delete Failed",
        };
        self.notifier.notify(Severity::Error, title, &message);
        Outcome::Failed { message }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    async fn request_list(&self) -> Result<Vec<Post>, ApiError> {
        let response = self.round_trip(self.client.build_list_posts()).await?;
        self.client.parse_list_posts(response)
    }

    async fn request_create(&self, payload: &NewPost) -> Result<Post, ApiError> {
        let request = self.client.build_create_post(payload)?;
        let response = self.round_trip(request).await?;
        self.client.parse_create_post(response)
    }

    async fn request_update(&self, payload: &Post) -> Result<(), ApiError> {
        let request = self.client.build_update_post(payload)?;
        let response = self.round_trip(request).await?;
        self.client.parse_update_post(response)
    }

    async fn request_delete(&self, id: PostId) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_post(id)).await?;
        self.client.parse_delete_post(response)
    }
}

/// Keep the first occurrence of every id.
fn dedupe(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::new();
    let before = posts.len();
    let posts: Vec<Post> = posts.into_iter().filter(|p| seen.insert(p.id)).collect();
    if posts.len() != before {
        warn!(dropped = before - posts.len(), "dropped posts with repeated ids");
    }
    posts
}

/// The backend hands out the same id for every create; give the new post
/// the next free id when that happens.
fn with_unique_id(posts: &[Post], mut post: Post) -> Post {
    let taken = |id: PostId| posts.iter().any(|p| p.id == id);
    if taken(post.id) {
        // No id above u64::MAX; take the lowest free one.
        let next = match posts.iter().map(|p| p.id).max().unwrap_or(0).checked_add(1) {
            Some(next) => next,
            None => (1..=PostId::MAX).find(|id| !taken(*id)).unwrap_or(PostId::MAX),
        };
        warn!(server_id = post.id, local_id = next, "server id already in use");
        post.id = next;
    }
    post
}
