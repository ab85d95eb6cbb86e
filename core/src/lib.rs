//! Client-side core for the posts list view.
//!
//! # Overview
//! The remote `/posts` resource answers writes but never keeps them. This
//! crate keeps the authoritative copy of the collection on the client and
//! reconciles it with whatever the server answers.
//!
//! # Design
//! - `PostClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. A `Transport` does the I/O in
//!   between, so tests can script the backend.
//! - `classify` turns a typed `ApiError` into retry / simulate success /
//!   fail for a given `Operation`.
//! - `PostController` owns the collection, the pending operations and the
//!   `EditSession`, publishes them through a `watch` channel and reports to
//!   the user through a `Notifier`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod classify;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod notify;
pub mod session;
pub mod transport;
pub mod types;
pub mod validation;

pub use classify::{classify, Disposition, Operation};
pub use client::PostClient;
pub use config::ControllerConfig;
pub use controller::{
    CollectionState, Outcome, PendingOperation, PostController, Seed, SubmitError, ViewState,
};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use session::{EditSession, SessionMode};
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{NewPost, Post, PostDraft, PostId, UserId};
pub use validation::{validate, DraftField, ValidDraft, ValidationError};
