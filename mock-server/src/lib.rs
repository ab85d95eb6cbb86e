//! Stand-in for a JSONPlaceholder-style `/posts` resource.
//!
//! Writes are answered but never stored: every request sees the same
//! fixture. Individual routes can be forced to fail with a fixed status so
//! client behavior can be exercised against each failure class.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

pub use axum::http::StatusCode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

/// The `id` in an update body is ignored; the path wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Get,
    Create,
    Update,
    Delete,
}

pub const FIXTURE_LEN: u64 = 100;

/// 100 posts, ids 1..=100, ten per user.
pub fn fixture() -> Vec<Post> {
    (1..=FIXTURE_LEN)
        .map(|id| Post {
            id,
            title: format!("post {id}"),
            body: format!("body of post {id}"),
            user_id: (id - 1) / 10 + 1,
        })
        .collect()
}

#[derive(Clone)]
struct MockState {
    posts: Arc<Vec<Post>>,
    faults: Arc<HashMap<Route, StatusCode>>,
}

impl MockState {
    fn check(&self, route: Route) -> Result<(), StatusCode> {
        match self.faults.get(&route) {
            Some(status) => {
                debug!(?route, %status, "injected fault");
                Err(*status)
            }
            None => Ok(()),
        }
    }

    fn find(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}

#[derive(Clone, Debug)]
pub struct MockServer {
    posts: Vec<Post>,
    faults: HashMap<Route, StatusCode>,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new(fixture())
    }
}

impl MockServer {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            faults: HashMap::new(),
        }
    }

    /// Make every request to `route` answer with `status`.
    pub fn with_fault(mut self, route: Route, status: StatusCode) -> Self {
        self.faults.insert(route, status);
        self
    }

    pub fn router(self) -> Router {
        let state = MockState {
            posts: Arc::new(self.posts),
            faults: Arc::new(self.faults),
        };
        Router::new()
            .route("/posts", get(list_posts).post(create_post))
            .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
            .with_state(state)
    }

    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router()).await
    }
}

pub fn app() -> Router {
    MockServer::default().router()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    MockServer::default().serve(listener).await
}

async fn list_posts(State(state): State<MockState>) -> Result<Json<Vec<Post>>, StatusCode> {
    state.check(Route::List)?;
    Ok(Json(state.posts.as_ref().clone()))
}

async fn get_post(
    State(state): State<MockState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, StatusCode> {
    state.check(Route::Get)?;
    state.find(id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Echoes the payload with the id the next post would get. Nothing is
/// stored, so every create gets the same id.
async fn create_post(
    State(state): State<MockState>,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), StatusCode> {
    state.check(Route::Create)?;
    let post = Post {
        id: state.posts.len() as u64 + 1,
        title: input.title,
        body: input.body,
        user_id: input.user_id,
    };
    Ok((StatusCode::CREATED, Json(post)))
}

/// Unknown ids answer 500, as the public JSONPlaceholder does.
async fn update_post(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Post>, StatusCode> {
    state.check(Route::Update)?;
    if state.find(id).is_none() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(Post {
        id,
        title: input.title,
        body: input.body,
        user_id: input.user_id,
    }))
}

async fn delete_post(
    State(state): State<MockState>,
    Path(_id): Path<u64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state.check(Route::Delete)?;
    Ok(Json(serde_json::json!({})))
}
