//! Stateless HTTP request builder and response parser for the posts API.
//!
//! # Design
//! `PostClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is the job of a `Transport`.
//!
//! Any 2xx status counts as success: the mock backend answers POST with 201
//! and everything else with 200, and real deployments may differ.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPost, Post, PostId};

#[derive(Debug, Clone)]
pub struct PostClient {
    base_url: String,
}

impl PostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        self.bodiless(HttpMethod::Get, format!("{}/posts", self.base_url))
    }

    pub fn build_get_post(&self, id: PostId) -> HttpRequest {
        self.bodiless(HttpMethod::Get, format!("{}/posts/{id}", self.base_url))
    }

    pub fn build_create_post(&self, input: &NewPost) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}/posts", self.base_url), input)
    }

    /// The update payload is the full merged record, `id` and `userId`
    /// included.
    pub fn build_update_post(&self, post: &Post) -> Result<HttpRequest, ApiError> {
        self.with_json(
            HttpMethod::Put,
            format!("{}/posts/{}", self.base_url, post.id),
            post,
        )
    }

    pub fn build_delete_post(&self, id: PostId) -> HttpRequest {
        self.bodiless(HttpMethod::Delete, format!("{}/posts/{id}", self.base_url))
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Only the status matters; the echoed record is not trusted because the
    /// backend does not persist it.
    pub fn parse_update_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn bodiless(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, response.body.clone()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
