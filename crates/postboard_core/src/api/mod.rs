//! Remote posts API boundary.
//!
//! # Responsibility
//! - Define the async contract the service uses to reach the remote API.
//! - Validate remote payloads into strict records before they reach the store.
//!
//! # Invariants
//! - Implementations never panic on malformed remote input.
//! - A record without an id is returned as `id: None`, never invented here.

pub mod http;
pub mod wire;

use crate::model::post::{NewPost, Post, PostId, PostRecord};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure talking to the remote API.
#[derive(Debug)]
pub enum ApiError {
    /// Connection, timeout or body transfer failure.
    Transport(reqwest::Error),
    /// Response arrived with a status the operation does not accept.
    Status { status: u16, reason: String },
    /// Body could not be decoded or failed boundary validation.
    InvalidPayload(String),
}

impl ApiError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::InvalidPayload(_) => "invalid_payload",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status { status, reason } => write!(f, "{status}: {reason}"),
            Self::InvalidPayload(message) => write!(f, "invalid response payload: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status { .. } => None,
            Self::InvalidPayload(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidPayload(value.to_string())
    }
}

/// Remote collection of posts.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// Reads the whole remote collection.
    async fn list_posts(&self) -> ApiResult<Vec<PostRecord>>;
    /// Sends a new post; returns the accepted record.
    async fn create_post(&self, draft: &NewPost) -> ApiResult<PostRecord>;
    /// Sends a full replacement keyed by `post.id`.
    async fn update_post(&self, post: &Post) -> ApiResult<PostRecord>;
    /// Deletes by id; succeeds only on an HTTP 200 equivalent.
    async fn delete_post(&self, id: PostId) -> ApiResult<()>;
}
