//! Post use-case service.
//!
//! # Responsibility
//! - Provide fetch/create/update/delete/react entry points for callers.
//! - Translate each remote outcome into exactly one store transition.
//!
//! # Invariants
//! - Failed create/update/delete calls never mutate the store.
//! - Only `fetch_posts` records its failure in store state.
//! - Overlapping calls apply in completion order.

use crate::api::{ApiError, PostsApi};
use crate::model::post::{parse_user_id, NewPost, Post, PostId, PostValidationError, ReactionKind};
use crate::service::clock::{Clock, SystemClock};
use crate::store::handle::PostStore;
use crate::store::state::PostsAction;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any request was sent.
    Validation(PostValidationError),
    /// Remote call failed.
    Api(ApiError),
    /// Every numeric post id is taken; the created post was not stored.
    IdSpaceExhausted,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Api(err) => write!(f, "{err}"),
            Self::IdSpaceExhausted => write!(f, "no numeric post id left to assign"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Api(err) => Some(err),
            Self::IdSpaceExhausted => None,
        }
    }
}

impl From<PostValidationError> for ServiceError {
    fn from(value: PostValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ApiError> for ServiceError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

/// Async post operations over a remote API and one store.
pub struct PostService<A: PostsApi> {
    api: A,
    store: PostStore,
    clock: Arc<dyn Clock>,
}

impl<A: PostsApi> PostService<A> {
    pub fn new(api: A, store: PostStore) -> Self {
        Self::with_clock(api, store, Arc::new(SystemClock))
    }

    pub fn with_clock(api: A, store: PostStore, clock: Arc<dyn Clock>) -> Self {
        Self { api, store, clock }
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Reads the remote collection and merges it into the store.
    ///
    /// Returns the number of records received. Failures are also recorded
    /// in store state (`failed` + message).
    pub async fn fetch_posts(&self) -> ServiceResult<usize> {
        let started_at = Instant::now();
        self.store.dispatch(PostsAction::FetchPending);

        match self.api.list_posts().await {
            Ok(records) => {
                let received = records.len();
                self.store.dispatch(PostsAction::FetchFulfilled {
                    posts: records,
                    at: self.clock.now(),
                });
                info!(
                    "event=posts_fetch module=service status=ok received={received} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(received)
            }
            Err(err) => {
                warn!(
                    "event=posts_fetch module=service status=error error_code={} duration_ms={} error={err}",
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                self.store.dispatch(PostsAction::FetchRejected {
                    error: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Sends a new post and inserts it with a fresh id on success.
    pub async fn add_new_post(&self, draft: NewPost) -> ServiceResult<Post> {
        draft.validate()?;
        let record = self.api.create_post(&draft).await.map_err(|err| {
            warn!(
                "event=post_create module=service status=error error_code={} error={err}",
                err.code()
            );
            err
        })?;

        // The remote API's assigned id is not stable; the store assigns one.
        let at = self.clock.now();
        let created = self.store.dispatch_with(
            |state| {
                let id = state.next_remote_id();
                (PostsAction::CreateFulfilled { post: record, at }, id)
            },
            |state, id| id.and_then(|id| state.get(&id).cloned()),
        );

        match created {
            Some(post) => {
                info!("event=post_create module=service status=ok id={}", post.id);
                Ok(post)
            }
            None => {
                warn!("event=post_create module=service status=error error_code=id_space_exhausted");
                Err(ServiceError::IdSpaceExhausted)
            }
        }
    }

    /// Sends a full replacement and upserts the returned record.
    ///
    /// Returns `Ok(None)` when the response had no id and was discarded.
    pub async fn update_post(&self, post: &Post) -> ServiceResult<Option<Post>> {
        post.validate()?;
        let record = self.api.update_post(post).await.map_err(|err| {
            warn!(
                "event=post_update module=service status=error id={} error_code={} error={err}",
                post.id,
                err.code()
            );
            err
        })?;

        let id = record.id;
        let updated = self.store.dispatch_then(
            PostsAction::UpdateFulfilled {
                post: record,
                at: self.clock.now(),
            },
            |state| id.and_then(|id| state.get(&id).cloned()),
        );
        if let Some(post) = &updated {
            info!("event=post_update module=service status=ok id={}", post.id);
        }
        Ok(updated)
    }

    /// Deletes remotely, then removes the post from the store.
    pub async fn delete_post(&self, post: &Post) -> ServiceResult<()> {
        self.api.delete_post(post.id).await.map_err(|err| {
            warn!(
                "event=post_delete module=service status=error id={} error_code={} error={err}",
                post.id,
                err.code()
            );
            err
        })?;

        self.store
            .dispatch(PostsAction::DeleteFulfilled { id: Some(post.id) });
        info!("event=post_delete module=service status=ok id={}", post.id);
        Ok(())
    }

    /// Adds a post locally without contacting the remote API.
    pub fn add_local_post(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        user_id: &str,
    ) -> ServiceResult<Post> {
        let user_id = parse_user_id(user_id)?;
        let post = Post::local(title, body, user_id, self.clock.now());
        post.validate()?;
        self.store.dispatch(PostsAction::PostAdded(post.clone()));
        Ok(post)
    }

    /// Increments one reaction counter; no-op for unknown posts.
    pub fn add_reaction(&self, post_id: PostId, reaction: ReactionKind) {
        self.store
            .dispatch(PostsAction::ReactionAdded { post_id, reaction });
    }
}
