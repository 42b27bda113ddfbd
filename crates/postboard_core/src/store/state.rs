//! Post store state and its reducer.
//!
//! # Responsibility
//! - Own the canonical in-memory copy of every post.
//! - Map each operation + lifecycle phase to one state transition.
//!
//! # Invariants
//! - `ids` and `entities` always hold the same key set; `ids` keeps
//!   insertion order.
//! - `version` changes whenever the collection changes.
//! - Malformed update/delete payloads never mutate the collection.

use crate::model::post::{Post, PostId, PostRecord, ReactionKind, Reactions};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Maximum number of discarded-payload warnings kept in state.
pub const MAX_WARNINGS: usize = 32;

/// Coarse lifecycle of the last bulk read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl Display for FetchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which transition discarded a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    FetchRecordWithoutId,
    UpdateWithoutId,
    DeleteWithoutId,
    IdSpaceExhausted,
}

/// Recorded when a payload is dropped instead of applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreWarning {
    pub kind: WarningKind,
    pub message: String,
}

/// One state transition, keyed by operation and lifecycle phase.
#[derive(Debug, Clone, PartialEq)]
pub enum PostsAction {
    FetchPending,
    FetchFulfilled {
        posts: Vec<PostRecord>,
        at: DateTime<Utc>,
    },
    FetchRejected {
        error: String,
    },
    CreateFulfilled {
        post: PostRecord,
        at: DateTime<Utc>,
    },
    UpdateFulfilled {
        post: PostRecord,
        at: DateTime<Utc>,
    },
    DeleteFulfilled {
        id: Option<PostId>,
    },
    PostAdded(Post),
    ReactionAdded {
        post_id: PostId,
        reaction: ReactionKind,
    },
}

/// Normalized post collection plus fetch lifecycle bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsState {
    ids: Vec<PostId>,
    entities: HashMap<PostId, Post>,
    status: FetchStatus,
    error: Option<String>,
    warnings: Vec<StoreWarning>,
    version: u64,
}

impl PostsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[PostId] {
        &self.ids
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warnings(&self) -> &[StoreWarning] {
        &self.warnings
    }

    /// Collection version; bumped on every collection mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Posts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Next server-style id: one past the largest numeric id, or 1.
    ///
    /// `None` once the numeric id space is used up.
    pub fn next_remote_id(&self) -> Option<PostId> {
        match self.ids.iter().filter_map(PostId::as_remote).max() {
            Some(max) => max.checked_add(1).map(PostId::Remote),
            None => Some(PostId::Remote(1)),
        }
    }

    /// Applies one transition.
    pub fn reduce(&mut self, action: PostsAction) {
        match action {
            PostsAction::FetchPending => {
                self.status = FetchStatus::Loading;
                debug!("event=posts_fetch module=store status=loading");
            }
            PostsAction::FetchFulfilled { posts, at } => {
                self.status = FetchStatus::Succeeded;
                self.error = None;
                let received = posts.len();
                let mut merged = 0usize;
                for (index, record) in posts.into_iter().enumerate() {
                    let Some(id) = record.id else {
                        self.push_warning(
                            WarningKind::FetchRecordWithoutId,
                            format!("fetched record `{}` has no id", record.title),
                        );
                        continue;
                    };
                    let date = synthesized_fetch_date(at, index);
                    self.upsert(record.into_post(id, date, Reactions::default()));
                    merged += 1;
                }
                debug!(
                    "event=posts_fetch module=store status=succeeded received={received} merged={merged} total={}",
                    self.ids.len()
                );
            }
            PostsAction::FetchRejected { error } => {
                self.status = FetchStatus::Failed;
                debug!("event=posts_fetch module=store status=failed error={error}");
                self.error = Some(error);
            }
            PostsAction::CreateFulfilled { post, at } => {
                let Some(id) = self.next_remote_id() else {
                    self.push_warning(
                        WarningKind::IdSpaceExhausted,
                        format!("create could not complete: no id left for `{}`", post.title),
                    );
                    return;
                };
                self.upsert(post.into_post(id, at, Reactions::default()));
                debug!("event=post_create module=store status=ok id={id}");
            }
            PostsAction::UpdateFulfilled { post: record, at } => {
                let Some(id) = record.id else {
                    self.push_warning(
                        WarningKind::UpdateWithoutId,
                        format!("update could not complete: payload `{}` has no id", record.title),
                    );
                    return;
                };
                let reactions = record
                    .reactions
                    .or_else(|| self.entities.get(&id).map(|post| post.reactions))
                    .unwrap_or_default();
                self.upsert(record.into_post(id, at, reactions));
                debug!("event=post_update module=store status=ok id={id}");
            }
            PostsAction::DeleteFulfilled { id } => {
                let Some(id) = id else {
                    self.push_warning(
                        WarningKind::DeleteWithoutId,
                        "delete could not complete: payload has no id".to_string(),
                    );
                    return;
                };
                let removed = self.remove(&id);
                debug!("event=post_delete module=store status=ok id={id} removed={removed}");
            }
            PostsAction::PostAdded(post) => {
                if self.entities.contains_key(&post.id) {
                    debug!("event=post_add module=store status=skipped id={}", post.id);
                    return;
                }
                self.upsert(post);
            }
            PostsAction::ReactionAdded { post_id, reaction } => {
                if let Some(post) = self.entities.get_mut(&post_id) {
                    post.reactions.increment(reaction);
                    self.version += 1;
                }
            }
        }
    }

    fn upsert(&mut self, post: Post) {
        if !self.entities.contains_key(&post.id) {
            self.ids.push(post.id);
        }
        self.entities.insert(post.id, post);
        self.version += 1;
    }

    fn remove(&mut self, id: &PostId) -> bool {
        if self.entities.remove(id).is_none() {
            return false;
        }
        self.ids.retain(|existing| existing != id);
        self.version += 1;
        true
    }

    fn push_warning(&mut self, kind: WarningKind, message: String) {
        warn!("event=store_warning module=store status=discarded kind={kind:?} message={message}");
        if self.warnings.len() == MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(StoreWarning { kind, message });
    }
}

/// Free-function form of [`PostsState::reduce`].
pub fn reduce(state: &mut PostsState, action: PostsAction) {
    state.reduce(action);
}

/// The remote API has no dates; spread fetched records into the recent past,
/// starting two minutes before `at`.
fn synthesized_fetch_date(at: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    let minutes = i64::try_from(index).map_or(i64::from(u32::MAX), |value| value + 2);
    at - Duration::minutes(minutes)
}
