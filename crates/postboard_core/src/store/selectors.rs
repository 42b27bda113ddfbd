//! Derived read-only views over the post store.
//!
//! # Responsibility
//! - Order posts newest first for list views.
//! - Filter by author and look up single posts.
//!
//! # Invariants
//! - Selectors never mutate state.
//! - Ties on `date` keep collection insertion order.
//! - `PostSelectors` recomputes whenever the collection version changes.

use crate::model::post::{to_millis, Post, PostId, UserId};
use crate::store::state::{FetchStatus, PostsState};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Date at wire precision; posts with the same ISO date compare equal.
fn sort_key(post: &Post) -> DateTime<Utc> {
    to_millis(post.date)
}

/// All posts, newest first.
pub fn select_all_posts(state: &PostsState) -> Vec<&Post> {
    let mut posts: Vec<&Post> = state.iter().collect();
    // Stable sort keeps insertion order for equal dates.
    posts.sort_by_key(|post| Reverse(sort_key(post)));
    posts
}

pub fn select_post_by_id<'s>(state: &'s PostsState, id: &PostId) -> Option<&'s Post> {
    state.get(id)
}

/// Ids in the same order as [`select_all_posts`].
pub fn select_post_ids(state: &PostsState) -> Vec<PostId> {
    select_all_posts(state)
        .into_iter()
        .map(|post| post.id)
        .collect()
}

/// Posts written by `user_id`, newest first.
pub fn select_posts_by_user(state: &PostsState, user_id: UserId) -> Vec<&Post> {
    select_all_posts(state)
        .into_iter()
        .filter(|post| post.user_id == user_id)
        .collect()
}

pub fn select_status(state: &PostsState) -> FetchStatus {
    state.status()
}

pub fn select_error(state: &PostsState) -> Option<&str> {
    state.error()
}

/// Memoized ordering for the "all posts" view.
///
/// Bound to one store: the cache key is that store's collection version.
#[derive(Debug, Default)]
pub struct PostSelectors {
    sorted: Option<(u64, Vec<PostId>)>,
}

impl PostSelectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered ids, recomputed only when `state.version()` moved.
    pub fn post_ids(&mut self, state: &PostsState) -> &[PostId] {
        let version = state.version();
        let stale = !matches!(&self.sorted, Some((cached, _)) if *cached == version);
        if stale {
            self.sorted = Some((version, select_post_ids(state)));
        }
        match &self.sorted {
            Some((_, ids)) => ids,
            None => &[],
        }
    }

    pub fn all_posts<'s>(&mut self, state: &'s PostsState) -> Vec<&'s Post> {
        self.post_ids(state)
            .iter()
            .filter_map(|id| state.get(id))
            .collect()
    }

    pub fn posts_by_user<'s>(&mut self, state: &'s PostsState, user_id: UserId) -> Vec<&'s Post> {
        self.all_posts(state)
            .into_iter()
            .filter(|post| post.user_id == user_id)
            .collect()
    }

    /// Whether the next read would reuse the cached ordering.
    pub fn is_cached_for(&self, state: &PostsState) -> bool {
        matches!(&self.sorted, Some((cached, _)) if *cached == state.version())
    }
}
