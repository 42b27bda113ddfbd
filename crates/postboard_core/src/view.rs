//! Display helpers for post list and detail views.
//!
//! # Responsibility
//! - Derive short excerpts, relative timestamps and author labels.
//! - Keep presentation text out of the store.
//!
//! # Invariants
//! - Helpers are pure; `now` is always passed in.

use crate::model::author::Author;
use crate::model::post::{Post, ReactionKind, Reactions, UserId};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const EXCERPT_CHARS: usize = 75;
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// First 75 characters of the whitespace-collapsed body, then `...`.
pub fn excerpt(body: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(body.trim(), " ");
    let mut text = collapsed.chars().take(EXCERPT_CHARS).collect::<String>();
    text.push_str("...");
    text
}

/// Relative age of `date` as seen at `now`.
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    plural(elapsed.num_days(), "day")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Emoji and count for every reaction kind, in fixed order.
pub fn reaction_line(reactions: &Reactions) -> String {
    ReactionKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind.emoji(), reactions.get(*kind)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Known author display names.
#[derive(Debug, Clone, Default)]
pub struct AuthorDirectory {
    names: HashMap<UserId, String>,
}

impl AuthorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: UserId, name: impl Into<String>) {
        self.names.insert(user_id, name.into());
    }

    pub fn name(&self, user_id: UserId) -> &str {
        self.names
            .get(&user_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn author_line(&self, user_id: UserId) -> String {
        format!("by {}", self.name(user_id))
    }
}

impl FromIterator<Author> for AuthorDirectory {
    fn from_iter<T: IntoIterator<Item = Author>>(iter: T) -> Self {
        iter.into_iter()
            .map(|author| (author.id, author.name))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(UserId, S)> for AuthorDirectory {
    fn from_iter<T: IntoIterator<Item = (UserId, S)>>(iter: T) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(id, name)| (id, name.into()))
                .collect(),
        }
    }
}

/// One list entry: title, excerpt, credit line and reactions.
pub fn render_excerpt(post: &Post, authors: &AuthorDirectory, now: DateTime<Utc>) -> String {
    format!(
        "#{} {}\n  {}\n  {} · {}\n  {}",
        post.id,
        post.title,
        excerpt(&post.body),
        authors.author_line(post.user_id),
        time_ago(post.date, now),
        reaction_line(&post.reactions)
    )
}
