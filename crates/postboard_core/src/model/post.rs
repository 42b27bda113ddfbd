//! Post domain model.
//!
//! # Responsibility
//! - Define the canonical post record owned by the store.
//! - Provide the reaction tally and its increment rule.
//! - Define draft/record shapes exchanged with the remote API.
//!
//! # Invariants
//! - `PostId::Remote` ids always order before `PostId::Local` ids.
//! - `date` serializes as ISO-8601 with millisecond precision and `Z`, so
//!   lexical order of the wire form equals chronological order.
//! - `Reactions::increment` adds exactly one and never wraps.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Numeric author identifier used by the remote API.
pub type UserId = u64;

/// Stable post identifier.
///
/// Remote records carry numeric ids; the local add action generates a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum PostId {
    Remote(u64),
    Local(Uuid),
}

impl PostId {
    /// Generates a fresh client-side id.
    pub fn new_local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Returns the numeric value for server-assigned ids.
    pub fn as_remote(&self) -> Option<u64> {
        match self {
            Self::Remote(value) => Some(*value),
            Self::Local(_) => None,
        }
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(value) => write!(f, "{value}"),
            Self::Local(uuid) => write!(f, "{uuid}"),
        }
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self::Remote(value)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawPostId::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPostId {
    Number(u64),
    Text(String),
}

impl TryFrom<RawPostId> for PostId {
    type Error = String;

    fn try_from(value: RawPostId) -> Result<Self, Self::Error> {
        match value {
            RawPostId::Number(number) => Ok(Self::Remote(number)),
            RawPostId::Text(text) => {
                let trimmed = text.trim();
                if let Ok(number) = trimmed.parse::<u64>() {
                    return Ok(Self::Remote(number));
                }
                Uuid::parse_str(trimmed)
                    .map(Self::Local)
                    .map_err(|_| format!("invalid post id `{text}`"))
            }
        }
    }
}

/// Fixed set of reactions a reader can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    ThumbsUp,
    Wow,
    Heart,
    Rocket,
    Coffee,
}

impl ReactionKind {
    /// All kinds in display order.
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::ThumbsUp,
        ReactionKind::Wow,
        ReactionKind::Heart,
        ReactionKind::Rocket,
        ReactionKind::Coffee,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Wow => "😮",
            Self::Heart => "❤️",
            Self::Rocket => "🚀",
            Self::Coffee => "☕",
        }
    }
}

/// Per-post reaction tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub thumbs_up: u32,
    pub wow: u32,
    pub heart: u32,
    pub rocket: u32,
    pub coffee: u32,
}

impl Reactions {
    pub fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::ThumbsUp => self.thumbs_up,
            ReactionKind::Wow => self.wow,
            ReactionKind::Heart => self.heart,
            ReactionKind::Rocket => self.rocket,
            ReactionKind::Coffee => self.coffee,
        }
    }

    /// Adds exactly one to the counter for `kind`.
    pub fn increment(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::ThumbsUp => &mut self.thumbs_up,
            ReactionKind::Wow => &mut self.wow,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Rocket => &mut self.rocket,
            ReactionKind::Coffee => &mut self.coffee,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        ReactionKind::ALL
            .iter()
            .map(|kind| u64::from(self.get(*kind)))
            .sum()
    }
}

/// Canonical post record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    /// Sort key for list views, newest first.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    pub reactions: Reactions,
}

impl Post {
    /// Builds a locally-added post with a generated id and zeroed reactions.
    pub fn local(
        title: impl Into<String>,
        body: impl Into<String>,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::new_local(),
            title: title.into(),
            body: body.into(),
            user_id,
            date: to_millis(now),
            reactions: Reactions::default(),
        }
    }

    /// Returns the `date` in its ISO-8601 wire form.
    pub fn date_iso(&self) -> String {
        iso_millis::format(&self.date)
    }

    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.title.trim().is_empty() {
            return Err(PostValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Draft sent to the remote API when creating a post.
///
/// The author id is kept as entered and coerced to numeric form on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: String,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id: user_id.into(),
        }
    }

    /// Checks that the draft can become a valid post once accepted.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.title.trim().is_empty() {
            return Err(PostValidationError::BlankTitle);
        }
        parse_user_id(&self.user_id)?;
        Ok(())
    }
}

/// Post fields returned by the remote API, already validated.
///
/// The remote API never stores `date`; `id` may be missing on malformed
/// responses and `reactions` only when echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: Option<PostId>,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
    pub reactions: Option<Reactions>,
}

impl PostRecord {
    /// Turns the record into a stored post.
    pub fn into_post(self, id: PostId, date: DateTime<Utc>, reactions: Reactions) -> Post {
        Post {
            id,
            title: self.title,
            body: self.body,
            user_id: self.user_id,
            date: to_millis(date),
            reactions,
        }
    }
}

impl From<&Post> for PostRecord {
    fn from(post: &Post) -> Self {
        Self {
            id: Some(post.id),
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
            reactions: Some(post.reactions),
        }
    }
}

/// Drops sub-millisecond precision so stored dates match their wire form.
pub fn to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Parses a user-entered author id into numeric form.
pub fn parse_user_id(value: &str) -> Result<UserId, PostValidationError> {
    value
        .trim()
        .parse::<UserId>()
        .map_err(|_| PostValidationError::InvalidAuthor(value.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    BlankTitle,
    InvalidAuthor(String),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "post title cannot be blank"),
            Self::InvalidAuthor(value) => {
                write!(f, "author id `{value}` is not a non-negative integer")
            }
        }
    }
}

impl Error for PostValidationError {}

/// ISO-8601 timestamps with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
