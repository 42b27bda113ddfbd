//! Lenient wire shapes for remote post payloads.
//!
//! # Responsibility
//! - Accept the payload variations the remote API actually returns.
//! - Convert them into strict `PostRecord`s or a propagated error.

use crate::api::{ApiError, ApiResult};
use crate::model::author::Author;
use crate::model::post::{parse_user_id, PostId, PostRecord, Reactions, UserId};
use serde::Deserialize;

/// Post as returned by the remote API. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    #[serde(default)]
    pub id: Option<PostId>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub user_id: Option<RemoteUserId>,
    #[serde(default)]
    pub reactions: Option<Reactions>,
}

/// Author id as sent by forms (text) or the server (number).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteUserId {
    Number(UserId),
    Text(String),
}

impl RemoteUserId {
    pub fn to_numeric(&self) -> ApiResult<UserId> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => {
                parse_user_id(text).map_err(|err| ApiError::InvalidPayload(err.to_string()))
            }
        }
    }
}

impl RemotePost {
    pub fn into_record(self) -> ApiResult<PostRecord> {
        let user_id = self
            .user_id
            .as_ref()
            .ok_or_else(|| ApiError::InvalidPayload("missing `userId`".to_string()))?
            .to_numeric()?;
        Ok(PostRecord {
            id: self.id,
            title: self.title,
            body: self.body,
            user_id,
            reactions: self.reactions,
        })
    }
}

/// Decodes a single-post body.
pub fn decode_post(bytes: &[u8]) -> ApiResult<PostRecord> {
    serde_json::from_slice::<RemotePost>(bytes)?.into_record()
}

/// Decodes a list body; one bad element fails the whole list.
pub fn decode_post_list(bytes: &[u8]) -> ApiResult<Vec<PostRecord>> {
    serde_json::from_slice::<Vec<RemotePost>>(bytes)?
        .into_iter()
        .map(RemotePost::into_record)
        .collect()
}

/// Decodes the users collection into author records.
pub fn decode_author_list(bytes: &[u8]) -> ApiResult<Vec<Author>> {
    Ok(serde_json::from_slice(bytes)?)
}
