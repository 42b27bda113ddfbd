//! Author records from the remote users collection.

use crate::model::post::UserId;
use serde::Deserialize;

/// Post author as listed by the remote API. Other user fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}
