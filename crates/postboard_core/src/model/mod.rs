//! Domain model for the post board.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and services.
//! - Keep remote payload leniency out of the strict record types.
//!
//! # Invariants
//! - Every post is identified by a stable `PostId`.
//! - Reaction counters never decrease through store transitions.

pub mod author;
pub mod post;
