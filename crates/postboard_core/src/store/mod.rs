//! Client-side post store.
//!
//! # Responsibility
//! - Hold the normalized post collection and the fetch lifecycle status.
//! - Apply lifecycle transitions through a single reducer.
//! - Expose read-only derived views over the collection.
//!
//! # Invariants
//! - Post ids are unique within the collection.
//! - State is mutated only by `reduce`, one action at a time.

pub mod handle;
pub mod selectors;
pub mod state;
