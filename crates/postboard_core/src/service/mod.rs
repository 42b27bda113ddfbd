//! Use-case services.
//!
//! # Responsibility
//! - Run remote operations and dispatch their lifecycle actions.
//! - Keep callers decoupled from HTTP and reducer details.

pub mod clock;
pub mod post_service;
