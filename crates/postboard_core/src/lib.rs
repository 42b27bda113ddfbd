//! Core client logic for the post board.
//! This crate owns the post store and every rule that mutates it.

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod view;

pub use api::http::HttpPostsApi;
pub use api::{ApiError, ApiResult, PostsApi};
pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::Author;
pub use model::post::{
    NewPost, Post, PostId, PostRecord, PostValidationError, ReactionKind, Reactions, UserId,
};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::post_service::{PostService, ServiceError, ServiceResult};
pub use store::handle::PostStore;
pub use store::selectors::{
    select_all_posts, select_error, select_post_by_id, select_post_ids, select_posts_by_user,
    select_status, PostSelectors,
};
pub use store::state::{FetchStatus, PostsAction, PostsState, StoreWarning, WarningKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
