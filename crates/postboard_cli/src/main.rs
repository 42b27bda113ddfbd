//! Command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and fetch the remote collection.
//! - Resolve author names from the users collection.
//! - Print the newest-first list with author, age and reactions.

use chrono::Utc;
use log::{error, warn};
use postboard_core::view::{render_excerpt, AuthorDirectory};
use postboard_core::{
    core_version, init_logging, ClientConfig, HttpPostsApi, PostSelectors, PostService, PostStore,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let api = match HttpPostsApi::new(&config) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("failed to build http client: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("postboard {} <- {}", core_version(), config.base_url);
    let service = PostService::new(api, PostStore::new());
    if let Err(err) = service.fetch_posts().await {
        error!("event=cli_fetch module=cli status=error error={err}");
        eprintln!("fetch failed: {err}");
        return ExitCode::FAILURE;
    }

    let authors: AuthorDirectory = match service.api().list_authors().await {
        Ok(authors) => authors.into_iter().collect(),
        Err(err) => {
            warn!("event=cli_authors module=cli status=error error={err}");
            eprintln!("author names unavailable: {err}");
            AuthorDirectory::new()
        }
    };
    let now = Utc::now();
    let mut selectors = PostSelectors::new();
    service.store().read(|state| {
        println!("status={} posts={}", state.status(), state.len());
        for post in selectors.all_posts(state) {
            println!("{}", render_excerpt(post, &authors, now));
        }
    });

    ExitCode::SUCCESS
}
