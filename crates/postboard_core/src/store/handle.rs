//! Shared handle over one post store instance.
//!
//! # Responsibility
//! - Give consumers an explicitly owned, cloneable store handle.
//! - Serialize every mutation through `dispatch`.
//! - Notify subscribers after each transition.
//!
//! # Invariants
//! - Subscribers receive a snapshot taken under the write lock and run after
//!   it is released, so they may `read` the handle.
//! - Subscribers must not call `dispatch` or `subscribe` on the same handle.

use crate::store::state::{PostsAction, PostsState};
use std::sync::{Arc, PoisonError, RwLock};

type Subscriber = Box<dyn Fn(&PostsState) + Send + Sync>;

/// Cloneable handle; clones share the same state.
#[derive(Clone, Default)]
pub struct PostStore {
    state: Arc<RwLock<PostsState>>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing state, e.g. a test fixture.
    pub fn with_state(state: PostsState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::default(),
        }
    }

    /// Applies one action, then notifies subscribers.
    pub fn dispatch(&self, action: PostsAction) {
        self.dispatch_then(action, |_| ());
    }

    /// Applies one action and reads the result under the same write lock,
    /// so no other transition can land in between.
    pub fn dispatch_then<F, R>(&self, action: PostsAction, f: F) -> R
    where
        F: FnOnce(&PostsState) -> R,
    {
        self.dispatch_with(|_| (action, ()), |state, ()| f(state))
    }

    /// Builds the action from the current state, applies it and reads the
    /// result, all under one write lock. `prepare` can hand a key (such as
    /// an id it predicted) through to `finish`.
    pub fn dispatch_with<P, F, K, R>(&self, prepare: P, finish: F) -> R
    where
        P: FnOnce(&PostsState) -> (PostsAction, K),
        F: FnOnce(&PostsState, K) -> R,
    {
        let (result, snapshot) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let (action, key) = prepare(&state);
            state.reduce(action);
            let snapshot = self.has_subscribers().then(|| state.clone());
            (finish(&state, key), snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.notify(&snapshot);
        }
        result
    }

    /// Reads state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PostsState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn snapshot(&self) -> PostsState {
        self.read(PostsState::clone)
    }

    /// Registers a callback run after every dispatched action.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&PostsState) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(callback));
    }

    fn has_subscribers(&self) -> bool {
        !self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn notify(&self, state: &PostsState) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter() {
            subscriber(state);
        }
    }
}
