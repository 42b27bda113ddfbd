use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use postboard_core::api::wire::decode_post;
use postboard_core::{
    ApiError, ApiResult, FetchStatus, FixedClock, NewPost, Post, PostId, PostRecord, PostService,
    PostStore, PostValidationError, PostsAction, PostsApi, PostsState, ReactionKind,
    ServiceError, WarningKind,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the remote posts collection.
#[derive(Default)]
struct FakeApi {
    remote: Mutex<Vec<PostRecord>>,
    fail_status: Mutex<Option<u16>>,
    drop_update_id: AtomicBool,
    delete_status: Mutex<Option<u16>>,
    calls: AtomicUsize,
}

impl FakeApi {
    fn with_remote(records: Vec<PostRecord>) -> Self {
        Self {
            remote: Mutex::new(records),
            ..Self::default()
        }
    }

    fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    fn check(&self) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Status {
                status,
                reason: "Internal Server Error".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostsApi for FakeApi {
    async fn list_posts(&self) -> ApiResult<Vec<PostRecord>> {
        self.check()?;
        Ok(self.remote.lock().unwrap().clone())
    }

    async fn create_post(&self, draft: &NewPost) -> ApiResult<PostRecord> {
        self.check()?;
        let mut body = serde_json::to_value(draft).unwrap();
        body["id"] = serde_json::json!(101);
        decode_post(&serde_json::to_vec(&body).unwrap())
    }

    async fn update_post(&self, post: &Post) -> ApiResult<PostRecord> {
        self.check()?;
        let mut body = serde_json::to_value(post).unwrap();
        if self.drop_update_id.load(Ordering::SeqCst) {
            body.as_object_mut().unwrap().remove("id");
        }
        decode_post(&serde_json::to_vec(&body).unwrap())
    }

    async fn delete_post(&self, _id: PostId) -> ApiResult<()> {
        self.check()?;
        match *self.delete_status.lock().unwrap() {
            Some(status) => Err(ApiError::Status {
                status,
                reason: "No Content".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn remote(id: u64, title: &str) -> PostRecord {
    PostRecord {
        id: Some(PostId::Remote(id)),
        title: title.to_string(),
        body: "body".to_string(),
        user_id: 1,
        reactions: None,
    }
}

fn service(api: FakeApi) -> PostService<FakeApi> {
    PostService::with_clock(api, PostStore::new(), Arc::new(FixedClock(now())))
}

#[tokio::test]
async fn fetch_posts_merges_remote_collection() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a"), remote(2, "b")]));

    let received = service.fetch_posts().await.unwrap();
    assert_eq!(received, 2);

    let (status, titles) = service.store().read(|state| {
        let titles: Vec<String> = postboard_core::select_all_posts(state)
            .into_iter()
            .map(|post| post.title.clone())
            .collect();
        (state.status(), titles)
    });
    assert_eq!(status, FetchStatus::Succeeded);
    assert_eq!(titles, vec!["a", "b"]);
}

#[tokio::test]
async fn fetch_posts_failure_is_recorded_in_store() {
    let api = FakeApi::default();
    api.fail_with(500);
    let service = service(api);

    let err = service.fetch_posts().await.unwrap_err();
    assert!(matches!(err, ServiceError::Api(ApiError::Status { status: 500, .. })));

    let snapshot = service.store().snapshot();
    assert_eq!(snapshot.status(), FetchStatus::Failed);
    assert_eq!(snapshot.error(), Some("500: Internal Server Error"));
}

#[tokio::test]
async fn add_new_post_assigns_next_id_and_coerces_author() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a"), remote(2, "b")]));
    service.fetch_posts().await.unwrap();

    let created = service
        .add_new_post(NewPost::new("T", "B", "1"))
        .await
        .unwrap();

    assert_eq!(created.id, PostId::Remote(3));
    assert_eq!(created.user_id, 1);
    assert_eq!(created.date, now());
    for kind in ReactionKind::ALL {
        assert_eq!(created.reactions.get(kind), 0);
    }
    assert_eq!(service.store().read(|state| state.len()), 3);
}

#[tokio::test]
async fn add_new_post_failure_leaves_store_untouched() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a")]));
    service.fetch_posts().await.unwrap();
    let before = service.store().snapshot();

    service.api().fail_with(503);
    let err = service
        .add_new_post(NewPost::new("T", "B", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Api(_)));
    assert_eq!(service.store().snapshot(), before);
}

#[tokio::test]
async fn add_new_post_rejects_bad_input_before_sending() {
    let service = service(FakeApi::default());

    let err = service
        .add_new_post(NewPost::new("T", "B", "someone"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(PostValidationError::InvalidAuthor(_))
    ));

    let err = service
        .add_new_post(NewPost::new("   ", "B", "1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(PostValidationError::BlankTitle)
    ));
    assert_eq!(service.api().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn update_post_restamps_and_keeps_reactions() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a")]));
    service.fetch_posts().await.unwrap();
    service.add_reaction(PostId::Remote(1), ReactionKind::ThumbsUp);

    let mut post = service
        .store()
        .read(|state| state.get(&PostId::Remote(1)).cloned())
        .unwrap();
    post.title = "edited".to_string();

    let updated = service.update_post(&post).await.unwrap().unwrap();
    assert_eq!(updated.title, "edited");
    assert_eq!(updated.date, now());
    assert_eq!(updated.reactions.thumbs_up, 1);
}

#[tokio::test]
async fn update_post_without_id_in_response_is_discarded() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a")]));
    service.fetch_posts().await.unwrap();
    let before = service.store().snapshot();

    service.api().drop_update_id.store(true, Ordering::SeqCst);
    let mut post = before.get(&PostId::Remote(1)).cloned().unwrap();
    post.title = "edited".to_string();

    let outcome = service.update_post(&post).await.unwrap();
    assert_eq!(outcome, None);

    let after = service.store().snapshot();
    assert_eq!(after.get(&PostId::Remote(1)), before.get(&PostId::Remote(1)));
    assert_eq!(after.warnings().len(), 1);
    assert_eq!(after.warnings()[0].kind, WarningKind::UpdateWithoutId);
}

#[tokio::test]
async fn update_post_failure_returns_error() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a")]));
    service.fetch_posts().await.unwrap();
    let before = service.store().snapshot();

    service.api().fail_with(500);
    let post = before.get(&PostId::Remote(1)).cloned().unwrap();
    assert!(service.update_post(&post).await.is_err());
    assert_eq!(service.store().snapshot(), before);
}

#[tokio::test]
async fn delete_post_removes_once_and_requires_ok_status() {
    let service = service(FakeApi::with_remote(vec![remote(1, "a"), remote(2, "b")]));
    service.fetch_posts().await.unwrap();
    let post = service
        .store()
        .read(|state| state.get(&PostId::Remote(1)).cloned())
        .unwrap();

    service.delete_post(&post).await.unwrap();
    let after_first = service.store().snapshot();
    assert!(after_first.get(&PostId::Remote(1)).is_none());

    service.delete_post(&post).await.unwrap();
    assert_eq!(service.store().snapshot(), after_first);

    *service.api().delete_status.lock().unwrap() = Some(204);
    let other = after_first.get(&PostId::Remote(2)).cloned().unwrap();
    let err = service.delete_post(&other).await.unwrap_err();
    assert_eq!(err.to_string(), "204: No Content");
    assert!(service
        .store()
        .read(|state| state.get(&PostId::Remote(2)).is_some()));
}

#[tokio::test]
async fn local_post_and_reactions() {
    let service = service(FakeApi::default());

    let post = service.add_local_post("draft", "text", " 2 ").unwrap();
    assert!(matches!(post.id, PostId::Local(_)));
    assert_eq!(post.user_id, 2);

    service.add_reaction(post.id, ReactionKind::Coffee);
    service.add_reaction(post.id, ReactionKind::Coffee);
    service.add_reaction(PostId::Remote(404), ReactionKind::Coffee);

    let coffee = service
        .store()
        .read(|state| state.get(&post.id).map(|post| post.reactions.coffee));
    assert_eq!(coffee, Some(2));
    assert!(service.add_local_post("x", "y", "nope").is_err());
}

#[tokio::test]
async fn add_new_post_reports_exhausted_id_space_without_overwriting() {
    let mut state = PostsState::new();
    state.reduce(PostsAction::FetchFulfilled {
        posts: vec![remote(u64::MAX, "last")],
        at: now(),
    });
    let service = PostService::with_clock(
        FakeApi::default(),
        PostStore::with_state(state),
        Arc::new(FixedClock(now())),
    );

    let err = service
        .add_new_post(NewPost::new("T", "B", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::IdSpaceExhausted));

    let snapshot = service.store().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get(&PostId::Remote(u64::MAX)).unwrap().title, "last");
    assert_eq!(snapshot.warnings()[0].kind, WarningKind::IdSpaceExhausted);
}
