use comunidade_lib::application::ports::identity::{CurrentUser, IdentityProvider};
use comunidade_lib::application::ports::repositories::{
    CommentRepository, LikeRepository, PostRepository, ProfileRepository,
};
use comunidade_lib::application::services::{
    CommentThreadLoader, FeedPhase, FeedService, LiveFeed, NewPost,
};
use comunidade_lib::domain::entities::{Profile, Role};
use comunidade_lib::infrastructure::database::{ConnectionPool, Repository, SqliteRepository};
use comunidade_lib::infrastructure::identity::SessionIdentity;
use comunidade_lib::infrastructure::realtime::ChangeHub;
use comunidade_lib::shared::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

struct Stack {
    service: Arc<FeedService>,
    loader: CommentThreadLoader,
    identity: Arc<SessionIdentity>,
    hub: Arc<ChangeHub>,
}

async fn build_stack() -> Stack {
    let pool = ConnectionPool::in_memory().await.expect("pool");
    let hub = Arc::new(ChangeHub::default());
    let repository = Arc::new(SqliteRepository::new(pool, Arc::clone(&hub)));
    repository.initialize().await.expect("migrations");
    assert!(repository.health_check().await.expect("health check"));

    repository
        .upsert_profile(&Profile::new(
            "user-maria".into(),
            "maria@example.org".into(),
            "Maria".into(),
        ))
        .await
        .expect("seed member");
    repository
        .upsert_profile(
            &Profile::new(
                "user-pastor".into(),
                "pastor@example.org".into(),
                "Pastor João".into(),
            )
            .with_role(Role::Admin),
        )
        .await
        .expect("seed admin");

    let identity = Arc::new(SessionIdentity::new());
    let service = Arc::new(FeedService::new(
        Arc::clone(&repository) as Arc<dyn PostRepository>,
        Arc::clone(&repository) as Arc<dyn CommentRepository>,
        Arc::clone(&repository) as Arc<dyn LikeRepository>,
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
    ));
    let loader = CommentThreadLoader::new(
        Arc::clone(&repository) as Arc<dyn PostRepository>,
        repository as Arc<dyn CommentRepository>,
    );

    Stack {
        service,
        loader,
        identity,
        hub,
    }
}

async fn wait_until<F>(feed: &LiveFeed, mut pred: F)
where
    F: FnMut(&comunidade_lib::application::services::FeedSnapshot) -> bool,
{
    let mut rx = feed.updates();
    timeout(Duration::from_secs(5), async {
        loop {
            rx.borrow_and_update();
            let snapshot = feed.snapshot().await;
            if pred(&snapshot) {
                return;
            }
            rx.changed().await.expect("live feed closed");
        }
    })
    .await
    .expect("timed out waiting for feed state");
}

#[tokio::test]
async fn community_feed_end_to_end() {
    let stack = build_stack().await;

    let member_feed = LiveFeed::start(Arc::clone(&stack.service), &stack.hub, true);
    let admin_feed = LiveFeed::start(Arc::clone(&stack.service), &stack.hub, false);
    wait_until(&member_feed, |s| s.phase == FeedPhase::Loaded).await;
    wait_until(&admin_feed, |s| s.phase == FeedPhase::Loaded).await;

    // Maria posts and interacts
    stack
        .identity
        .sign_in(CurrentUser::member("user-maria"))
        .await;
    let post = stack
        .service
        .create_post(NewPost {
            title: "Mutirão de sábado".into(),
            content: "Vamos pintar o salão. Quem vem?".into(),
            category: Some("geral".into()),
            media_urls: Vec::new(),
        })
        .await
        .expect("create post");

    assert!(stack.service.toggle_like(&post.post.id).await.expect("like"));
    stack
        .service
        .add_comment(&post.post.id, "Conte comigo!")
        .await
        .expect("comment");

    wait_until(&member_feed, |s| {
        s.posts.iter().any(|e| {
            e.post.id == post.post.id
                && e.likes_count == 1
                && e.comments_count == 1
                && e.user_liked
        })
    })
    .await;

    // a second member's like raises the counter but not Maria's flag
    stack
        .identity
        .sign_in(CurrentUser::member("user-pastor"))
        .await;
    assert!(stack.service.toggle_like(&post.post.id).await.expect("like"));
    stack
        .identity
        .sign_in(CurrentUser::member("user-maria"))
        .await;
    wait_until(&member_feed, |s| {
        s.posts
            .iter()
            .any(|e| e.post.id == post.post.id && e.likes_count == 2 && e.user_liked)
    })
    .await;

    // the expanded thread shows the comment with author metadata
    let thread = stack.loader.load(&post.post.id).await.expect("thread");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].content, "Conte comigo!");
    assert_eq!(thread[0].author.display_name.as_deref(), Some("Maria"));

    // moderation: hide, check both views, then unhide
    stack
        .identity
        .sign_in(CurrentUser::admin("user-pastor"))
        .await;
    stack
        .service
        .set_visibility(&post.post.id, false)
        .await
        .expect("hide");
    wait_until(&member_feed, |s| s.posts.is_empty()).await;
    wait_until(&admin_feed, |s| {
        s.posts
            .iter()
            .any(|e| e.post.id == post.post.id && !e.post.visible)
    })
    .await;

    stack
        .service
        .set_visibility(&post.post.id, true)
        .await
        .expect("unhide");
    wait_until(&member_feed, |s| {
        s.posts.iter().any(|e| e.post.id == post.post.id)
    })
    .await;

    // delete cascades and the thread loader refuses the stale post
    stack
        .service
        .delete_post(&post.post.id)
        .await
        .expect("delete");
    wait_until(&member_feed, |s| s.posts.is_empty()).await;
    wait_until(&admin_feed, |s| s.posts.is_empty()).await;

    let err = stack
        .loader
        .load(&post.post.id)
        .await
        .expect_err("thread must be gone");
    assert!(matches!(err, AppError::NotFound(_)));

    member_feed.shutdown();
    admin_feed.shutdown();
}
