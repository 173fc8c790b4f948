use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use comunidade_lib::application::ports::identity::{CurrentUser, IdentityProvider};
use comunidade_lib::application::ports::repositories::{
    CommentRepository, LikeRepository, PostRepository, ProfileRepository,
};
use comunidade_lib::application::services::{
    CommentThreadLoader, FeedService, LiveFeed, NewPost,
};
use comunidade_lib::domain::entities::{Profile, Role};
use comunidade_lib::infrastructure::database::{ConnectionPool, Repository, SqliteRepository};
use comunidade_lib::infrastructure::identity::SessionIdentity;
use comunidade_lib::infrastructure::realtime::ChangeHub;
use comunidade_lib::shared::AppConfig;
use tokio::time::sleep;
use tracing::info;

/// Manual end-to-end drive of the community feed: seed an in-memory store,
/// run two live views (member and admin), then walk through the write paths
/// and log what each view sees.
#[tokio::main]
async fn main() -> Result<()> {
    comunidade_lib::init_logging();

    let config = AppConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let pool = ConnectionPool::in_memory().await?;
    let hub = Arc::new(ChangeHub::new(config.realtime.channel_capacity));
    let repository = Arc::new(SqliteRepository::new(pool, Arc::clone(&hub)));
    repository.initialize().await?;
    let healthy = repository.health_check().await?;
    info!(healthy, "store ready");

    repository
        .upsert_profile(&Profile::new(
            "user-maria".into(),
            "maria@example.org".into(),
            "Maria".into(),
        ))
        .await?;
    repository
        .upsert_profile(
            &Profile::new(
                "user-pastor".into(),
                "pastor@example.org".into(),
                "Pastor João".into(),
            )
            .with_role(Role::Admin),
        )
        .await?;

    let identity = Arc::new(SessionIdentity::new());
    let service = Arc::new(FeedService::new(
        Arc::clone(&repository) as Arc<dyn PostRepository>,
        Arc::clone(&repository) as Arc<dyn CommentRepository>,
        Arc::clone(&repository) as Arc<dyn LikeRepository>,
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
    ));
    let loader = CommentThreadLoader::new(
        Arc::clone(&repository) as Arc<dyn PostRepository>,
        Arc::clone(&repository) as Arc<dyn CommentRepository>,
    );

    let member_feed = LiveFeed::start(Arc::clone(&service), &hub, true);
    let admin_feed = LiveFeed::start(Arc::clone(&service), &hub, false);

    identity.sign_in(CurrentUser::member("user-maria")).await;
    let post = service
        .create_post(NewPost {
            title: "Culto de domingo".into(),
            content: "Encontro às 10h, traga um visitante!".into(),
            category: Some("geral".into()),
            media_urls: vec!["https://storage.example/feed/culto.jpg".into()],
        })
        .await?;
    info!(post_id = %post.post.id, "post created");

    service.toggle_like(&post.post.id).await?;
    service.add_comment(&post.post.id, "Estarei lá!").await?;

    sleep(Duration::from_millis(200)).await;
    log_snapshot("member", &member_feed).await;

    let thread = loader.load(&post.post.id).await?;
    info!(comments = thread.len(), "thread loaded");
    for comment in &thread {
        info!(author = comment.author.display_label(), content = %comment.content, "comment");
    }

    identity.sign_in(CurrentUser::admin("user-pastor")).await;
    service.set_visibility(&post.post.id, false).await?;
    sleep(Duration::from_millis(200)).await;
    log_snapshot("member", &member_feed).await;
    log_snapshot("admin", &admin_feed).await;

    service.delete_post(&post.post.id).await?;
    sleep(Duration::from_millis(200)).await;
    log_snapshot("admin", &admin_feed).await;
    match loader.load(&post.post.id).await {
        Err(err) => info!(%err, "thread gone after delete"),
        Ok(_) => info!("unexpected: thread still present"),
    }

    member_feed.shutdown();
    admin_feed.shutdown();
    info!("harness finished");
    Ok(())
}

async fn log_snapshot(label: &str, feed: &LiveFeed) {
    let snapshot = feed.snapshot().await;
    info!(
        view = label,
        phase = ?snapshot.phase,
        posts = snapshot.posts.len(),
        revision = snapshot.revision,
        "feed snapshot"
    );
    for entry in &snapshot.posts {
        info!(
            view = label,
            title = %entry.post.title,
            author = entry.post.author.display_label(),
            likes = entry.likes_count,
            comments = entry.comments_count,
            visible = entry.post.visible,
            "feed entry"
        );
    }
}
