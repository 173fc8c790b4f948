use crate::application::services::feed_service::FeedService;
use crate::domain::entities::EnrichedPost;
use crate::infrastructure::realtime::{ChangeEvent, ChangeHub, ChangeKind, Collection};
use crate::shared::error::AppError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Point-in-time copy of the feed view state. On `Error` the entries are the
/// last good result; a failed fetch never overwrites what the reader already
/// sees.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub posts: Vec<EnrichedPost>,
    pub last_error: Option<String>,
    pub revision: u64,
}

/// Monotonic tickets for in-flight fetches. A completion may only be applied
/// when its ticket is above the highest committed one, so a slow fetch that
/// resolves after a newer one is discarded instead of clobbering fresher data.
#[derive(Debug, Default)]
struct FetchSequencer {
    next: AtomicU64,
    applied: AtomicU64,
}

impl FetchSequencer {
    fn begin(&self) -> u64 {
        self.next.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        ticket > self.applied.load(Ordering::Acquire)
    }

    fn try_commit(&self, ticket: u64) -> bool {
        let mut current = self.applied.load(Ordering::Acquire);
        loop {
            if ticket <= current {
                return false;
            }
            match self.applied.compare_exchange(
                current,
                ticket,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

struct FeedState {
    phase: FeedPhase,
    entries: Vec<EnrichedPost>,
    last_error: Option<String>,
}

struct LiveFeedInner {
    service: Arc<FeedService>,
    visible_only: bool,
    state: RwLock<FeedState>,
    seq: FetchSequencer,
    revision: watch::Sender<u64>,
}

impl LiveFeedInner {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn sort_entries(entries: &mut [EnrichedPost]) {
        entries.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then_with(|| b.post.id.cmp(&a.post.id))
        });
    }

    async fn full_refresh(&self) {
        let ticket = self.seq.begin();

        {
            let mut state = self.state.write().await;
            if self.seq.is_current(ticket) {
                state.phase = FeedPhase::Loading;
            }
        }
        self.bump();

        let result = self.service.list_feed(self.visible_only).await;

        let mut state = self.state.write().await;
        if !self.seq.try_commit(ticket) {
            debug!(ticket, "discarding superseded feed fetch");
            return;
        }
        match result {
            Ok(posts) => {
                state.entries = posts;
                state.phase = FeedPhase::Loaded;
                state.last_error = None;
            }
            Err(err) => {
                warn!(error = %err, "feed refresh failed");
                state.phase = FeedPhase::Error;
                state.last_error = Some(err.to_string());
            }
        }
        drop(state);
        self.bump();
    }

    async fn apply_event(&self, event: ChangeEvent) {
        let Some(post_id) = event.post_id.clone() else {
            // no way to tell which entry changed
            self.full_refresh().await;
            return;
        };

        let outcome = match (event.collection, event.kind) {
            (Collection::Posts, ChangeKind::Delete) => {
                self.remove_entry(&post_id).await;
                Ok(())
            }
            // post inserts/updates and any comment/like change resolve the
            // same way: re-fetch that one enriched post and reconcile
            _ => self.patch_entry(&post_id).await,
        };

        if let Err(err) = outcome {
            warn!(error = %err, post_id = %post_id, "feed patch failed");
            let mut state = self.state.write().await;
            state.phase = FeedPhase::Error;
            state.last_error = Some(err.to_string());
            drop(state);
            self.bump();
        }
    }

    async fn remove_entry(&self, post_id: &str) {
        // removals take a ticket too, so an in-flight refresh that listed the
        // post before its deletion cannot commit afterwards and resurrect it
        let ticket = self.seq.begin();
        let mut state = self.state.write().await;
        if !self.seq.try_commit(ticket) {
            return;
        }
        let before = state.entries.len();
        state.entries.retain(|entry| entry.post.id != post_id);
        let changed = state.entries.len() != before;
        drop(state);
        if changed {
            self.bump();
        }
    }

    async fn patch_entry(&self, post_id: &str) -> Result<(), AppError> {
        let ticket = self.seq.begin();
        let fetched = self.service.enriched_post(post_id).await?;

        let mut state = self.state.write().await;
        if !self.seq.try_commit(ticket) {
            debug!(ticket, post_id, "discarding superseded feed patch");
            return Ok(());
        }

        match fetched {
            Some(enriched) if !self.visible_only || enriched.post.visible => {
                if let Some(slot) = state
                    .entries
                    .iter_mut()
                    .find(|entry| entry.post.id == post_id)
                {
                    *slot = enriched;
                } else {
                    state.entries.push(enriched);
                    Self::sort_entries(&mut state.entries);
                }
            }
            // deleted, or moderated out of this view
            _ => state.entries.retain(|entry| entry.post.id != post_id),
        }
        state.phase = FeedPhase::Loaded;
        state.last_error = None;
        drop(state);
        self.bump();
        Ok(())
    }
}

async fn run(inner: Arc<LiveFeedInner>, mut rx: broadcast::Receiver<ChangeEvent>) {
    inner.full_refresh().await;

    loop {
        match rx.recv().await {
            Ok(event) => inner.apply_event(event).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // ambiguous: events were dropped, so patching is unsound
                warn!(skipped, "change feed lagged; falling back to full refresh");
                inner.full_refresh().await;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// The live update bridge plus feed view state. Subscribes to the change hub
/// for as long as the view is alive; dropping (or `shutdown`) aborts the pump
/// task and releases the subscription.
pub struct LiveFeed {
    inner: Arc<LiveFeedInner>,
    revision_rx: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl LiveFeed {
    /// Starts the bridge. The subscription is taken before the initial load so
    /// changes racing the first fetch are still observed.
    pub fn start(service: Arc<FeedService>, hub: &ChangeHub, visible_only: bool) -> Self {
        let (revision_tx, revision_rx) = watch::channel(0);
        let inner = Arc::new(LiveFeedInner {
            service,
            visible_only,
            state: RwLock::new(FeedState {
                phase: FeedPhase::Idle,
                entries: Vec::new(),
                last_error: None,
            }),
            seq: FetchSequencer::default(),
            revision: revision_tx,
        });

        let rx = hub.subscribe();
        let task = tokio::spawn(run(Arc::clone(&inner), rx));

        Self {
            inner,
            revision_rx,
            task,
        }
    }

    /// Explicit refresh, e.g. pull-to-refresh. Runs through the same
    /// sequencer as event-driven fetches.
    pub async fn refresh(&self) {
        self.inner.full_refresh().await;
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.inner.state.read().await;
        FeedSnapshot {
            phase: state.phase,
            posts: state.entries.clone(),
            last_error: state.last_error.clone(),
            revision: *self.revision_rx.borrow(),
        }
    }

    /// Revision ticks for consumers that want to re-render on change.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.revision_rx.clone()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
