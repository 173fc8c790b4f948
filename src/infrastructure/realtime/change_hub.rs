use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Collections the managed store reports changes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Posts,
    Comments,
    Likes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change notification. `post_id` names the feed entry the change belongs
/// to: the row itself for posts, the parent post for comments and likes.
/// Events without a post reference force subscribers into a full refetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    pub row_id: String,
    pub post_id: Option<String>,
}

impl ChangeEvent {
    pub fn post(kind: ChangeKind, post_id: &str) -> Self {
        Self {
            collection: Collection::Posts,
            kind,
            row_id: post_id.to_string(),
            post_id: Some(post_id.to_string()),
        }
    }

    pub fn comment(kind: ChangeKind, comment_id: &str, post_id: &str) -> Self {
        Self {
            collection: Collection::Comments,
            kind,
            row_id: comment_id.to_string(),
            post_id: Some(post_id.to_string()),
        }
    }

    pub fn like(kind: ChangeKind, like_id: &str, post_id: &str) -> Self {
        Self {
            collection: Collection::Likes,
            kind,
            row_id: like_id.to_string(),
            post_id: Some(post_id.to_string()),
        }
    }
}

/// In-process stand-in for the managed store's change-notification channels.
/// The store adapter publishes after every committed mutation; feed views
/// subscribe for as long as they are active.
pub struct ChangeHub {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Delivery to zero subscribers is not an error; nobody is watching.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let hub = ChangeHub::default();
        let mut rx = hub.subscribe();

        hub.publish(ChangeEvent::post(ChangeKind::Insert, "post-1"));

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.collection, Collection::Posts);
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.post_id.as_deref(), Some("post-1"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let hub = ChangeHub::default();
        hub.publish(ChangeEvent::like(ChangeKind::Delete, "like-1", "post-1"));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_receiver_releases_subscription() {
        let hub = ChangeHub::default();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
