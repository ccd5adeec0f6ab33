use crate::models::PostModel;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;

pub type FeedSender = mpsc::UnboundedSender<String>;

/// Change-feed payload for a row inserted into `posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInsertEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub table: String,
    pub record: PostModel,
}

impl PostInsertEvent {
    pub fn new(record: PostModel) -> Self {
        Self {
            kind: "INSERT".to_string(),
            table: "posts".to_string(),
            record,
        }
    }
}

/// Fans post-insert events out to every open realtime connection.
#[derive(Clone)]
pub struct PostFeedHub {
    connections: Arc<DashMap<u64, FeedSender>>,
    next_conn_id: Arc<AtomicU64>,
}

impl Default for PostFeedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PostFeedHub {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            next_conn_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(conn_id, tx);
        (conn_id, rx)
    }

    pub fn unsubscribe(&self, conn_id: u64) {
        self.connections.remove(&conn_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.connections.len()
    }

    pub fn publish_insert(&self, record: &PostModel) {
        let payload = match serde_json::to_string(&PostInsertEvent::new(record.clone())) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode post insert event: {}", e);
                return;
            }
        };

        // Closed receivers are pruned while sending
        self.connections
            .retain(|_, sender| sender.send(payload.clone()).is_ok());
        tracing::debug!(
            post_id = record.id,
            subscribers = self.connections.len(),
            "Published post insert"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_post(id: i32) -> PostModel {
        PostModel {
            id,
            created_at: Utc::now(),
            content: "有人捡到一把蓝色雨伞吗".to_string(),
            user_id: Uuid::new_v4(),
            category: "失物招领".to_string(),
        }
    }

    #[tokio::test]
    async fn every_subscriber_receives_insert() {
        let hub = PostFeedHub::new();
        let (_, mut first) = hub.subscribe();
        let (_, mut second) = hub.subscribe();

        hub.publish_insert(&sample_post(3));

        for rx in [&mut first, &mut second] {
            let payload = rx.recv().await.unwrap();
            let event: PostInsertEvent = serde_json::from_str(&payload).unwrap();
            assert_eq!(event.kind, "INSERT");
            assert_eq!(event.table, "posts");
            assert_eq!(event.record.id, 3);
        }
    }

    #[tokio::test]
    async fn closed_receivers_are_pruned() {
        let hub = PostFeedHub::new();
        let (_, rx) = hub.subscribe();
        let (_, _live) = hub.subscribe();
        drop(rx);

        hub.publish_insert(&sample_post(1));
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn unsubscribe_removes_connection() {
        let hub = PostFeedHub::new();
        let (conn_id, _rx) = hub.subscribe();
        hub.unsubscribe(conn_id);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
