//! Background insight loading for the player currently being viewed.
//!
//! Viewing a player schedules a debounced task keyed by the player's id.
//! Viewing another player aborts the pending task, and a task that still
//! finishes late only publishes if its key is the player currently viewed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::requester::InsightRequester;
use crate::models::Player;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Insight results for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerInsight {
    pub player_id: String,
    pub summary: String,
    pub similar: Vec<Player>,
}

pub struct InsightTask {
    requester: Arc<InsightRequester>,
    debounce: Duration,
    viewed: Arc<watch::Sender<Option<String>>>,
    published: Arc<watch::Sender<Option<PlayerInsight>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl InsightTask {
    pub fn new(requester: Arc<InsightRequester>) -> Self {
        Self {
            requester,
            debounce: DEBOUNCE_DELAY,
            viewed: Arc::new(watch::Sender::new(None)),
            published: Arc::new(watch::Sender::new(None)),
            pending: Mutex::new(None),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Id of the player currently viewed.
    pub fn viewed(&self) -> Option<String> {
        self.viewed.borrow().clone()
    }

    /// Latest published insight.
    pub fn latest(&self) -> Option<PlayerInsight> {
        self.published.borrow().clone()
    }

    /// Receiver notified every time an insight is published.
    pub fn subscribe(&self) -> watch::Receiver<Option<PlayerInsight>> {
        self.published.subscribe()
    }

    /// Starts loading insights for `player`, replacing any pending request.
    pub async fn view(&self, player: Player, candidates: Vec<Player>) {
        let key = player.id.clone();

        // The viewed key and the pending handle change together under this lock
        let mut pending = self.pending.lock().await;
        self.viewed.send_replace(Some(key.clone()));

        let requester = Arc::clone(&self.requester);
        let viewed = Arc::clone(&self.viewed);
        let published = Arc::clone(&self.published);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let (summary, similar) = tokio::join!(
                requester.get_insights(&player),
                requester.get_similar_players(&player, &candidates)
            );

            if viewed.borrow().as_deref() != Some(key.as_str()) {
                tracing::debug!("Discarding stale insights for {}", key);
                return;
            }
            published.send_replace(Some(PlayerInsight {
                player_id: key,
                summary,
                similar,
            }));
        });

        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Stops tracking the viewed player and aborts any pending request.
    pub async fn leave(&self) {
        let mut pending = self.pending.lock().await;
        self.viewed.send_replace(None);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    /// Waits for the pending request, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.pending.lock().await.take();
        if let Some(handle) = handle {
            // Aborted tasks resolve to a cancellation error
            let _ = handle.await;
        }
    }
}

impl Drop for InsightTask {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{InsightError, TextGenerator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers after a per-prompt delay and counts calls.
    struct Echo {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if prompt.starts_with("Analyze") {
                Ok("insight".to_string())
            } else {
                Err(InsightError::Malformed("no names".to_string()))
            }
        }
    }

    fn setup(delay: Duration) -> (InsightTask, Arc<Echo>) {
        let echo = Arc::new(Echo {
            delay,
            calls: AtomicUsize::new(0),
        });
        let requester = InsightRequester::new(echo.clone()).with_current_year(2025);
        (InsightTask::new(Arc::new(requester)), echo)
    }

    fn players() -> Vec<Player> {
        vec![
            Player::new("1", "One", "A", "Forward"),
            Player::new("2", "Two", "A", "Forward"),
            Player::new("3", "Three", "B", "Forward"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_for_viewed_player() {
        let (task, _) = setup(Duration::from_millis(50));
        let catalog = players();

        task.view(catalog[0].clone(), catalog.clone()).await;
        task.settle().await;

        let insight = task.latest().unwrap();
        assert_eq!(insight.player_id, "1");
        assert_eq!(insight.summary, "insight");
        assert_eq!(insight.similar.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_debounce_starts_immediately() {
        let (task, echo) = setup(Duration::ZERO);
        let task = task.with_debounce(Duration::ZERO);
        let catalog = players();

        let start = tokio::time::Instant::now();
        task.view(catalog[1].clone(), catalog.clone()).await;
        task.settle().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
        assert_eq!(task.latest().unwrap().player_id, "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_views_publish_viewed_player() {
        let (task, _) = setup(Duration::from_millis(50));
        let catalog = players();

        tokio::join!(
            task.view(catalog[0].clone(), catalog.clone()),
            task.view(catalog[1].clone(), catalog.clone()),
            task.view(catalog[2].clone(), catalog.clone()),
        );
        task.settle().await;

        let viewed = task.viewed().unwrap();
        assert_eq!(task.latest().unwrap().player_id, viewed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_selection_only_requests_last() {
        let (task, echo) = setup(Duration::from_millis(50));
        let catalog = players();

        task.view(catalog[0].clone(), catalog.clone()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.view(catalog[1].clone(), catalog.clone()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.view(catalog[2].clone(), catalog.clone()).await;
        task.settle().await;

        // Only the last selection outlived its debounce window
        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
        assert_eq!(task.latest().unwrap().player_id, "3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_is_discarded_after_leave() {
        let (task, _) = setup(Duration::from_secs(2));
        let catalog = players();
        let mut updates = task.subscribe();

        task.view(catalog[0].clone(), catalog.clone()).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        task.leave().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(task.viewed().is_none());
        assert!(task.latest().is_none());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_new_insight() {
        let (task, _) = setup(Duration::from_millis(10));
        let catalog = players();
        let mut updates = task.subscribe();

        task.view(catalog[2].clone(), catalog.clone()).await;
        updates.changed().await.unwrap();
        let insight = updates.borrow_and_update().clone().unwrap();
        assert_eq!(insight.player_id, "3");
    }
}
