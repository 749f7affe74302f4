use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{ClientError, WorkshopClient};
use crate::api::HealthResponse;
use crate::models::Entity;
use crate::store::Document;

/// Refresh interval for collection views.
pub const COLLECTION_INTERVAL: Duration = Duration::from_secs(2);
/// Refresh interval for the liveness indicator.
pub const HEALTH_INTERVAL: Duration = Duration::from_secs(5);

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send>>;
type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// What a view knows about its data at a given moment.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Latest successful snapshot. Kept when a later fetch fails.
    pub data: Option<T>,
    /// Error of the latest fetch, cleared by the next success.
    pub error: Option<String>,
    /// True until the first fetch finishes.
    pub loading: bool,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: true,
        }
    }
}

/// Keeps a snapshot approximately fresh by fetching it on a fixed timer.
///
/// The first fetch happens immediately. Each successful fetch replaces the
/// snapshot wholesale. Failures are recorded and retried on the next tick,
/// without backoff. Fetches are not de-duplicated: a slow response that lands
/// after a newer one overwrites it.
///
/// The timer stops when the poller is stopped or dropped. Requests already in
/// flight through [`Poller::refetch`] are not cancelled.
pub struct Poller<T> {
    fetch: Fetcher<T>,
    state: Arc<watch::Sender<PollState<T>>>,
    /// Never read, so clones of it report every change since spawn.
    receiver: watch::Receiver<PollState<T>>,
    timer: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> Poller<T> {
    /// Start polling `fetch` every `interval`. Must be called inside a tokio
    /// runtime.
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let fetch: Fetcher<T> = Arc::new(move || Box::pin(fetch()) as FetchFuture<T>);
        let (sender, receiver) = watch::channel(PollState::default());
        let state = Arc::new(sender);

        let timer = {
            let fetch = fetch.clone();
            let state = state.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    fetch_into(&fetch, &state).await;
                }
            })
        };

        Self {
            fetch,
            state,
            receiver,
            timer,
        }
    }

    /// Watch the state. The receiver is notified after every fetch, starting
    /// with the first one even if it already completed.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.receiver.clone()
    }

    pub fn snapshot(&self) -> PollState<T> {
        self.state.borrow().clone()
    }

    /// Fetch now, outside the timer. Used after a mutation so the caller sees
    /// its own change without waiting for the next tick.
    pub async fn refetch(&self) {
        fetch_into(&self.fetch, &self.state).await;
    }

    /// Stop the timer.
    pub fn stop(&self) {
        self.timer.abort();
    }
}

impl<E: Entity> Poller<Document<E>> {
    /// Poll one collection at [`COLLECTION_INTERVAL`].
    pub fn collection(client: WorkshopClient) -> Self {
        Self::collection_every(client, COLLECTION_INTERVAL)
    }

    pub fn collection_every(client: WorkshopClient, interval: Duration) -> Self {
        Self::spawn(interval, move || {
            let client = client.clone();
            async move { client.list::<E>().await }
        })
    }
}

impl Poller<HealthResponse> {
    /// Poll `/health` at [`HEALTH_INTERVAL`].
    pub fn health(client: WorkshopClient) -> Self {
        Self::spawn(HEALTH_INTERVAL, move || {
            let client = client.clone();
            async move { client.health().await }
        })
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

async fn fetch_into<T>(fetch: &Fetcher<T>, state: &watch::Sender<PollState<T>>) {
    match fetch().await {
        Ok(data) => state.send_modify(|s| {
            s.data = Some(data);
            s.error = None;
            s.loading = false;
        }),
        Err(e) => {
            tracing::warn!("Poll failed: {}", e);
            state.send_modify(|s| {
                s.error = Some(e.to_string());
                s.loading = false;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_poller(interval: Duration) -> (Poller<usize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let poller = Poller::spawn(interval, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }
        });
        (poller, calls)
    }

    #[tokio::test]
    async fn fetches_immediately_on_spawn() {
        let (poller, _) = counting_poller(Duration::from_secs(3600));
        let mut rx = poller.subscribe();

        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_again_every_interval() {
        let (poller, calls) = counting_poller(Duration::from_secs(2));
        let mut rx = poller.subscribe();

        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(4100)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(poller.snapshot().data, Some(3));
    }

    #[tokio::test]
    async fn refetch_replaces_snapshot_without_waiting() {
        let (poller, _) = counting_poller(Duration::from_secs(3600));
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        poller.refetch().await;
        assert_eq!(poller.snapshot().data, Some(2));
    }

    #[tokio::test]
    async fn failure_keeps_last_data_and_records_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let poller = Poller::spawn(Duration::from_secs(3600), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok("first")
                } else {
                    Err(ClientError::Server("503: down".to_string()))
                }
            }
        });
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        poller.refetch().await;
        let state = poller.snapshot();
        assert_eq!(state.data, Some("first"));
        assert!(state.error.unwrap().contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_the_timer() {
        let (poller, calls) = counting_poller(Duration::from_secs(2));
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        poller.stop();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
