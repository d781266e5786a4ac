//! Search state store
//!
//! Owns the result set shown on the search screen. Each search runs against a
//! [`PodcastSearch`] backend; the outcome is filtered and published through a
//! `watch` channel, so readers always see a whole set, never a partial one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use nai_common::SearchResultSet;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::itunes::PodcastSearch;

/// Single owner of the observable search results.
///
/// Dropping the store (or calling [`SearchStore::shutdown`]) stops searches
/// that are still in flight from publishing.
pub struct SearchStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: Arc<dyn PodcastSearch>,
    results: watch::Sender<SearchResultSet>,
    /// Last sequence number handed out
    issued: AtomicU64,
    /// Sequence number of the outcome currently published (0 = initial empty set)
    published: AtomicU64,
    in_flight: AtomicUsize,
    cancel: CancellationToken,
}

impl SearchStore {
    pub fn new(client: Arc<dyn PodcastSearch>) -> Self {
        let (results, _) = watch::channel(SearchResultSet::empty());
        Self {
            inner: Arc::new(StoreInner {
                client,
                results,
                issued: AtomicU64::new(0),
                published: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Start a search in the background; the outcome arrives through
    /// [`subscribe`](Self::subscribe). Must be called inside a Tokio runtime.
    ///
    /// The returned handle may be dropped; the search keeps running.
    pub fn search(&self, term: impl Into<String>) -> JoinHandle<()> {
        let term = term.into();
        let seq = self.inner.next_seq();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(seq, &term).await })
    }

    /// Run a search to completion and apply its outcome.
    pub async fn run_search(&self, term: &str) {
        let seq = self.inner.next_seq();
        self.inner.run(seq, term).await;
    }

    /// A read-only view that is notified whenever a new set is published.
    pub fn subscribe(&self) -> watch::Receiver<SearchResultSet> {
        self.inner.results.subscribe()
    }

    /// The set currently published.
    pub fn results(&self) -> SearchResultSet {
        self.inner.results.borrow().clone()
    }

    pub fn is_searching(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Stop publishing. Searches still in flight are abandoned.
    pub fn shutdown(&self) {
        if !self.inner.cancel.is_cancelled() {
            debug!("Search store shutting down");
            self.inner.cancel.cancel();
        }
    }
}

impl Drop for SearchStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl StoreInner {
    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run(&self, seq: u64, term: &str) {
        let _in_flight = InFlight::enter(&self.in_flight);

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Search #{} for {:?} abandoned", seq, term);
                return;
            }
            outcome = self.client.search(term) => outcome,
        };

        let set = match outcome {
            Ok(response) => {
                let total = response.results.len();
                let set = SearchResultSet::from_results(response.results);
                info!(
                    "Search #{} for {:?}: {} result(s), {} without a page dropped",
                    seq,
                    term,
                    set.len(),
                    total - set.len()
                );
                set
            }
            Err(e) => {
                warn!("Search #{} for {:?} failed: {}", seq, term, e);
                SearchResultSet::empty()
            }
        };

        self.publish(seq, set);
    }

    /// Publish `set` unless the store is shut down or a later search already
    /// published.
    fn publish(&self, seq: u64, set: SearchResultSet) {
        if self.cancel.is_cancelled() {
            debug!("Search #{} finished after shutdown, not publishing", seq);
            return;
        }
        // The closure runs under the channel's write lock, which serializes
        // the sequence check against concurrent publishers.
        let published = self.results.send_if_modified(|current| {
            if seq <= self.published.load(Ordering::SeqCst) {
                return false;
            }
            self.published.store(seq, Ordering::SeqCst);
            *current = set;
            true
        });
        if !published {
            debug!("Search #{} superseded by a later search", seq);
        }
    }
}

/// Counts a search as in flight for as long as the guard lives.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itunes::{SearchError, SearchResponse};
    use async_trait::async_trait;
    use nai_common::PodcastSummary;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone)]
    enum Outcome {
        Results(Vec<PodcastSummary>),
        Http(u16),
        Malformed,
        Transport,
    }

    /// Backend that answers each term with a scripted outcome after a delay.
    #[derive(Default)]
    struct ScriptedSearch {
        script: HashMap<String, (Duration, Outcome)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSearch {
        fn with(mut self, term: &str, delay_ms: u64, outcome: Outcome) -> Self {
            self.script.insert(
                term.to_string(),
                (Duration::from_millis(delay_ms), outcome),
            );
            self
        }
    }

    #[async_trait]
    impl PodcastSearch for ScriptedSearch {
        async fn search(&self, term: &str) -> Result<SearchResponse, SearchError> {
            self.calls.lock().unwrap().push(term.to_string());
            let (delay, outcome) = self
                .script
                .get(term)
                .cloned()
                .unwrap_or((Duration::ZERO, Outcome::Results(Vec::new())));
            tokio::time::sleep(delay).await;
            match outcome {
                Outcome::Results(results) => Ok(SearchResponse { results }),
                Outcome::Http(status) => Err(SearchError::Http { status }),
                Outcome::Malformed => Err(serde_json::from_str::<serde_json::Value>("{")
                    .unwrap_err()
                    .into()),
                Outcome::Transport => Err(transport_error().await),
            }
        }
    }

    /// A real connection-refused error from reqwest.
    async fn transport_error() -> SearchError {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        reqwest::Client::new()
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err()
            .into()
    }

    fn podcast(id: i64, page_url: Option<&str>) -> PodcastSummary {
        PodcastSummary {
            collection_id: id,
            collection_name: format!("Show {}", id),
            artist_name: "Host".to_string(),
            artwork_url: format!("http://img/{}.png", id),
            page_url: page_url.map(|s| s.to_string()),
        }
    }

    fn linked(id: i64) -> PodcastSummary {
        podcast(id, Some(&format!("http://pod/{}", id)))
    }

    fn ids(set: &SearchResultSet) -> Vec<i64> {
        set.iter().map(|p| p.collection_id).collect()
    }

    fn store(search: ScriptedSearch) -> SearchStore {
        SearchStore::new(Arc::new(search))
    }

    #[tokio::test]
    async fn test_initial_set_is_empty() {
        let store = store(ScriptedSearch::default());
        assert!(store.results().is_empty());
        assert!(!store.is_searching());
    }

    #[tokio::test]
    async fn test_publishes_only_linked_podcasts() {
        let store = store(ScriptedSearch::default().with(
            "technology",
            0,
            Outcome::Results(vec![
                podcast(1, Some("http://a")),
                podcast(2, None),
                podcast(3, Some("http://c")),
                podcast(4, None),
            ]),
        ));

        store.run_search("technology").await;

        let results = store.results();
        assert_eq!(ids(&results), vec![1, 3]);
        assert!(results.iter().all(|p| p.page_url.is_some()));
    }

    #[tokio::test]
    async fn test_one_linked_one_unlinked_yields_single_item() {
        let store = store(ScriptedSearch::default().with(
            "a",
            0,
            Outcome::Results(vec![podcast(1, Some("http://a")), podcast(2, None)]),
        ));

        store.run_search("a").await;

        assert_eq!(ids(&store.results()), vec![1]);
    }

    #[tokio::test]
    async fn test_empty_response_publishes_empty_set() {
        let store = store(
            ScriptedSearch::default()
                .with("first", 0, Outcome::Results(vec![linked(1)]))
                .with("nothing", 0, Outcome::Results(Vec::new())),
        );

        store.run_search("first").await;
        store.run_search("nothing").await;

        assert!(store.results().is_empty());
    }

    #[tokio::test]
    async fn test_failures_reset_previous_results() {
        for failure in [Outcome::Http(500), Outcome::Malformed, Outcome::Transport] {
            let store = store(
                ScriptedSearch::default()
                    .with("good", 0, Outcome::Results(vec![linked(1), linked(2)]))
                    .with("bad", 0, failure),
            );

            store.run_search("good").await;
            assert_eq!(store.results().len(), 2);

            store.run_search("bad").await;
            assert!(store.results().is_empty());
            assert!(!store.is_searching());
        }
    }

    #[tokio::test]
    async fn test_empty_term_is_searched() {
        let search = Arc::new(ScriptedSearch::default().with(
            "",
            0,
            Outcome::Results(vec![linked(1), podcast(2, None)]),
        ));
        let store = SearchStore::new(search.clone());

        store.run_search("").await;

        assert_eq!(search.calls.lock().unwrap().as_slice(), &[String::new()]);
        assert_eq!(ids(&store.results()), vec![1]);
    }

    #[tokio::test]
    async fn test_each_search_publishes_fresh_set() {
        let store = store(
            ScriptedSearch::default()
                .with("one", 0, Outcome::Results(vec![linked(1), linked(2)]))
                .with("two", 0, Outcome::Results(vec![linked(3)])),
        );

        store.run_search("one").await;
        let first = store.results();
        store.run_search("two").await;
        let second = store.results();

        assert_eq!(ids(&first), vec![1, 2]);
        assert_eq!(ids(&second), vec![3]);
        assert!(!first.ptr_eq(&second));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = store(ScriptedSearch::default().with(
            "technology",
            0,
            Outcome::Results(vec![linked(7)]),
        ));
        let mut rx = store.subscribe();

        store.search("technology").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(ids(&rx.borrow_and_update()), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_search_does_not_overwrite_later_one() {
        let store = store(
            ScriptedSearch::default()
                .with("slow", 500, Outcome::Results(vec![linked(1)]))
                .with("fast", 10, Outcome::Results(vec![linked(2)])),
        );

        let slow = store.search("slow");
        let fast = store.search("fast");
        fast.await.unwrap();
        assert_eq!(ids(&store.results()), vec![2]);

        slow.await.unwrap();
        assert_eq!(ids(&store.results()), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_failure_wins_over_slow_success() {
        let store = store(
            ScriptedSearch::default()
                .with("slow", 500, Outcome::Results(vec![linked(1)]))
                .with("broken", 10, Outcome::Http(503)),
        );

        let slow = store.search("slow");
        let broken = store.search("broken");
        broken.await.unwrap();
        slow.await.unwrap();

        assert!(store.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_searching_while_in_flight() {
        let store = store(ScriptedSearch::default().with(
            "slow",
            100,
            Outcome::Results(vec![linked(1)]),
        ));

        let handle = store.search("slow");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_searching());

        handle.await.unwrap();
        assert!(!store.is_searching());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_publishing() {
        let store = store(ScriptedSearch::default().with(
            "slow",
            100,
            Outcome::Results(vec![linked(1)]),
        ));
        let mut rx = store.subscribe();

        let handle = store.search("slow");
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.shutdown();
        handle.await.unwrap();

        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
        assert!(!store.is_searching());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_store_abandons_search() {
        let store = store(ScriptedSearch::default().with(
            "slow",
            100,
            Outcome::Results(vec![linked(1)]),
        ));
        let rx = store.subscribe();

        let handle = store.search("slow");
        drop(store);
        handle.await.unwrap();

        assert!(rx.borrow().is_empty());
    }
}
