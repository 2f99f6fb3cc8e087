//! crates/quoteflow_core/src/store.rs
//!
//! The quotes store: the client-resident state holding the currently displayed
//! quote, the saved quotes, and today's generation counter.
//!
//! The store is an explicit container handed to whoever composes the view.
//! Persistence and the calendar are injected through the `KeyValueStore` and
//! `Clock` ports. Every mutation updates memory first, then awaits its write,
//! so writes land in call order. Write failures are logged and swallowed.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{DailyGenerationCounter, Quote};
use crate::ports::{Clock, KeyValueStore};

//=========================================================================================
// Storage Keys
//=========================================================================================

pub const QUOTES_DATE_KEY: &str = "quotesDate";
pub const QUOTES_COUNT_KEY: &str = "quotesCount";
pub const SAVED_QUOTES_KEY: &str = "savedQuotes";

const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// Snapshot
//=========================================================================================

/// What observers of the store see after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotesSnapshot {
    pub current_quote: Option<Quote>,
    pub saved_quotes: Vec<Quote>,
    pub quotes_generated_today: u32,
}

//=========================================================================================
// QuotesStore
//=========================================================================================

pub struct QuotesStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    current_quote: Option<Quote>,
    saved_quotes: Vec<Quote>,
    counter: DailyGenerationCounter,
    observers: watch::Sender<QuotesSnapshot>,
}

impl QuotesStore {
    /// Builds the store and rehydrates it from durable storage.
    ///
    /// A counter persisted on a different day is reset to zero (and the reset is
    /// written back). A saved-quotes snapshot that fails to deserialize is
    /// discarded rather than loaded.
    pub async fn initialize(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        let (observers, _) = watch::channel(QuotesSnapshot::default());

        let mut store = Self {
            storage,
            clock,
            current_quote: None,
            saved_quotes: Vec::new(),
            counter: DailyGenerationCounter::fresh(today),
            observers,
        };

        match store.load_count(today).await {
            Some(count) => store.counter.count = count,
            None => {
                store.persist(QUOTES_DATE_KEY, &format_day(today)).await;
                store.persist(QUOTES_COUNT_KEY, "0").await;
            }
        }
        store.saved_quotes = store.load_saved_quotes().await;

        info!(
            saved = store.saved_quotes.len(),
            generated_today = store.counter.count,
            "Quotes store initialized."
        );
        store.notify();
        store
    }

    //-------------------------------------------------------------------------------------
    // Read interface
    //-------------------------------------------------------------------------------------

    pub fn current_quote(&self) -> Option<&Quote> {
        self.current_quote.as_ref()
    }

    pub fn saved_quotes(&self) -> &[Quote] {
        &self.saved_quotes
    }

    pub fn quotes_generated_today(&self) -> u32 {
        self.counter.count
    }

    pub fn snapshot(&self) -> QuotesSnapshot {
        QuotesSnapshot {
            current_quote: self.current_quote.clone(),
            saved_quotes: self.saved_quotes.clone(),
            quotes_generated_today: self.counter.count,
        }
    }

    /// Subscribes to a snapshot published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<QuotesSnapshot> {
        self.observers.subscribe()
    }

    //-------------------------------------------------------------------------------------
    // Mutations
    //-------------------------------------------------------------------------------------

    /// Replaces the displayed quote. Never persisted.
    pub fn set_current_quote(&mut self, quote: Option<Quote>) {
        self.current_quote = quote;
        self.notify();
    }

    /// Appends `quote` unless a quote with the same id is already saved.
    pub async fn add_saved_quote(&mut self, quote: Quote) {
        if self.saved_quotes.iter().any(|saved| saved.id == quote.id) {
            return;
        }
        self.saved_quotes.push(quote);
        self.persist_saved_quotes().await;
        self.notify();
    }

    /// Removes the saved quote with `id`, if there is one.
    pub async fn remove_saved_quote(&mut self, id: &str) {
        let before = self.saved_quotes.len();
        self.saved_quotes.retain(|saved| saved.id != id);
        if self.saved_quotes.len() == before {
            return;
        }
        self.persist_saved_quotes().await;
        self.notify();
    }

    /// Counts one more generation, starting a fresh count if the day has changed
    /// since the last one.
    pub async fn increment_generated_count(&mut self) {
        let today = self.clock.today();
        if self.counter.date != today {
            info!(previous = %self.counter.date, %today, "Day changed, resetting generation count.");
            self.counter = DailyGenerationCounter::fresh(today);
        }
        self.counter.count += 1;

        self.persist(QUOTES_DATE_KEY, &format_day(self.counter.date)).await;
        self.persist(QUOTES_COUNT_KEY, &self.counter.count.to_string()).await;
        self.notify();
    }

    /// Moves the displayed quote into the saved quotes.
    pub async fn save_current_quote(&mut self) -> Option<Quote> {
        let quote = self.current_quote.take()?;
        self.add_saved_quote(quote.clone()).await;
        self.notify();
        Some(quote)
    }

    /// Dismisses the displayed quote without saving it.
    pub fn reject_current_quote(&mut self) {
        self.set_current_quote(None);
    }

    //-------------------------------------------------------------------------------------
    // Persistence helpers
    //-------------------------------------------------------------------------------------

    async fn load_count(&self, today: NaiveDate) -> Option<u32> {
        let stored_date = self.read(QUOTES_DATE_KEY).await?;
        let stored_count = self.read(QUOTES_COUNT_KEY).await?;

        let date = NaiveDate::parse_from_str(&stored_date, DATE_FORMAT).ok()?;
        if date != today {
            return None;
        }
        stored_count.trim().parse::<u32>().ok()
    }

    async fn load_saved_quotes(&self) -> Vec<Quote> {
        let Some(raw) = self.read(SAVED_QUOTES_KEY).await else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<Quote>>(&raw) {
            Ok(quotes) => dedup_by_id(quotes),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable saved quotes snapshot.");
                Vec::new()
            }
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed.");
                None
            }
        }
    }

    async fn persist_saved_quotes(&self) {
        match serde_json::to_string(&self.saved_quotes) {
            Ok(snapshot) => self.persist(SAVED_QUOTES_KEY, &snapshot).await,
            Err(e) => warn!(error = %e, "Failed to serialize saved quotes."),
        }
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value).await {
            warn!(key, error = %e, "Storage write failed.");
        }
    }

    fn notify(&self) {
        self.observers.send_replace(self.snapshot());
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

fn dedup_by_id(quotes: Vec<Quote>) -> Vec<Quote> {
    let mut unique: Vec<Quote> = Vec::with_capacity(quotes.len());
    for quote in quotes {
        if !unique.iter().any(|q| q.id == quote.id) {
            unique.push(quote);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::memory::InMemoryKeyValueStore;
    use std::sync::Mutex;

    struct FixedClock {
        day: Mutex<NaiveDate>,
    }

    impl FixedClock {
        fn on(day: NaiveDate) -> Arc<Self> {
            Arc::new(Self { day: Mutex::new(day) })
        }

        fn advance_to(&self, day: NaiveDate) {
            *self.day.lock().unwrap() = day;
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            *self.day.lock().unwrap()
        }

        fn now_millis(&self) -> i64 {
            0
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn quote(id: &str) -> Quote {
        Quote {
            id: id.to_string(),
            text: format!("text of {}", id),
            author: "Maya".to_string(),
            category: Category::resolve("life"),
        }
    }

    #[tokio::test]
    async fn fresh_storage_starts_empty_and_records_today() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let store = QuotesStore::initialize(storage.clone(), FixedClock::on(day(18))).await;

        assert_eq!(store.quotes_generated_today(), 0);
        assert!(store.saved_quotes().is_empty());
        assert!(store.current_quote().is_none());
        assert_eq!(storage.peek(QUOTES_DATE_KEY).as_deref(), Some("2026-10-18"));
        assert_eq!(storage.peek(QUOTES_COUNT_KEY).as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn adding_the_same_id_twice_keeps_one_entry() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage.clone(), FixedClock::on(day(18))).await;

        store.add_saved_quote(quote("life_1")).await;
        store.add_saved_quote(quote("life_1")).await;

        assert_eq!(store.saved_quotes().len(), 1);
        let persisted: Vec<Quote> =
            serde_json::from_str(&storage.peek(SAVED_QUOTES_KEY).unwrap()).unwrap();
        assert_eq!(persisted, vec![quote("life_1")]);
    }

    #[tokio::test]
    async fn removing_an_unknown_id_changes_nothing() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage.clone(), FixedClock::on(day(18))).await;
        store.add_saved_quote(quote("life_1")).await;
        store.add_saved_quote(quote("life_2")).await;
        let writes = storage.write_count();

        store.remove_saved_quote("life_404").await;

        assert_eq!(store.saved_quotes(), &[quote("life_1"), quote("life_2")]);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn removing_a_saved_quote_persists_the_rest_in_order() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage.clone(), FixedClock::on(day(18))).await;
        for id in ["a_1", "b_2", "c_3"] {
            store.add_saved_quote(quote(id)).await;
        }

        store.remove_saved_quote("b_2").await;

        let persisted: Vec<Quote> =
            serde_json::from_str(&storage.peek(SAVED_QUOTES_KEY).unwrap()).unwrap();
        assert_eq!(persisted, vec![quote("a_1"), quote("c_3")]);
    }

    #[tokio::test]
    async fn count_survives_a_restart_on_the_same_day() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let clock = FixedClock::on(day(18));
        let mut store = QuotesStore::initialize(storage.clone(), clock.clone()).await;

        for _ in 0..3 {
            store.increment_generated_count().await;
        }
        assert_eq!(store.quotes_generated_today(), 3);
        assert_eq!(storage.peek(QUOTES_COUNT_KEY).as_deref(), Some("3"));

        let reloaded = QuotesStore::initialize(storage.clone(), clock).await;
        assert_eq!(reloaded.quotes_generated_today(), 3);
    }

    #[tokio::test]
    async fn count_resets_on_a_restart_the_next_day() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let clock = FixedClock::on(day(18));
        let mut store = QuotesStore::initialize(storage.clone(), clock.clone()).await;
        store.increment_generated_count().await;
        store.increment_generated_count().await;

        clock.advance_to(day(19));
        let reloaded = QuotesStore::initialize(storage.clone(), clock).await;

        assert_eq!(reloaded.quotes_generated_today(), 0);
        assert_eq!(storage.peek(QUOTES_DATE_KEY).as_deref(), Some("2026-10-19"));
        assert_eq!(storage.peek(QUOTES_COUNT_KEY).as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn increment_rolls_over_at_midnight_without_restart() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let clock = FixedClock::on(day(18));
        let mut store = QuotesStore::initialize(storage.clone(), clock.clone()).await;
        store.increment_generated_count().await;
        store.increment_generated_count().await;

        clock.advance_to(day(19));
        store.increment_generated_count().await;

        assert_eq!(store.quotes_generated_today(), 1);
        assert_eq!(storage.peek(QUOTES_DATE_KEY).as_deref(), Some("2026-10-19"));
        assert_eq!(storage.peek(QUOTES_COUNT_KEY).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn saved_quotes_reload_in_insertion_order() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let clock = FixedClock::on(day(18));
        let mut store = QuotesStore::initialize(storage.clone(), clock.clone()).await;
        for id in ["wisdom_3", "life_1", "romantic_2"] {
            store.add_saved_quote(quote(id)).await;
        }

        let reloaded = QuotesStore::initialize(storage, clock).await;
        assert_eq!(reloaded.saved_quotes(), store.saved_quotes());
    }

    #[tokio::test]
    async fn corrupted_snapshot_loads_as_empty() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        storage.seed(SAVED_QUOTES_KEY, r#"[{"id": 7, "words": "nope"}]"#);

        let store = QuotesStore::initialize(storage, FixedClock::on(day(18))).await;
        assert!(store.saved_quotes().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_in_snapshot_keep_the_first() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut second = quote("life_1");
        second.text = "shadowed".to_string();
        let snapshot = serde_json::to_string(&vec![quote("life_1"), second]).unwrap();
        storage.seed(SAVED_QUOTES_KEY, &snapshot);

        let store = QuotesStore::initialize(storage, FixedClock::on(day(18))).await;
        assert_eq!(store.saved_quotes(), &[quote("life_1")]);
    }

    #[tokio::test]
    async fn write_failures_do_not_block_in_memory_updates() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage.clone(), FixedClock::on(day(18))).await;
        storage.fail_writes(true);

        store.add_saved_quote(quote("life_1")).await;
        store.increment_generated_count().await;

        assert_eq!(store.saved_quotes().len(), 1);
        assert_eq!(store.quotes_generated_today(), 1);
        assert!(storage.peek(SAVED_QUOTES_KEY).is_none());
    }

    #[tokio::test]
    async fn save_and_reject_clear_the_current_quote() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage, FixedClock::on(day(18))).await;

        store.set_current_quote(Some(quote("life_1")));
        let saved = store.save_current_quote().await;
        assert_eq!(saved, Some(quote("life_1")));
        assert!(store.current_quote().is_none());
        assert_eq!(store.saved_quotes().len(), 1);

        store.set_current_quote(Some(quote("life_2")));
        store.reject_current_quote();
        assert!(store.current_quote().is_none());
        assert_eq!(store.saved_quotes().len(), 1);
        assert_eq!(store.save_current_quote().await, None);
    }

    #[tokio::test]
    async fn observers_see_each_mutation() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = QuotesStore::initialize(storage, FixedClock::on(day(18))).await;
        let mut observer = store.subscribe();

        store.set_current_quote(Some(quote("life_1")));
        assert!(observer.has_changed().unwrap());
        assert_eq!(
            observer.borrow_and_update().current_quote.as_ref().map(|q| q.id.as_str()),
            Some("life_1")
        );

        store.increment_generated_count().await;
        assert_eq!(observer.borrow_and_update().quotes_generated_today, 1);
    }
}
