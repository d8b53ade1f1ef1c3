//! Gallery feed state and the controller that drives it.
//!
//! All tattoo records live in one normalized store (`records`), with the
//! visible feed expressed as an ordered set of ids. Every surface that shows a
//! tattoo (feed card, detail view, featured strip) reads the same record, so a
//! like or an admin edit is visible everywhere at once.
//!
//! Concurrency rules:
//! - at most one pagination request runs at a time (`inflight` gates
//!   `load_more`), but a filter change may start its own request immediately;
//! - every response is checked against the *current* filters before it is
//!   absorbed; a response for a query the user has since left is dropped;
//! - `inflight` is decremented on every completion, stale or not, so the
//!   loading flag can never wedge.

use crate::api::{PortfolioApi, TattooPage};
use crate::likes::{LikeAttempt, LikeLedger};
use indexmap::IndexSet;
use inkfolio_model::{
    Category, FilterPatch, PaginationInfo, Settings, Style, Tattoo, TattooFilters,
};
use keepsake::StorageBackend;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle returned by [`FeedController::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerKey(slotmap::DefaultKey);

/// The batch the host page rendered on the server, handed over at startup so
/// the first paint does not refetch what is already on screen.
#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct InitialFeed {
    #[serde(default)]
    pub tattoos: Vec<Tattoo>,
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}

/// Everything a view needs to render the gallery, cloned out of the store.
#[derive(Clone, Debug, Serialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub tattoos: Vec<Tattoo>,
    pub featured: Vec<Tattoo>,
    pub filters: TattooFilters,
    pub loading: bool,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Tattoo>,
    pub liked: Vec<String>,
}

#[derive(Clone, Copy)]
enum FetchMode {
    Replace,
    Append,
}

#[derive(Default)]
pub(crate) struct FeedState {
    pub(crate) records: HashMap<String, Tattoo>,
    pub(crate) order: IndexSet<String>,
    pub(crate) featured: Vec<String>,
    pub(crate) filters: TattooFilters,
    pub(crate) has_more: bool,
    pub(crate) inflight: u32,
    pub(crate) selected: Option<String>,
    pub(crate) initial: Option<InitialFeed>,
    pub(crate) categories: Vec<Category>,
    pub(crate) styles: Vec<Style>,
    pub(crate) settings: Option<Settings>,
}

impl FeedState {
    /// Fold one page into the store. Ids already in the feed keep their
    /// original position; their records are refreshed from the newer payload.
    fn absorb_page(&mut self, page: TattooPage) {
        let got_any = !page.tattoos.is_empty();
        for tattoo in page.tattoos {
            self.order.insert(tattoo.id.clone());
            self.records.insert(tattoo.id.clone(), tattoo);
        }
        // Without pagination metadata we cannot know there is more, so there
        // isn't.
        self.has_more = match page.pagination {
            Some(p) => got_any && p.page < p.pages,
            None => false,
        };
    }

    /// If the current query is the untouched default and a server-rendered
    /// batch exists, reinstate that batch instead of fetching. Returns true
    /// when it did.
    fn try_restore_initial(&mut self) -> bool {
        if !self.filters.same_query(&TattooFilters::default()) {
            return false;
        }
        let Some(initial) = self.initial.clone() else {
            return false;
        };
        self.order.clear();
        self.filters.page = initial.pagination.as_ref().map_or(1, |p| p.page);
        self.absorb_page(TattooPage {
            tattoos: initial.tattoos,
            pagination: initial.pagination,
        });
        self.prune_records();
        true
    }

    /// Drop records nothing references anymore.
    fn prune_records(&mut self) {
        let order = &self.order;
        let featured = &self.featured;
        let selected = &self.selected;
        self.records.retain(|id, _| {
            order.contains(id.as_str())
                || featured.iter().any(|f| f == id)
                || selected.as_deref() == Some(id.as_str())
        });
    }
}

pub struct FeedController<A, B> {
    pub(crate) api: A,
    pub(crate) ledger: LikeLedger<B>,
    pub(crate) state: RefCell<FeedState>,
    listeners: RefCell<SlotMap<slotmap::DefaultKey, Rc<dyn Fn()>>>,
}

/// Notifies all listeners when dropped, so a mutator can return early from
/// any branch and still flush exactly once.
pub(crate) struct NotifyLater<'a, A, B> {
    feed: &'a FeedController<A, B>,
}

impl<A, B> Drop for NotifyLater<'_, A, B> {
    fn drop(&mut self) {
        self.feed.notify();
    }
}

impl<A, B> FeedController<A, B> {
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> ListenerKey {
        ListenerKey(self.listeners.borrow_mut().insert(Rc::new(callback)))
    }

    pub fn unsubscribe(&self, key: ListenerKey) {
        self.listeners.borrow_mut().remove(key.0);
    }

    fn notify(&self) {
        // Clone the callbacks out first; one of them may subscribe or
        // unsubscribe while we are iterating.
        let callbacks: Vec<Rc<dyn Fn()>> = self.listeners.borrow().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    pub(crate) fn notify_later(&self) -> NotifyLater<'_, A, B> {
        NotifyLater { feed: self }
    }
}

impl<A: PortfolioApi, B: StorageBackend> FeedController<A, B> {
    pub fn new(api: A, backend: B, initial: Option<InitialFeed>) -> Self {
        let mut state = FeedState::default();
        if let Some(initial) = initial {
            state.initial = Some(initial);
            state.try_restore_initial();
        }
        Self {
            api,
            ledger: LikeLedger::new(backend),
            state: RefCell::new(state),
            listeners: RefCell::new(SlotMap::new()),
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.borrow();
        FeedSnapshot {
            tattoos: state
                .order
                .iter()
                .filter_map(|id| state.records.get(id).cloned())
                .collect(),
            featured: state
                .featured
                .iter()
                .filter_map(|id| state.records.get(id).cloned())
                .collect(),
            filters: state.filters.clone(),
            loading: state.inflight > 0,
            has_more: state.has_more,
            selected: state
                .selected
                .as_ref()
                .and_then(|id| state.records.get(id))
                .cloned(),
            liked: self.ledger.liked_ids(),
        }
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.ledger.is_liked(id)
    }

    /// Replace the feed with page 1 of the current query.
    pub async fn refresh(&self) {
        let requested = {
            let mut state = self.state.borrow_mut();
            state.filters.page = 1;
            state.filters.clone()
        };
        self.run_fetch(requested, FetchMode::Replace).await;
    }

    /// Merge a partial filter update and reload the feed for the new query.
    pub async fn apply_filters(&self, patch: FilterPatch) {
        let (restored, requested) = {
            let mut state = self.state.borrow_mut();
            patch.apply(&mut state.filters);
            let restored = state.try_restore_initial();
            (restored, state.filters.clone())
        };
        self.notify();
        if !restored {
            self.run_fetch(requested, FetchMode::Replace).await;
        }
    }

    /// Back to the default query. Reinstates the server-rendered batch when
    /// one was handed over; fetches otherwise. Safe to call repeatedly.
    pub async fn clear_filters(&self) {
        let (restored, requested) = {
            let mut state = self.state.borrow_mut();
            state.filters = TattooFilters::default();
            let restored = state.try_restore_initial();
            (restored, state.filters.clone())
        };
        self.notify();
        if !restored {
            self.run_fetch(requested, FetchMode::Replace).await;
        }
    }

    /// Fetch the next page, if there is one and nothing is already loading.
    pub async fn load_more(&self) {
        let requested = {
            let mut state = self.state.borrow_mut();
            if !state.has_more || state.inflight > 0 {
                return;
            }
            state.filters.page += 1;
            state.filters.clone()
        };
        self.run_fetch(requested, FetchMode::Append).await;
    }

    async fn run_fetch(&self, requested: TattooFilters, mode: FetchMode) {
        self.state.borrow_mut().inflight += 1;
        self.notify();
        let result = self.api.fetch_tattoos(&requested).await;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        // Unconditional: a stale completion must still release the flag.
        state.inflight -= 1;
        if !state.filters.same_query(&requested) {
            return;
        }
        match result {
            Ok(page) => {
                if let FetchMode::Replace = mode {
                    state.order.clear();
                }
                state.absorb_page(page);
                state.prune_records();
            }
            Err(e) => {
                // The feed keeps what it has; pagination just stops.
                state.has_more = false;
                log::error!("failed to load tattoos (page {page}): {e}", page = requested.page);
            }
        }
    }

    /// Open the detail view for `id`, fetching the record if the feed does
    /// not hold it, and report the view to the server.
    pub async fn select(&self, id: &str) {
        let known = self.state.borrow().records.contains_key(id);
        if !known {
            match self.api.fetch_tattoo(id).await {
                Ok(tattoo) => {
                    let mut state = self.state.borrow_mut();
                    state.records.insert(tattoo.id.clone(), tattoo);
                }
                Err(e) => {
                    log::error!("failed to load tattoo {id}: {e}");
                    return;
                }
            }
        }
        self.state.borrow_mut().selected = Some(id.to_string());
        self.notify();
        // Best effort; a lost view ping does not affect the gallery.
        match self.api.increment_view(id).await {
            Ok(views) => {
                let _flush = self.notify_later();
                let mut state = self.state.borrow_mut();
                if let Some(tattoo) = state.records.get_mut(id) {
                    tattoo.views = views;
                }
            }
            Err(e) => log::info!("view increment for {id} failed: {e}"),
        }
    }

    pub fn close_detail(&self) {
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        state.selected = None;
        state.prune_records();
    }

    /// The one entry point for the like gesture, from any surface. The ledger
    /// decides whether a request goes out; the count only moves when the
    /// server confirms. Returns true if a like was recorded.
    pub async fn like(&self, id: &str) -> bool {
        match self.ledger.begin(id) {
            LikeAttempt::AlreadyLiked | LikeAttempt::InFlight => return false,
            LikeAttempt::Started => {}
        }
        match self.api.like_tattoo(id).await {
            Ok(likes) => {
                self.ledger.commit(id);
                let _flush = self.notify_later();
                let mut state = self.state.borrow_mut();
                if let Some(tattoo) = state.records.get_mut(id) {
                    tattoo.likes = likes;
                }
                true
            }
            Err(e) => {
                self.ledger.abort(id);
                log::error!("like for {id} failed: {e}");
                false
            }
        }
    }

    /// Load the featured strip. Failure leaves the previous strip in place.
    pub async fn load_featured(&self) {
        match self.api.fetch_featured().await {
            Ok(tattoos) => {
                let _flush = self.notify_later();
                let mut state = self.state.borrow_mut();
                state.featured = tattoos.iter().map(|t| t.id.clone()).collect();
                for tattoo in tattoos {
                    state.records.insert(tattoo.id.clone(), tattoo);
                }
            }
            Err(e) => log::error!("failed to load featured tattoos: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::testing::{initial_feed, page, tattoo, FakeApi};
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use keepsake::MemoryBackend;

    fn feed_with_initial() -> (Rc<FeedController<FakeApi, MemoryBackend>>, Rc<crate::testing::Script>) {
        let (api, script) = FakeApi::new();
        let feed = FeedController::new(
            api,
            MemoryBackend::new(),
            Some(initial_feed(&ids("t", 1, 12), 1, 3)),
        );
        (Rc::new(feed), script)
    }

    fn ids(prefix: &str, from: u32, to: u32) -> Vec<String> {
        (from..=to).map(|n| format!("{prefix}{n}")).collect()
    }

    fn shown_ids(feed: &FeedController<FakeApi, MemoryBackend>) -> Vec<String> {
        feed.snapshot().tattoos.into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn initial_batch_seeds_the_feed_without_a_fetch() {
        let (feed, script) = feed_with_initial();
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.tattoos.len(), 12);
        assert!(snapshot.has_more);
        assert!(!snapshot.loading);
        assert!(script.fetch_log.borrow().is_empty());
    }

    #[test]
    fn scrolling_through_all_pages_latches_has_more_off() {
        let (feed, script) = feed_with_initial();
        script.push_page(page(&ids("t", 13, 24), 2, 3));
        script.push_page(page(&ids("t", 25, 30), 3, 3));

        block_on(feed.load_more());
        assert!(feed.snapshot().has_more);
        assert_eq!(feed.snapshot().tattoos.len(), 24);

        block_on(feed.load_more());
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.tattoos.len(), 30);
        assert!(!snapshot.has_more, "last page reached");

        // Nothing more to load, so this must not hit the network.
        block_on(feed.load_more());
        assert_eq!(script.fetch_log.borrow().len(), 2);
        assert_eq!(shown_ids(&feed), ids("t", 1, 30));
    }

    #[test]
    fn repeated_ids_keep_their_first_position() {
        let (feed, script) = feed_with_initial();
        // The server shifted between pages and repeats t12.
        let mut repeat = ids("t", 13, 24);
        repeat.insert(0, "t12".to_string());
        script.push_page(page(&repeat, 2, 3));

        block_on(feed.load_more());
        let shown = shown_ids(&feed);
        assert_eq!(shown.len(), 24);
        assert_eq!(shown[11], "t12");
        assert_eq!(shown[12], "t13");
    }

    #[test]
    fn missing_pagination_metadata_means_no_more_pages() {
        let (feed, script) = feed_with_initial();
        script.push_page(TattooPage {
            tattoos: ids("t", 13, 24).iter().map(|id| tattoo(id)).collect(),
            pagination: None,
        });
        block_on(feed.load_more());
        assert!(!feed.snapshot().has_more);
        assert_eq!(feed.snapshot().tattoos.len(), 24);
    }

    #[test]
    fn a_failed_page_keeps_the_feed_and_stops_pagination() {
        let (feed, script) = feed_with_initial();
        script.push_page_err(ApiError::Transport("connection reset".into()));
        block_on(feed.load_more());
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.tattoos.len(), 12, "feed untouched");
        assert!(!snapshot.has_more);
        assert!(!snapshot.loading);
    }

    #[test]
    fn changing_filters_replaces_the_feed_and_resets_the_page() {
        let (feed, script) = feed_with_initial();
        script.push_page(page(&ids("c", 1, 5), 1, 1));

        block_on(feed.apply_filters(FilterPatch::category("cat1")));
        assert_eq!(shown_ids(&feed), ids("c", 1, 5));
        assert!(!feed.snapshot().has_more);

        let requested = script.fetch_log.borrow();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0].category.as_deref(), Some("cat1"));
        assert_eq!(requested[0].page, 1);
    }

    #[test]
    fn clearing_filters_reinstates_the_initial_batch_without_fetching() {
        let (feed, script) = feed_with_initial();
        script.push_page(page(&ids("c", 1, 5), 1, 1));
        block_on(feed.apply_filters(FilterPatch::category("cat1")));

        block_on(feed.clear_filters());
        assert_eq!(shown_ids(&feed), ids("t", 1, 12));
        assert!(feed.snapshot().has_more);
        assert_eq!(script.fetch_log.borrow().len(), 1, "only the filtered fetch");

        // Clearing again changes nothing.
        block_on(feed.clear_filters());
        assert_eq!(shown_ids(&feed), ids("t", 1, 12));
        assert_eq!(script.fetch_log.borrow().len(), 1);
    }

    #[test]
    fn clearing_filters_without_an_initial_batch_refetches() {
        let (api, script) = FakeApi::new();
        let feed = FeedController::new(api, MemoryBackend::new(), None);
        script.push_page(page(&ids("t", 1, 12), 1, 2));
        block_on(feed.clear_filters());
        assert_eq!(feed.snapshot().tattoos.len(), 12);
        assert_eq!(script.fetch_log.borrow().len(), 1);
    }

    #[test]
    fn a_response_for_an_abandoned_query_is_discarded() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let (feed, script) = feed_with_initial();

        // Page 2 of the default query starts, but stalls on the network.
        let release = script.gate_next_fetch();
        script.push_page(page(&ids("t", 13, 24), 2, 3));
        let f = feed.clone();
        spawner
            .spawn_local(async move { f.load_more().await })
            .unwrap();
        pool.run_until_stalled();
        assert!(feed.snapshot().loading);

        // Meanwhile the user picks a category; that fetch is not gated.
        script.push_page(page(&ids("c", 1, 5), 1, 1));
        let f = feed.clone();
        spawner
            .spawn_local(async move { f.apply_filters(FilterPatch::category("cat1")).await })
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(shown_ids(&feed), ids("c", 1, 5));

        // Now the stale page 2 arrives. It must not leak into the new feed.
        release.send(()).unwrap();
        pool.run_until_stalled();
        let snapshot = feed.snapshot();
        assert_eq!(shown_ids(&feed), ids("c", 1, 5));
        assert!(!snapshot.loading, "stale completion still clears the flag");
        assert!(!snapshot.has_more);
    }

    #[test]
    fn load_more_is_single_flight() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let (feed, script) = feed_with_initial();

        let release = script.gate_next_fetch();
        script.push_page(page(&ids("t", 13, 24), 2, 3));
        for _ in 0..2 {
            let f = feed.clone();
            spawner
                .spawn_local(async move { f.load_more().await })
                .unwrap();
        }
        pool.run_until_stalled();
        release.send(()).unwrap();
        pool.run_until_stalled();

        // The second call saw the in-flight request and did nothing.
        assert_eq!(script.fetch_log.borrow().len(), 1);
        assert_eq!(feed.snapshot().tattoos.len(), 24);
        assert_eq!(feed.snapshot().filters.page, 2);
    }

    #[test]
    fn like_moves_the_count_only_on_confirmation() {
        let (feed, script) = feed_with_initial();
        script.push_like(Ok(6));
        assert!(block_on(feed.like("t3")));
        let snapshot = feed.snapshot();
        let t3 = snapshot.tattoos.iter().find(|t| t.id == "t3").unwrap();
        assert_eq!(t3.likes, 6);
        assert!(feed.is_liked("t3"));
        assert_eq!(snapshot.liked, vec!["t3".to_string()]);
    }

    #[test]
    fn an_empty_batch_also_latches_has_more_off() {
        let (feed, script) = feed_with_initial();
        script.push_page(page(&[], 2, 3));
        block_on(feed.load_more());
        assert!(!feed.snapshot().has_more);
        assert_eq!(feed.snapshot().tattoos.len(), 12);
    }

    #[test]
    fn a_like_shows_in_the_grid_and_the_open_detail_at_once() {
        let (feed, script) = feed_with_initial();
        script.push_view(Ok(1));
        block_on(feed.select("t1"));
        script.push_like(Ok(6));
        block_on(feed.like("t1"));

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.tattoos[0].likes, 6);
        assert_eq!(snapshot.selected.unwrap().likes, 6);
    }

    #[test]
    fn two_like_gestures_in_flight_become_one_request() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let (feed, script) = feed_with_initial();

        let release = script.gate_next_like();
        script.push_like(Ok(1));
        for _ in 0..2 {
            let f = feed.clone();
            spawner
                .spawn_local(async move {
                    f.like("t1").await;
                })
                .unwrap();
        }
        pool.run_until_stalled();
        release.send(()).unwrap();
        pool.run_until_stalled();

        assert_eq!(script.like_log.borrow().len(), 1);
        assert!(feed.is_liked("t1"));
        assert_eq!(feed.snapshot().liked, vec!["t1".to_string()]);
    }

    #[test]
    fn a_second_like_gesture_sends_nothing() {
        let (feed, script) = feed_with_initial();
        script.push_like(Ok(1));
        assert!(block_on(feed.like("t1")));
        assert!(!block_on(feed.like("t1")));
        assert_eq!(script.like_log.borrow().len(), 1);
    }

    #[test]
    fn a_failed_like_leaves_no_trace_and_can_be_retried() {
        let (feed, script) = feed_with_initial();
        script.push_like(Err(ApiError::Status {
            code: 500,
            message: "boom".into(),
        }));
        assert!(!block_on(feed.like("t1")));
        assert!(!feed.is_liked("t1"));
        let t1 = feed.snapshot().tattoos[0].clone();
        assert_eq!(t1.likes, 0, "count untouched on failure");

        script.push_like(Ok(1));
        assert!(block_on(feed.like("t1")));
        assert!(feed.is_liked("t1"));
    }

    #[test]
    fn selecting_an_unknown_tattoo_fetches_it_and_reports_the_view() {
        let (api, script) = FakeApi::new();
        let feed = FeedController::new(api, MemoryBackend::new(), None);
        script.push_single(Ok(tattoo("solo")));
        script.push_view(Ok(41));

        block_on(feed.select("solo"));
        let selected = feed.snapshot().selected.expect("detail view open");
        assert_eq!(selected.id, "solo");
        assert_eq!(selected.views, 41);

        feed.close_detail();
        assert!(feed.snapshot().selected.is_none());
    }

    #[test]
    fn selecting_a_feed_tattoo_reuses_the_record() {
        let (feed, script) = feed_with_initial();
        script.push_view(Ok(1));
        block_on(feed.select("t5"));
        assert_eq!(feed.snapshot().selected.unwrap().id, "t5");
        assert!(script.single_log.borrow().is_empty(), "no detail fetch");
    }

    #[test]
    fn featured_strip_shares_records_with_the_feed() {
        let (feed, script) = feed_with_initial();
        script.push_featured(Ok(vec![tattoo("t2"), tattoo("f1")]));
        block_on(feed.load_featured());
        script.push_like(Ok(9));
        block_on(feed.like("t2"));

        let snapshot = feed.snapshot();
        let in_feed = snapshot.tattoos.iter().find(|t| t.id == "t2").unwrap();
        let in_strip = snapshot.featured.iter().find(|t| t.id == "t2").unwrap();
        assert_eq!(in_feed.likes, 9);
        assert_eq!(in_strip.likes, 9);
    }

    #[test]
    fn listeners_fire_on_mutation_and_stop_after_unsubscribe() {
        let (feed, script) = feed_with_initial();
        let fired = Rc::new(RefCell::new(0u32));
        let counter = fired.clone();
        let key = feed.subscribe(move || *counter.borrow_mut() += 1);

        script.push_page(page(&ids("t", 13, 24), 2, 3));
        block_on(feed.load_more());
        let after_load = *fired.borrow();
        assert!(after_load >= 2, "loading-start and completion both notify");

        feed.unsubscribe(key);
        feed.close_detail();
        assert_eq!(*fired.borrow(), after_load);
    }
}
