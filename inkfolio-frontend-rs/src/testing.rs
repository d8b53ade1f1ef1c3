//! Shared test doubles: a scripted [`PortfolioApi`] and record fixtures.
//!
//! Each endpoint pops its next response from a queue on the shared [`Script`]
//! handle; an unscripted call panics, so a test that hits the network more
//! than it meant to fails loudly. `gate_next_fetch` parks the next tattoo
//! list request on a oneshot so tests can interleave completions.

use crate::api::{ApiError, PortfolioApi, TattooPage};
use crate::feed::InitialFeed;
use futures::channel::oneshot;
use inkfolio_model::{
    Category, CategoryDraft, CategoryPatch, PaginationInfo, ReorderItem, Settings, SettingsUpdate,
    Style, StyleDraft, StylePatch, Tattoo, TattooDraft, TattooFilters, TattooPatch,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
pub struct Script {
    pub tattoo_pages: RefCell<VecDeque<Result<TattooPage, ApiError>>>,
    pub fetch_log: RefCell<Vec<TattooFilters>>,
    pub gates: RefCell<VecDeque<oneshot::Receiver<()>>>,

    pub singles: RefCell<VecDeque<Result<Tattoo, ApiError>>>,
    pub single_log: RefCell<Vec<String>>,
    pub featured: RefCell<VecDeque<Result<Vec<Tattoo>, ApiError>>>,
    pub likes: RefCell<VecDeque<Result<u32, ApiError>>>,
    pub like_log: RefCell<Vec<String>>,
    pub like_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    pub views: RefCell<VecDeque<Result<u32, ApiError>>>,
    pub view_log: RefCell<Vec<String>>,

    pub creates: RefCell<VecDeque<Result<Tattoo, ApiError>>>,
    pub create_log: RefCell<Vec<TattooDraft>>,
    pub updates: RefCell<VecDeque<Result<Tattoo, ApiError>>>,
    pub update_log: RefCell<Vec<(String, TattooPatch)>>,
    pub deletes: RefCell<VecDeque<Result<(), ApiError>>>,
    pub delete_log: RefCell<Vec<String>>,

    pub category_lists: RefCell<VecDeque<Result<Vec<Category>, ApiError>>>,
    pub category_creates: RefCell<VecDeque<Result<Category, ApiError>>>,
    pub category_updates: RefCell<VecDeque<Result<Category, ApiError>>>,
    pub category_deletes: RefCell<VecDeque<Result<(), ApiError>>>,
    pub category_reorders: RefCell<VecDeque<Result<(), ApiError>>>,
    pub category_reorder_log: RefCell<Vec<Vec<ReorderItem>>>,

    pub style_lists: RefCell<VecDeque<Result<Vec<Style>, ApiError>>>,
    pub style_creates: RefCell<VecDeque<Result<Style, ApiError>>>,
    pub style_updates: RefCell<VecDeque<Result<Style, ApiError>>>,
    pub style_deletes: RefCell<VecDeque<Result<(), ApiError>>>,
    pub style_reorders: RefCell<VecDeque<Result<(), ApiError>>>,
    pub style_reorder_log: RefCell<Vec<Vec<ReorderItem>>>,

    pub settings_fetches: RefCell<VecDeque<Result<Settings, ApiError>>>,
    pub settings_updates: RefCell<VecDeque<Result<Settings, ApiError>>>,
    pub settings_update_log: RefCell<Vec<SettingsUpdate>>,
}

impl Script {
    pub fn push_page(&self, page: TattooPage) {
        self.tattoo_pages.borrow_mut().push_back(Ok(page));
    }

    pub fn push_page_err(&self, error: ApiError) {
        self.tattoo_pages.borrow_mut().push_back(Err(error));
    }

    /// The next `fetch_tattoos` call will not complete until the returned
    /// sender fires.
    pub fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn push_single(&self, result: Result<Tattoo, ApiError>) {
        self.singles.borrow_mut().push_back(result);
    }

    pub fn push_featured(&self, result: Result<Vec<Tattoo>, ApiError>) {
        self.featured.borrow_mut().push_back(result);
    }

    pub fn push_like(&self, result: Result<u32, ApiError>) {
        self.likes.borrow_mut().push_back(result);
    }

    /// Park the next `like_tattoo` call until the returned sender fires.
    pub fn gate_next_like(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.like_gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn push_view(&self, result: Result<u32, ApiError>) {
        self.views.borrow_mut().push_back(result);
    }
}

fn pop<T>(queue: &RefCell<VecDeque<T>>, endpoint: &str) -> T {
    queue
        .borrow_mut()
        .pop_front()
        .unwrap_or_else(|| panic!("{endpoint} was called but not scripted"))
}

pub struct FakeApi {
    script: Rc<Script>,
}

impl FakeApi {
    pub fn new() -> (Self, Rc<Script>) {
        let script = Rc::new(Script::default());
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl PortfolioApi for FakeApi {
    async fn fetch_tattoos(&self, filters: &TattooFilters) -> Result<TattooPage, ApiError> {
        self.script.fetch_log.borrow_mut().push(filters.clone());
        // Claim this call's scripted response before parking on the gate, so a
        // later ungated fetch cannot steal the page meant for a gated one.
        let page = pop(&self.script.tattoo_pages, "fetch_tattoos");
        let gate = self.script.gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        page
    }

    async fn fetch_tattoo(&self, id: &str) -> Result<Tattoo, ApiError> {
        self.script.single_log.borrow_mut().push(id.to_string());
        pop(&self.script.singles, "fetch_tattoo")
    }

    async fn fetch_featured(&self) -> Result<Vec<Tattoo>, ApiError> {
        pop(&self.script.featured, "fetch_featured")
    }

    async fn like_tattoo(&self, id: &str) -> Result<u32, ApiError> {
        self.script.like_log.borrow_mut().push(id.to_string());
        let gate = self.script.like_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        pop(&self.script.likes, "like_tattoo")
    }

    async fn increment_view(&self, id: &str) -> Result<u32, ApiError> {
        self.script.view_log.borrow_mut().push(id.to_string());
        pop(&self.script.views, "increment_view")
    }

    async fn create_tattoo(&self, draft: &TattooDraft) -> Result<Tattoo, ApiError> {
        self.script.create_log.borrow_mut().push(draft.clone());
        pop(&self.script.creates, "create_tattoo")
    }

    async fn update_tattoo(&self, id: &str, patch: &TattooPatch) -> Result<Tattoo, ApiError> {
        self.script
            .update_log
            .borrow_mut()
            .push((id.to_string(), patch.clone()));
        pop(&self.script.updates, "update_tattoo")
    }

    async fn delete_tattoo(&self, id: &str) -> Result<(), ApiError> {
        self.script.delete_log.borrow_mut().push(id.to_string());
        pop(&self.script.deletes, "delete_tattoo")
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        pop(&self.script.category_lists, "fetch_categories")
    }

    async fn create_category(&self, _draft: &CategoryDraft) -> Result<Category, ApiError> {
        pop(&self.script.category_creates, "create_category")
    }

    async fn update_category(&self, _id: &str, _patch: &CategoryPatch) -> Result<Category, ApiError> {
        pop(&self.script.category_updates, "update_category")
    }

    async fn delete_category(&self, _id: &str) -> Result<(), ApiError> {
        pop(&self.script.category_deletes, "delete_category")
    }

    async fn reorder_categories(&self, order: &[ReorderItem]) -> Result<(), ApiError> {
        self.script
            .category_reorder_log
            .borrow_mut()
            .push(order.to_vec());
        pop(&self.script.category_reorders, "reorder_categories")
    }

    async fn fetch_styles(&self) -> Result<Vec<Style>, ApiError> {
        pop(&self.script.style_lists, "fetch_styles")
    }

    async fn create_style(&self, _draft: &StyleDraft) -> Result<Style, ApiError> {
        pop(&self.script.style_creates, "create_style")
    }

    async fn update_style(&self, _id: &str, _patch: &StylePatch) -> Result<Style, ApiError> {
        pop(&self.script.style_updates, "update_style")
    }

    async fn delete_style(&self, _id: &str) -> Result<(), ApiError> {
        pop(&self.script.style_deletes, "delete_style")
    }

    async fn reorder_styles(&self, order: &[ReorderItem]) -> Result<(), ApiError> {
        self.script
            .style_reorder_log
            .borrow_mut()
            .push(order.to_vec());
        pop(&self.script.style_reorders, "reorder_styles")
    }

    async fn fetch_settings(&self) -> Result<Settings, ApiError> {
        pop(&self.script.settings_fetches, "fetch_settings")
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ApiError> {
        self.script
            .settings_update_log
            .borrow_mut()
            .push(update.clone());
        pop(&self.script.settings_updates, "update_settings")
    }
}

pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: None,
        color: String::new(),
        icon: None,
        image: None,
        is_active: true,
        position: 0,
        tattoo_count: 0,
        created_at: None,
        updated_at: None,
    }
}

pub fn style(id: &str, name: &str) -> Style {
    Style {
        id: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: None,
        is_active: true,
        position: 0,
        tattoo_count: 0,
        created_at: None,
        updated_at: None,
    }
}

pub fn tattoo(id: &str) -> Tattoo {
    Tattoo {
        id: id.to_string(),
        title: format!("Tattoo {id}"),
        description: String::new(),
        images: Vec::new(),
        category: category("c1", "Blackwork"),
        style: style("s1", "Tradicional"),
        tags: Vec::new(),
        size: Default::default(),
        duration: None,
        body_part: Default::default(),
        is_portfolio: true,
        is_featured: false,
        is_published: true,
        views: 0,
        likes: 0,
        position: 0,
        created_at: None,
        updated_at: None,
    }
}

pub fn page(ids: &[String], page_no: u32, pages: u32) -> TattooPage {
    TattooPage {
        tattoos: ids.iter().map(|id| tattoo(id)).collect(),
        pagination: Some(PaginationInfo {
            page: page_no,
            limit: 12,
            total: pages * 12,
            pages,
        }),
    }
}

pub fn initial_feed(ids: &[String], page_no: u32, pages: u32) -> InitialFeed {
    let page = page(ids, page_no, pages);
    InitialFeed {
        tattoos: page.tattoos,
        pagination: page.pagination,
    }
}
