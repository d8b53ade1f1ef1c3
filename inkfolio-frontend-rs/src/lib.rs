//! Browser controller for a tattoo studio's portfolio gallery.
//!
//! The host page renders the shell and hands control of the feed to
//! [`Gallery`]: filtered infinite scroll, a detail view with view counts, a
//! once-per-browser like gesture, and the management operations behind the
//! admin screens. All state lives in one store; the UI subscribes and
//! re-renders from [`FeedController::snapshot`] whenever anything changes.
//!
//! Everything except the transport and the `localStorage` backend runs on
//! native targets too, which is where the tests live.

mod admin;
mod api;
mod feed;
#[cfg(target_arch = "wasm32")]
mod fetch;
mod likes;
#[cfg(test)]
pub(crate) mod testing;

pub use api::{filters_query, ApiError, PortfolioApi, TattooPage};
pub use feed::{FeedController, FeedSnapshot, InitialFeed, ListenerKey};
pub use likes::{LikeAttempt, LikeLedger, LIKED_TATTOOS_KEY};

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchApi;
#[cfg(target_arch = "wasm32")]
pub use app::{Gallery, GalleryConfig, Subscription};

#[cfg(target_arch = "wasm32")]
mod app {
    use crate::fetch::FetchApi;
    use crate::feed::{FeedController, FeedSnapshot, InitialFeed, ListenerKey};
    use inkfolio_model::{
        CategoryDraft, CategoryPatch, FilterPatch, SettingsUpdate, StyleDraft, StylePatch,
        TattooDraft, TattooPatch,
    };
    use keepsake::LocalStorageBackend;
    use serde::Deserialize;
    use std::rc::Rc;
    use std::sync::LazyLock;
    use tsify::Tsify;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{future_to_promise, spawn_local};

    // One-time logging and panic setup, touched by the constructor.
    static LOGGER: LazyLock<()> = LazyLock::new(|| {
        wasm_logger::init(wasm_logger::Config::default());
        #[cfg(feature = "console_error_panic_hook")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    });

    #[derive(Debug, Default, Deserialize, Tsify)]
    #[tsify(from_wasm_abi)]
    #[serde(rename_all = "camelCase")]
    pub struct GalleryConfig {
        /// API origin without a trailing slash. Empty means same-origin.
        #[serde(default)]
        pub base_url: String,
        /// Bearer token for the admin operations, when signed in.
        #[serde(default)]
        pub auth_token: Option<String>,
        /// The server-rendered first batch, if the page shipped one.
        #[serde(default)]
        pub initial: Option<InitialFeed>,
    }

    #[wasm_bindgen]
    pub struct Subscription {
        key: ListenerKey,
    }

    #[wasm_bindgen]
    pub struct Gallery {
        feed: Rc<FeedController<FetchApi, LocalStorageBackend>>,
    }

    fn to_js(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    #[wasm_bindgen]
    impl Gallery {
        #[wasm_bindgen(constructor)]
        pub fn new(config: GalleryConfig) -> Result<Gallery, JsValue> {
            let _ = &*LOGGER;
            let api = FetchApi::new(config.base_url);
            api.set_auth_token(config.auth_token);
            let backend = LocalStorageBackend::new().map_err(to_js)?;
            let feed = FeedController::new(api, backend, config.initial);
            Ok(Gallery {
                feed: Rc::new(feed),
            })
        }

        pub fn snapshot(&self) -> FeedSnapshot {
            self.feed.snapshot()
        }

        pub fn subscribe(&self, callback: js_sys::Function) -> Subscription {
            let key = self.feed.subscribe(move || {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    log::error!("gallery listener threw: {e:?}");
                }
            });
            Subscription { key }
        }

        pub fn unsubscribe(&self, subscription: Subscription) {
            self.feed.unsubscribe(subscription.key);
        }

        #[wasm_bindgen(js_name = setAuthToken)]
        pub fn set_auth_token(&self, token: Option<String>) {
            self.feed.api.set_auth_token(token);
        }

        // Feed gestures are fire-and-forget; the UI hears about the outcome
        // through its subscription.

        pub fn refresh(&self) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.refresh().await });
        }

        #[wasm_bindgen(js_name = applyFilters)]
        pub fn apply_filters(&self, patch: FilterPatch) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.apply_filters(patch).await });
        }

        #[wasm_bindgen(js_name = clearFilters)]
        pub fn clear_filters(&self) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.clear_filters().await });
        }

        #[wasm_bindgen(js_name = loadMore)]
        pub fn load_more(&self) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.load_more().await });
        }

        #[wasm_bindgen(js_name = loadFeatured)]
        pub fn load_featured(&self) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.load_featured().await });
        }

        pub fn select(&self, id: String) {
            let feed = self.feed.clone();
            spawn_local(async move { feed.select(&id).await });
        }

        #[wasm_bindgen(js_name = closeDetail)]
        pub fn close_detail(&self) {
            self.feed.close_detail();
        }

        pub fn like(&self, id: String) {
            let feed = self.feed.clone();
            spawn_local(async move {
                feed.like(&id).await;
            });
        }

        #[wasm_bindgen(js_name = isLiked)]
        pub fn is_liked(&self, id: String) -> bool {
            self.feed.is_liked(&id)
        }

        // Admin operations resolve to the server's record, or reject with a
        // message the form can show.

        #[wasm_bindgen(js_name = loadCatalogs)]
        pub fn load_catalogs(&self) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.load_catalogs().await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        #[wasm_bindgen(js_name = createTattoo)]
        pub fn create_tattoo(&self, draft: TattooDraft) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let tattoo = feed.create_tattoo(&draft).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&tattoo).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = updateTattoo)]
        pub fn update_tattoo(&self, id: String, patch: TattooPatch) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let tattoo = feed.update_tattoo(&id, &patch).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&tattoo).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = setFeatured)]
        pub fn set_featured(&self, id: String, featured: bool) -> js_sys::Promise {
            self.update_tattoo(id, TattooPatch::featured(featured))
        }

        #[wasm_bindgen(js_name = setPublished)]
        pub fn set_published(&self, id: String, published: bool) -> js_sys::Promise {
            self.update_tattoo(id, TattooPatch::published(published))
        }

        #[wasm_bindgen(js_name = deleteTattoo)]
        pub fn delete_tattoo(&self, id: String) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.delete_tattoo(&id).await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        pub fn categories(&self) -> Result<JsValue, JsValue> {
            serde_wasm_bindgen::to_value(&self.feed.categories()).map_err(to_js)
        }

        pub fn styles(&self) -> Result<JsValue, JsValue> {
            serde_wasm_bindgen::to_value(&self.feed.styles()).map_err(to_js)
        }

        #[wasm_bindgen(js_name = createCategory)]
        pub fn create_category(&self, draft: CategoryDraft) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let category = feed.create_category(&draft).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&category).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = updateCategory)]
        pub fn update_category(&self, id: String, patch: CategoryPatch) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let category = feed.update_category(&id, &patch).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&category).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = deleteCategory)]
        pub fn delete_category(&self, id: String) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.delete_category(&id).await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        #[wasm_bindgen(js_name = reorderCategories)]
        pub fn reorder_categories(&self, ordered_ids: Vec<String>) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.reorder_categories(&ordered_ids).await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        #[wasm_bindgen(js_name = createStyle)]
        pub fn create_style(&self, draft: StyleDraft) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let style = feed.create_style(&draft).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&style).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = updateStyle)]
        pub fn update_style(&self, id: String, patch: StylePatch) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let style = feed.update_style(&id, &patch).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&style).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = deleteStyle)]
        pub fn delete_style(&self, id: String) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.delete_style(&id).await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        #[wasm_bindgen(js_name = reorderStyles)]
        pub fn reorder_styles(&self, ordered_ids: Vec<String>) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                feed.reorder_styles(&ordered_ids).await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        #[wasm_bindgen(js_name = loadSettings)]
        pub fn load_settings(&self) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let settings = feed.load_settings().await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&settings).map_err(to_js)
            })
        }

        #[wasm_bindgen(js_name = saveSettings)]
        pub fn save_settings(&self, update: SettingsUpdate) -> js_sys::Promise {
            let feed = self.feed.clone();
            future_to_promise(async move {
                let settings = feed.save_settings(&update).await.map_err(to_js)?;
                serde_wasm_bindgen::to_value(&settings).map_err(to_js)
            })
        }
    }
}
