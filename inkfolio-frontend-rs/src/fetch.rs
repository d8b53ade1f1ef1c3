//! The browser transport: [`PortfolioApi`] over `window.fetch`.

use crate::api::{
    filters_query, parse_ack, parse_envelope, parse_tattoo_page, ApiError, PortfolioApi,
    TattooPage,
};
use inkfolio_model::{
    ApiEnvelope, Category, CategoryDraft, CategoryPatch, ReorderItem, Settings, SettingsUpdate,
    Style, StyleDraft, StylePatch, Tattoo, TattooDraft, TattooFilters, TattooPatch,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

pub struct FetchApi {
    base_url: String,
    auth_token: RefCell<Option<String>>,
}

impl FetchApi {
    /// `base_url` is the API origin, e.g. `https://studio.example`. Paths are
    /// appended as-is, so pass it without a trailing slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: RefCell::new(None),
        }
    }

    /// Bearer token sent with every request from now on. `None` clears it.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.borrow_mut() = token;
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let init = RequestInit::new();
        init.set_method(method);
        let headers = Headers::new().map_err(js_err)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
        if let Some(token) = self.auth_token.borrow().as_deref() {
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(js_err)?;
        }
        init.set_headers(&headers);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(&body));
        }
        let url = format!("{}{path}", self.base_url);
        let request = Request::new_with_str_and_init(&url, &init).map_err(js_err)?;
        let window =
            web_sys::window().ok_or_else(|| ApiError::Transport("no window object".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = response.dyn_into().map_err(js_err)?;
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        let body = text.as_string().unwrap_or_default();
        if !response.ok() {
            // Non-2xx bodies usually still carry the standard envelope.
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| response.status_text());
            return Err(ApiError::Status {
                code: response.status(),
                message,
            });
        }
        Ok(body)
    }

    async fn get(&self, path: &str) -> Result<String, ApiError> {
        self.request("GET", path, None).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: &str,
        path: &str,
        payload: &T,
    ) -> Result<String, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.request(method, path, Some(body)).await
    }
}

fn js_err(value: JsValue) -> ApiError {
    ApiError::Transport(format!("{value:?}"))
}

fn id_path(prefix: &str, id: &str) -> String {
    format!("{prefix}/{}", crate::api::encode_component(id))
}

#[derive(Deserialize)]
struct TattooData {
    tattoo: Tattoo,
}

#[derive(Deserialize)]
struct TattoosData {
    tattoos: Vec<Tattoo>,
}

#[derive(Deserialize)]
struct LikesData {
    likes: u32,
}

#[derive(Deserialize)]
struct ViewsData {
    views: u32,
}

#[derive(Deserialize)]
struct CategoryData {
    category: Category,
}

#[derive(Deserialize)]
struct CategoriesData {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct StyleData {
    style: Style,
}

#[derive(Deserialize)]
struct StylesData {
    styles: Vec<Style>,
}

#[derive(Deserialize)]
struct SettingsData {
    settings: Settings,
}

#[derive(Serialize)]
struct CategoryReorder<'a> {
    categories: &'a [ReorderItem],
}

#[derive(Serialize)]
struct StyleReorder<'a> {
    styles: &'a [ReorderItem],
}

impl PortfolioApi for FetchApi {
    async fn fetch_tattoos(&self, filters: &TattooFilters) -> Result<TattooPage, ApiError> {
        let body = self
            .get(&format!("/api/tattoos{}", filters_query(filters)))
            .await?;
        parse_tattoo_page(&body)
    }

    async fn fetch_tattoo(&self, id: &str) -> Result<Tattoo, ApiError> {
        let body = self.get(&id_path("/api/tattoos", id)).await?;
        Ok(parse_envelope::<TattooData>(&body)?.tattoo)
    }

    async fn fetch_featured(&self) -> Result<Vec<Tattoo>, ApiError> {
        let body = self.get("/api/tattoos/featured").await?;
        Ok(parse_envelope::<TattoosData>(&body)?.tattoos)
    }

    async fn like_tattoo(&self, id: &str) -> Result<u32, ApiError> {
        let path = format!("{}/like", id_path("/api/tattoos", id));
        let body = self.request("POST", &path, None).await?;
        Ok(parse_envelope::<LikesData>(&body)?.likes)
    }

    async fn increment_view(&self, id: &str) -> Result<u32, ApiError> {
        let path = format!("{}/view", id_path("/api/tattoos", id));
        let body = self.request("POST", &path, None).await?;
        Ok(parse_envelope::<ViewsData>(&body)?.views)
    }

    async fn create_tattoo(&self, draft: &TattooDraft) -> Result<Tattoo, ApiError> {
        let body = self.send_json("POST", "/api/tattoos", draft).await?;
        Ok(parse_envelope::<TattooData>(&body)?.tattoo)
    }

    async fn update_tattoo(&self, id: &str, patch: &TattooPatch) -> Result<Tattoo, ApiError> {
        let body = self
            .send_json("PUT", &id_path("/api/tattoos", id), patch)
            .await?;
        Ok(parse_envelope::<TattooData>(&body)?.tattoo)
    }

    async fn delete_tattoo(&self, id: &str) -> Result<(), ApiError> {
        let body = self.request("DELETE", &id_path("/api/tattoos", id), None).await?;
        parse_ack(&body)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let body = self.get("/api/categories").await?;
        Ok(parse_envelope::<CategoriesData>(&body)?.categories)
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, ApiError> {
        let body = self.send_json("POST", "/api/categories", draft).await?;
        Ok(parse_envelope::<CategoryData>(&body)?.category)
    }

    async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, ApiError> {
        let body = self
            .send_json("PUT", &id_path("/api/categories", id), patch)
            .await?;
        Ok(parse_envelope::<CategoryData>(&body)?.category)
    }

    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        let body = self
            .request("DELETE", &id_path("/api/categories", id), None)
            .await?;
        parse_ack(&body)
    }

    async fn reorder_categories(&self, order: &[ReorderItem]) -> Result<(), ApiError> {
        let body = self
            .send_json(
                "PUT",
                "/api/categories/reorder",
                &CategoryReorder { categories: order },
            )
            .await?;
        parse_ack(&body)
    }

    async fn fetch_styles(&self) -> Result<Vec<Style>, ApiError> {
        let body = self.get("/api/styles").await?;
        Ok(parse_envelope::<StylesData>(&body)?.styles)
    }

    async fn create_style(&self, draft: &StyleDraft) -> Result<Style, ApiError> {
        let body = self.send_json("POST", "/api/styles", draft).await?;
        Ok(parse_envelope::<StyleData>(&body)?.style)
    }

    async fn update_style(&self, id: &str, patch: &StylePatch) -> Result<Style, ApiError> {
        let body = self
            .send_json("PUT", &id_path("/api/styles", id), patch)
            .await?;
        Ok(parse_envelope::<StyleData>(&body)?.style)
    }

    async fn delete_style(&self, id: &str) -> Result<(), ApiError> {
        let body = self
            .request("DELETE", &id_path("/api/styles", id), None)
            .await?;
        parse_ack(&body)
    }

    async fn reorder_styles(&self, order: &[ReorderItem]) -> Result<(), ApiError> {
        let body = self
            .send_json("PUT", "/api/styles/reorder", &StyleReorder { styles: order })
            .await?;
        parse_ack(&body)
    }

    async fn fetch_settings(&self) -> Result<Settings, ApiError> {
        let body = self.get("/api/settings").await?;
        Ok(parse_envelope::<SettingsData>(&body)?.settings)
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ApiError> {
        let body = self.send_json("PUT", "/api/settings", update).await?;
        Ok(parse_envelope::<SettingsData>(&body)?.settings)
    }
}
