//! The REST surface the gallery consumes, as a port.
//!
//! [`PortfolioApi`] is implemented by the web-sys fetch client on wasm and by
//! a scripted fake in tests. Envelope unwrapping and query building are plain
//! string functions so they are covered by native tests.

use inkfolio_model::{
    ApiEnvelope, ApiStatus, Category, CategoryDraft, CategoryPatch, PaginatedTattoos,
    PaginationInfo, ReorderItem, Settings, SettingsUpdate, Style, StyleDraft, StylePatch, Tattoo,
    TattooDraft, TattooFilters, TattooPatch,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("server returned http {code}: {message}")]
    Status { code: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// One page of gallery results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TattooPage {
    pub tattoos: Vec<Tattoo>,
    pub pagination: Option<PaginationInfo>,
}

/// Logical operations of the portfolio backend. Transport lives behind this
/// trait; the feed controller never sees a URL.
#[allow(async_fn_in_trait)]
pub trait PortfolioApi {
    async fn fetch_tattoos(&self, filters: &TattooFilters) -> Result<TattooPage, ApiError>;
    async fn fetch_tattoo(&self, id: &str) -> Result<Tattoo, ApiError>;
    async fn fetch_featured(&self) -> Result<Vec<Tattoo>, ApiError>;
    async fn like_tattoo(&self, id: &str) -> Result<u32, ApiError>;
    async fn increment_view(&self, id: &str) -> Result<u32, ApiError>;

    async fn create_tattoo(&self, draft: &TattooDraft) -> Result<Tattoo, ApiError>;
    async fn update_tattoo(&self, id: &str, patch: &TattooPatch) -> Result<Tattoo, ApiError>;
    async fn delete_tattoo(&self, id: &str) -> Result<(), ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, ApiError>;
    async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, ApiError>;
    async fn delete_category(&self, id: &str) -> Result<(), ApiError>;
    async fn reorder_categories(&self, order: &[ReorderItem]) -> Result<(), ApiError>;

    async fn fetch_styles(&self) -> Result<Vec<Style>, ApiError>;
    async fn create_style(&self, draft: &StyleDraft) -> Result<Style, ApiError>;
    async fn update_style(&self, id: &str, patch: &StylePatch) -> Result<Style, ApiError>;
    async fn delete_style(&self, id: &str) -> Result<(), ApiError>;
    async fn reorder_styles(&self, order: &[ReorderItem]) -> Result<(), ApiError>;

    async fn fetch_settings(&self) -> Result<Settings, ApiError>;
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ApiError>;
}

// Everything except RFC 3986 unreserved characters gets escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// `?page=1&limit=12&...` for the tattoo list endpoint.
pub fn filters_query(filters: &TattooFilters) -> String {
    let query = filters
        .to_query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={}", encode_component(&value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{query}")
}

/// Unwrap `{status, data, message}`, surfacing a backend rejection or a
/// missing body as distinct errors.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    match envelope.status {
        ApiStatus::Success => envelope
            .data
            .ok_or_else(|| ApiError::Malformed("success response without data".to_string())),
        ApiStatus::Error => Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "unspecified server error".to_string()),
        )),
    }
}

/// Unwrap an envelope whose payload does not matter (deletes, reorders).
pub(crate) fn parse_ack(body: &str) -> Result<(), ApiError> {
    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    match envelope.status {
        ApiStatus::Success => Ok(()),
        ApiStatus::Error => Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "unspecified server error".to_string()),
        )),
    }
}

/// Unwrap the paginated tattoo list shape.
pub(crate) fn parse_tattoo_page(body: &str) -> Result<TattooPage, ApiError> {
    let response: PaginatedTattoos =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    match response.status {
        ApiStatus::Success => Ok(TattooPage {
            tattoos: response.data.unwrap_or_default().tattoos,
            pagination: response.pagination,
        }),
        ApiStatus::Error => Err(ApiError::Rejected(
            response
                .message
                .unwrap_or_else(|| "unspecified server error".to_string()),
        )),
    }
}
