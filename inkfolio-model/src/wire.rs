use serde::{Deserialize, Serialize};

use crate::tattoo::Tattoo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// The backend's standard response envelope: `{status, data?, message?}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: ApiStatus,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// `#[serde(default)]` on a generic field requires T: Default; this does not.
fn none<T>() -> Option<T> {
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TattooList {
    #[serde(default)]
    pub tattoos: Vec<Tattoo>,
}

/// The paginated list envelope: `{status, results, pagination, data: {tattoos}}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatedTattoos {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TattooList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_error_without_data() {
        let envelope: ApiEnvelope<TattooList> =
            serde_json::from_str(r#"{"status": "error", "message": "No encontrado"}"#).unwrap();
        assert_eq!(envelope.status, ApiStatus::Error);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("No encontrado"));
    }

    #[test]
    fn paginated_response_parses_backend_shape() {
        let json = r#"{
            "status": "success",
            "results": 1,
            "pagination": {"page": 2, "limit": 12, "total": 30, "pages": 3},
            "data": {"tattoos": []}
        }"#;
        let page: PaginatedTattoos = serde_json::from_str(json).unwrap();
        assert_eq!(page.pagination.unwrap().pages, 3);
        assert!(page.data.unwrap().tattoos.is_empty());
    }

    #[test]
    fn paginated_response_tolerates_missing_pagination() {
        let page: PaginatedTattoos =
            serde_json::from_str(r#"{"status": "success", "data": {"tattoos": []}}"#).unwrap();
        assert!(page.pagination.is_none());
    }
}
