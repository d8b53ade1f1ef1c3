use serde::{Deserialize, Serialize};

use crate::tattoo::{BodyPart, TattooSize};

/// Default gallery page size.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Likes,
    Views,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::Likes => "likes",
            SortKey::Views => "views",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// The normalized query driving gallery requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TattooFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<BodyPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<TattooSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for TattooFilters {
    fn default() -> Self {
        Self {
            category: None,
            style: None,
            body_part: None,
            size: None,
            featured: None,
            search: None,
            sort_by: SortKey::default(),
            order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TattooFilters {
    /// True when both filter sets describe the same query, ignoring the page
    /// cursor. Responses from a fetch whose filters no longer `same_query` the
    /// current state are stale and must be dropped.
    pub fn same_query(&self, other: &Self) -> bool {
        self.category == other.category
            && self.style == other.style
            && self.body_part == other.body_part
            && self.size == other.size
            && self.featured == other.featured
            && self.search == other.search
            && self.sort_by == other.sort_by
            && self.order == other.order
            && self.limit == other.limit
    }

    /// Key/value pairs in the order the backend documents them. Values are
    /// not yet percent-encoded.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("order", self.order.as_str().to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(style) = &self.style {
            pairs.push(("style", style.clone()));
        }
        if let Some(body_part) = self.body_part {
            pairs.push(("bodyPart", body_part.as_str().to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.as_str().to_string()));
        }
        if let Some(featured) = self.featured {
            pairs.push(("featured", featured.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// A partial filter update. Each field has three states on the wire: absent
/// (leave unchanged), `null` (clear the constraint), or a value (set it).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub style: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub body_part: Option<Option<BodyPart>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub size: Option<Option<TattooSize>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub featured: Option<Option<bool>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub search: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl FilterPatch {
    /// Merge this patch into `filters`. Any update resets the page cursor to
    /// 1, whether or not a constraint actually changed.
    pub fn apply(self, filters: &mut TattooFilters) {
        if let Some(category) = self.category {
            filters.category = category;
        }
        if let Some(style) = self.style {
            filters.style = style;
        }
        if let Some(body_part) = self.body_part {
            filters.body_part = body_part;
        }
        if let Some(size) = self.size {
            filters.size = size;
        }
        if let Some(featured) = self.featured {
            filters.featured = featured;
        }
        if let Some(search) = self.search {
            // A blank search box means "no search constraint".
            filters.search = search.filter(|s| !s.trim().is_empty());
        }
        if let Some(sort_by) = self.sort_by {
            filters.sort_by = sort_by;
        }
        if let Some(order) = self.order {
            filters.order = order;
        }
        if let Some(limit) = self.limit {
            filters.limit = limit.max(1);
        }
        filters.page = 1;
    }

    pub fn category(value: impl Into<String>) -> Self {
        Self {
            category: Some(Some(value.into())),
            ..Default::default()
        }
    }

    pub fn search(value: impl Into<String>) -> Self {
        Self {
            search: Some(Some(value.into())),
            ..Default::default()
        }
    }
}

/// Serde helper distinguishing an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
