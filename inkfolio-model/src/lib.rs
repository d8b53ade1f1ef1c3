//! Shared data model for the Inkfolio portfolio frontend.
//!
//! Everything here mirrors the REST backend's wire format (camelCase JSON,
//! `_id` identifiers, Spanish enum literals for sizes and body parts), so the
//! frontend crate can deserialize responses directly and hand the same shapes
//! across the wasm boundary to the UI.

mod catalog;
mod filters;
mod settings;
mod tattoo;
mod wire;

pub use catalog::{
    Category, CategoryDraft, CategoryImage, CategoryPatch, ReorderItem, Style, StyleDraft,
    StylePatch,
};
pub use filters::{DEFAULT_PAGE_SIZE, FilterPatch, SortKey, SortOrder, TattooFilters};
pub use settings::{
    AboutSettings, BackgroundSize, FooterSettings, HeroSettings, HeroSource, Settings,
    SettingsUpdate,
};
pub use tattoo::{BodyPart, Tattoo, TattooDraft, TattooImage, TattooPatch, TattooSize};
pub use wire::{ApiEnvelope, ApiStatus, PaginatedTattoos, PaginationInfo, TattooList};
