//! Management operations layered on the same store the gallery reads.
//!
//! None of these are optimistic: a record or cache entry only changes when
//! the server has answered, and it changes to exactly what the server
//! returned. Errors are returned to the caller so the admin UI can show them.

use crate::api::{ApiError, PortfolioApi};
use crate::feed::FeedController;
use inkfolio_model::{
    Category, CategoryDraft, CategoryPatch, ReorderItem, Settings, SettingsUpdate, Style,
    StyleDraft, StylePatch, Tattoo, TattooDraft, TattooPatch,
};
use keepsake::StorageBackend;

impl<A: PortfolioApi, B: StorageBackend> FeedController<A, B> {
    pub fn categories(&self) -> Vec<Category> {
        self.state.borrow().categories.clone()
    }

    pub fn styles(&self) -> Vec<Style> {
        self.state.borrow().styles.clone()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.state.borrow().settings.clone()
    }

    /// Fetch both catalogs used by the filter bar and the admin forms.
    pub async fn load_catalogs(&self) -> Result<(), ApiError> {
        let categories = self.api.fetch_categories().await?;
        let styles = self.api.fetch_styles().await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        state.categories = categories;
        state.styles = styles;
        Ok(())
    }

    /// New work lands at the top of the feed.
    pub async fn create_tattoo(&self, draft: &TattooDraft) -> Result<Tattoo, ApiError> {
        let created = self.api.create_tattoo(draft).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        state.order.shift_insert(0, created.id.clone());
        state.records.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    /// Patch a tattoo and adopt whatever the server made of it.
    pub async fn update_tattoo(&self, id: &str, patch: &TattooPatch) -> Result<Tattoo, ApiError> {
        let updated = self.api.update_tattoo(id, patch).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        state.records.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    pub async fn set_featured(&self, id: &str, featured: bool) -> Result<Tattoo, ApiError> {
        self.update_tattoo(id, &TattooPatch::featured(featured)).await
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Tattoo, ApiError> {
        self.update_tattoo(id, &TattooPatch::published(published)).await
    }

    pub async fn delete_tattoo(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_tattoo(id).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        state.order.shift_remove(id);
        state.featured.retain(|f| f != id);
        if state.selected.as_deref() == Some(id) {
            state.selected = None;
        }
        state.records.remove(id);
        Ok(())
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, ApiError> {
        let created = self.api.create_category(draft).await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().categories.push(created.clone());
        Ok(created)
    }

    pub async fn update_category(
        &self,
        id: &str,
        patch: &CategoryPatch,
    ) -> Result<Category, ApiError> {
        let updated = self.api.update_category(id, patch).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.categories.iter_mut().find(|c| c.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_category(id).await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Persist a drag-reorder of the categories. Positions are the indexes of
    /// `ordered_ids`; the cache only reorders once the server has accepted.
    pub async fn reorder_categories(&self, ordered_ids: &[String]) -> Result<(), ApiError> {
        let batch = reorder_batch(ordered_ids);
        self.api.reorder_categories(&batch).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        for category in &mut state.categories {
            if let Some(item) = batch.iter().find(|i| i.id == category.id) {
                category.position = item.position;
            }
        }
        state.categories.sort_by_key(|c| c.position);
        Ok(())
    }

    pub async fn create_style(&self, draft: &StyleDraft) -> Result<Style, ApiError> {
        let created = self.api.create_style(draft).await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().styles.push(created.clone());
        Ok(created)
    }

    pub async fn update_style(&self, id: &str, patch: &StylePatch) -> Result<Style, ApiError> {
        let updated = self.api.update_style(id, patch).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.styles.iter_mut().find(|s| s.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_style(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_style(id).await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().styles.retain(|s| s.id != id);
        Ok(())
    }

    pub async fn reorder_styles(&self, ordered_ids: &[String]) -> Result<(), ApiError> {
        let batch = reorder_batch(ordered_ids);
        self.api.reorder_styles(&batch).await?;
        let _flush = self.notify_later();
        let mut state = self.state.borrow_mut();
        for style in &mut state.styles {
            if let Some(item) = batch.iter().find(|i| i.id == style.id) {
                style.position = item.position;
            }
        }
        state.styles.sort_by_key(|s| s.position);
        Ok(())
    }

    pub async fn load_settings(&self) -> Result<Settings, ApiError> {
        let settings = self.api.fetch_settings().await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().settings = Some(settings.clone());
        Ok(settings)
    }

    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<Settings, ApiError> {
        let saved = self.api.update_settings(update).await?;
        let _flush = self.notify_later();
        self.state.borrow_mut().settings = Some(saved.clone());
        Ok(saved)
    }
}

fn reorder_batch(ordered_ids: &[String]) -> Vec<ReorderItem> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(index, id)| ReorderItem {
            id: id.clone(),
            position: index as i32,
        })
        .collect()
}
