//! Ordered category lookup used when rendering task badges.

use std::collections::HashMap;

use taskdeck_core::{Category, CategoryId, TaskError};
use tracing::debug;

use crate::async_store::AsyncCategoryStore;

/// Badge color tokens understood by front ends. Anything else renders as [`NEUTRAL_BADGE`].
pub const BADGE_COLORS: [&str; 6] = ["primary", "secondary", "accent", "success", "warning", "error"];

/// Fallback badge color for unknown tokens.
pub const NEUTRAL_BADGE: &str = "neutral";

/// Categories in ascending `order_index` with an id index.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
    index: HashMap<CategoryId, usize>,
}

impl CategoryCatalog {
    /// Build a catalog; input order is normalized to ascending `order_index`, then id.
    #[must_use]
    pub fn new(mut categories: Vec<Category>) -> Self {
        categories.sort_by_key(|category| (category.order_index, category.id));
        let index = categories
            .iter()
            .enumerate()
            .map(|(idx, category)| (category.id, idx))
            .collect();
        Self { categories, index }
    }

    /// Fetch every category from `store`.
    ///
    /// # Errors
    /// Returns the store failure translated into [`TaskError`].
    pub async fn load<S: AsyncCategoryStore>(store: &S) -> Result<Self, TaskError> {
        let categories = store.fetch_categories().await.map_err(Into::<TaskError>::into)?;
        debug!(count = categories.len(), "Loaded categories");
        Ok(Self::new(categories))
    }

    /// Category for `id`; `None` for dangling references, which render without a badge.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.index.get(&id).and_then(|&idx| self.categories.get(idx))
    }

    /// Categories in display order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Badge color for `id`, or `None` when the category is unknown.
    #[must_use]
    pub fn badge_color(&self, id: CategoryId) -> Option<&'static str> {
        self.get(id).map(|category| badge_color(&category.color))
    }
}

impl<'a> IntoIterator for &'a CategoryCatalog {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Map a stored color to a known badge token.
#[must_use]
pub fn badge_color(color: &str) -> &'static str {
    BADGE_COLORS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(color.trim()))
        .copied()
        .unwrap_or(NEUTRAL_BADGE)
}
