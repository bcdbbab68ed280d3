//! Hierarchical event categories.
//!
//! # Invariants
//! - `slug` is lowercase ASCII alphanumerics separated by single hyphens.
//! - A category's parent is created before the category itself.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned category identifier.
pub type CategoryId = i64;

/// One node of the `event_category` taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub label: String,
    pub parent_id: Option<CategoryId>,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCategory {
    pub label: String,
    /// Derived from `label` when absent.
    pub slug: Option<String>,
    pub parent_id: Option<CategoryId>,
}

impl NewCategory {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Returns the validated `(label, slug)` pair.
    pub fn normalized(&self) -> Result<(String, String), CategoryValidationError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(CategoryValidationError::EmptyLabel);
        }
        let source = self.slug.as_deref().unwrap_or(label);
        let slug = normalize_slug(source)
            .ok_or_else(|| CategoryValidationError::InvalidSlug(source.to_string()))?;
        Ok((label.to_string(), slug))
    }
}

/// Normalizes free text into a category slug.
///
/// Returns `None` when nothing slug-worthy remains.
pub fn normalize_slug(value: &str) -> Option<String> {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyLabel,
    InvalidSlug(String),
}

impl Display for CategoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "category label cannot be empty"),
            Self::InvalidSlug(value) => write!(f, "cannot derive a category slug from `{value}`"),
        }
    }
}

impl Error for CategoryValidationError {}
