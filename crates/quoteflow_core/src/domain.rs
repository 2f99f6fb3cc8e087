//! crates/quoteflow_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs double as the wire and persistence format, so their serde
//! representation is part of the public contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Theme color used for category ids that are not in the catalog.
pub const DEFAULT_CATEGORY_COLOR: &str = "blue";

/// The static category catalog: `(id, display name, theme color)`.
pub const CATEGORIES: [(&str, &str, &str); 6] = [
    ("romantic", "Romantic", "rose"),
    ("inspirational", "Inspirational", "blue"),
    ("motivational", "Motivational", "orange"),
    ("wisdom", "Wisdom", "purple"),
    ("success", "Success", "emerald"),
    ("life", "Life", "cyan"),
];

/// A thematic tag for quotes, with its display label and theme color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    /// Resolves a category id against the catalog.
    ///
    /// Ids outside the catalog still resolve: the name becomes a title-cased
    /// rendering of the id and the color falls back to [`DEFAULT_CATEGORY_COLOR`].
    pub fn resolve(id: &str) -> Self {
        let color = CATEGORIES
            .iter()
            .find(|(known, _, _)| known.eq_ignore_ascii_case(id))
            .map(|(_, _, color)| *color)
            .unwrap_or(DEFAULT_CATEGORY_COLOR);

        Self {
            id: id.to_string(),
            name: title_case(id),
            color: color.to_string(),
        }
    }

    /// Returns true when `id` is one of the catalog members, ignoring ASCII case.
    pub fn is_known(id: &str) -> bool {
        CATEGORIES.iter().any(|(known, _, _)| known.eq_ignore_ascii_case(id))
    }

    /// The full catalog, in display order.
    pub fn all() -> Vec<Category> {
        CATEGORIES
            .iter()
            .map(|(id, name, color)| Category {
                id: id.to_string(),
                name: name.to_string(),
                color: color.to_string(),
            })
            .collect()
    }
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A normalized quote as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: String,
    pub category: Category,
}

/// Per-day count of successful generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyGenerationCounter {
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyGenerationCounter {
    /// A zero count starting on `date`.
    pub fn fresh(date: NaiveDate) -> Self {
        Self { date, count: 0 }
    }
}
