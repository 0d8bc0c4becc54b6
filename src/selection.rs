//! Trait selection and time estimation.
//!
//! Presents the catalog's axes with per-trait question counts and derived
//! time estimates, and validates the subset a respondent opts into. An
//! empty selection is rejected before any session exists.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::SelectionError;

/// Estimated answering time per question, in minutes.
pub const MINUTES_PER_QUESTION: f64 = 1.5;

/// Time estimate for a number of questions, rounded up to whole minutes.
pub fn estimate_minutes(question_count: usize) -> u32 {
    (question_count as f64 * MINUTES_PER_QUESTION).ceil() as u32
}

/// One row of the trait selection listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitSummary {
    pub key: String,
    pub name: String,
    pub question_count: usize,
    pub estimated_minutes: u32,
}

/// The catalog's axes with question counts and per-trait estimates, in
/// canonical catalog order.
pub fn trait_listing(catalog: &Catalog) -> Vec<TraitSummary> {
    catalog
        .axes()
        .iter()
        .map(|axis| TraitSummary {
            key: axis.key.clone(),
            name: axis.interpretation.name.clone(),
            question_count: axis.question_count(),
            estimated_minutes: estimate_minutes(axis.question_count()),
        })
        .collect()
}

/// A validated, non-empty subset of catalog trait keys.
///
/// Duplicates collapse to their first occurrence; the respondent's order is
/// preserved.
#[derive(Debug, Clone)]
pub struct TraitSelection {
    keys: Vec<String>,
}

impl TraitSelection {
    /// Validate a selection against the catalog.
    pub fn new(catalog: &Catalog, keys: &[String]) -> Result<Self, SelectionError> {
        if keys.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for key in keys {
            if catalog.get(key).is_none() {
                return Err(SelectionError::UnknownTrait {
                    trait_key: key.clone(),
                });
            }
            if seen.insert(key.as_str()) {
                selected.push(key.clone());
            }
        }

        Ok(Self { keys: selected })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total questions across the selected axes.
    pub fn question_count(&self, catalog: &Catalog) -> usize {
        self.keys
            .iter()
            .filter_map(|key| catalog.get(key))
            .map(|axis| axis.question_count())
            .sum()
    }

    /// Aggregate time estimate across the selected axes. Pure; recomputed
    /// on every call.
    pub fn estimated_minutes(&self, catalog: &Catalog) -> u32 {
        estimate_minutes(self.question_count(catalog))
    }
}
