//! The assessment session engine.
//!
//! An [`AssessmentSession`] is an explicit, owned state object created when
//! a respondent starts an assessment and discarded when they finish or
//! change their trait selection. It pools the questions of every selected
//! trait, fixes one randomized presentation order for its lifetime, records
//! answers keyed by `(trait, question)`, and recomputes completeness on
//! every answer event. Nothing is persisted; dropping the session is the
//! reset operation.
//!
//! The presentation order is drawn with an in-place Fisher–Yates shuffle so
//! every permutation of the pool is equally likely.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{Catalog, PoleValue, Question, QuestionRole};
use crate::error::SessionError;
use crate::selection::TraitSelection;

/// A pooled question's link back to its owning trait and canonical role.
#[derive(Debug, Clone)]
pub struct PooledQuestion {
    pub trait_key: String,
    pub role: QuestionRole,
}

/// A question resolved for display, tagged with its owning trait.
#[derive(Debug, Clone, Copy)]
pub struct PresentedQuestion<'c> {
    pub trait_key: &'c str,
    pub question: &'c Question,
}

/// Mutable state of one in-progress assessment.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: Uuid,
    selected_traits: Vec<String>,
    /// Randomized presentation order, fixed for the session's lifetime.
    question_order: Vec<String>,
    /// Question id → owning trait and canonical role, independent of
    /// presentation order.
    pool: HashMap<String, PooledQuestion>,
    /// Answers keyed by trait, then question id. An entry exists for every
    /// selected trait from the moment the session starts.
    answers: HashMap<String, HashMap<String, PoleValue>>,
    /// Opaque analysis result cached after a successful analysis request.
    analysis: Option<Value>,
    started_at: DateTime<Utc>,
}

impl AssessmentSession {
    /// Start a session for a validated selection, drawing the presentation
    /// order from the thread RNG.
    ///
    /// The selection must have been validated against the same catalog.
    pub fn start(catalog: &Catalog, selection: &TraitSelection) -> Self {
        Self::start_with_rng(catalog, selection, &mut rand::thread_rng())
    }

    /// Start a session with a caller-supplied RNG. Deterministic given a
    /// seeded RNG.
    pub fn start_with_rng<R: Rng>(
        catalog: &Catalog,
        selection: &TraitSelection,
        rng: &mut R,
    ) -> Self {
        let mut answers = HashMap::new();
        let mut pool = HashMap::new();
        let mut question_order = Vec::new();

        for key in selection.keys() {
            answers.insert(key.clone(), HashMap::new());
            let Some(axis) = catalog.get(key) else {
                continue;
            };
            for question in &axis.questions {
                let role = axis
                    .role_of(&question.id)
                    .unwrap_or(QuestionRole::Verification);
                pool.insert(
                    question.id.clone(),
                    PooledQuestion {
                        trait_key: key.clone(),
                        role,
                    },
                );
                question_order.push(question.id.clone());
            }
        }

        fisher_yates(&mut question_order, rng);

        Self {
            id: Uuid::new_v4(),
            selected_traits: selection.keys().to_vec(),
            question_order,
            pool,
            answers,
            analysis: None,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn selected_traits(&self) -> &[String] {
        &self.selected_traits
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Question ids in presentation order.
    pub fn question_order(&self) -> &[String] {
        &self.question_order
    }

    /// The pooled questions resolved against the catalog, in presentation
    /// order.
    pub fn questions_in_order<'c>(&self, catalog: &'c Catalog) -> Vec<PresentedQuestion<'c>> {
        self.question_order
            .iter()
            .filter_map(|id| {
                let pooled = self.pool.get(id)?;
                let axis = catalog.get(&pooled.trait_key)?;
                Some(PresentedQuestion {
                    trait_key: axis.key.as_str(),
                    question: axis.question(id)?,
                })
            })
            .collect()
    }

    /// The owning trait and canonical role of a pooled question.
    pub fn pooled(&self, question_id: &str) -> Option<&PooledQuestion> {
        self.pool.get(question_id)
    }

    pub fn total_questions(&self) -> usize {
        self.pool.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().map(|per_trait| per_trait.len()).sum()
    }

    /// Record an answer. Overwrites any prior answer for the question; no
    /// history is kept. Returns the freshly recomputed completeness flag.
    pub fn answer(&mut self, question_id: &str, value: PoleValue) -> Result<bool, SessionError> {
        let trait_key = match self.pool.get(question_id) {
            Some(pooled) => pooled.trait_key.clone(),
            None => {
                return Err(SessionError::UnknownQuestion {
                    question_id: question_id.to_string(),
                })
            }
        };

        self.answers
            .entry(trait_key)
            .or_default()
            .insert(question_id.to_string(), value);

        Ok(self.is_complete())
    }

    /// The recorded answer for a question, if any.
    pub fn answer_for(&self, question_id: &str) -> Option<PoleValue> {
        let pooled = self.pool.get(question_id)?;
        self.answers.get(&pooled.trait_key)?.get(question_id).copied()
    }

    /// All answers for one trait.
    pub fn trait_answers(&self, trait_key: &str) -> Option<&HashMap<String, PoleValue>> {
        self.answers.get(trait_key)
    }

    /// Whether every pooled question of every selected trait has an answer.
    /// Pure function of the current state; recomputed on every call.
    pub fn is_complete(&self) -> bool {
        !self.pool.is_empty()
            && self.pool.iter().all(|(question_id, pooled)| {
                self.answers
                    .get(&pooled.trait_key)
                    .is_some_and(|per_trait| per_trait.contains_key(question_id))
            })
    }

    /// Cache the opaque analysis response for later report generation.
    pub fn record_analysis(&mut self, result: Value) {
        self.analysis = Some(result);
    }

    /// The cached analysis response, if an analysis request succeeded.
    pub fn analysis(&self) -> Option<&Value> {
        self.analysis.as_ref()
    }
}

/// Unbiased in-place shuffle: walk from the last index down, swapping each
/// element with one at a uniformly random index at or below it.
fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
