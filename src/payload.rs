//! Payload assembly for the external analysis service.
//!
//! Once a session is complete, the assembler merges its raw answers with
//! the catalog fragments for the selected traits into one canonical,
//! order-independent structure. Assembly is a pure transformation: it never
//! mutates the session, and it refuses to run while any question is
//! unanswered.
//!
//! The derived 3-symbol pattern code reads scenario answers in canonical
//! catalog order, never presentation order. The payload still ships the
//! full 8-profile set per trait: matching a profile to the derived code is
//! the analysis service's call, not ours.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, PatternProfile, PoleValue, Question, TraitAxis, TraitInterpretation};
use crate::error::AssemblyError;
use crate::session::AssessmentSession;

/// Everything the analysis service needs about one selected trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitBundle {
    pub questions: Vec<Question>,
    pub interpretation: TraitInterpretation,
    pub patterns: BTreeMap<String, PatternProfile>,
}

/// The outbound analysis payload assembled from a completed session.
///
/// `BTreeMap` keys make serialization independent of answer or insertion
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPayload {
    pub selected_traits: Vec<String>,
    /// Raw answers keyed by trait, then question id.
    pub answers: BTreeMap<String, BTreeMap<String, PoleValue>>,
    /// Full catalog fragments for each selected trait.
    pub trait_data: BTreeMap<String, TraitBundle>,
    /// Derived 3-symbol pattern code per trait (e.g. `A-B-A`).
    pub patterns: BTreeMap<String, String>,
}

/// Derive a trait's 3-symbol pattern code from its scenario answers, read
/// in canonical order. `None` until all three scenario answers exist.
pub fn derive_pattern(session: &AssessmentSession, axis: &TraitAxis) -> Option<String> {
    let answers = session.trait_answers(&axis.key)?;
    let symbols: Vec<String> = axis
        .scenario_questions()
        .iter()
        .map(|question| {
            answers
                .get(&question.id)
                .map(|value| value.symbol().to_string())
        })
        .collect::<Option<Vec<_>>>()?;
    Some(symbols.join("-"))
}

/// Assemble the analysis payload from a completed session.
///
/// Fails with [`AssemblyError::Incomplete`] while any selected-trait
/// question is unanswered; callers gate on the session's completeness flag
/// before submitting.
pub fn assemble(
    session: &AssessmentSession,
    catalog: &Catalog,
) -> Result<AssessmentPayload, AssemblyError> {
    if !session.is_complete() {
        return Err(AssemblyError::Incomplete {
            answered: session.answered_count(),
            expected: session.total_questions(),
        });
    }

    let mut answers = BTreeMap::new();
    let mut trait_data = BTreeMap::new();
    let mut patterns = BTreeMap::new();

    for key in session.selected_traits() {
        let axis = catalog.get(key).ok_or(AssemblyError::Incomplete {
            answered: session.answered_count(),
            expected: session.total_questions(),
        })?;

        let per_trait: BTreeMap<String, PoleValue> = session
            .trait_answers(key)
            .map(|map| {
                map.iter()
                    .map(|(id, value)| (id.clone(), *value))
                    .collect()
            })
            .unwrap_or_default();
        answers.insert(key.clone(), per_trait);

        trait_data.insert(
            key.clone(),
            TraitBundle {
                questions: axis.questions.clone(),
                interpretation: axis.interpretation.clone(),
                patterns: axis.patterns.clone(),
            },
        );

        if let Some(code) = derive_pattern(session, axis) {
            patterns.insert(key.clone(), code);
        }
    }

    Ok(AssessmentPayload {
        selected_traits: session.selected_traits().to_vec(),
        answers,
        trait_data,
        patterns,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::selection::TraitSelection;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session_for(keys: &[&str], seed: u64) -> AssessmentSession {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let selection = TraitSelection::new(catalog::catalog(), &keys).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        AssessmentSession::start_with_rng(catalog::catalog(), &selection, &mut rng)
    }

    #[test]
    fn test_pattern_reads_canonical_order_not_answer_order() {
        // RC1=low, RC2=high, RC3=low answered back to front, verification
        // interleaved: the code must still be A-B-A.
        let mut session = session_for(&["Risk-Caution"], 13);
        session.answer("RC3", PoleValue::Low).unwrap();
        session.answer("V_RC", PoleValue::High).unwrap();
        session.answer("RC2", PoleValue::High).unwrap();
        session.answer("RC1", PoleValue::Low).unwrap();

        let axis = catalog::catalog().get("Risk-Caution").unwrap();
        assert_eq!(derive_pattern(&session, axis).unwrap(), "A-B-A");
    }

    #[test]
    fn test_pattern_ignores_verification_answer() {
        let mut session = session_for(&["Risk-Caution"], 17);
        session.answer("RC1", PoleValue::High).unwrap();
        session.answer("RC2", PoleValue::High).unwrap();
        session.answer("RC3", PoleValue::High).unwrap();
        let axis = catalog::catalog().get("Risk-Caution").unwrap();

        // Derivable before the verification answer exists, and unchanged by it.
        assert_eq!(derive_pattern(&session, axis).unwrap(), "B-B-B");
        session.answer("V_RC", PoleValue::Low).unwrap();
        assert_eq!(derive_pattern(&session, axis).unwrap(), "B-B-B");
    }

    #[test]
    fn test_pattern_absent_while_scenarios_missing() {
        let mut session = session_for(&["Risk-Caution"], 19);
        session.answer("RC1", PoleValue::Low).unwrap();
        session.answer("RC3", PoleValue::Low).unwrap();
        let axis = catalog::catalog().get("Risk-Caution").unwrap();
        assert!(derive_pattern(&session, axis).is_none());
    }

    #[test]
    fn test_assemble_rejects_incomplete_session() {
        let mut session = session_for(&["Risk-Caution", "Structure-Flexibility"], 23);
        // 7 of 8 answered.
        for id in ["RC1", "RC2", "RC3", "V_RC", "SF1", "SF2", "SF3"] {
            session.answer(id, PoleValue::Low).unwrap();
        }
        let err = assemble(&session, catalog::catalog()).unwrap_err();
        match err {
            AssemblyError::Incomplete { answered, expected } => {
                assert_eq!(answered, 7);
                assert_eq!(expected, 8);
            }
        }
    }

    #[test]
    fn test_assemble_complete_session() {
        let mut session = session_for(&["Risk-Caution"], 29);
        session.answer("RC1", PoleValue::Low).unwrap();
        session.answer("RC2", PoleValue::High).unwrap();
        session.answer("RC3", PoleValue::Low).unwrap();
        session.answer("V_RC", PoleValue::High).unwrap();

        let payload = assemble(&session, catalog::catalog()).unwrap();
        assert_eq!(payload.selected_traits, ["Risk-Caution"]);
        assert_eq!(payload.patterns["Risk-Caution"], "A-B-A");

        let answers = &payload.answers["Risk-Caution"];
        assert_eq!(answers["RC1"], PoleValue::Low);
        assert_eq!(answers["V_RC"], PoleValue::High);

        let bundle = &payload.trait_data["Risk-Caution"];
        assert_eq!(bundle.questions.len(), 4);
        assert_eq!(bundle.patterns.len(), 8);
        assert_eq!(bundle.interpretation.high_end, "Risk-Taking");
    }

    #[test]
    fn test_assemble_does_not_mutate_session() {
        let mut session = session_for(&["Risk-Caution"], 31);
        for id in ["RC1", "RC2", "RC3", "V_RC"] {
            session.answer(id, PoleValue::High).unwrap();
        }
        let before = session.answered_count();
        let _ = assemble(&session, catalog::catalog()).unwrap();
        let _ = assemble(&session, catalog::catalog()).unwrap();
        assert_eq!(session.answered_count(), before);
        assert!(session.is_complete());
    }

    #[test]
    fn test_wire_field_names() {
        let mut session = session_for(&["Risk-Caution"], 37);
        for id in ["RC1", "RC2", "RC3", "V_RC"] {
            session.answer(id, PoleValue::Low).unwrap();
        }
        let payload = assemble(&session, catalog::catalog()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert!(value.get("selectedTraits").is_some());
        assert!(value.get("answers").is_some());
        assert!(value.get("traitData").is_some());
        assert_eq!(value["answers"]["Risk-Caution"]["RC1"], 0);
        assert_eq!(
            value["traitData"]["Risk-Caution"]["interpretation"]["lowEnd"],
            "Cautious"
        );
    }

    #[test]
    fn test_payload_independent_of_presentation_order() {
        // Two sessions with different shuffles and answer orders but the
        // same choices serialize to the same canonical payload.
        let answer_sets = [
            ["RC1", "RC2", "RC3", "V_RC"],
            ["V_RC", "RC3", "RC1", "RC2"],
        ];
        let mut rendered = Vec::new();
        for (seed, ids) in answer_sets.iter().enumerate() {
            let mut session = session_for(&["Risk-Caution"], seed as u64 + 41);
            for id in ids.iter() {
                let value = if *id == "RC2" {
                    PoleValue::High
                } else {
                    PoleValue::Low
                };
                session.answer(id, value).unwrap();
            }
            let payload = assemble(&session, catalog::catalog()).unwrap();
            rendered.push(serde_json::to_string(&payload).unwrap());
        }
        assert_eq!(rendered[0], rendered[1]);
    }
}
