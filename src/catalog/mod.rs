//! The trait catalog: the read-only data set the assessment runs against.
//!
//! A catalog is an ordered list of trait axes. Each axis pairs two opposing
//! dispositions (e.g. Structure vs. Flexibility) and owns exactly four
//! questions — three scenario questions followed by one self-report
//! verification question — plus a narrative interpretation record and the
//! full 8-way set of pattern profiles keyed by a 3-symbol code (`A-B-A`).
//!
//! The default catalog is embedded at compile time as JSON and parsed once;
//! no write interface exists. Custom catalogs can be loaded from JSON with
//! [`Catalog::from_json`], which validates the structural invariants.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Default trait catalog embedded at compile time.
const EMBEDDED_TRAITS_JSON: &str = include_str!("traits.json");

/// Scenario questions per trait; these feed pattern derivation.
pub const SCENARIO_COUNT: usize = 3;

/// Total questions per trait (scenario questions plus one verification).
pub const QUESTIONS_PER_TRAIT: usize = 4;

/// Id prefix marking a trait's verification question.
pub const VERIFICATION_PREFIX: &str = "V_";

/// Size of a trait's pattern profile set: `{low,high}³`.
pub const PATTERN_COUNT: usize = 8;

// ---------------------------------------------------------------------------
// Poles and roles
// ---------------------------------------------------------------------------

/// One of the two poles of a trait axis.
///
/// On the wire this is the numeric option value: `0` for the low pole,
/// `2` for the high pole. No other values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PoleValue {
    /// The trait's low pole (wire value `0`).
    Low,
    /// The trait's high pole (wire value `2`).
    High,
}

impl PoleValue {
    /// The symbol used in pattern codes: `A` for low, `B` for high.
    pub fn symbol(self) -> char {
        match self {
            PoleValue::Low => 'A',
            PoleValue::High => 'B',
        }
    }
}

impl From<PoleValue> for u8 {
    fn from(value: PoleValue) -> u8 {
        match value {
            PoleValue::Low => 0,
            PoleValue::High => 2,
        }
    }
}

impl TryFrom<u8> for PoleValue {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PoleValue::Low),
            2 => Ok(PoleValue::High),
            other => Err(format!("invalid option value {}, expected 0 or 2", other)),
        }
    }
}

/// A question's canonical role within its trait, independent of any
/// presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRole {
    /// Scenario question at canonical ordinal 1, 2 or 3.
    Scenario(u8),
    /// The trait's fourth question: direct self-report, excluded from
    /// pattern derivation.
    Verification,
}

impl QuestionRole {
    pub fn is_scenario(self) -> bool {
        matches!(self, QuestionRole::Scenario(_))
    }
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// One of the two mutually exclusive choices a question offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Which pole this choice maps to.
    pub value: PoleValue,
    /// The choice text shown to the respondent.
    pub label: String,
    /// What selecting this choice reveals; absent on verification options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoding: Option<String>,
}

/// A forced-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Globally unique id encoding trait membership and ordinal position.
    pub id: String,
    /// The scenario or self-report text.
    pub text: String,
    /// Exactly two options, one per pole.
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Whether this is a verification question by naming convention.
    pub fn is_verification(&self) -> bool {
        self.id.starts_with(VERIFICATION_PREFIX)
    }

    /// The option carrying the given pole value.
    pub fn option_for(&self, value: PoleValue) -> Option<&QuestionOption> {
        self.options.iter().find(|opt| opt.value == value)
    }
}

/// Narrative interpretation text for a trait axis, keyed to aggregate
/// tendency. Consumed downstream; never evaluated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitInterpretation {
    pub name: String,
    pub low_end: String,
    pub high_end: String,
    pub low_description: String,
    pub high_description: String,
    pub mixed_description: String,
}

/// Pre-authored behavioral profile for one response pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternProfile {
    pub label: String,
    pub logic: String,
    pub cues: String,
    pub impact: String,
    pub risk: String,
    pub development: String,
}

/// A trait axis: key, interpretation, questions in canonical order, and the
/// full pattern profile set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitAxis {
    /// Catalog key, e.g. `"Structure-Flexibility"`.
    pub key: String,
    pub interpretation: TraitInterpretation,
    /// Canonical order: three scenario questions, then the verification
    /// question.
    pub questions: Vec<Question>,
    /// Profiles keyed by 3-symbol pattern code (`A-A-A` .. `B-B-B`).
    pub patterns: BTreeMap<String, PatternProfile>,
}

impl TraitAxis {
    /// The trait's scenario questions in canonical order.
    pub fn scenario_questions(&self) -> &[Question] {
        let end = self.questions.len().min(SCENARIO_COUNT);
        &self.questions[..end]
    }

    /// The trait's verification question.
    pub fn verification_question(&self) -> Option<&Question> {
        self.questions.get(SCENARIO_COUNT)
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// The canonical role of a question within this trait.
    pub fn role_of(&self, id: &str) -> Option<QuestionRole> {
        let position = self.questions.iter().position(|q| q.id == id)?;
        if position < SCENARIO_COUNT {
            Some(QuestionRole::Scenario(position as u8 + 1))
        } else {
            Some(QuestionRole::Verification)
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Deserialization shape of a catalog file.
#[derive(Deserialize)]
struct CatalogFile {
    traits: Vec<TraitAxis>,
}

/// The immutable trait catalog, loaded once per process.
#[derive(Debug, Clone)]
pub struct Catalog {
    axes: Vec<TraitAxis>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Load the embedded default catalog.
    ///
    /// # Panics
    /// Panics if the embedded data is malformed; this is a build defect,
    /// not a runtime condition.
    pub fn load_default() -> Self {
        Self::from_json(EMBEDDED_TRAITS_JSON).expect("Error decoding embedded traits.json catalog.")
    }

    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            message: e.to_string(),
        })?;

        let mut index = HashMap::new();
        let mut seen_questions = HashSet::new();
        for (position, axis) in file.traits.iter().enumerate() {
            validate_axis(axis)?;
            for question in &axis.questions {
                if !seen_questions.insert(question.id.clone()) {
                    return Err(CatalogError::DuplicateQuestion {
                        question_id: question.id.clone(),
                    });
                }
            }
            if index.insert(axis.key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTrait {
                    trait_key: axis.key.clone(),
                });
            }
        }

        Ok(Self {
            axes: file.traits,
            index,
        })
    }

    /// Look up a trait axis by key.
    pub fn get(&self, key: &str) -> Option<&TraitAxis> {
        self.index.get(key).map(|&i| &self.axes[i])
    }

    /// All axes in canonical catalog order.
    pub fn axes(&self) -> &[TraitAxis] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// Check the structural invariants of one axis.
fn validate_axis(axis: &TraitAxis) -> Result<(), CatalogError> {
    if axis.questions.len() != QUESTIONS_PER_TRAIT {
        return Err(CatalogError::QuestionCount {
            trait_key: axis.key.clone(),
            count: axis.questions.len(),
        });
    }

    for (position, question) in axis.questions.iter().enumerate() {
        let expect_verification = position >= SCENARIO_COUNT;
        if question.is_verification() != expect_verification {
            let message = if expect_verification {
                format!("slot {} must hold the verification question", position + 1)
            } else {
                format!("verification question found in scenario slot {}", position + 1)
            };
            return Err(CatalogError::QuestionLayout {
                trait_key: axis.key.clone(),
                question_id: question.id.clone(),
                message,
            });
        }

        let has_both_poles = question.options.len() == 2
            && question.option_for(PoleValue::Low).is_some()
            && question.option_for(PoleValue::High).is_some();
        if !has_both_poles {
            return Err(CatalogError::OptionPolarity {
                question_id: question.id.clone(),
            });
        }
    }

    let valid_codes = axis
        .patterns
        .keys()
        .filter(|code| is_pattern_code(code))
        .count();
    if valid_codes != PATTERN_COUNT || axis.patterns.len() != PATTERN_COUNT {
        return Err(CatalogError::PatternSet {
            trait_key: axis.key.clone(),
            count: valid_codes,
        });
    }

    Ok(())
}

/// Whether a string is a well-formed 3-symbol pattern code (`A-B-A`).
fn is_pattern_code(code: &str) -> bool {
    let symbols: Vec<&str> = code.split('-').collect();
    symbols.len() == SCENARIO_COUNT && symbols.iter().all(|s| *s == "A" || *s == "B")
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Get the process-wide default catalog, loading it on first use.
pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(Catalog::load_default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads_and_validates() {
        let catalog = Catalog::load_default();
        assert!(!catalog.is_empty());

        for axis in catalog.axes() {
            assert_eq!(axis.question_count(), QUESTIONS_PER_TRAIT);
            assert_eq!(axis.scenario_questions().len(), SCENARIO_COUNT);
            let verification = axis.verification_question().unwrap();
            assert!(verification.is_verification());
            assert_eq!(axis.patterns.len(), PATTERN_COUNT);
        }
    }

    #[test]
    fn test_known_axis_lookup() {
        let catalog = Catalog::load_default();
        let axis = catalog.get("Risk-Caution").unwrap();
        assert_eq!(axis.interpretation.low_end, "Cautious");
        assert_eq!(axis.question("RC2").unwrap().options.len(), 2);
        assert!(catalog.get("Nope-Nothing").is_none());
    }

    #[test]
    fn test_role_of_follows_canonical_order() {
        let catalog = Catalog::load_default();
        let axis = catalog.get("Structure-Flexibility").unwrap();
        assert_eq!(axis.role_of("SF1"), Some(QuestionRole::Scenario(1)));
        assert_eq!(axis.role_of("SF3"), Some(QuestionRole::Scenario(3)));
        assert_eq!(axis.role_of("V_SF"), Some(QuestionRole::Verification));
        assert_eq!(axis.role_of("RC1"), None);
    }

    #[test]
    fn test_pole_value_wire_format() {
        assert_eq!(serde_json::to_string(&PoleValue::Low).unwrap(), "0");
        assert_eq!(serde_json::to_string(&PoleValue::High).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<PoleValue>("2").unwrap(),
            PoleValue::High
        );
        assert!(serde_json::from_str::<PoleValue>("1").is_err());
        assert_eq!(PoleValue::Low.symbol(), 'A');
        assert_eq!(PoleValue::High.symbol(), 'B');
    }

    #[test]
    fn test_from_json_rejects_missing_verification() {
        let json = r#"{
            "traits": [{
                "key": "X-Y",
                "interpretation": {
                    "name": "X vs Y", "lowEnd": "X", "highEnd": "Y",
                    "lowDescription": "x", "highDescription": "y", "mixedDescription": "xy"
                },
                "questions": [
                    {"id": "XY1", "text": "q", "options": [
                        {"value": 0, "label": "a"}, {"value": 2, "label": "b"}]},
                    {"id": "XY2", "text": "q", "options": [
                        {"value": 0, "label": "a"}, {"value": 2, "label": "b"}]},
                    {"id": "XY3", "text": "q", "options": [
                        {"value": 0, "label": "a"}, {"value": 2, "label": "b"}]},
                    {"id": "XY4", "text": "q", "options": [
                        {"value": 0, "label": "a"}, {"value": 2, "label": "b"}]}
                ],
                "patterns": {}
            }]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::QuestionLayout { .. }));
    }

    #[test]
    fn test_from_json_rejects_bad_option_values() {
        let json = r#"{
            "traits": [{
                "key": "X-Y",
                "interpretation": {
                    "name": "X vs Y", "lowEnd": "X", "highEnd": "Y",
                    "lowDescription": "x", "highDescription": "y", "mixedDescription": "xy"
                },
                "questions": [
                    {"id": "XY1", "text": "q", "options": [
                        {"value": 0, "label": "a"}, {"value": 1, "label": "b"}]}
                ],
                "patterns": {}
            }]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_pattern_code_format() {
        assert!(is_pattern_code("A-A-A"));
        assert!(is_pattern_code("B-A-B"));
        assert!(!is_pattern_code("A-A"));
        assert!(!is_pattern_code("A-C-A"));
        assert!(!is_pattern_code("AAB"));
    }
}
