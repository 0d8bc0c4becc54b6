//! Error types for the assessment engine.
//!
//! Mapping errors to HTTP status codes is the responsibility of the route
//! layer; nothing here is fatal to the process.

use thiserror::Error;

/// Errors raised while parsing or validating a trait catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog JSON could not be parsed.
    #[error("Failed to parse catalog JSON: {message}")]
    Parse { message: String },

    /// A trait does not carry the required number of questions.
    #[error("Trait '{trait_key}' must have exactly 4 questions, found {count}")]
    QuestionCount { trait_key: String, count: usize },

    /// A question sits in the wrong slot for its naming convention.
    #[error("Question '{question_id}' in trait '{trait_key}': {message}")]
    QuestionLayout {
        trait_key: String,
        question_id: String,
        message: String,
    },

    /// A question does not offer exactly one option per pole.
    #[error("Question '{question_id}' must offer exactly one low-pole and one high-pole option")]
    OptionPolarity { question_id: String },

    /// A trait's pattern profile set is not the full 8-way set.
    #[error("Trait '{trait_key}' must define all 8 pattern profiles, found {count} valid codes")]
    PatternSet { trait_key: String, count: usize },

    /// The same question id appears twice in the catalog.
    #[error("Duplicate question id '{question_id}'")]
    DuplicateQuestion { question_id: String },

    /// The same trait key appears twice in the catalog.
    #[error("Duplicate trait key '{trait_key}'")]
    DuplicateTrait { trait_key: String },
}

/// Errors raised while validating a trait selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The selection is empty; no session may be created.
    #[error("At least one trait must be selected")]
    Empty,

    /// A selected key does not exist in the catalog.
    #[error("Unknown trait '{trait_key}'")]
    UnknownTrait { trait_key: String },
}

/// Errors raised by session mutation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The answered question id is not part of the session's pool.
    #[error("Question '{question_id}' does not belong to this session")]
    UnknownQuestion { question_id: String },
}

/// Errors raised by payload assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The session is not yet fully answered.
    #[error("Session is incomplete: {answered} of {expected} questions answered")]
    Incomplete { answered: usize, expected: usize },
}

/// Errors raised by the external service clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a body this client cannot use.
    #[error("Service returned an unusable body: {message}")]
    InvalidResponse { message: String },
}
