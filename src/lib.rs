//! # polarity
//!
//! A forced-choice personality assessment engine. Respondents pick a subset
//! of trait axes (pairs of opposing dispositions), answer the pooled
//! questions of those axes in one randomized sequence, and — once every
//! question is answered — the raw choices are assembled with the relevant
//! catalog fragments into a canonical payload for an external analysis
//! service. A second external service turns the analysis into a
//! downloadable report.
//!
//! The crate deliberately computes no scores and classifies nothing: it
//! curates, validates and serializes choices. Session state lives in memory
//! for the duration of one assessment and is discarded on reset.

pub mod catalog;
pub mod error;
pub mod payload;
pub mod selection;
pub mod server;
pub mod services;
pub mod session;

pub use catalog::{catalog, Catalog, PoleValue, Question, QuestionRole, TraitAxis};
pub use error::{AssemblyError, CatalogError, SelectionError, ServiceError, SessionError};
pub use payload::{assemble, derive_pattern, AssessmentPayload, TraitBundle};
pub use selection::{estimate_minutes, trait_listing, TraitSelection, MINUTES_PER_QUESTION};
pub use services::{AnalysisClient, ReportArtifact, ReportClient};
pub use session::AssessmentSession;

/// Library version.
pub const VERSION: &str = "0.1.0";
