//! Eligibility screening and fit scoring of land parcels against agricultural programs.
//!
//! The engine is pure: a validated [`ProgramDefinition`] and a set of parcel attribute
//! records go in, a [`BatchReport`] comes out. Reading parcel files, override tables and
//! the program store are separate concerns living alongside it.

pub mod batch;
pub mod domain;
pub mod evaluation;
pub mod intake;
pub mod overrides;
pub mod program;
pub mod report;
pub mod scoring;
pub mod screening;
pub mod store;

#[cfg(test)]
mod tests;

pub use batch::{BatchEvaluator, BatchOptions, BatchReport, BatchSummary, UnprocessableRecord};
pub use domain::{ParcelAttributes, ParcelId, ParcelRecord, RecordError};
pub use evaluation::{DerivedFields, ParcelEvaluation, ParcelEvaluator};
pub use intake::{load_parcels, IntakeError, ParcelIntake, SkippedRow};
pub use overrides::{
    JurisdictionOverrideEntry, JurisdictionOverrideTable, OverrideStatus, OverrideTableError,
};
pub use program::{
    validate, ConfigurationError, ProgramDefinition, Requirements, ScoreCategory,
    ScoringWeights, ValidatedProgram, ValidationError,
};
pub use report::{RankedRow, RejectionRow, RANKED_COLUMNS, REJECTION_COLUMNS};
pub use scoring::{score, score_card, ScoreCard, ScoreComponent};
pub use screening::{screen, FilterCheck, ScreeningDecision, ScreeningFilter, ScreeningOutcome};
pub use store::{
    InMemoryProgramStore, JsonProgramStore, ProgramCatalog, ProgramStore, ProgramStoreError,
    ProgramSummary,
};
