use std::collections::BTreeSet;

use serde::Serialize;

use super::{ProgramDefinition, Requirements, ScoreCategory, ScoringWeights};

const REQUIRED_WEIGHT_TOTAL: u64 = 100;

/// A configuration defect in a program definition.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("min_acres ({min}) cannot be greater than max_acres ({max})")]
    AcreageBounds { min: f64, max: f64 },
    #[error("{field} must be a finite non-negative number (current: {value})")]
    InvalidBound { field: &'static str, value: f64 },
    #[error("scoring weights must sum to 100 (current: {0})")]
    WeightSum(u64),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("unknown scoring category: {0}")]
    UnknownCategory(String),
    #[error("soil order '{0}' is both allowed and excluded")]
    ContradictorySoil(String),
}

/// Raised when a batch is requested against a program that fails validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("program '{program}' is invalid: {}", join_errors(.errors))]
pub struct ConfigurationError {
    pub program: String,
    pub errors: Vec<ValidationError>,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs every check and reports all failures in a stable order.
pub fn validate(program: &ProgramDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if program.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
        errors.push(ValidationError::MissingField("name"));
    }
    if program
        .description
        .as_deref()
        .map_or(true, |description| description.trim().is_empty())
    {
        errors.push(ValidationError::MissingField("description"));
    }
    if program.requirements.is_none() {
        errors.push(ValidationError::MissingField("requirements"));
    }
    if program.scoring.is_none() {
        errors.push(ValidationError::MissingField("scoring"));
    }
    errors.extend(
        program
            .unknown_fields()
            .into_iter()
            .map(ValidationError::UnknownField),
    );

    if let Some(requirements) = &program.requirements {
        check_bounds(requirements, &mut errors);
        check_soil_sets(requirements, &mut errors);
    }
    if let Some(weights) = &program.scoring {
        check_weights(weights, &mut errors);
    }

    errors
}

fn check_bounds(requirements: &Requirements, errors: &mut Vec<ValidationError>) {
    let bounds = [
        ("min_acres", requirements.min_acres),
        ("max_acres", requirements.max_acres),
        ("max_slope_pct", requirements.max_slope_pct),
        ("min_organic_matter", requirements.min_organic_matter),
        ("max_erodibility", requirements.max_erodibility),
        ("max_dist_to_road_miles", requirements.max_dist_to_road_miles),
    ];
    for (field, value) in bounds {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                errors.push(ValidationError::InvalidBound { field, value });
            }
        }
    }

    if let (Some(min), Some(max)) = (requirements.min_acres, requirements.max_acres) {
        if min > max {
            errors.push(ValidationError::AcreageBounds { min, max });
        }
    }
}

fn check_soil_sets(requirements: &Requirements, errors: &mut Vec<ValidationError>) {
    let excluded: BTreeSet<String> = requirements
        .excluded_soil_orders
        .iter()
        .map(|soil| soil.trim().to_lowercase())
        .collect();
    let mut reported = BTreeSet::new();

    for soil in &requirements.allowed_soil_orders {
        let key = soil.trim().to_lowercase();
        if excluded.contains(&key) && reported.insert(key) {
            errors.push(ValidationError::ContradictorySoil(soil.trim().to_string()));
        }
    }
}

fn check_weights(weights: &ScoringWeights, errors: &mut Vec<ValidationError>) {
    for (category, _) in weights.iter() {
        if ScoreCategory::parse(category).is_none() {
            errors.push(ValidationError::UnknownCategory(category.to_string()));
        }
    }

    let total = weights.total();
    if total != REQUIRED_WEIGHT_TOTAL {
        errors.push(ValidationError::WeightSum(total));
    }
}
