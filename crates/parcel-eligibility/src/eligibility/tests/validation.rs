use super::common::*;
use crate::eligibility::program::{
    validate, ProgramDefinition, Requirements, ScoreCategory, ScoringWeights, ValidationError,
};

#[test]
fn well_formed_program_has_no_errors() {
    assert!(validate(&sep_program()).is_empty());
    assert!(sep_program().validated().is_ok());
}

#[test]
fn missing_sections_are_all_reported() {
    let program = ProgramDefinition {
        name: Some("Empty".to_string()),
        ..ProgramDefinition::default()
    };

    assert_eq!(
        validate(&program),
        vec![
            ValidationError::MissingField("description"),
            ValidationError::MissingField("requirements"),
            ValidationError::MissingField("scoring"),
        ]
    );
}

#[test]
fn weights_must_sum_to_exactly_one_hundred() {
    let short: ScoringWeights = [(ScoreCategory::Acres, 50), (ScoreCategory::Slope, 49)]
        .into_iter()
        .collect();
    let over: ScoringWeights = [(ScoreCategory::Acres, 50), (ScoreCategory::Slope, 51)]
        .into_iter()
        .collect();

    let short_program = ProgramDefinition::new("Short", "99 points", sep_requirements(), short);
    let over_program = ProgramDefinition::new("Over", "101 points", sep_requirements(), over);

    assert_eq!(validate(&short_program), vec![ValidationError::WeightSum(99)]);
    assert_eq!(validate(&over_program), vec![ValidationError::WeightSum(101)]);
}

#[test]
fn inverted_acreage_bounds_are_rejected() {
    let requirements = Requirements {
        min_acres: Some(500.0),
        max_acres: Some(100.0),
        ..Requirements::default()
    };
    let program = ProgramDefinition::new("Inverted", "min above max", requirements, even_weights());

    assert_eq!(
        validate(&program),
        vec![ValidationError::AcreageBounds {
            min: 500.0,
            max: 100.0
        }]
    );
}

#[test]
fn negative_bounds_and_contradictory_soils_are_reported() {
    let requirements = Requirements {
        max_slope_pct: Some(-1.0),
        allowed_soil_orders: vec!["Mollisols".to_string(), "Histosols".to_string()],
        excluded_soil_orders: vec!["histosols".to_string()],
        ..Requirements::default()
    };
    let program = ProgramDefinition::new("Odd", "conflicting sets", requirements, even_weights());

    let errors = validate(&program);
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        errors[0],
        ValidationError::InvalidBound {
            field: "max_slope_pct",
            ..
        }
    ));
    assert_eq!(
        errors[1],
        ValidationError::ContradictorySoil("Histosols".to_string())
    );
}

#[test]
fn unknown_category_is_a_validation_error() {
    let mut weights = ScoringWeights::new().with(ScoreCategory::Acres, 80);
    weights.insert("yield_history", 20);
    let program = ProgramDefinition::new("Yield", "unknown category", sep_requirements(), weights);

    assert_eq!(
        validate(&program),
        vec![ValidationError::UnknownCategory("yield_history".to_string())]
    );
}

#[test]
fn configuration_error_names_program_and_every_failure() {
    let program = ProgramDefinition {
        name: Some("Broken".to_string()),
        description: Some(" ".to_string()),
        requirements: Some(sep_requirements()),
        scoring: Some(ScoringWeights::new().with(ScoreCategory::Acres, 10)),
        ..ProgramDefinition::default()
    };

    let err = program.validated().expect_err("program is invalid");
    assert_eq!(err.program, "Broken");
    assert_eq!(err.errors.len(), 2);
    let message = err.to_string();
    assert!(message.contains("missing required field: description"));
    assert!(message.contains("current: 10"));
}

#[test]
fn unrecognised_keys_are_reported_not_ignored() {
    let json = r#"{
        "name": "Legacy",
        "description": "hand-edited document",
        "requirements": {"min_acres": 10, "max_slope": 3},
        "scoring": {"acres": 100}
    }"#;
    let program: ProgramDefinition = serde_json::from_str(json).expect("program parses");

    assert_eq!(
        validate(&program),
        vec![ValidationError::UnknownField("requirements.max_slope".to_string())]
    );
}
