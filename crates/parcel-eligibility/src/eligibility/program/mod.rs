mod validation;

pub use validation::{validate, ConfigurationError, ValidationError};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{normalize_key, slugify};
use super::overrides::{JurisdictionOverrideTable, OverrideStatus};

/// One named eligibility program as stored in configuration.
///
/// Top-level fields are optional here so that an incomplete document still loads and
/// [`validate`] can report every missing piece at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_type: Option<String>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
    #[serde(default)]
    pub scoring: Option<ScoringWeights>,
    /// Keys this version does not understand, kept so a save never drops them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgramDefinition {
    pub fn new(name: &str, description: &str, requirements: Requirements, scoring: ScoringWeights) -> Self {
        Self {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            practice_type: None,
            requirements: Some(requirements),
            scoring: Some(scoring),
            extra: Map::new(),
        }
    }

    pub fn with_practice(mut self, practice_type: &str) -> Self {
        self.practice_type = Some(practice_type.trim().to_string());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Practice credited by this program: the configured practice type, else a slug of the name.
    pub fn practice(&self) -> String {
        match self.practice_type.as_deref().map(str::trim) {
            Some(practice) if !practice.is_empty() => practice.to_string(),
            _ => slugify(self.name.as_deref().unwrap_or_default()),
        }
    }

    /// Dotted names of program and requirement keys that are not part of the schema.
    pub fn unknown_fields(&self) -> Vec<String> {
        let program = self.extra.keys().cloned();
        let requirements = self
            .requirements
            .iter()
            .flat_map(|requirements| requirements.extra.keys())
            .map(|key| format!("requirements.{key}"));
        program.chain(requirements).collect()
    }

    /// Returns a copy whose override table also contains `overrides`.
    pub fn with_overrides(mut self, overrides: &JurisdictionOverrideTable) -> Self {
        if let Some(requirements) = self.requirements.as_mut() {
            requirements.jurisdiction_overrides.merge(overrides);
        }
        self
    }

    /// Checks the definition and borrows the parts the engine needs.
    pub fn validated(&self) -> Result<ValidatedProgram<'_>, ConfigurationError> {
        let errors = validate(self);
        let configuration_error = |errors| ConfigurationError {
            program: self.display_name().to_string(),
            errors,
        };
        if !errors.is_empty() {
            return Err(configuration_error(errors));
        }

        match (&self.requirements, &self.scoring) {
            (Some(requirements), Some(weights)) => Ok(ValidatedProgram {
                name: self.display_name(),
                practice: self.practice(),
                requirements,
                weights,
            }),
            (None, _) => Err(configuration_error(vec![ValidationError::MissingField(
                "requirements",
            )])),
            (_, None) => Err(configuration_error(vec![ValidationError::MissingField(
                "scoring",
            )])),
        }
    }
}

/// A program that passed validation, immutable for the duration of a batch.
#[derive(Debug, Clone)]
pub struct ValidatedProgram<'a> {
    pub name: &'a str,
    pub practice: String,
    pub requirements: &'a Requirements,
    pub weights: &'a ScoringWeights,
}

/// Eligibility requirements. `None` bounds and empty sets are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub min_acres: Option<f64>,
    pub max_acres: Option<f64>,
    pub max_slope_pct: Option<f64>,
    pub allowed_soil_orders: Vec<String>,
    pub excluded_soil_orders: Vec<String>,
    pub allowed_landuse: Vec<String>,
    pub min_organic_matter: Option<f64>,
    pub max_erodibility: Option<f64>,
    pub max_dist_to_road_miles: Option<f64>,
    #[serde(skip_serializing_if = "JurisdictionOverrideTable::is_empty")]
    pub jurisdiction_overrides: JurisdictionOverrideTable,
    /// County name to status for the program's own practice, in any state.
    pub county_restrictions: BTreeMap<String, OverrideStatus>,
    pub required_practices: Vec<String>,
    pub stacking_allowed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Requirements {
    pub(crate) fn acreage_within(&self, acres: f64) -> bool {
        self.min_acres.map_or(true, |min| acres >= min)
            && self.max_acres.map_or(true, |max| acres <= max)
    }

    /// Status recorded in `county_restrictions` for a jurisdiction; unlisted counties are eligible.
    pub fn county_restriction(&self, jurisdiction: &str) -> OverrideStatus {
        let jurisdiction = normalize_key(jurisdiction);
        self.county_restrictions
            .iter()
            .find(|(county, _)| normalize_key(county) == jurisdiction)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }
}

/// Scoring categories the calculator knows how to award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Acres,
    Slope,
    Landuse,
    SoilHealth,
    ErosionRisk,
    Access,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::Acres,
        ScoreCategory::Slope,
        ScoreCategory::Landuse,
        ScoreCategory::SoilHealth,
        ScoreCategory::ErosionRisk,
        ScoreCategory::Access,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            ScoreCategory::Acres => "acres",
            ScoreCategory::Slope => "slope",
            ScoreCategory::Landuse => "landuse",
            ScoreCategory::SoilHealth => "soil_health",
            ScoreCategory::ErosionRisk => "erosion_risk",
            ScoreCategory::Access => "access",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|category| category.key() == raw)
    }
}

/// Category name to integer weight. Valid programs sum to exactly 100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringWeights(BTreeMap<String, u32>);

impl ScoringWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: ScoreCategory, weight: u32) -> Self {
        self.0.insert(category.key().to_string(), weight);
        self
    }

    pub fn insert(&mut self, category: &str, weight: u32) -> Option<u32> {
        self.0.insert(category.trim().to_string(), weight)
    }

    pub fn get(&self, category: &str) -> Option<u32> {
        self.0.get(category).copied()
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|weight| u64::from(*weight)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(category, weight)| (category.as_str(), *weight))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ScoreCategory, u32)> for ScoringWeights {
    fn from_iter<T: IntoIterator<Item = (ScoreCategory, u32)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |weights, (category, weight)| weights.with(category, weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_program_document() {
        let json = r#"{
            "name": "Cover Crops",
            "description": "Cover crop incentive",
            "requirements": {
                "min_acres": 20,
                "max_acres": 2000,
                "max_slope_pct": 12,
                "excluded_soil_orders": ["Histosols"],
                "allowed_landuse": ["farmland"],
                "required_practices": ["cover_crops"],
                "stacking_allowed": true,
                "jurisdiction_overrides": [
                    {"state": "IL", "county": "McLean", "practice_type": "cover_crops", "status": "INELIGIBLE"}
                ]
            },
            "scoring": {"acres": 25, "soil_health": 25, "erosion_risk": 25, "access": 25}
        }"#;
        let program: ProgramDefinition = serde_json::from_str(json).expect("program parses");
        let requirements = program.requirements.as_ref().expect("requirements present");
        assert_eq!(requirements.min_acres, Some(20.0));
        assert!(requirements.max_dist_to_road_miles.is_none());
        assert!(requirements.stacking_allowed);
        assert_eq!(requirements.jurisdiction_overrides.len(), 1);
        assert_eq!(program.scoring.as_ref().map(ScoringWeights::total), Some(100));
        assert_eq!(program.practice(), "cover_crops");
    }

    #[test]
    fn county_restrictions_and_unknown_keys_survive_a_round_trip() {
        let json = r#"{
            "name": "Legacy",
            "description": "editor document",
            "owner_notes": "keep me",
            "requirements": {
                "min_acres": 10,
                "county_restrictions": {"MCLEAN": "INELIGIBLE", "Ford": "ELIGIBLE"},
                "max_slope": 3
            },
            "scoring": {"acres": 100}
        }"#;
        let program: ProgramDefinition = serde_json::from_str(json).expect("program parses");
        let requirements = program.requirements.as_ref().expect("requirements present");
        assert_eq!(requirements.county_restriction(" McLean "), OverrideStatus::Ineligible);
        assert_eq!(requirements.county_restriction("FORD"), OverrideStatus::Eligible);
        assert_eq!(requirements.county_restriction("Story"), OverrideStatus::Eligible);
        assert_eq!(
            program.unknown_fields(),
            vec!["owner_notes".to_string(), "requirements.max_slope".to_string()]
        );

        let value = serde_json::to_value(&program).expect("program serializes");
        assert_eq!(
            value["requirements"]["county_restrictions"]["MCLEAN"],
            serde_json::json!("INELIGIBLE")
        );
        assert_eq!(value["requirements"]["max_slope"], serde_json::json!(3));
        assert_eq!(value["owner_notes"], serde_json::json!("keep me"));
    }

    #[test]
    fn practice_prefers_configured_value() {
        let program = ProgramDefinition::new(
            "Conservation Tillage",
            "Reduced tillage",
            Requirements::default(),
            ScoringWeights::new(),
        );
        assert_eq!(program.practice(), "conservation_tillage");
        assert_eq!(program.with_practice(" no_till ").practice(), "no_till");
    }

    #[test]
    fn category_keys_round_trip() {
        for category in ScoreCategory::ALL {
            assert_eq!(ScoreCategory::parse(category.key()), Some(category));
        }
        assert_eq!(ScoreCategory::parse("yield"), None);
    }
}
