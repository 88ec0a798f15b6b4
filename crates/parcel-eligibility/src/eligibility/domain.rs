use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for parcels, unique within a batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub String);

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

/// Parcel attributes as delivered by the upstream enrichment stage. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelAttributes {
    #[serde(default, alias = "apn", deserialize_with = "empty_string_as_none")]
    pub parcel_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state: Option<String>,
    #[serde(default, alias = "jurisdiction", deserialize_with = "empty_string_as_none")]
    pub county: Option<String>,
    #[serde(default)]
    pub acres: Option<f64>,
    #[serde(default)]
    pub slope_pct: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub soil_order: Option<String>,
    #[serde(default)]
    pub organic_matter: Option<f64>,
    #[serde(default)]
    pub erodibility: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub landuse: Option<String>,
    #[serde(default)]
    pub dist_road_mi: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub owner: Option<String>,
}

/// Reasons a raw record cannot enter the screening pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be a finite non-negative number (found {value})")]
    InvalidField { field: &'static str, value: f64 },
    #[error("duplicate parcel identifier `{0}`")]
    DuplicateId(ParcelId),
}

/// A validated candidate parcel. Identity cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelRecord {
    #[serde(rename = "parcel_id")]
    id: ParcelId,
    pub state: String,
    #[serde(rename = "county")]
    pub jurisdiction: String,
    pub acres: f64,
    pub slope_pct: Option<f64>,
    pub soil_order: Option<String>,
    pub organic_matter: Option<f64>,
    pub erodibility: Option<f64>,
    pub landuse: Option<String>,
    pub dist_road_mi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ParcelRecord {
    pub fn new(id: impl Into<ParcelId>, state: &str, jurisdiction: &str, acres: f64) -> Self {
        Self {
            id: id.into(),
            state: normalize_key(state),
            jurisdiction: normalize_key(jurisdiction),
            acres,
            slope_pct: None,
            soil_order: None,
            organic_matter: None,
            erodibility: None,
            landuse: None,
            dist_road_mi: None,
            address: None,
            owner: None,
        }
    }

    pub fn id(&self) -> &ParcelId {
        &self.id
    }

    pub fn with_slope(mut self, slope_pct: f64) -> Self {
        self.slope_pct = Some(slope_pct);
        self
    }

    pub fn with_soil(mut self, soil_order: &str) -> Self {
        self.soil_order = clean_text(soil_order);
        self
    }

    pub fn with_landuse(mut self, landuse: &str) -> Self {
        self.landuse = clean_text(landuse);
        self
    }

    pub fn with_road_distance(mut self, miles: f64) -> Self {
        self.dist_road_mi = Some(miles);
        self
    }

    pub fn with_organic_matter(mut self, pct: f64) -> Self {
        self.organic_matter = Some(pct);
        self
    }

    pub fn with_erodibility(mut self, factor: f64) -> Self {
        self.erodibility = Some(factor);
        self
    }
}

impl TryFrom<ParcelAttributes> for ParcelRecord {
    type Error = RecordError;

    fn try_from(raw: ParcelAttributes) -> Result<Self, Self::Error> {
        let id = raw
            .parcel_id
            .as_deref()
            .and_then(clean_text)
            .ok_or(RecordError::MissingField("parcel_id"))?;
        let acres = raw.acres.ok_or(RecordError::MissingField("acres"))?;
        let state = raw
            .state
            .as_deref()
            .and_then(clean_text)
            .ok_or(RecordError::MissingField("state"))?;
        let jurisdiction = raw
            .county
            .as_deref()
            .and_then(clean_text)
            .ok_or(RecordError::MissingField("county"))?;

        Ok(Self {
            id: ParcelId(id),
            state: normalize_key(&state),
            jurisdiction: normalize_key(&jurisdiction),
            acres: measurement("acres", acres)?,
            slope_pct: optional_measurement("slope_pct", raw.slope_pct)?,
            soil_order: raw.soil_order.as_deref().and_then(clean_text),
            organic_matter: optional_measurement("organic_matter", raw.organic_matter)?,
            erodibility: optional_measurement("erodibility", raw.erodibility)?,
            landuse: raw.landuse.as_deref().and_then(clean_text),
            dist_road_mi: optional_measurement("dist_road_mi", raw.dist_road_mi)?,
            address: raw.address,
            owner: raw.owner,
        })
    }
}

fn measurement(field: &'static str, value: f64) -> Result<f64, RecordError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(RecordError::InvalidField { field, value })
    }
}

fn optional_measurement(field: &'static str, value: Option<f64>) -> Result<Option<f64>, RecordError> {
    value.map(|value| measurement(field, value)).transpose()
}

fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Uppercase, trimmed lookup key for state and jurisdiction names.
pub(crate) fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Case-insensitive comparison for categorical attributes.
pub(crate) fn same_category(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Lowercase, underscore-joined key derived from a display name.
pub(crate) fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
