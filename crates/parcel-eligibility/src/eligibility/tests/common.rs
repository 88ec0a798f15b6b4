use crate::eligibility::domain::{ParcelAttributes, ParcelRecord};
use crate::eligibility::overrides::{
    JurisdictionOverrideEntry, JurisdictionOverrideTable, OverrideStatus,
};
use crate::eligibility::program::{ProgramDefinition, Requirements, ScoreCategory, ScoringWeights};

pub(super) fn even_weights() -> ScoringWeights {
    [
        (ScoreCategory::Acres, 25),
        (ScoreCategory::Slope, 25),
        (ScoreCategory::Landuse, 25),
        (ScoreCategory::Access, 25),
    ]
    .into_iter()
    .collect()
}

pub(super) fn sep_requirements() -> Requirements {
    Requirements {
        min_acres: Some(40.0),
        max_slope_pct: Some(10.0),
        excluded_soil_orders: vec!["Histosols".to_string()],
        allowed_landuse: vec!["farmland".to_string()],
        max_dist_to_road_miles: Some(0.5),
        ..Requirements::default()
    }
}

pub(super) fn sep_program() -> ProgramDefinition {
    ProgramDefinition::new(
        "SEP Qualified Parcels",
        "Soil enrichment screening",
        sep_requirements(),
        even_weights(),
    )
    .with_practice("cover_crops")
}

pub(super) fn mclean_overrides() -> JurisdictionOverrideTable {
    JurisdictionOverrideTable::from_entries([
        JurisdictionOverrideEntry::new("IL", "CHAMPAIGN", "cover_crops", OverrideStatus::Eligible),
        JurisdictionOverrideEntry::new("IL", "MCLEAN", "cover_crops", OverrideStatus::Ineligible),
    ])
}

/// A parcel that clears every filter of [`sep_program`].
pub(super) fn good_parcel(id: &str) -> ParcelRecord {
    ParcelRecord::new(id, "IL", "Champaign", 60.0)
        .with_slope(5.0)
        .with_soil("Alfisols")
        .with_landuse("farmland")
        .with_road_distance(0.2)
}

pub(super) fn raw_parcel(id: &str, acres: f64) -> ParcelAttributes {
    ParcelAttributes {
        parcel_id: Some(id.to_string()),
        state: Some("IL".to_string()),
        county: Some("Champaign".to_string()),
        acres: Some(acres),
        slope_pct: Some(5.0),
        soil_order: Some("Alfisols".to_string()),
        landuse: Some("farmland".to_string()),
        dist_road_mi: Some(0.2),
        ..ParcelAttributes::default()
    }
}
