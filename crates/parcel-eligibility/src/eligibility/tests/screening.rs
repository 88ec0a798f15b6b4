use super::common::*;
use crate::eligibility::overrides::OverrideStatus;
use crate::eligibility::screening::{screen, ScreeningDecision, ScreeningFilter};

#[test]
fn clean_parcel_passes_every_filter() {
    let outcome = screen(&good_parcel("p-1"), &sep_requirements(), "cover_crops");

    assert!(outcome.passed());
    assert_eq!(outcome.decision(), ScreeningDecision::Pass);
    assert_eq!(outcome.checks.len(), ScreeningFilter::ORDER.len());
    assert!(outcome.landuse_ok);
    assert_eq!(outcome.override_status, OverrideStatus::Eligible);
    assert!(!outcome.stacking_required);
}

#[test]
fn acreage_outside_bounds_is_rejected() {
    let mut requirements = sep_requirements();
    requirements.max_acres = Some(50.0);

    let mut small = good_parcel("small");
    small.acres = 20.0;
    assert_eq!(
        screen(&small, &requirements, "cover_crops").rejection(),
        Some(ScreeningFilter::Acreage)
    );

    let mut large = good_parcel("large");
    large.acres = 50.5;
    assert_eq!(
        screen(&large, &requirements, "cover_crops").rejection(),
        Some(ScreeningFilter::Acreage)
    );
}

#[test]
fn unknown_slope_passes_even_with_a_strict_ceiling() {
    let mut requirements = sep_requirements();
    requirements.max_slope_pct = Some(0.0);
    let mut parcel = good_parcel("no-slope");
    parcel.slope_pct = None;

    let outcome = screen(&parcel, &requirements, "cover_crops");
    assert!(outcome.passed());
}

#[test]
fn steep_parcel_fails_slope_filter() {
    let parcel = good_parcel("steep").with_slope(11.2);
    assert_eq!(
        screen(&parcel, &sep_requirements(), "cover_crops").decision(),
        ScreeningDecision::Reject(ScreeningFilter::Slope)
    );
}

#[test]
fn allowed_soils_require_membership() {
    let mut requirements = sep_requirements();
    requirements.allowed_soil_orders = vec!["Alfisols".to_string(), "Mollisols".to_string()];

    let spodosol = good_parcel("spodosol").with_soil("Spodosols");
    assert_eq!(
        screen(&spodosol, &requirements, "cover_crops").rejection(),
        Some(ScreeningFilter::SoilInclusion)
    );

    let mut unknown = good_parcel("unknown-soil");
    unknown.soil_order = None;
    assert_eq!(
        screen(&unknown, &requirements, "cover_crops").rejection(),
        Some(ScreeningFilter::SoilInclusion)
    );

    let mollisol = good_parcel("mollisol").with_soil("mollisols");
    assert!(screen(&mollisol, &requirements, "cover_crops").passed());
}

#[test]
fn excluded_soils_match_case_insensitive_substrings() {
    let peat = good_parcel("peat").with_soil("HISTOSOLS (drained)");
    assert_eq!(
        screen(&peat, &sep_requirements(), "cover_crops").rejection(),
        Some(ScreeningFilter::SoilExclusion)
    );
}

#[test]
fn landuse_flag_is_set_even_when_another_filter_fails() {
    let parcel = good_parcel("meadow").with_landuse("meadow").with_slope(30.0);
    let outcome = screen(&parcel, &sep_requirements(), "cover_crops");

    assert!(!outcome.landuse_ok);
    assert_eq!(outcome.rejection(), Some(ScreeningFilter::Slope));
    let failed: Vec<_> = outcome
        .checks
        .iter()
        .filter(|check| !check.passed)
        .map(|check| check.filter)
        .collect();
    assert_eq!(failed, vec![ScreeningFilter::Slope, ScreeningFilter::LandUse]);
}

#[test]
fn road_distance_is_permissive_when_unknown() {
    let far = good_parcel("far").with_road_distance(0.75);
    assert_eq!(
        screen(&far, &sep_requirements(), "cover_crops").rejection(),
        Some(ScreeningFilter::RoadAccess)
    );

    let mut unknown = good_parcel("unknown-road");
    unknown.dist_road_mi = None;
    assert!(screen(&unknown, &sep_requirements(), "cover_crops").passed());
}

#[test]
fn ineligible_jurisdiction_is_rejected_without_partner_practice() {
    let mut requirements = sep_requirements();
    requirements.jurisdiction_overrides = mclean_overrides();
    let mut parcel = good_parcel("mclean");
    parcel.jurisdiction = "MCLEAN".to_string();

    let outcome = screen(&parcel, &requirements, "cover_crops");
    assert_eq!(outcome.rejection(), Some(ScreeningFilter::JurisdictionOverride));
    assert_eq!(outcome.override_status, OverrideStatus::Ineligible);
    assert!(!outcome.stacking_required);
}

#[test]
fn county_restriction_rejects_in_any_state() {
    let mut requirements = sep_requirements();
    requirements
        .county_restrictions
        .insert("MCLEAN".to_string(), OverrideStatus::Ineligible);

    let mut illinois = good_parcel("il");
    illinois.jurisdiction = "MCLEAN".to_string();
    let outcome = screen(&illinois, &requirements, "cover_crops");
    assert_eq!(outcome.rejection(), Some(ScreeningFilter::JurisdictionOverride));
    assert_eq!(outcome.override_status, OverrideStatus::Ineligible);

    let champaign = good_parcel("champaign");
    assert!(screen(&champaign, &requirements, "cover_crops").passed());
}

#[test]
fn county_restriction_follows_the_stacking_rule() {
    let mut requirements = sep_requirements();
    requirements
        .county_restrictions
        .insert("McLean".to_string(), OverrideStatus::Ineligible);
    requirements.stacking_allowed = true;
    requirements.required_practices = vec!["cover_crops".to_string(), "no_till".to_string()];

    let mut parcel = good_parcel("stacked");
    parcel.jurisdiction = "MCLEAN".to_string();
    let outcome = screen(&parcel, &requirements, "cover_crops");
    assert!(outcome.passed());
    assert!(outcome.stacking_required);
}

#[test]
fn first_failing_filter_names_the_rejection() {
    let mut parcel = good_parcel("many-failures")
        .with_slope(20.0)
        .with_soil("Histosols")
        .with_road_distance(3.0);
    parcel.acres = 5.0;

    let outcome = screen(&parcel, &sep_requirements(), "cover_crops");
    assert_eq!(outcome.rejection(), Some(ScreeningFilter::Acreage));
    assert_eq!(
        outcome.checks.iter().filter(|check| !check.passed).count(),
        4
    );
}

#[test]
fn rejection_labels_use_the_canonical_vocabulary() {
    let labels: Vec<_> = ScreeningFilter::ORDER.iter().map(|f| f.label()).collect();
    assert_eq!(
        labels,
        vec![
            "acreage filter",
            "slope filter",
            "soil inclusion filter",
            "soil exclusion filter",
            "land-use filter",
            "road-access filter",
            "jurisdiction override filter",
        ]
    );
    let json = serde_json::to_string(&ScreeningFilter::LandUse).expect("filter serializes");
    assert_eq!(json, "\"land-use filter\"");
}
