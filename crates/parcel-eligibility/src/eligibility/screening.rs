use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{same_category, ParcelRecord};
use super::overrides::OverrideStatus;
use super::program::Requirements;

/// Filters of the screening pipeline, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScreeningFilter {
    #[serde(rename = "acreage filter")]
    Acreage,
    #[serde(rename = "slope filter")]
    Slope,
    #[serde(rename = "soil inclusion filter")]
    SoilInclusion,
    #[serde(rename = "soil exclusion filter")]
    SoilExclusion,
    #[serde(rename = "land-use filter")]
    LandUse,
    #[serde(rename = "road-access filter")]
    RoadAccess,
    #[serde(rename = "jurisdiction override filter")]
    JurisdictionOverride,
}

impl ScreeningFilter {
    pub const ORDER: [ScreeningFilter; 7] = [
        ScreeningFilter::Acreage,
        ScreeningFilter::Slope,
        ScreeningFilter::SoilInclusion,
        ScreeningFilter::SoilExclusion,
        ScreeningFilter::LandUse,
        ScreeningFilter::RoadAccess,
        ScreeningFilter::JurisdictionOverride,
    ];

    /// Canonical rejection reason.
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningFilter::Acreage => "acreage filter",
            ScreeningFilter::Slope => "slope filter",
            ScreeningFilter::SoilInclusion => "soil inclusion filter",
            ScreeningFilter::SoilExclusion => "soil exclusion filter",
            ScreeningFilter::LandUse => "land-use filter",
            ScreeningFilter::RoadAccess => "road-access filter",
            ScreeningFilter::JurisdictionOverride => "jurisdiction override filter",
        }
    }
}

impl fmt::Display for ScreeningFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterCheck {
    pub filter: ScreeningFilter,
    pub passed: bool,
}

/// Accept/reject decision; a rejection names the first failing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreeningDecision {
    Pass,
    Reject(ScreeningFilter),
}

/// Every filter's outcome plus the flags screening derives for scoring and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningOutcome {
    pub checks: Vec<FilterCheck>,
    pub landuse_ok: bool,
    pub override_status: OverrideStatus,
    pub stacking_required: bool,
}

impl ScreeningOutcome {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn rejection(&self) -> Option<ScreeningFilter> {
        self.checks
            .iter()
            .find(|check| !check.passed)
            .map(|check| check.filter)
    }

    pub fn decision(&self) -> ScreeningDecision {
        match self.rejection() {
            Some(filter) => ScreeningDecision::Reject(filter),
            None => ScreeningDecision::Pass,
        }
    }
}

/// Runs every filter against `parcel`. `practice` is the practice the program credits,
/// used to resolve jurisdiction overrides.
pub fn screen(parcel: &ParcelRecord, requirements: &Requirements, practice: &str) -> ScreeningOutcome {
    let landuse_ok = landuse_eligible(parcel, requirements);
    let overrides = &requirements.jurisdiction_overrides;
    let own_status = match requirements.county_restriction(&parcel.jurisdiction) {
        OverrideStatus::Ineligible => OverrideStatus::Ineligible,
        OverrideStatus::Eligible => overrides.status(&parcel.state, &parcel.jurisdiction, practice),
    };
    let resolution = overrides.resolve_with_status(
        own_status,
        &parcel.state,
        &parcel.jurisdiction,
        practice,
        &requirements.required_practices,
        requirements.stacking_allowed,
    );

    let checks = ScreeningFilter::ORDER
        .into_iter()
        .map(|filter| {
            let passed = match filter {
                ScreeningFilter::Acreage => requirements.acreage_within(parcel.acres),
                ScreeningFilter::Slope => slope_within(parcel, requirements),
                ScreeningFilter::SoilInclusion => soil_included(parcel, requirements),
                ScreeningFilter::SoilExclusion => !soil_excluded(parcel, requirements),
                ScreeningFilter::LandUse => landuse_ok,
                ScreeningFilter::RoadAccess => road_access_within(parcel, requirements),
                ScreeningFilter::JurisdictionOverride => resolution.passed,
            };
            FilterCheck { filter, passed }
        })
        .collect();

    ScreeningOutcome {
        checks,
        landuse_ok,
        override_status: resolution.status,
        stacking_required: resolution.passed && resolution.stacking_required,
    }
}

/// Unknown slope passes.
pub(crate) fn slope_within(parcel: &ParcelRecord, requirements: &Requirements) -> bool {
    match (requirements.max_slope_pct, parcel.slope_pct) {
        (Some(max), Some(slope)) => slope <= max,
        _ => true,
    }
}

/// Unknown road distance passes.
pub(crate) fn road_access_within(parcel: &ParcelRecord, requirements: &Requirements) -> bool {
    match (requirements.max_dist_to_road_miles, parcel.dist_road_mi) {
        (Some(max), Some(distance)) => distance <= max,
        _ => true,
    }
}

fn soil_included(parcel: &ParcelRecord, requirements: &Requirements) -> bool {
    if requirements.allowed_soil_orders.is_empty() {
        return true;
    }
    parcel.soil_order.as_deref().map_or(false, |soil| {
        requirements
            .allowed_soil_orders
            .iter()
            .any(|allowed| same_category(allowed, soil))
    })
}

// Substring match so legacy variants such as "Histosols (drained)" are caught.
fn soil_excluded(parcel: &ParcelRecord, requirements: &Requirements) -> bool {
    let Some(soil) = parcel.soil_order.as_deref() else {
        return false;
    };
    let soil = soil.to_lowercase();
    requirements
        .excluded_soil_orders
        .iter()
        .map(|excluded| excluded.trim().to_lowercase())
        .filter(|excluded| !excluded.is_empty())
        .any(|excluded| soil.contains(&excluded))
}

pub(crate) fn landuse_eligible(parcel: &ParcelRecord, requirements: &Requirements) -> bool {
    if requirements.allowed_landuse.is_empty() {
        return true;
    }
    parcel.landuse.as_deref().map_or(false, |landuse| {
        requirements
            .allowed_landuse
            .iter()
            .any(|allowed| same_category(allowed, landuse))
    })
}
