use serde::Serialize;

use super::domain::ParcelRecord;
use super::program::{Requirements, ScoreCategory, ScoringWeights};
use super::screening::{landuse_eligible, road_access_within, slope_within};

/// Discrete contribution to a fit score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub category: String,
    pub weight: u32,
    pub awarded: u32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub total: u32,
    pub components: Vec<ScoreComponent>,
}

/// Weighted fit score: the sum of the weights of every category whose condition holds.
pub fn score(parcel: &ParcelRecord, requirements: &Requirements, weights: &ScoringWeights) -> u32 {
    score_card(parcel, requirements, weights).total
}

pub fn score_card(
    parcel: &ParcelRecord,
    requirements: &Requirements,
    weights: &ScoringWeights,
) -> ScoreCard {
    let mut components = Vec::new();
    let mut total: u32 = 0;

    for (category, weight) in weights.iter() {
        let (met, notes) = match ScoreCategory::parse(category) {
            Some(known) => category_condition(known, parcel, requirements),
            None => (false, "unrecognised category".to_string()),
        };
        let awarded = if met { weight } else { 0 };
        total = total.saturating_add(awarded);
        components.push(ScoreComponent {
            category: category.to_string(),
            weight,
            awarded,
            notes,
        });
    }

    ScoreCard { total, components }
}

fn category_condition(
    category: ScoreCategory,
    parcel: &ParcelRecord,
    requirements: &Requirements,
) -> (bool, String) {
    match category {
        ScoreCategory::Acres => {
            let met = requirements.acreage_within(parcel.acres);
            (met, format!("{:.1} acres", parcel.acres))
        }
        ScoreCategory::Slope => {
            let met = slope_within(parcel, requirements);
            let notes = match (parcel.slope_pct, requirements.max_slope_pct) {
                (_, None) => "no slope ceiling".to_string(),
                (None, Some(_)) => "slope unknown".to_string(),
                (Some(slope), Some(max)) => format!("slope {slope:.1}% against {max:.1}%"),
            };
            (met, notes)
        }
        ScoreCategory::Landuse => {
            let met = landuse_eligible(parcel, requirements);
            let notes = match parcel.landuse.as_deref() {
                Some(landuse) if met => format!("land use '{landuse}' eligible"),
                Some(landuse) => format!("land use '{landuse}' not eligible"),
                None if met => "no land-use restriction".to_string(),
                None => "land use unknown".to_string(),
            };
            (met, notes)
        }
        ScoreCategory::SoilHealth => match (requirements.min_organic_matter, parcel.organic_matter) {
            (None, _) => (true, "no organic matter minimum".to_string()),
            (Some(_), None) => (false, "organic matter unknown".to_string()),
            (Some(min), Some(om)) => (om >= min, format!("organic matter {om:.1}% against {min:.1}%")),
        },
        ScoreCategory::ErosionRisk => match (requirements.max_erodibility, parcel.erodibility) {
            (None, _) => (true, "no erodibility ceiling".to_string()),
            (Some(_), None) => (false, "erodibility unknown".to_string()),
            (Some(max), Some(k)) => (k <= max, format!("erodibility {k:.2} against {max:.2}")),
        },
        ScoreCategory::Access => {
            let met = road_access_within(parcel, requirements);
            let notes = match parcel.dist_road_mi {
                Some(distance) => format!("{distance:.2} mi to road"),
                None => "road distance unknown".to_string(),
            };
            (met, notes)
        }
    }
}
