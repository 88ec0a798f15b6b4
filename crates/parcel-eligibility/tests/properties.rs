use parcel_eligibility::eligibility::{
    score, screen, validate, BatchEvaluator, BatchOptions, ParcelEvaluator, ParcelRecord,
    ProgramDefinition, Requirements, ScoreCategory, ScoringWeights,
};
use proptest::prelude::*;

fn requirements() -> Requirements {
    Requirements {
        min_acres: Some(40.0),
        max_acres: Some(1500.0),
        max_slope_pct: Some(10.0),
        excluded_soil_orders: vec!["Histosols".to_string()],
        allowed_landuse: vec!["farmland".to_string(), "pasture".to_string()],
        min_organic_matter: Some(2.0),
        max_erodibility: Some(0.4),
        max_dist_to_road_miles: Some(0.5),
        ..Requirements::default()
    }
}

fn weights_from(values: [u32; 6]) -> ScoringWeights {
    ScoreCategory::ALL.into_iter().zip(values).collect()
}

/// Six weights summing to exactly 100, cut from sorted points on [0, 100].
fn hundred_point_weights() -> impl Strategy<Value = ScoringWeights> {
    prop::collection::vec(0u32..=100, 5).prop_map(|mut cuts| {
        cuts.sort_unstable();
        let mut values = [0u32; 6];
        let mut previous = 0;
        for (slot, cut) in values.iter_mut().zip(cuts.iter().chain(std::iter::once(&100))) {
            *slot = cut - previous;
            previous = *cut;
        }
        weights_from(values)
    })
}

fn soil() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "Alfisols".to_string(),
        "Mollisols".to_string(),
        "Histosols".to_string(),
        "Entisols".to_string(),
    ]))
}

fn landuse() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "farmland".to_string(),
        "pasture".to_string(),
        "meadow".to_string(),
    ]))
}

prop_compose! {
    fn arb_parcel()(
        id in "[a-z]{1,6}",
        acres in 0.0f64..3000.0,
        slope in prop::option::of(0.0f64..40.0),
        soil in soil(),
        landuse in landuse(),
        organic_matter in prop::option::of(0.0f64..6.0),
        erodibility in prop::option::of(0.0f64..0.8),
        road in prop::option::of(0.0f64..3.0),
    ) -> ParcelRecord {
        let mut parcel = ParcelRecord::new(id.as_str(), "IL", "Champaign", acres);
        parcel.slope_pct = slope;
        parcel.soil_order = soil;
        parcel.landuse = landuse;
        parcel.organic_matter = organic_matter;
        parcel.erodibility = erodibility;
        parcel.dist_road_mi = road;
        parcel
    }
}

proptest! {
    #[test]
    fn score_stays_within_zero_and_one_hundred(
        parcel in arb_parcel(),
        weights in hundred_point_weights(),
    ) {
        prop_assert_eq!(weights.total(), 100);
        let total = score(&parcel, &requirements(), &weights);
        prop_assert!(total <= 100);
    }

    #[test]
    fn parcel_meeting_every_category_scores_exactly_one_hundred(
        weights in hundred_point_weights(),
        acres in 40.0f64..=1500.0,
    ) {
        let parcel = ParcelRecord::new("ideal", "IL", "Champaign", acres)
            .with_slope(3.0)
            .with_soil("Alfisols")
            .with_landuse("farmland")
            .with_organic_matter(3.0)
            .with_erodibility(0.2)
            .with_road_distance(0.1);
        prop_assert_eq!(score(&parcel, &requirements(), &weights), 100);
    }

    #[test]
    fn parcel_failing_every_category_scores_zero(weights in hundred_point_weights()) {
        let parcel = ParcelRecord::new("poor", "IL", "Champaign", 10.0)
            .with_slope(30.0)
            .with_soil("Alfisols")
            .with_landuse("meadow")
            .with_organic_matter(0.5)
            .with_erodibility(0.7)
            .with_road_distance(2.0);
        prop_assert_eq!(score(&parcel, &requirements(), &weights), 0);
    }

    #[test]
    fn evaluation_is_idempotent(parcel in arb_parcel()) {
        let weights = weights_from([20, 20, 20, 20, 10, 10]);
        let program = ProgramDefinition::new("Props", "property checks", requirements(), weights);
        let validated = program.validated().expect("program is valid");
        let evaluator = ParcelEvaluator::new(validated);

        let first = evaluator.evaluate(&parcel);
        let second = evaluator.evaluate(&parcel);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn unknown_slope_never_fails_the_slope_filter(
        parcel in arb_parcel(),
        max_slope in 0.0f64..1.0,
    ) {
        let mut parcel = parcel;
        parcel.slope_pct = None;
        let mut requirements = requirements();
        requirements.max_slope_pct = Some(max_slope);
        let outcome = screen(&parcel, &requirements, "cover_crops");
        prop_assert!(outcome
            .checks
            .iter()
            .any(|check| check.filter.label() == "slope filter" && check.passed));
    }

    #[test]
    fn equal_score_and_acreage_rank_by_ascending_id(
        ids in prop::collection::btree_set("[a-z]{1,5}", 2..12),
    ) {
        let weights = ScoringWeights::new().with(ScoreCategory::Acres, 100);
        let program = ProgramDefinition::new("Tie", "tie break", Requirements::default(), weights);
        let parcels: Vec<ParcelRecord> = ids
            .iter()
            .rev()
            .map(|id| ParcelRecord::new(id.as_str(), "IL", "Ford", 80.0))
            .collect();

        let report = BatchEvaluator::new(BatchOptions { parallel: false })
            .evaluate_records(&program, parcels)
            .expect("program is valid");
        let ranked: Vec<String> = report.ranked.iter().map(|e| e.parcel_id().0.clone()).collect();
        let expected: Vec<String> = ids.into_iter().collect();
        prop_assert_eq!(ranked, expected);
    }

    #[test]
    fn only_weights_summing_to_one_hundred_validate(values in prop::array::uniform6(0u32..=40)) {
        let weights = weights_from(values);
        let total = weights.total();
        let program = ProgramDefinition::new("Weights", "sum check", requirements(), weights);
        prop_assert_eq!(validate(&program).is_empty(), total == 100);
    }
}

#[test]
fn weight_totals_adjacent_to_one_hundred_are_rejected() {
    for (values, valid) in [
        ([20, 20, 20, 20, 10, 9], false),
        ([20, 20, 20, 20, 10, 10], true),
        ([20, 20, 20, 20, 10, 11], false),
    ] {
        let program = ProgramDefinition::new("Edge", "weight edge", requirements(), weights_from(values));
        assert_eq!(validate(&program).is_empty(), valid, "weights {values:?}");
    }
}
