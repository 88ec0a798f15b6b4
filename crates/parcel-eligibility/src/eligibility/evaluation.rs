use serde::Serialize;

use super::domain::{ParcelId, ParcelRecord};
use super::overrides::OverrideStatus;
use super::program::ValidatedProgram;
use super::scoring::{score_card, ScoreComponent};
use super::screening::{screen, FilterCheck, ScreeningFilter};

/// Fields the engine derives for a parcel during one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedFields {
    pub landuse_ok: bool,
    pub override_status: OverrideStatus,
    pub stacking_required: bool,
    pub fit_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<ScreeningFilter>,
}

/// Evaluation output for one parcel: decision trail, derived fields and score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelEvaluation {
    pub parcel: ParcelRecord,
    pub derived: DerivedFields,
    pub checks: Vec<FilterCheck>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ScoreComponent>,
}

impl ParcelEvaluation {
    pub fn parcel_id(&self) -> &ParcelId {
        self.parcel.id()
    }

    pub fn passed(&self) -> bool {
        self.derived.rejection.is_none()
    }

    pub fn fit_score(&self) -> u32 {
        self.derived.fit_score
    }

    pub fn rejection(&self) -> Option<ScreeningFilter> {
        self.derived.rejection
    }
}

/// Stateless evaluator that applies a validated program to single parcels.
pub struct ParcelEvaluator<'a> {
    program: ValidatedProgram<'a>,
}

impl<'a> ParcelEvaluator<'a> {
    pub fn new(program: ValidatedProgram<'a>) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &ValidatedProgram<'a> {
        &self.program
    }

    /// Screens the parcel and scores it when every filter passes. Rejected parcels score 0.
    pub fn evaluate(&self, parcel: &ParcelRecord) -> ParcelEvaluation {
        let requirements = self.program.requirements;
        let outcome = screen(parcel, requirements, &self.program.practice);
        let rejection = outcome.rejection();

        let (fit_score, components) = match rejection {
            None => {
                let card = score_card(parcel, requirements, self.program.weights);
                (card.total, card.components)
            }
            Some(_) => (0, Vec::new()),
        };

        ParcelEvaluation {
            parcel: parcel.clone(),
            derived: DerivedFields {
                landuse_ok: outcome.landuse_ok,
                override_status: outcome.override_status,
                stacking_required: outcome.stacking_required,
                fit_score,
                rejection,
            },
            checks: outcome.checks,
            components,
        }
    }
}
