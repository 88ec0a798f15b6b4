use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ParcelAttributes, ParcelId, ParcelRecord, RecordError};
use super::evaluation::{ParcelEvaluation, ParcelEvaluator};
use super::program::{ConfigurationError, ProgramDefinition};
use super::screening::ScreeningFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Evaluate parcels on the rayon pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// A raw record that could not be evaluated, with its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnprocessableRecord {
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<String>,
    pub reason: String,
    #[serde(skip)]
    pub error: RecordError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_evaluated: usize,
    pub total_passed: usize,
    pub total_rejected: usize,
    pub total_unprocessable: usize,
    pub total_acres_passed: f64,
    pub mean_score: f64,
    pub rejections_by_filter: BTreeMap<ScreeningFilter, usize>,
}

/// Ranked passers, rejections with reasons, unprocessable records and summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub program: String,
    pub practice: String,
    pub ranked: Vec<ParcelEvaluation>,
    pub rejected: Vec<ParcelEvaluation>,
    pub unprocessable: Vec<UnprocessableRecord>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Parcel identifier and canonical reason for each rejected parcel, in input order.
    pub fn rejection_list(&self) -> Vec<(&ParcelId, ScreeningFilter)> {
        self.rejected
            .iter()
            .filter_map(|evaluation| {
                evaluation
                    .rejection()
                    .map(|reason| (evaluation.parcel_id(), reason))
            })
            .collect()
    }
}

/// Orchestrates validation, screening, scoring and ranking over a batch of parcels.
#[derive(Debug, Clone, Default)]
pub struct BatchEvaluator {
    options: BatchOptions,
}

impl BatchEvaluator {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Evaluates raw parcel attributes. An invalid program aborts before any parcel is touched;
    /// malformed records are set aside individually.
    pub fn evaluate<I>(
        &self,
        program: &ProgramDefinition,
        parcels: I,
    ) -> Result<BatchReport, ConfigurationError>
    where
        I: IntoIterator<Item = ParcelAttributes>,
    {
        let validated = program.validated()?;
        let (records, unprocessable) = intake_records(parcels);
        Ok(self.run(ParcelEvaluator::new(validated), records, unprocessable))
    }

    /// Evaluates records that were already validated upstream.
    pub fn evaluate_records(
        &self,
        program: &ProgramDefinition,
        parcels: Vec<ParcelRecord>,
    ) -> Result<BatchReport, ConfigurationError> {
        let validated = program.validated()?;
        let (records, unprocessable) = dedupe_records(parcels.into_iter().enumerate());
        Ok(self.run(ParcelEvaluator::new(validated), records, unprocessable))
    }

    fn run(
        &self,
        evaluator: ParcelEvaluator<'_>,
        records: Vec<ParcelRecord>,
        unprocessable: Vec<UnprocessableRecord>,
    ) -> BatchReport {
        let evaluations: Vec<ParcelEvaluation> = if self.options.parallel {
            records
                .par_iter()
                .map(|record| evaluator.evaluate(record))
                .collect()
        } else {
            records
                .iter()
                .map(|record| evaluator.evaluate(record))
                .collect()
        };

        let (mut ranked, rejected): (Vec<_>, Vec<_>) =
            evaluations.into_iter().partition(ParcelEvaluation::passed);
        ranked.sort_by(rank_order);

        for evaluation in &rejected {
            if let Some(reason) = evaluation.rejection() {
                debug!(parcel = %evaluation.parcel_id(), %reason, "parcel rejected");
            }
        }

        let summary = summarize(&ranked, &rejected, unprocessable.len());
        let program = evaluator.program();
        info!(
            program = program.name,
            evaluated = summary.total_evaluated,
            passed = summary.total_passed,
            rejected = summary.total_rejected,
            unprocessable = summary.total_unprocessable,
            mean_score = summary.mean_score,
            "batch evaluated"
        );

        BatchReport {
            program: program.name.to_string(),
            practice: program.practice.clone(),
            ranked,
            rejected,
            unprocessable,
            summary,
        }
    }
}

/// Descending score, then descending acreage, then ascending parcel identifier.
pub fn rank_order(left: &ParcelEvaluation, right: &ParcelEvaluation) -> Ordering {
    right
        .fit_score()
        .cmp(&left.fit_score())
        .then_with(|| right.parcel.acres.total_cmp(&left.parcel.acres))
        .then_with(|| left.parcel_id().cmp(right.parcel_id()))
}

fn intake_records<I>(parcels: I) -> (Vec<ParcelRecord>, Vec<UnprocessableRecord>)
where
    I: IntoIterator<Item = ParcelAttributes>,
{
    let mut valid = Vec::new();
    let mut unprocessable = Vec::new();

    for (position, raw) in parcels.into_iter().enumerate() {
        let parcel_id = raw.parcel_id.clone();
        match ParcelRecord::try_from(raw) {
            Ok(record) => valid.push((position, record)),
            Err(error) => unprocessable.push(unprocessable_record(position, parcel_id, error)),
        }
    }

    let (records, duplicates) = dedupe_records(valid);
    unprocessable.extend(duplicates);
    unprocessable.sort_by_key(|record| record.position);
    (records, unprocessable)
}

fn dedupe_records<I>(records: I) -> (Vec<ParcelRecord>, Vec<UnprocessableRecord>)
where
    I: IntoIterator<Item = (usize, ParcelRecord)>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();

    for (position, record) in records {
        if seen.insert(record.id().clone()) {
            unique.push(record);
        } else {
            let id = record.id().clone();
            duplicates.push(unprocessable_record(
                position,
                Some(id.0.clone()),
                RecordError::DuplicateId(id),
            ));
        }
    }

    (unique, duplicates)
}

fn unprocessable_record(
    position: usize,
    parcel_id: Option<String>,
    error: RecordError,
) -> UnprocessableRecord {
    warn!(position, parcel = ?parcel_id, %error, "skipping unprocessable parcel record");
    UnprocessableRecord {
        position,
        parcel_id,
        reason: error.to_string(),
        error,
    }
}

fn summarize(
    ranked: &[ParcelEvaluation],
    rejected: &[ParcelEvaluation],
    unprocessable: usize,
) -> BatchSummary {
    let total_passed = ranked.len();
    let total_acres_passed = ranked.iter().map(|evaluation| evaluation.parcel.acres).sum();
    let score_sum: u64 = ranked
        .iter()
        .map(|evaluation| u64::from(evaluation.fit_score()))
        .sum();
    let mean_score = if total_passed == 0 {
        0.0
    } else {
        score_sum as f64 / total_passed as f64
    };

    let mut rejections_by_filter = BTreeMap::new();
    for reason in rejected.iter().filter_map(ParcelEvaluation::rejection) {
        *rejections_by_filter.entry(reason).or_insert(0) += 1;
    }

    BatchSummary {
        total_evaluated: ranked.len() + rejected.len(),
        total_passed,
        total_rejected: rejected.len(),
        total_unprocessable: unprocessable,
        total_acres_passed,
        mean_score,
        rejections_by_filter,
    }
}
