//! Tabular views of a batch report for downstream rendering.

use std::io::Write;

use serde::Serialize;

use super::batch::BatchReport;
use super::evaluation::ParcelEvaluation;

/// Header of the ranked candidate table, in [`RankedRow`] field order.
pub const RANKED_COLUMNS: [&str; 13] = [
    "rank",
    "parcel_id",
    "state",
    "county",
    "acres",
    "landuse",
    "landuse_ok",
    "soil_order",
    "slope_pct",
    "dist_road_mi",
    "override_status",
    "stacking_required",
    "fit_score",
];

pub const REJECTION_COLUMNS: [&str; 2] = ["parcel_id", "reason"];

/// One row of the ranked candidate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow<'a> {
    pub rank: usize,
    pub parcel_id: &'a str,
    pub state: &'a str,
    pub county: &'a str,
    pub acres: f64,
    pub landuse: Option<&'a str>,
    pub landuse_ok: bool,
    pub soil_order: Option<&'a str>,
    pub slope_pct: Option<f64>,
    pub dist_road_mi: Option<f64>,
    pub override_status: &'static str,
    pub stacking_required: bool,
    pub fit_score: u32,
}

impl<'a> RankedRow<'a> {
    fn from_evaluation(rank: usize, evaluation: &'a ParcelEvaluation) -> Self {
        let parcel = &evaluation.parcel;
        Self {
            rank,
            parcel_id: &parcel.id().0,
            state: &parcel.state,
            county: &parcel.jurisdiction,
            acres: parcel.acres,
            landuse: parcel.landuse.as_deref(),
            landuse_ok: evaluation.derived.landuse_ok,
            soil_order: parcel.soil_order.as_deref(),
            slope_pct: parcel.slope_pct,
            dist_road_mi: parcel.dist_road_mi,
            override_status: evaluation.derived.override_status.label(),
            stacking_required: evaluation.derived.stacking_required,
            fit_score: evaluation.derived.fit_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionRow<'a> {
    pub parcel_id: &'a str,
    pub reason: &'static str,
}

impl BatchReport {
    pub fn ranked_rows(&self) -> Vec<RankedRow<'_>> {
        self.ranked
            .iter()
            .enumerate()
            .map(|(index, evaluation)| RankedRow::from_evaluation(index + 1, evaluation))
            .collect()
    }

    pub fn rejection_rows(&self) -> Vec<RejectionRow<'_>> {
        self.rejection_list()
            .into_iter()
            .map(|(id, reason)| RejectionRow {
                parcel_id: &id.0,
                reason: reason.label(),
            })
            .collect()
    }

    pub fn write_ranked_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        write_rows(writer, &RANKED_COLUMNS, self.ranked_rows())
    }

    pub fn write_rejections_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        write_rows(writer, &REJECTION_COLUMNS, self.rejection_rows())
    }
}

/// Serializes `rows`; an empty table still gets its header line.
fn write_rows<W, T>(writer: W, columns: &[&str], rows: Vec<T>) -> Result<(), csv::Error>
where
    W: Write,
    T: Serialize,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(columns)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
