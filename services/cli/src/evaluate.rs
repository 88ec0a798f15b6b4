use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use clap::Args;
use parcel_eligibility::config::AppConfig;
use parcel_eligibility::eligibility::{
    load_parcels, BatchEvaluator, BatchReport, JurisdictionOverrideTable, SkippedRow,
};
use parcel_eligibility::error::AppError;
use serde::Serialize;
use tracing::info;

use crate::infra::{batch_options, load_catalog, open_store, select_program};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Enriched parcel file (.csv or .json)
    #[arg(long)]
    pub(crate) parcels: PathBuf,
    /// Program key (defaults to PARCEL_DEFAULT_PROGRAM or the only configured program)
    #[arg(long)]
    pub(crate) program: Option<String>,
    /// Jurisdiction override CSV merged into the program's own table
    #[arg(long)]
    pub(crate) overrides: Option<PathBuf>,
    /// Write the ranked candidate table to this CSV file
    #[arg(long)]
    pub(crate) csv_out: Option<PathBuf>,
    /// Write parcel identifiers and rejection reasons to this CSV file
    #[arg(long)]
    pub(crate) rejections_out: Option<PathBuf>,
    /// Number of ranked parcels to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    /// Evaluate on the calling thread only
    #[arg(long)]
    pub(crate) sequential: bool,
}

#[derive(Serialize)]
struct EvaluationOutput<'a> {
    generated_at: String,
    program_key: &'a str,
    report: &'a BatchReport,
    skipped_rows: &'a [SkippedRow],
}

pub(crate) fn run_evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<(), AppError> {
    let store = open_store(config);
    let catalog = load_catalog(&store)?;
    let (key, mut program) = select_program(config, &catalog, args.program.as_deref())?;

    if let Some(path) = &args.overrides {
        let table = JurisdictionOverrideTable::from_path(path)?;
        info!(path = %path.display(), entries = table.len(), "loaded jurisdiction overrides");
        program = program.with_overrides(&table);
    }

    let intake = load_parcels(&args.parcels)?;
    info!(
        path = %args.parcels.display(),
        parcels = intake.parcels.len(),
        skipped = intake.skipped.len(),
        "parcel file loaded"
    );

    let evaluator = BatchEvaluator::new(batch_options(config, args.sequential));
    let report = evaluator.evaluate(&program, intake.parcels)?;

    if let Some(path) = &args.csv_out {
        report.write_ranked_csv(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows = report.ranked.len(), "ranked table written");
    }
    if let Some(path) = &args.rejections_out {
        report.write_rejections_csv(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows = report.rejected.len(), "rejection list written");
    }

    if args.json {
        let output = EvaluationOutput {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            program_key: &key,
            report: &report,
            skipped_rows: &intake.skipped,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render_report(&key, &report, &intake.skipped, args.top);
    }

    Ok(())
}

fn render_report(key: &str, report: &BatchReport, skipped: &[SkippedRow], top: usize) {
    let summary = &report.summary;
    println!("Eligibility report: {} ({key})", report.program);
    println!("Practice: {}", report.practice);
    println!(
        "- {} evaluated | {} passed | {} rejected | {} unprocessable",
        summary.total_evaluated,
        summary.total_passed,
        summary.total_rejected,
        summary.total_unprocessable
    );
    println!(
        "- {:.1} qualifying acres | mean fit score {:.1}",
        summary.total_acres_passed, summary.mean_score
    );

    if !report.ranked.is_empty() {
        println!("\nTop candidates");
        for row in report.ranked_rows().into_iter().take(top) {
            let stacking = if row.stacking_required { " | stacking required" } else { "" };
            println!(
                "{:>3}. {} | {}/{} | {:.1} ac | score {} | override {}{}",
                row.rank,
                row.parcel_id,
                row.state,
                row.county,
                row.acres,
                row.fit_score,
                row.override_status,
                stacking
            );
        }
        if report.ranked.len() > top {
            println!("  ... {} more", report.ranked.len() - top);
        }
    }

    if !summary.rejections_by_filter.is_empty() {
        println!("\nRejections by filter");
        for (filter, count) in &summary.rejections_by_filter {
            println!("- {filter}: {count}");
        }
    }

    if !report.unprocessable.is_empty() {
        println!("\nUnprocessable records");
        for record in &report.unprocessable {
            println!(
                "- #{} {}: {}",
                record.position + 1,
                record.parcel_id.as_deref().unwrap_or("<no id>"),
                record.reason
            );
        }
    }

    if !skipped.is_empty() {
        println!("\nSkipped input rows");
        for row in skipped {
            println!("- row {}: {}", row.line, row.message);
        }
    }
}
