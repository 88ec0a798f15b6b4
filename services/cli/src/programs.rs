use std::path::PathBuf;

use clap::{Args, Subcommand};
use parcel_eligibility::config::AppConfig;
use parcel_eligibility::eligibility::{ConfigurationError, ProgramDefinition, ProgramStore};
use parcel_eligibility::error::AppError;

use crate::infra::{format_bound, format_list, load_catalog, open_store};

#[derive(Subcommand, Debug)]
pub(crate) enum ProgramsCommand {
    /// List configured programs
    List,
    /// Show one program's requirements and scoring weights
    Show(ShowArgs),
    /// Create a program from the default template
    Create(CreateArgs),
    /// Set one field, e.g. `requirements.max_slope_pct 12`
    Set(SetArgs),
    /// Delete a program
    Delete(KeyArgs),
    /// Validate a program and list every problem found
    Validate(KeyArgs),
    /// Export a program to a standalone file
    Export(ExportArgs),
    /// Import a program from an export file
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct KeyArgs {
    /// Program key
    pub(crate) key: String,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    pub(crate) key: String,
    /// Print the stored definition as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CreateArgs {
    pub(crate) key: String,
    /// Display name (defaults to the key)
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: String,
}

#[derive(Args, Debug)]
pub(crate) struct SetArgs {
    pub(crate) key: String,
    /// `field` or `section.field`
    pub(crate) path: String,
    /// Value; booleans, numbers and `[a, b]` lists are recognised
    pub(crate) value: String,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    pub(crate) key: String,
    /// Destination file (defaults to `<key>_config.json`)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    pub(crate) file: PathBuf,
    /// Store under this key instead of one derived from the program name
    #[arg(long)]
    pub(crate) key: Option<String>,
}

pub(crate) fn run_programs(config: &AppConfig, command: ProgramsCommand) -> Result<(), AppError> {
    let store = open_store(config);
    let mut catalog = load_catalog(&store)?;

    match command {
        ProgramsCommand::List => {
            let summaries = catalog.list();
            if summaries.is_empty() {
                println!("No programs configured in {}", store.location());
                return Ok(());
            }
            println!("Programs in {}", store.location());
            for summary in summaries {
                println!(
                    "- {} | {} | min acres {} | max slope {}%",
                    summary.key,
                    summary.name,
                    format_bound(summary.min_acres),
                    format_bound(summary.max_slope_pct)
                );
                if !summary.description.is_empty() {
                    println!("    {}", summary.description);
                }
            }
        }
        ProgramsCommand::Show(args) => {
            let program = catalog.get(&args.key)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                render_program(&args.key, &program);
            }
        }
        ProgramsCommand::Create(args) => {
            let name = args.name.unwrap_or_else(|| args.key.clone());
            catalog.create(&args.key, &name, &args.description)?;
            store.save(&catalog)?;
            println!("Created program '{}' from the default template", args.key);
        }
        ProgramsCommand::Set(args) => {
            catalog.update_field(&args.key, &args.path, &args.value)?;
            store.save(&catalog)?;
            println!("Updated {}.{} = {}", args.key, args.path, args.value);
            let problems = catalog.validate(&args.key)?;
            if !problems.is_empty() {
                println!("Warning: program now has {} validation issue(s):", problems.len());
                for problem in problems {
                    println!("  - {problem}");
                }
            }
        }
        ProgramsCommand::Delete(args) => {
            let removed = catalog.delete(&args.key)?;
            store.save(&catalog)?;
            println!("Deleted program '{}' ({})", args.key, removed.display_name());
        }
        ProgramsCommand::Validate(args) => {
            let errors = catalog.validate(&args.key)?;
            if errors.is_empty() {
                println!("Program '{}' is valid", args.key);
            } else {
                return Err(ConfigurationError {
                    program: args.key,
                    errors,
                }
                .into());
            }
        }
        ProgramsCommand::Export(args) => {
            let path = catalog.export_to_file(&args.key, args.output.as_deref(), &store.location())?;
            println!("Exported '{}' to {}", args.key, path.display());
        }
        ProgramsCommand::Import(args) => {
            let key = catalog.import_from_file(&args.file, args.key.as_deref())?;
            store.save(&catalog)?;
            println!("Imported program as '{key}'");
        }
    }

    Ok(())
}

fn render_program(key: &str, program: &ProgramDefinition) {
    println!("{} ({key})", program.display_name());
    if let Some(description) = program.description.as_deref() {
        println!("{description}");
    }
    println!("Practice: {}", program.practice());

    if let Some(requirements) = &program.requirements {
        println!("\nRequirements");
        println!(
            "- acres: {} to {}",
            format_bound(requirements.min_acres),
            format_bound(requirements.max_acres)
        );
        println!("- max slope: {}%", format_bound(requirements.max_slope_pct));
        println!("- soils allowed: {}", format_list(&requirements.allowed_soil_orders));
        println!("- soils excluded: {}", format_list(&requirements.excluded_soil_orders));
        println!("- land use: {}", format_list(&requirements.allowed_landuse));
        println!(
            "- min organic matter: {}%",
            format_bound(requirements.min_organic_matter)
        );
        println!("- max erodibility: {}", format_bound(requirements.max_erodibility));
        println!(
            "- max road distance: {} mi",
            format_bound(requirements.max_dist_to_road_miles)
        );
        if !requirements.required_practices.is_empty() {
            println!(
                "- required practices: {} (stacking {})",
                requirements.required_practices.join(", "),
                if requirements.stacking_allowed { "allowed" } else { "not allowed" }
            );
        }
        for entry in requirements.jurisdiction_overrides.entries() {
            println!(
                "- override: {}/{} {} -> {}",
                entry.state,
                entry.jurisdiction,
                entry.practice_type,
                entry.status.label()
            );
        }
        for (county, status) in &requirements.county_restrictions {
            println!("- county restriction: {county} -> {}", status.label());
        }
    }

    let unknown = program.unknown_fields();
    if !unknown.is_empty() {
        println!("\nUnrecognised keys: {}", unknown.join(", "));
    }

    if let Some(weights) = &program.scoring {
        println!("\nScoring (total {})", weights.total());
        for (category, weight) in weights.iter() {
            println!("- {category}: {weight}");
        }
    }
}
