use parcel_eligibility::config::AppConfig;
use parcel_eligibility::eligibility::{
    BatchOptions, JsonProgramStore, ProgramCatalog, ProgramDefinition, ProgramStore,
};
use parcel_eligibility::error::AppError;

pub(crate) fn open_store(config: &AppConfig) -> JsonProgramStore {
    JsonProgramStore::new(config.store.path.clone())
}

/// Loads the catalog, treating a missing configuration file as empty.
pub(crate) fn load_catalog(store: &JsonProgramStore) -> Result<ProgramCatalog, AppError> {
    if !store.path().exists() {
        return Ok(ProgramCatalog::new());
    }
    Ok(store.load()?)
}

/// Resolves the program for a batch: the explicit key, else the configured default, else the
/// only program in the catalog.
pub(crate) fn select_program(
    config: &AppConfig,
    catalog: &ProgramCatalog,
    requested: Option<&str>,
) -> Result<(String, ProgramDefinition), AppError> {
    let key = match requested.or(config.store.default_program.as_deref()) {
        Some(key) => key.to_string(),
        None => {
            let mut keys = catalog.keys();
            match (keys.next(), keys.next()) {
                (Some(only), None) => only.to_string(),
                (None, _) => {
                    return Err(AppError::Usage(format!(
                        "no programs configured in {}",
                        config.store.path.display()
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(AppError::Usage(
                        "several programs are configured; pass --program KEY".to_string(),
                    ))
                }
            }
        }
    };
    let program = catalog.get(&key)?;
    Ok((key, program))
}

pub(crate) fn batch_options(config: &AppConfig, sequential: bool) -> BatchOptions {
    BatchOptions {
        parallel: config.evaluation.parallel && !sequential,
    }
}

pub(crate) fn format_bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value}"))
}

pub(crate) fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        "any".to_string()
    } else {
        values.join(", ")
    }
}
