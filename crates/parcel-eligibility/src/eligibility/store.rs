//! Program configuration store: the administrative side of program definitions.
//!
//! Programs are cloned out of the catalog, so edits never reach a definition that an
//! evaluation already holds.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::domain::slugify;
use super::program::{validate, ProgramDefinition, Requirements, ScoreCategory, ScoringWeights, ValidationError};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum ProgramStoreError {
    #[error("program '{0}' not found")]
    NotFound(String),
    #[error("program '{0}' already exists")]
    Conflict(String),
    #[error("invalid field path '{0}' (use 'field' or 'section.field')")]
    InvalidPath(String),
    #[error("update of '{path}' does not produce a valid program: {source}")]
    InvalidUpdate {
        path: String,
        source: serde_json::Error,
    },
    #[error("'{0}' is not a program export (missing \"program\")")]
    InvalidExport(PathBuf),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed program document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("program store unavailable: {0}")]
    Unavailable(String),
}

/// Listing entry for `list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub min_acres: Option<f64>,
    pub max_slope_pct: Option<f64>,
}

/// The configuration document: programs by key, plus any other top-level sections kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramCatalog {
    #[serde(default)]
    programs: BTreeMap<String, ProgramDefinition>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Export file layout.
#[derive(Debug, Serialize, Deserialize)]
struct ProgramExport {
    program: Option<ProgramDefinition>,
    #[serde(default)]
    exported: bool,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exported_at: Option<String>,
}

impl ProgramCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<ProgramSummary> {
        self.programs
            .iter()
            .map(|(key, program)| {
                let requirements = program.requirements.as_ref();
                ProgramSummary {
                    key: key.clone(),
                    name: program.name.clone().unwrap_or_default(),
                    description: program.description.clone().unwrap_or_default(),
                    min_acres: requirements.and_then(|req| req.min_acres),
                    max_slope_pct: requirements.and_then(|req| req.max_slope_pct),
                }
            })
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    /// Returns a copy of the program; a missing practice type defaults to the key.
    pub fn get(&self, key: &str) -> Result<ProgramDefinition, ProgramStoreError> {
        let mut program = self
            .programs
            .get(key)
            .cloned()
            .ok_or_else(|| ProgramStoreError::NotFound(key.to_string()))?;
        if program.practice_type.is_none() {
            program.practice_type = Some(key.to_string());
        }
        Ok(program)
    }

    /// Creates a program from the default template.
    pub fn create(&mut self, key: &str, name: &str, description: &str) -> Result<(), ProgramStoreError> {
        let key = key.trim();
        if self.programs.contains_key(key) {
            return Err(ProgramStoreError::Conflict(key.to_string()));
        }
        self.programs
            .insert(key.to_string(), template_program(name, description));
        info!(program = key, "created program");
        Ok(())
    }

    /// Adds or replaces a program wholesale, returning the replaced definition.
    pub fn insert(&mut self, key: &str, program: ProgramDefinition) -> Option<ProgramDefinition> {
        self.programs.insert(key.trim().to_string(), program)
    }

    /// Sets `path` (`field` or `section.field`) to the coerced `raw` value.
    ///
    /// The change is applied to a copy and only committed when the result is still a
    /// well-formed program document and the path names a field the schema knows.
    pub fn update_field(&mut self, key: &str, path: &str, raw: &str) -> Result<(), ProgramStoreError> {
        let current = self
            .programs
            .get(key)
            .ok_or_else(|| ProgramStoreError::NotFound(key.to_string()))?;

        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if segments.is_empty() || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(ProgramStoreError::InvalidPath(path.to_string()));
        }
        let invalid_path = || ProgramStoreError::InvalidPath(path.to_string());

        let value = coerce_value(raw);
        let clears = value.is_null();
        let mut document = serde_json::to_value(current)?;
        set_path(&mut document, &segments, value).ok_or_else(invalid_path)?;

        let updated: ProgramDefinition =
            serde_json::from_value(document).map_err(|source| ProgramStoreError::InvalidUpdate {
                path: path.to_string(),
                source,
            })?;

        let dotted = segments.join(".");
        let lands_in_extra = updated.unknown_fields().iter().any(|field| {
            dotted == *field || dotted.starts_with(&format!("{field}."))
        });
        let round_trip = serde_json::to_value(&updated)?;
        if lands_in_extra || (!clears && get_path(&round_trip, &segments).is_none()) {
            return Err(invalid_path());
        }

        self.programs.insert(key.to_string(), updated);
        info!(program = key, path, value = raw, "updated program field");
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<ProgramDefinition, ProgramStoreError> {
        let removed = self
            .programs
            .remove(key)
            .ok_or_else(|| ProgramStoreError::NotFound(key.to_string()))?;
        info!(program = key, name = removed.display_name(), "deleted program");
        Ok(removed)
    }

    pub fn validate(&self, key: &str) -> Result<Vec<ValidationError>, ProgramStoreError> {
        let program = self
            .programs
            .get(key)
            .ok_or_else(|| ProgramStoreError::NotFound(key.to_string()))?;
        Ok(validate(program))
    }

    /// Writes one program to a standalone export file. Defaults to `<key>_config.json`.
    pub fn export_to_file(
        &self,
        key: &str,
        path: Option<&Path>,
        source: &str,
    ) -> Result<PathBuf, ProgramStoreError> {
        let program = self
            .programs
            .get(key)
            .cloned()
            .ok_or_else(|| ProgramStoreError::NotFound(key.to_string()))?;
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(format!("{key}_config.json")));

        let export = ProgramExport {
            program: Some(program),
            exported: true,
            source: Some(source.to_string()),
            exported_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        write_json(&path, &export)?;
        info!(program = key, path = %path.display(), "exported program");
        Ok(path)
    }

    /// Imports an export file. Without `key` the program name's slug is used; an existing
    /// program under that key is overwritten.
    pub fn import_from_file(&mut self, path: &Path, key: Option<&str>) -> Result<String, ProgramStoreError> {
        let export: ProgramExport = read_json(path)?;
        let program = export
            .program
            .ok_or_else(|| ProgramStoreError::InvalidExport(path.to_path_buf()))?;

        let key = match key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => key.to_string(),
            None => slugify(program.name.as_deref().unwrap_or_default()),
        };
        if key.is_empty() {
            return Err(ProgramStoreError::InvalidExport(path.to_path_buf()));
        }
        if self.programs.contains_key(&key) {
            warn!(program = %key, "program already exists; overwriting with imported definition");
        }
        self.programs.insert(key.clone(), program);
        info!(program = %key, path = %path.display(), "imported program");
        Ok(key)
    }
}

/// Persistence for the catalog.
pub trait ProgramStore: Send + Sync {
    fn load(&self) -> Result<ProgramCatalog, ProgramStoreError>;
    fn save(&self, catalog: &ProgramCatalog) -> Result<(), ProgramStoreError>;
    /// Human readable origin, recorded in exports.
    fn location(&self) -> String;
}

/// Catalog persisted as a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonProgramStore {
    path: PathBuf,
}

impl JsonProgramStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgramStore for JsonProgramStore {
    fn load(&self) -> Result<ProgramCatalog, ProgramStoreError> {
        read_json(&self.path)
    }

    fn save(&self, catalog: &ProgramCatalog) -> Result<(), ProgramStoreError> {
        write_json(&self.path, catalog)?;
        info!(path = %self.path.display(), "program configuration saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Store used by tests and embedding callers that manage persistence themselves.
#[derive(Debug, Default)]
pub struct InMemoryProgramStore {
    catalog: Mutex<ProgramCatalog>,
}

impl InMemoryProgramStore {
    pub fn new(catalog: ProgramCatalog) -> Self {
        Self {
            catalog: Mutex::new(catalog),
        }
    }
}

impl ProgramStore for InMemoryProgramStore {
    fn load(&self) -> Result<ProgramCatalog, ProgramStoreError> {
        self.catalog
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| ProgramStoreError::Unavailable("catalog mutex poisoned".to_string()))
    }

    fn save(&self, catalog: &ProgramCatalog) -> Result<(), ProgramStoreError> {
        let mut guard = self
            .catalog
            .lock()
            .map_err(|_| ProgramStoreError::Unavailable("catalog mutex poisoned".to_string()))?;
        *guard = catalog.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

fn template_program(name: &str, description: &str) -> ProgramDefinition {
    let to_strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    let requirements = Requirements {
        min_acres: Some(10.0),
        max_acres: Some(1000.0),
        max_slope_pct: Some(15.0),
        max_dist_to_road_miles: Some(1.0),
        allowed_soil_orders: to_strings(&["Alfisols", "Mollisols", "Entisols"]),
        excluded_soil_orders: to_strings(&["Histosols"]),
        allowed_landuse: to_strings(&["farmland", "farmyard"]),
        min_organic_matter: Some(1.0),
        max_erodibility: Some(0.4),
        stacking_allowed: true,
        ..Requirements::default()
    };
    let scoring = [
        (ScoreCategory::Acres, 25),
        (ScoreCategory::SoilHealth, 25),
        (ScoreCategory::ErosionRisk, 25),
        (ScoreCategory::Access, 25),
    ]
    .into_iter()
    .collect::<ScoringWeights>();

    ProgramDefinition::new(name.trim(), description.trim(), requirements, scoring)
}

/// Interprets a raw CLI value: booleans, `null`, integers, decimals, `[a, b]` lists of
/// strings, otherwise a plain string.
pub fn coerce_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "none" => return Value::Null,
        _ => {}
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::from(integer);
    }
    if let Ok(decimal) = trimmed.parse::<f64>() {
        if decimal.is_finite() {
            return Value::from(decimal);
        }
    }
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect();
        return Value::Array(items);
    }
    Value::String(trimmed.to_string())
}

fn set_path(document: &mut Value, segments: &[&str], value: Value) -> Option<()> {
    let (last, parents) = segments.split_last()?;
    let mut cursor = document;
    for segment in parents {
        let object = cursor.as_object_mut()?;
        let child = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if child.is_null() {
            *child = Value::Object(Map::new());
        }
        cursor = child;
    }
    cursor.as_object_mut()?.insert(last.to_string(), value);
    Some(())
}

fn get_path<'a>(document: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(document, |cursor, segment| cursor.as_object()?.get(*segment))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ProgramStoreError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ProgramStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Writes to a temporary sibling and renames it over `path`.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProgramStoreError> {
    let body = serde_json::to_string_pretty(value)?;
    let io_error = |source| ProgramStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(body.as_bytes()).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}
