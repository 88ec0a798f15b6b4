//! Jurisdiction override ("negative list") table.
//!
//! Entries map (state, jurisdiction, practice type) to an eligibility status. Keys are
//! normalized on insert so lookups are insensitive to case and surrounding whitespace;
//! jurisdictions without an entry are eligible.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{normalize_key, same_category};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideStatus {
    #[default]
    Eligible,
    Ineligible,
}

impl OverrideStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OverrideStatus::Eligible => "ELIGIBLE",
            OverrideStatus::Ineligible => "INELIGIBLE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ELIGIBLE" => Some(Self::Eligible),
            "INELIGIBLE" => Some(Self::Ineligible),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionOverrideEntry {
    pub state: String,
    #[serde(alias = "county")]
    pub jurisdiction: String,
    pub practice_type: String,
    pub status: OverrideStatus,
}

impl JurisdictionOverrideEntry {
    pub fn new(state: &str, jurisdiction: &str, practice_type: &str, status: OverrideStatus) -> Self {
        Self {
            state: normalize_key(state),
            jurisdiction: normalize_key(jurisdiction),
            practice_type: normalize_practice(practice_type),
            status,
        }
    }
}

type OverrideKey = (String, String, String);

/// Lookup table backing the jurisdiction override filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<JurisdictionOverrideEntry>", into = "Vec<JurisdictionOverrideEntry>")]
pub struct JurisdictionOverrideTable {
    entries: BTreeMap<OverrideKey, OverrideStatus>,
}

/// Result of resolving a parcel's jurisdiction against the table for one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideResolution {
    /// Status recorded for the program's own practice.
    pub status: OverrideStatus,
    pub passed: bool,
    pub stacking_required: bool,
}

impl JurisdictionOverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = JurisdictionOverrideEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    /// Adds or replaces an entry, returning the status it replaced.
    pub fn insert(&mut self, entry: JurisdictionOverrideEntry) -> Option<OverrideStatus> {
        let key = (
            normalize_key(&entry.state),
            normalize_key(&entry.jurisdiction),
            normalize_practice(&entry.practice_type),
        );
        self.entries.insert(key, entry.status)
    }

    /// Folds another table in; its entries win on conflicting keys.
    pub fn merge(&mut self, other: &JurisdictionOverrideTable) {
        for (key, status) in &other.entries {
            self.entries.insert(key.clone(), *status);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<JurisdictionOverrideEntry> {
        self.entries
            .iter()
            .map(|((state, jurisdiction, practice), status)| JurisdictionOverrideEntry {
                state: state.clone(),
                jurisdiction: jurisdiction.clone(),
                practice_type: practice.clone(),
                status: *status,
            })
            .collect()
    }

    pub fn status(&self, state: &str, jurisdiction: &str, practice_type: &str) -> OverrideStatus {
        let key = (
            normalize_key(state),
            normalize_key(jurisdiction),
            normalize_practice(practice_type),
        );
        self.entries.get(&key).copied().unwrap_or_default()
    }

    /// Practices the table flags as ineligible in the given jurisdiction.
    pub fn ineligible_practices<'a>(
        &'a self,
        state: &str,
        jurisdiction: &str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let state = normalize_key(state);
        let jurisdiction = normalize_key(jurisdiction);
        self.entries
            .iter()
            .filter(move |((s, j, _), status)| {
                *s == state && *j == jurisdiction && **status == OverrideStatus::Ineligible
            })
            .map(|((_, _, practice), _)| practice.as_str())
    }

    /// Applies the override and stacking rules for a program crediting `practice`.
    ///
    /// A jurisdiction flagged ineligible for the program's own practice only passes when
    /// stacking is allowed and one of the other required practices is not flagged there;
    /// the parcel is then marked as requiring stacking. When the own practice is eligible
    /// but some other practice is flagged, stacking is required if the program allows it.
    pub fn resolve(
        &self,
        state: &str,
        jurisdiction: &str,
        practice: &str,
        required_practices: &[String],
        stacking_allowed: bool,
    ) -> OverrideResolution {
        let status = self.status(state, jurisdiction, practice);
        self.resolve_with_status(
            status,
            state,
            jurisdiction,
            practice,
            required_practices,
            stacking_allowed,
        )
    }

    /// Same rules as [`resolve`](Self::resolve) with the own-practice status supplied by the
    /// caller, for restrictions recorded outside this table.
    pub fn resolve_with_status(
        &self,
        status: OverrideStatus,
        state: &str,
        jurisdiction: &str,
        practice: &str,
        required_practices: &[String],
        stacking_allowed: bool,
    ) -> OverrideResolution {
        let flagged: Vec<&str> = self.ineligible_practices(state, jurisdiction).collect();

        match status {
            OverrideStatus::Ineligible => {
                let partner = required_practices.iter().any(|candidate| {
                    !same_category(candidate, practice)
                        && !flagged.iter().any(|flag| same_category(flag, candidate))
                });
                let passed = stacking_allowed && partner;
                OverrideResolution {
                    status,
                    passed,
                    stacking_required: passed,
                }
            }
            OverrideStatus::Eligible => {
                let other_flagged = flagged.iter().any(|flag| !same_category(flag, practice));
                OverrideResolution {
                    status,
                    passed: true,
                    stacking_required: stacking_allowed && other_flagged,
                }
            }
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, OverrideTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `state,county,practice_type,status` rows. Later rows replace earlier ones.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, OverrideTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();

        for (index, record) in csv_reader.deserialize::<OverrideRow>().enumerate() {
            let row = record?;
            // header is line 1
            let line = index + 2;
            let status = OverrideStatus::parse(&row.status).ok_or_else(|| {
                OverrideTableError::UnknownStatus {
                    line,
                    value: row.status.clone(),
                }
            })?;
            let entry =
                JurisdictionOverrideEntry::new(&row.state, &row.jurisdiction, &row.practice_type, status);
            if let Some(previous) = table.insert(entry) {
                warn!(
                    line,
                    state = %row.state,
                    jurisdiction = %row.jurisdiction,
                    practice = %row.practice_type,
                    previous = previous.label(),
                    "override row replaces an earlier entry"
                );
            }
        }

        Ok(table)
    }
}

impl From<Vec<JurisdictionOverrideEntry>> for JurisdictionOverrideTable {
    fn from(entries: Vec<JurisdictionOverrideEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<JurisdictionOverrideTable> for Vec<JurisdictionOverrideEntry> {
    fn from(table: JurisdictionOverrideTable) -> Self {
        table.entries()
    }
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    state: String,
    #[serde(alias = "county")]
    jurisdiction: String,
    practice_type: String,
    status: String,
}

fn normalize_practice(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideTableError {
    #[error("failed to read override table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid override table data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unknown override status '{value}' (expected ELIGIBLE or INELIGIBLE)")]
    UnknownStatus { line: usize, value: String },
}
