//! A single workbook-backed dataset: records, months, index and load state.
//!
//! Built once at startup and read-only afterwards. A dataset whose workbook is
//! missing or unreadable still exists; it holds no records and remembers why.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::DatasetError;
use crate::index::{key_norm, CompositeIndex};
use crate::kpi::{compute_kpis, KpiSummary};
use crate::loader::{load_workbook, LoadedRows};
use crate::record::{Month, Record};
use crate::selection::Selection;

/// Valid choices for the filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub divisions: Vec<String>,
    pub sa_names: Vec<String>,
}

#[derive(Debug)]
pub struct Dataset {
    name: String,
    source: PathBuf,
    records: Vec<Record>,
    available_months: Vec<Month>,
    load_error: Option<String>,
    index: CompositeIndex,
}

impl Dataset {
    /// Load and index the workbook at `source`. Never fails: load problems
    /// are stored and reported by [`Dataset::ensure_loaded`].
    pub fn load(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let source = source.into();

        match load_workbook(&source) {
            Ok(loaded) => {
                let dataset = Self::from_rows(name, source, loaded);
                info!(
                    "Loaded dataset '{}' from {:?}: {} records, months {:?}, {} index buckets",
                    dataset.name(),
                    dataset.source(),
                    dataset.records().len(),
                    dataset.available_months(),
                    dataset.index.bucket_count()
                );
                dataset
            }
            Err(e) => {
                warn!("Dataset '{}' failed to load from {:?}: {}", name, source, e);
                let mut dataset = Self::from_rows(name, source, LoadedRows::default());
                dataset.load_error = Some(e.to_string());
                dataset
            }
        }
    }

    pub fn from_rows(name: impl Into<String>, source: impl Into<PathBuf>, loaded: LoadedRows) -> Self {
        let LoadedRows {
            mut records,
            months,
        } = loaded;
        let index = CompositeIndex::build(&mut records);

        Self {
            name: name.into(),
            source: source.into(),
            records,
            available_months: months,
            load_error: None,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn available_months(&self) -> &[Month] {
        &self.available_months
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Fail if the workbook could not be loaded, so callers can tell an empty
    /// dataset from a broken one.
    pub fn ensure_loaded(&self) -> Result<(), DatasetError> {
        match &self.load_error {
            Some(message) => Err(DatasetError::LoadFailed {
                dataset: self.name.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Records matching every combination of the three selectors, each once,
    /// in first-seen order.
    pub fn apply_filters(
        &self,
        month: Option<&str>,
        division: Option<&str>,
        advisor: Option<&str>,
    ) -> Vec<&Record> {
        let months = Selection::parse(month);
        let divisions = Selection::parse(division);
        let advisors = Selection::parse(advisor);

        if months.is_empty() || divisions.is_empty() || advisors.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for m in months.values() {
            for d in divisions.values() {
                for a in advisors.values() {
                    for &pos in self.index.lookup(m, d, a) {
                        if seen.insert(pos) {
                            out.push(&self.records[pos]);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn compute_kpis(&self, rows: &[&Record], include_osat: bool) -> KpiSummary {
        compute_kpis(rows, include_osat)
    }

    /// Dropdown options given the current month and division selections.
    ///
    /// `months` always lists every month the workbook has (the whole fiscal
    /// calendar if it has none); divisions narrow by month, advisors by both.
    pub fn filter_options(
        &self,
        month: Option<&str>,
        division: Option<&str>,
    ) -> Result<FilterOptions, DatasetError> {
        self.ensure_loaded()?;

        let months_list: Vec<String> = if self.available_months.is_empty() {
            Month::FISCAL_ORDER.iter().map(|m| m.label().to_string()).collect()
        } else {
            self.available_months.iter().map(|m| m.label().to_string()).collect()
        };

        let months = Selection::parse(month);
        let divisions = Selection::parse(division);

        if months.is_empty() {
            return Ok(FilterOptions {
                months: months_list,
                divisions: Vec::new(),
                sa_names: Vec::new(),
            });
        }

        let mut division_set = BTreeSet::new();
        if months.includes_all() {
            for set in self.index.all_month_divisions() {
                division_set.extend(set.iter().cloned());
            }
        } else {
            for m in months.values() {
                if let Some(set) = self.index.divisions_in_month(&key_norm(Some(m.as_str()))) {
                    division_set.extend(set.iter().cloned());
                }
            }
        }
        let division_list: Vec<String> = division_set.into_iter().collect();

        if divisions.is_empty() {
            return Ok(FilterOptions {
                months: months_list,
                divisions: division_list,
                sa_names: Vec::new(),
            });
        }

        let mut advisors = BTreeSet::new();
        let all_divisions = divisions.includes_all();

        if months.includes_all() {
            let wanted: HashSet<String> = divisions
                .values()
                .iter()
                .filter(|d| !d.eq_ignore_ascii_case("all"))
                .map(|d| key_norm(Some(d.as_str())))
                .collect();
            for record in &self.records {
                let Some(name) = advisor_text(record) else {
                    continue;
                };
                if all_divisions || wanted.contains(&key_norm(record.division.as_deref())) {
                    advisors.insert(name.to_string());
                }
            }
        } else {
            for m in months.values() {
                let month_key = key_norm(Some(m.as_str()));
                if all_divisions {
                    for set in self.index.advisors_in_month(&month_key) {
                        advisors.extend(set.iter().cloned());
                    }
                } else {
                    for d in divisions.values() {
                        if let Some(set) = self.index.advisors_in(&month_key, &key_norm(Some(d.as_str()))) {
                            advisors.extend(set.iter().cloned());
                        }
                    }
                }
            }
        }

        Ok(FilterOptions {
            months: months_list,
            divisions: division_list,
            sa_names: advisors.into_iter().collect(),
        })
    }
}

fn advisor_text(record: &Record) -> Option<&str> {
    record
        .sa_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
