//! Composite (month, division, advisor) index with wildcard entries.
//!
//! Every record is registered under all eight combinations of
//! {specific, "all"} across the three dimensions, so any filter combination
//! is a single hash lookup. Records are referenced by their position in the
//! owning dataset's record list.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::record::Record;

/// Wildcard key: no restriction on a dimension.
pub const WILDCARD: &str = "all";

/// Lookup key for one dimension. Absent or empty values collapse to the wildcard,
/// so a record without a division is indistinguishable from "All" here.
pub fn key_norm(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.trim().to_lowercase(),
        _ => WILDCARD.to_string(),
    }
}

type IndexKey = (String, String, String);

#[derive(Debug, Default)]
pub struct CompositeIndex {
    buckets: HashMap<IndexKey, Vec<usize>>,
    /// month key → divisions seen (original text)
    divisions_by_month: HashMap<String, BTreeSet<String>>,
    /// (month key, division key) → advisors seen (original text)
    advisors_by_month_division: HashMap<(String, String), BTreeSet<String>>,
}

/// Record ordering inside every bucket: (division, advisor, month label), absent first.
pub fn record_order(a: &Record, b: &Record) -> Ordering {
    let key = |r: &Record| {
        (
            r.division.clone().unwrap_or_default(),
            r.sa_name.clone().unwrap_or_default(),
            r.month.label(),
        )
    };
    key(a).cmp(&key(b))
}

/// The key itself plus the wildcard, once each.
fn with_wildcard(key: &str) -> Vec<&str> {
    if key == WILDCARD {
        vec![WILDCARD]
    } else {
        vec![key, WILDCARD]
    }
}

impl CompositeIndex {
    /// Sort `records` in place (stable) and index them.
    pub fn build(records: &mut [Record]) -> Self {
        records.sort_by(record_order);

        let mut index = Self::default();
        for (pos, record) in records.iter().enumerate() {
            index.insert(pos, record);
        }
        index
    }

    fn insert(&mut self, pos: usize, record: &Record) {
        let m = key_norm(Some(record.month.label()));
        let d = key_norm(record.division.as_deref());
        let a = key_norm(record.sa_name.as_deref());

        let division_text = record.division.as_deref().unwrap_or("").trim();
        let advisor_text = record.sa_name.as_deref().unwrap_or("").trim();

        if !division_text.is_empty() {
            self.divisions_by_month
                .entry(m.clone())
                .or_default()
                .insert(division_text.to_string());
            if !advisor_text.is_empty() {
                self.advisors_by_month_division
                    .entry((m.clone(), d.clone()))
                    .or_default()
                    .insert(advisor_text.to_string());
            }
        }

        for month_key in with_wildcard(&m) {
            for division_key in with_wildcard(&d) {
                for advisor_key in with_wildcard(&a) {
                    self.buckets
                        .entry((
                            month_key.to_string(),
                            division_key.to_string(),
                            advisor_key.to_string(),
                        ))
                        .or_default()
                        .push(pos);
                }
            }
        }
    }

    /// Record positions for one (month, division, advisor) selector triple.
    pub fn lookup(&self, month: &str, division: &str, advisor: &str) -> &[usize] {
        let key = (
            key_norm(Some(month)),
            key_norm(Some(division)),
            key_norm(Some(advisor)),
        );
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn divisions_in_month(&self, month_key: &str) -> Option<&BTreeSet<String>> {
        self.divisions_by_month.get(month_key)
    }

    pub fn all_month_divisions(&self) -> impl Iterator<Item = &BTreeSet<String>> {
        self.divisions_by_month.values()
    }

    pub fn advisors_in(&self, month_key: &str, division_key: &str) -> Option<&BTreeSet<String>> {
        self.advisors_by_month_division
            .get(&(month_key.to_string(), division_key.to_string()))
    }

    /// Advisor sets of every division seen in a month.
    pub fn advisors_in_month<'a>(
        &'a self,
        month_key: &'a str,
    ) -> impl Iterator<Item = &'a BTreeSet<String>> + 'a {
        self.advisors_by_month_division
            .iter()
            .filter(move |((m, _), _)| m == month_key)
            .map(|(_, names)| names)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
