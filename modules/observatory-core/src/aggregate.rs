//! Per-country counts and the policy-area histogram.
//!
//! Both are rebuilt from scratch on every pass over the filtered record set.

use std::collections::{BTreeMap, HashMap};

use observatory_common::{Record, UNDATED_YEAR};
use serde::Serialize;

use crate::reference::CountryCatalog;

/// Country code -> number of filtered records whose primary country it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryCountIndex {
    counts: BTreeMap<String, usize>,
}

impl CountryCountIndex {
    /// Zero for codes with no entry.
    pub fn get(&self, code: &str) -> usize {
        self.counts.get(code).copied().unwrap_or(0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.counts.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Group records by primary country. Every tracked country gets an entry,
/// including zero counts; records without a country are dropped.
pub fn country_index(records: &[&Record], catalog: &CountryCatalog) -> CountryCountIndex {
    let mut counts: BTreeMap<String, usize> =
        catalog.iter().map(|c| (c.code.clone(), 0)).collect();

    for record in records {
        if let Some(country) = record.primary_country() {
            *counts.entry(country.code.clone()).or_insert(0) += 1;
        }
    }

    CountryCountIndex { counts }
}

/// Total item count shown in the highlights panel.
pub fn highlight_count(index: &CountryCountIndex) -> usize {
    index.total()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramEntry {
    pub label: String,
    pub count: usize,
}

/// Policy-area histogram over the filtered records.
///
/// With no selection: one entry per distinct label seen, in first-seen order.
/// With a selection: exactly one entry per selected label, in selection
/// order, zero counts included.
pub fn histogram(records: &[&Record], selected: &[String]) -> Vec<HistogramEntry> {
    if selected.is_empty() {
        return empirical_histogram(records);
    }

    let mut entries: Vec<HistogramEntry> = Vec::with_capacity(selected.len());
    for label in selected {
        if entries.iter().any(|e| e.label == *label) {
            continue;
        }
        let count = records.iter().filter(|r| r.has_policy_area(label)).count();
        entries.push(HistogramEntry {
            label: label.clone(),
            count,
        });
    }
    entries
}

fn empirical_histogram(records: &[&Record]) -> Vec<HistogramEntry> {
    let mut entries: Vec<HistogramEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        for (i, tag) in record.policy_areas.iter().enumerate() {
            // A label repeated on one record counts once.
            if record.policy_areas[..i].iter().any(|t| t.label == tag.label) {
                continue;
            }
            match positions.get(tag.label.as_str()) {
                Some(&pos) => entries[pos].count += 1,
                None => {
                    positions.insert(tag.label.as_str(), entries.len());
                    entries.push(HistogramEntry {
                        label: tag.label.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    entries
}

/// Dated records, most recent year first. Records with no year, or whose
/// first year is the undated sentinel, are left out.
pub fn recent_policies<'a>(records: &[&'a Record]) -> Vec<(&'a Record, i32)> {
    let mut dated: Vec<(&Record, i32)> = records
        .iter()
        .filter(|r| r.years.first().is_some_and(|y| *y != UNDATED_YEAR))
        .filter_map(|r| r.most_recent_year().map(|y| (*r, y)))
        .collect();

    dated.sort_by(|a, b| b.1.cmp(&a.1));
    dated
}
