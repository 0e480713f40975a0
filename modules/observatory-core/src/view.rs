//! Derived view model: everything the presentation layer draws, recomputed in
//! one pass from the record store and the filter state.

use observatory_common::{GeoPoint, Record};
use serde::Serialize;

use crate::aggregate::{
    country_index, highlight_count, histogram, recent_policies, CountryCountIndex, HistogramEntry,
};
use crate::color::FillBand;
use crate::filter::FilterState;
use crate::query::QueryBuilder;
use crate::reference::ReferenceData;
use crate::sort::sort_records;

/// Table titles longer than this are cut.
pub const TITLE_WIDTH: usize = 70;
/// Bar chart labels are always cut to this width and suffixed with `...`.
pub const BAR_LABEL_WIDTH: usize = 15;
/// The chart axis never shows less than this.
pub const MIN_CHART_DOMAIN: usize = 20;

/// Cut `s` to `n` characters, appending `...` when anything was removed.
pub fn truncate(s: &str, n: usize) -> String {
    match s.char_indices().nth(n) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCell {
    pub code: String,
    pub name: String,
    pub count: usize,
    pub tracked: bool,
    pub fill: FillBand,
    pub centroid: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub full_label: String,
    pub count: usize,
    /// Bar length as a fraction of the chart domain, 0.0-1.0.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub domain_max: usize,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn from_histogram(entries: &[HistogramEntry]) -> Self {
        let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
        let domain_max = max.max(MIN_CHART_DOMAIN);
        let bars = entries
            .iter()
            .map(|e| Bar {
                label: format!("{}...", truncate_plain(&e.label, BAR_LABEL_WIDTH)),
                full_label: e.label.clone(),
                count: e.count,
                fraction: e.count as f64 / domain_max as f64,
            })
            .collect();
        Self { domain_max, bars }
    }
}

fn truncate_plain(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub countries: Vec<String>,
    pub sectors: Vec<String>,
    pub research_type: String,
    pub years: String,
}

impl TableRow {
    fn from_record(record: &Record) -> Self {
        Self {
            title: truncate(record.display_title(), TITLE_WIDTH),
            url: record.external_url.clone(),
            summary: record.summary.clone(),
            countries: record.countries.iter().map(|c| c.name.clone()).collect(),
            sectors: record.sectors.clone(),
            research_type: record.research_type_label(),
            years: record.years_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry {
    pub title: String,
    pub url: Option<String>,
    pub countries: Vec<String>,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    /// Indices into the record store of the records passing the filter.
    pub filtered: Vec<usize>,
    pub country_index: CountryCountIndex,
    pub histogram: Vec<HistogramEntry>,
    pub chart: BarChart,
    pub highlight_count: usize,
    pub map: Vec<MapCell>,
    pub recent: Vec<RecentEntry>,
    pub table: Vec<TableRow>,
}

/// Recompute the whole view. Pure; callable without any renderer.
pub fn recompute(records: &[Record], filter: &FilterState, reference: &ReferenceData) -> DerivedView {
    let query = QueryBuilder::local(filter);
    let matching: Vec<(usize, &Record)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| query.matches(r))
        .collect();
    let filtered: Vec<usize> = matching.iter().map(|(i, _)| *i).collect();
    let selected: Vec<&Record> = matching.iter().map(|(_, r)| *r).collect();

    let country_index = country_index(&selected, &reference.catalog);
    let histogram = histogram(&selected, filter.policy_areas());
    let chart = BarChart::from_histogram(&histogram);
    let map = map_cells(&country_index, reference);

    let recent = recent_policies(&selected)
        .into_iter()
        .map(|(r, year)| RecentEntry {
            title: r.display_title().to_string(),
            url: r.external_url.clone(),
            countries: r.countries.iter().map(|c| c.name.clone()).collect(),
            year,
        })
        .collect();

    let mut ordered = selected.clone();
    sort_records(&mut ordered, filter.sort());
    let table = ordered.into_iter().map(TableRow::from_record).collect();

    DerivedView {
        filtered,
        highlight_count: highlight_count(&country_index),
        country_index,
        histogram,
        chart,
        map,
        recent,
        table,
    }
}

/// One cell per boundary feature; without boundaries, one per tracked country.
fn map_cells(index: &CountryCountIndex, reference: &ReferenceData) -> Vec<MapCell> {
    let cell = |code: &str, name: &str| {
        let tracked = reference.catalog.is_tracked(code);
        let count = index.get(code);
        MapCell {
            code: code.to_string(),
            name: name.to_string(),
            count,
            tracked,
            fill: FillBand::for_country(count, tracked),
            centroid: reference.centroids.get(code),
        }
    };

    if reference.boundaries.is_empty() {
        reference
            .catalog
            .iter()
            .map(|c| cell(&c.code, &c.name))
            .collect()
    } else {
        reference
            .boundaries
            .iter()
            .map(|b| cell(&b.code, &b.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observatory_common::RecordKind;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 70), "short");
        assert_eq!(truncate("Stratégie", 5), "Strat...");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn chart_domain_has_floor() {
        let chart = BarChart::from_histogram(&[HistogramEntry {
            label: "Data governance and privacy".into(),
            count: 5,
        }]);
        assert_eq!(chart.domain_max, 20);
        assert_eq!(chart.bars[0].label, "Data governance...");
        assert!((chart.bars[0].fraction - 0.25).abs() < 1e-9);

        let chart = BarChart::from_histogram(&[
            HistogramEntry { label: "a".into(), count: 40 },
            HistogramEntry { label: "b".into(), count: 10 },
        ]);
        assert_eq!(chart.domain_max, 40);
        assert_eq!(chart.bars[0].label, "a...");
        assert!((chart.bars[1].fraction - 0.25).abs() < 1e-9);
    }

    #[test]
    fn empty_chart() {
        let chart = BarChart::from_histogram(&[]);
        assert_eq!(chart.domain_max, MIN_CHART_DOMAIN);
        assert!(chart.bars.is_empty());
    }

    #[test]
    fn table_is_ordered_by_the_title_it_shows() {
        let mut translated = Record::titled(RecordKind::Policy, "Zambia Politique");
        translated.english_title = Some("Alpha policy".into());
        let records = vec![translated, Record::titled(RecordKind::Policy, "Beta policy")];

        let view = recompute(&records, &FilterState::new(), &ReferenceData::default());
        let titles: Vec<_> = view.table.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha policy", "Beta policy"]);
    }
}
