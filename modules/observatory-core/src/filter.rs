use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Inclusive year range. `start <= end` always holds; bounds given in the
/// wrong order are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    ResearchType,
    YearPublished,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "Original title",
            SortField::ResearchType => "Research type",
            SortField::YearPublished => "Year published",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" | "original title" => Ok(SortField::Title),
            "research-type" | "research_type" | "research type" => Ok(SortField::ResearchType),
            "year" | "year-published" | "year published" => Ok(SortField::YearPublished),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            field: SortField::Title,
            order: SortOrder::Ascending,
        }
    }
}

/// The user's current selection. Starts empty (match everything) and is only
/// changed through the methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    policy_areas: Vec<String>,
    countries: BTreeSet<String>,
    sectors: BTreeSet<String>,
    research_types: BTreeSet<String>,
    year_range: Option<YearRange>,
    search: String,
    sort: SortKey,
}

fn toggle(set: &mut BTreeSet<String>, value: String) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected policy-area labels, in the order they were selected.
    pub fn policy_areas(&self) -> &[String] {
        &self.policy_areas
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn sectors(&self) -> &BTreeSet<String> {
        &self.sectors
    }

    pub fn research_types(&self) -> &BTreeSet<String> {
        &self.research_types
    }

    pub fn year_range(&self) -> Option<YearRange> {
        self.year_range
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// True when no dimension restricts the record set.
    pub fn is_unfiltered(&self) -> bool {
        self.policy_areas.is_empty()
            && self.countries.is_empty()
            && self.sectors.is_empty()
            && self.research_types.is_empty()
            && self.year_range.is_none()
            && self.search.is_empty()
    }

    /// Checking an unchecked area appends it; unchecking removes it and keeps
    /// the order of the rest.
    pub fn toggle_policy_area(&mut self, label: impl Into<String>) {
        let label = label.into();
        if let Some(pos) = self.policy_areas.iter().position(|l| *l == label) {
            self.policy_areas.remove(pos);
        } else {
            self.policy_areas.push(label);
        }
    }

    pub fn toggle_country(&mut self, code: impl Into<String>) {
        toggle(&mut self.countries, code.into());
    }

    pub fn toggle_sector(&mut self, sector: impl Into<String>) {
        toggle(&mut self.sectors, sector.into());
    }

    pub fn toggle_research_type(&mut self, research_type: impl Into<String>) {
        toggle(&mut self.research_types, research_type.into());
    }

    pub fn set_year_range(&mut self, start: i32, end: i32) {
        self.year_range = Some(YearRange::new(start, end));
    }

    pub fn clear_year_range(&mut self) {
        self.year_range = None;
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Selecting the current field again flips direction; a new field starts ascending.
    pub fn select_sort(&mut self, field: SortField) {
        self.sort = if self.sort.field == field {
            SortKey {
                field,
                order: self.sort.order.reversed(),
            }
        } else {
            SortKey {
                field,
                order: SortOrder::Ascending,
            }
        };
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = key;
    }

    /// Clear every filter dimension. Sort order is kept.
    pub fn reset(&mut self) {
        *self = Self {
            sort: self.sort,
            ..Self::default()
        };
    }
}
