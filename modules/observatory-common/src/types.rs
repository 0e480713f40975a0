use serde::{Deserialize, Serialize};

/// Year value the source uses for undated entries.
pub const UNDATED_YEAR: i32 = 9999;

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

// --- Reference Types ---

/// A country keyed by its ISO-3 code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A policy-area tag attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAreaTag {
    /// Stable short label used for filtering and grouping.
    pub label: String,
    /// Human-readable name.
    pub name: String,
}

impl PolicyAreaTag {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
        }
    }
}

/// Which source table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Policy,
    Research,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Policy => write!(f, "policy"),
            RecordKind::Research => write!(f, "research"),
        }
    }
}

// --- Record ---

/// One policy or research entry. Missing relational fields are empty collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<u64>,
    pub kind: RecordKind,
    pub original_title: String,
    pub english_title: Option<String>,
    pub external_url: Option<String>,
    pub summary: Option<String>,
    pub analysis_status: Option<String>,
    pub countries: Vec<Country>,
    pub years: Vec<i32>,
    pub policy_areas: Vec<PolicyAreaTag>,
    pub secondary_policy_areas: Vec<PolicyAreaTag>,
    pub sectors: Vec<String>,
    pub regions: Vec<String>,
    pub research_types: Vec<String>,
}

impl Record {
    /// A record with only a title set. Used as a starting point by row conversions.
    pub fn titled(kind: RecordKind, original_title: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            original_title: original_title.into(),
            english_title: None,
            external_url: None,
            summary: None,
            analysis_status: None,
            countries: Vec::new(),
            years: Vec::new(),
            policy_areas: Vec::new(),
            secondary_policy_areas: Vec::new(),
            sectors: Vec::new(),
            regions: Vec::new(),
            research_types: Vec::new(),
        }
    }

    /// English title when present, otherwise the original title.
    pub fn display_title(&self) -> &str {
        match self.english_title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.original_title,
        }
    }

    /// The first associated country; the grouping key for per-country counts.
    pub fn primary_country(&self) -> Option<&Country> {
        self.countries.first()
    }

    /// Matches either an ISO-3 code or a display name.
    pub fn has_country(&self, code_or_name: &str) -> bool {
        self.countries
            .iter()
            .any(|c| c.code == code_or_name || c.name == code_or_name)
    }

    pub fn has_policy_area(&self, label: &str) -> bool {
        self.policy_areas.iter().any(|p| p.label == label)
    }

    pub fn most_recent_year(&self) -> Option<i32> {
        self.years.iter().copied().max()
    }

    pub fn has_year_in(&self, start: i32, end: i32) -> bool {
        self.years.iter().any(|y| (start..=end).contains(y))
    }

    /// Years joined for display, in source order.
    pub fn years_label(&self) -> String {
        self.years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn research_type_label(&self) -> String {
        self.research_types.join(", ")
    }
}
