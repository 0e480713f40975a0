//! Row shapes returned by the NocoDB tables, and their conversion into [`Record`]s.
//!
//! Linked fields arrive as arrays of objects and may be `null`, missing, or
//! contain `null` entries. All of those deserialize to empty collections.

use serde::{Deserialize, Deserializer};

use crate::types::{Country, PolicyAreaTag, Record, RecordKind};

pub const POLICY_TABLE: &str = "Policy and Governance Map";
pub const POLICY_AREA_TABLE: &str = "Observatory AI policy areas";
pub const RESEARCH_TABLE: &str = "Research Directory";
pub const COUNTRY_TABLE: &str = "Country";
pub const SECTOR_TABLE: &str = "Sectors";

pub const PRIMARY_POLICY_AREAS: &str = "Observatory AI policy areas - primary";
pub const SECONDARY_POLICY_AREAS: &str = "Observatory AI policy areas - secondary";

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

/// Year cells come back as numbers or numeric strings depending on column type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum YearValue {
    Number(i64),
    Text(String),
}

impl YearValue {
    fn as_year(&self) -> Option<i32> {
        match self {
            YearValue::Number(n) => i32::try_from(*n).ok(),
            YearValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryLink {
    #[serde(rename = "Country code", default)]
    pub code: Option<String>,
    #[serde(rename = "Country name", default)]
    pub name: Option<String>,
}

impl CountryLink {
    fn into_country(self) -> Option<Country> {
        let code = self.code.filter(|c| !c.is_empty())?;
        let name = self.name.unwrap_or_else(|| code.clone());
        Some(Country { code, name })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearLink {
    #[serde(rename = "Year", default)]
    year: Option<YearValue>,
}

impl YearLink {
    fn year(&self) -> Option<i32> {
        self.year.as_ref().and_then(YearValue::as_year)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyAreaLink {
    #[serde(rename = "policy_label", default)]
    pub label: Option<String>,
    #[serde(rename = "Policy area", default)]
    pub name: Option<String>,
}

impl PolicyAreaLink {
    fn into_tag(self) -> Option<PolicyAreaTag> {
        let label = self.label.filter(|l| !l.is_empty())?;
        let name = self.name.unwrap_or_else(|| label.clone());
        Some(PolicyAreaTag { label, name })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectorLink {
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
}

/// Generic single-title link (regions, research types).
#[derive(Debug, Clone, Deserialize)]
pub struct TitleLink {
    #[serde(rename = "Title", alias = "Region", alias = "Research type", default)]
    pub title: Option<String>,
}

fn countries(links: Vec<CountryLink>) -> Vec<Country> {
    links.into_iter().filter_map(CountryLink::into_country).collect()
}

fn years(links: &[YearLink]) -> Vec<i32> {
    links.iter().filter_map(YearLink::year).collect()
}

fn tags(links: Vec<PolicyAreaLink>) -> Vec<PolicyAreaTag> {
    links.into_iter().filter_map(PolicyAreaLink::into_tag).collect()
}

fn titles(links: Vec<TitleLink>) -> Vec<String> {
    links.into_iter().filter_map(|l| l.title).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A row of the "Policy and Governance Map" table.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRow {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "Original title", default)]
    pub original_title: Option<String>,
    #[serde(rename = "English title", default)]
    pub english_title: Option<String>,
    #[serde(rename = "External URL", default)]
    pub external_url: Option<String>,
    #[serde(rename = "Analysis status", default)]
    pub analysis_status: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "null_as_empty")]
    pub country: Vec<CountryLink>,
    #[serde(rename = "Year", default, deserialize_with = "null_as_empty")]
    pub year: Vec<YearLink>,
    #[serde(
        rename = "Observatory AI policy areas - primary",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub primary_policy_areas: Vec<PolicyAreaLink>,
    #[serde(
        rename = "Observatory AI policy areas - secondary",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub secondary_policy_areas: Vec<PolicyAreaLink>,
    #[serde(rename = "Region", default, deserialize_with = "null_as_empty")]
    pub region: Vec<TitleLink>,
}

impl PolicyRow {
    /// Field projection requested from the policy table.
    pub const FIELDS: &'static [&'static str] = &[
        "Original title",
        "English title",
        "External URL",
        "Country",
        "Year",
        "Analysis status",
        PRIMARY_POLICY_AREAS,
        SECONDARY_POLICY_AREAS,
    ];

    pub fn into_record(self) -> Record {
        let mut record = Record::titled(
            RecordKind::Policy,
            self.original_title.unwrap_or_default(),
        );
        record.id = self.id;
        record.english_title = non_empty(self.english_title);
        record.external_url = non_empty(self.external_url);
        record.analysis_status = non_empty(self.analysis_status);
        record.countries = countries(self.country);
        record.years = years(&self.year);
        record.policy_areas = tags(self.primary_policy_areas);
        record.secondary_policy_areas = tags(self.secondary_policy_areas);
        record.regions = titles(self.region);
        record
    }
}

/// A row of the "Research Directory" table.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRow {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "Original title", default)]
    pub original_title: Option<String>,
    #[serde(rename = "English title", default)]
    pub english_title: Option<String>,
    #[serde(rename = "External URL", default)]
    pub external_url: Option<String>,
    #[serde(rename = "Short summary", default)]
    pub short_summary: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "null_as_empty")]
    pub country: Vec<CountryLink>,
    #[serde(rename = "Year published", default, deserialize_with = "null_as_empty")]
    pub year_published: Vec<YearLink>,
    #[serde(rename = "Sectors", default, deserialize_with = "null_as_empty")]
    pub sectors: Vec<SectorLink>,
    #[serde(rename = "Region", default, deserialize_with = "null_as_empty")]
    pub region: Vec<TitleLink>,
    #[serde(rename = "Research type", default, deserialize_with = "null_as_empty")]
    pub research_type: Vec<TitleLink>,
}

impl ResearchRow {
    pub fn into_record(self) -> Record {
        let mut record = Record::titled(
            RecordKind::Research,
            self.original_title.unwrap_or_default(),
        );
        record.id = self.id;
        record.english_title = non_empty(self.english_title);
        record.external_url = non_empty(self.external_url);
        record.summary = non_empty(self.short_summary);
        record.countries = countries(self.country);
        record.years = years(&self.year_published);
        record.sectors = self.sectors.into_iter().filter_map(|s| s.sector).collect();
        record.regions = titles(self.region);
        record.research_types = titles(self.research_type);
        record
    }
}

/// A row of the "Observatory AI policy areas" reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyAreaRow {
    #[serde(rename = "policy_label", default)]
    pub label: Option<String>,
    #[serde(rename = "Policy area", default)]
    pub name: Option<String>,
}

impl PolicyAreaRow {
    pub fn into_tag(self) -> Option<PolicyAreaTag> {
        PolicyAreaLink {
            label: self.label,
            name: self.name,
        }
        .into_tag()
    }
}

/// A row of the "Country" reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryRow {
    #[serde(rename = "Country code", default)]
    pub code: Option<String>,
    #[serde(rename = "Country name", default)]
    pub name: Option<String>,
}

impl CountryRow {
    pub fn into_country(self) -> Option<Country> {
        CountryLink {
            code: self.code,
            name: self.name,
        }
        .into_country()
    }
}

/// A row of the "Sectors" reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct SectorRow {
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn policy_row_converts_linked_fields() {
        let row: PolicyRow = serde_json::from_value(json!({
            "Id": 7,
            "Original title": "Stratégie nationale",
            "English title": "National strategy",
            "External URL": "https://example.org/p/7",
            "Country": [{ "Country name": "Senegal", "Country code": "SEN" }],
            "Year": [{ "Year": 2021 }, { "Year": "2023" }],
            "Observatory AI policy areas - primary": [
                { "Policy area": "Data governance", "policy_label": "data" }
            ],
        }))
        .unwrap();

        let record = row.into_record();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.kind, RecordKind::Policy);
        assert_eq!(record.display_title(), "National strategy");
        assert_eq!(record.countries, vec![Country::new("SEN", "Senegal")]);
        assert_eq!(record.years, vec![2021, 2023]);
        assert_eq!(record.policy_areas, vec![PolicyAreaTag::new("data", "Data governance")]);
        assert!(record.secondary_policy_areas.is_empty());
    }

    #[test]
    fn null_links_become_empty() {
        let row: PolicyRow = serde_json::from_value(json!({
            "Original title": "Bare",
            "Country": null,
            "Year": [null, { "Year": null }],
            "Observatory AI policy areas - primary": null,
        }))
        .unwrap();

        let record = row.into_record();
        assert!(record.countries.is_empty());
        assert!(record.years.is_empty());
        assert!(record.policy_areas.is_empty());
    }

    #[test]
    fn research_row_collects_sectors() {
        let row: ResearchRow = serde_json::from_value(json!({
            "Original title": "AI in agriculture",
            "Short summary": "Survey",
            "Sectors": [{ "Sector": "Agriculture" }, null, { "Sector": "Health" }],
            "Country": [{ "Country name": "Ghana", "Country code": "GHA" }],
            "Year published": [{ "Year": 2019 }],
            "Research type": [{ "Title": "Report" }],
        }))
        .unwrap();

        let record = row.into_record();
        assert_eq!(record.kind, RecordKind::Research);
        assert_eq!(record.sectors, vec!["Agriculture", "Health"]);
        assert_eq!(record.summary.as_deref(), Some("Survey"));
        assert_eq!(record.research_types, vec!["Report"]);
        assert_eq!(record.years, vec![2019]);
    }

    #[test]
    fn country_without_code_is_dropped() {
        let row: CountryRow = serde_json::from_value(json!({ "Country name": "Nowhere" })).unwrap();
        assert!(row.into_country().is_none());
    }
}
