//! Typed filter expressions.
//!
//! A [`Query`] is a conjunction of [`Clause`]s. It evaluates directly against
//! in-memory records and serializes to the NocoDB `where` grammar
//! (`(field,op,value)` joined with `~and`) only when a request is built.

use observatory_common::rows::PRIMARY_POLICY_AREAS;
use observatory_common::{Record, RecordKind};
use serde::Serialize;

use crate::filter::FilterState;
use crate::reference::CountryCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    PolicyArea,
    Sector,
    ResearchType,
    Year,
    OriginalTitle,
}

impl Field {
    /// Column name in the given source table.
    pub fn column(&self, kind: RecordKind) -> &'static str {
        match (self, kind) {
            (Field::Country, _) => "Country",
            (Field::PolicyArea, _) => PRIMARY_POLICY_AREAS,
            (Field::Sector, _) => "Sectors",
            (Field::ResearchType, _) => "Research type",
            (Field::Year, RecordKind::Policy) => "Year",
            (Field::Year, RecordKind::Research) => "Year published",
            (Field::OriginalTitle, _) => "Original title",
        }
    }

    /// Whether `record` carries `value` in this field. Countries match by code or name.
    fn holds(&self, record: &Record, value: &str) -> bool {
        match self {
            Field::Country => record.has_country(value),
            Field::PolicyArea => record.has_policy_area(value),
            Field::Sector => record.sectors.iter().any(|s| s == value),
            Field::ResearchType => record.research_types.iter().any(|t| t == value),
            Field::Year => value
                .trim()
                .parse::<i32>()
                .is_ok_and(|y| record.years.contains(&y)),
            Field::OriginalTitle => record.original_title == value,
        }
    }

    fn contains_text(&self, record: &Record, text: &str) -> bool {
        match self {
            Field::Country => record
                .countries
                .iter()
                .any(|c| c.code.contains(text) || c.name.contains(text)),
            Field::PolicyArea => record.policy_areas.iter().any(|p| p.label.contains(text)),
            Field::Sector => record.sectors.iter().any(|s| s.contains(text)),
            Field::ResearchType => record.research_types.iter().any(|t| t.contains(text)),
            Field::Year => record.years.iter().any(|y| y.to_string().contains(text)),
            Field::OriginalTitle => record.original_title.contains(text),
        }
    }

    fn is_present(&self, record: &Record) -> bool {
        match self {
            Field::Country => !record.countries.is_empty(),
            Field::PolicyArea => !record.policy_areas.is_empty(),
            Field::Sector => !record.sectors.is_empty(),
            Field::ResearchType => !record.research_types.is_empty(),
            Field::Year => !record.years.is_empty(),
            Field::OriginalTitle => !record.original_title.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Equals { field: Field, value: String },
    /// Matches when the record's values for `field` intersect `values`.
    In { field: Field, values: Vec<String> },
    /// Inclusive numeric range; only years are numeric.
    Range { field: Field, start: i32, end: i32 },
    /// Case-sensitive substring match.
    Contains { field: Field, text: String },
    NotNull { field: Field },
    And(Vec<Clause>),
}

impl Clause {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Clause::Equals { field, value } => field.holds(record, value),
            Clause::In { field, values } => values.iter().any(|v| field.holds(record, v)),
            Clause::Range { field, start, end } => match field {
                Field::Year => record.has_year_in(*start, *end),
                _ => false,
            },
            Clause::Contains { field, text } => field.contains_text(record, text),
            Clause::NotNull { field } => field.is_present(record),
            Clause::And(clauses) => clauses.iter().all(|c| c.matches(record)),
        }
    }

    /// Serialize to the NocoDB filter grammar.
    pub fn to_wire(&self, kind: RecordKind) -> String {
        match self {
            Clause::Equals { field, value } => format!("({},eq,{})", field.column(kind), value),
            Clause::In { field, values } => {
                format!("({},in,{})", field.column(kind), values.join(","))
            }
            Clause::Range { field, start, end } => {
                format!("({},btw,{},{})", field.column(kind), start, end)
            }
            Clause::Contains { field, text } => {
                format!("({},like,%{}%)", field.column(kind), text)
            }
            Clause::NotNull { field } => format!("({},isnot,null)", field.column(kind)),
            Clause::And(clauses) => join_and(clauses, kind),
        }
    }
}

fn join_and(clauses: &[Clause], kind: RecordKind) -> String {
    clauses
        .iter()
        .filter(|c| !matches!(c, Clause::And(inner) if inner.is_empty()))
        .map(|c| match c {
            Clause::And(_) => format!("({})", c.to_wire(kind)),
            _ => c.to_wire(kind),
        })
        .collect::<Vec<_>>()
        .join("~and")
}

/// A conjunction of clauses. The empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    clauses: Vec<Clause>,
}

impl Query {
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Base clause for remote fetches: rows without a country are excluded.
    pub fn with_country() -> Self {
        Self::match_all().and(Clause::NotNull {
            field: Field::Country,
        })
    }

    pub fn and(mut self, clause: Clause) -> Self {
        match clause {
            Clause::And(inner) => self.clauses.extend(inner),
            other => self.clauses.push(other),
        }
        self
    }

    pub fn and_query(mut self, other: Query) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    pub fn filter<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// `where` parameter for the given table, or `None` when nothing is filtered.
    pub fn to_where(&self, kind: RecordKind) -> Option<String> {
        let wire = join_and(&self.clauses, kind);
        (!wire.is_empty()).then_some(wire)
    }
}

/// Translates [`FilterState`] into queries: one clause per non-empty dimension.
pub struct QueryBuilder<'a> {
    catalog: &'a CountryCatalog,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(catalog: &'a CountryCatalog) -> Self {
        Self { catalog }
    }

    /// Predicate over in-memory records. Countries are matched by ISO-3 code.
    pub fn local(filter: &FilterState) -> Query {
        build(filter, filter.countries().iter().cloned().collect())
    }

    /// Query for the remote source. Country links are filtered by display name,
    /// so selected codes are resolved through the catalog.
    pub fn remote(&self, filter: &FilterState) -> Query {
        let names = filter
            .countries()
            .iter()
            .map(|code| {
                self.catalog
                    .name_of(code)
                    .map(str::to_string)
                    .unwrap_or_else(|| code.clone())
            })
            .collect();
        build(filter, names)
    }
}

fn build(filter: &FilterState, countries: Vec<String>) -> Query {
    let mut query = Query::match_all();

    if !countries.is_empty() {
        query = query.and(Clause::In {
            field: Field::Country,
            values: countries,
        });
    }
    if !filter.policy_areas().is_empty() {
        query = query.and(Clause::In {
            field: Field::PolicyArea,
            values: filter.policy_areas().to_vec(),
        });
    }
    if !filter.sectors().is_empty() {
        query = query.and(Clause::In {
            field: Field::Sector,
            values: filter.sectors().iter().cloned().collect(),
        });
    }
    if !filter.research_types().is_empty() {
        query = query.and(Clause::In {
            field: Field::ResearchType,
            values: filter.research_types().iter().cloned().collect(),
        });
    }
    if let Some(range) = filter.year_range() {
        query = query.and(Clause::Range {
            field: Field::Year,
            start: range.start(),
            end: range.end(),
        });
    }
    if !filter.search().is_empty() {
        query = query.and(Clause::Contains {
            field: Field::OriginalTitle,
            text: filter.search().to_string(),
        });
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use observatory_common::{Country, PolicyAreaTag};

    fn record(title: &str, years: &[i32]) -> Record {
        let mut r = Record::titled(RecordKind::Policy, title);
        r.years = years.to_vec();
        r
    }

    #[test]
    fn empty_filter_matches_everything_and_emits_no_where() {
        let query = QueryBuilder::local(&FilterState::new());
        assert!(query.is_match_all());
        assert!(query.matches(&record("anything", &[])));
        assert_eq!(query.to_where(RecordKind::Policy), None);
    }

    #[test]
    fn clauses_join_with_and() {
        let mut filter = FilterState::new();
        filter.toggle_country("KEN");
        filter.toggle_policy_area("data");
        filter.set_year_range(2010, 2020);
        filter.set_search("AI");

        let wire = QueryBuilder::local(&filter)
            .to_where(RecordKind::Policy)
            .unwrap();
        assert_eq!(
            wire,
            "(Country,in,KEN)~and(Observatory AI policy areas - primary,in,data)\
             ~and(Year,btw,2010,2020)~and(Original title,like,%AI%)"
        );
    }

    #[test]
    fn single_dimension_is_well_formed() {
        let mut filter = FilterState::new();
        filter.set_search("policy");
        let wire = QueryBuilder::local(&filter)
            .to_where(RecordKind::Research)
            .unwrap();
        assert_eq!(wire, "(Original title,like,%policy%)");
    }

    #[test]
    fn base_clause_prefixes_filter() {
        let mut filter = FilterState::new();
        filter.toggle_sector("Health");
        let query = Query::with_country().and_query(QueryBuilder::local(&filter));
        assert_eq!(
            query.to_where(RecordKind::Research).unwrap(),
            "(Country,isnot,null)~and(Sectors,in,Health)"
        );
        assert_eq!(
            Query::with_country().to_where(RecordKind::Policy).unwrap(),
            "(Country,isnot,null)"
        );
    }

    #[test]
    fn nested_groups_are_parenthesised() {
        let clause = Clause::And(vec![
            Clause::Equals {
                field: Field::Sector,
                value: "Health".into(),
            },
            Clause::And(vec![Clause::NotNull {
                field: Field::Year,
            }]),
            Clause::And(vec![]),
        ]);
        assert_eq!(
            clause.to_wire(RecordKind::Research),
            "(Sectors,eq,Health)~and((Year published,isnot,null))"
        );
    }

    #[test]
    fn text_search_is_case_sensitive() {
        let mut filter = FilterState::new();
        filter.set_search("Data");
        let query = QueryBuilder::local(&filter);
        assert!(query.matches(&record("Open Data strategy", &[])));
        assert!(!query.matches(&record("open data strategy", &[])));
    }

    #[test]
    fn year_clause_needs_one_year_in_range() {
        let mut filter = FilterState::new();
        filter.set_year_range(2005, 2015);
        let query = QueryBuilder::local(&filter);
        assert!(query.matches(&record("a", &[2001, 2015])));
        assert!(!query.matches(&record("b", &[2001, 2016])));
        assert!(!query.matches(&record("c", &[])));
    }

    #[test]
    fn multi_valued_clauses_use_set_intersection() {
        let mut r = record("a", &[]);
        r.countries = vec![Country::new("GHA", "Ghana"), Country::new("TGO", "Togo")];
        r.policy_areas = vec![PolicyAreaTag::new("ethics", "Ethics")];

        let mut filter = FilterState::new();
        filter.toggle_country("TGO");
        filter.toggle_country("ZAF");
        assert!(QueryBuilder::local(&filter).matches(&r));

        filter.toggle_policy_area("skills");
        assert!(!QueryBuilder::local(&filter).matches(&r));
        filter.toggle_policy_area("ethics");
        assert!(QueryBuilder::local(&filter).matches(&r));
    }

    #[test]
    fn remote_query_uses_country_names() {
        let catalog = CountryCatalog::new(vec![Country::new("ZAF", "South Africa")]);
        let mut filter = FilterState::new();
        filter.toggle_country("ZAF");
        filter.toggle_country("XXX");

        let wire = QueryBuilder::new(&catalog)
            .remote(&filter)
            .to_where(RecordKind::Research)
            .unwrap();
        assert_eq!(wire, "(Country,in,XXX,South Africa)");
    }
}
