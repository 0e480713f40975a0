//! Where records come from: the NocoDB tables, or a fixed in-memory set.

use std::sync::Arc;

use async_trait::async_trait;
use nocodb_client::{ListParams, NocoDbClient};
use observatory_common::rows::{
    CountryRow, PolicyAreaRow, PolicyRow, ResearchRow, SectorRow, COUNTRY_TABLE,
    POLICY_AREA_TABLE, POLICY_TABLE, PRIMARY_POLICY_AREAS, RESEARCH_TABLE,
    SECONDARY_POLICY_AREAS, SECTOR_TABLE,
};
use observatory_common::{Country, ObservatoryError, PolicyAreaTag, Record, RecordKind};
use tracing::info;

use crate::query::{Field, Query};

/// Row limit for the small reference tables.
const REFERENCE_LIMIT: u32 = 250;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record matching `query`.
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>, ObservatoryError>;
}

/// The "Policy and Governance Map" table.
pub struct PolicySource {
    client: Arc<NocoDbClient>,
    page_size: u32,
}

impl PolicySource {
    pub fn new(client: Arc<NocoDbClient>, page_size: u32) -> Self {
        Self { client, page_size }
    }

    pub fn params(&self, query: &Query) -> ListParams {
        let query = Query::with_country().and_query(query.clone());
        ListParams::new(self.page_size)
            .fields(PolicyRow::FIELDS.iter().copied())
            .nested("Country", ["Country name", "Country code"])
            .nested(PRIMARY_POLICY_AREAS, ["Policy area", "policy_label"])
            .nested(SECONDARY_POLICY_AREAS, ["Policy area", "policy_label"])
            .where_clause(query.to_where(RecordKind::Policy))
    }
}

#[async_trait]
impl RecordSource for PolicySource {
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>, ObservatoryError> {
        let rows: Vec<PolicyRow> = self
            .client
            .list_all(POLICY_TABLE, &self.params(query))
            .await?;
        info!(count = rows.len(), "Fetched policy records");
        Ok(rows.into_iter().map(PolicyRow::into_record).collect())
    }
}

/// The "Research Directory" table.
pub struct ResearchSource {
    client: Arc<NocoDbClient>,
    page_size: u32,
}

impl ResearchSource {
    pub fn new(client: Arc<NocoDbClient>, page_size: u32) -> Self {
        Self { client, page_size }
    }

    pub fn params(&self, query: &Query) -> ListParams {
        let query = Query::with_country().and_query(query.clone());
        // Every link the local pass re-tests has to be projected.
        ListParams::new(self.page_size)
            .nested("Country", ["Country name", "Country code"])
            .nested(Field::Sector.column(RecordKind::Research), ["Sector"])
            .nested(Field::ResearchType.column(RecordKind::Research), ["Title"])
            .nested(Field::Year.column(RecordKind::Research), ["Year"])
            .nested("Region", ["Title"])
            .where_clause(query.to_where(RecordKind::Research))
    }
}

#[async_trait]
impl RecordSource for ResearchSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>, ObservatoryError> {
        let rows: Vec<ResearchRow> = self
            .client
            .list_all(RESEARCH_TABLE, &self.params(query))
            .await?;
        info!(count = rows.len(), "Fetched research records");
        Ok(rows.into_iter().map(ResearchRow::into_record).collect())
    }
}

/// A fixed record set, filtered in memory. Used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load records from a JSON array of serialized [`Record`]s.
    pub fn from_json(json: &str) -> Result<Self, ObservatoryError> {
        let records: Vec<Record> = serde_json::from_str(json)
            .map_err(|e| ObservatoryError::ReferenceData(format!("record fixture: {e}")))?;
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>, ObservatoryError> {
        Ok(query.filter(&self.records).into_iter().cloned().collect())
    }
}

/// All policy areas, in table order.
pub async fn fetch_policy_areas(
    client: &NocoDbClient,
) -> Result<Vec<PolicyAreaTag>, ObservatoryError> {
    let rows: Vec<PolicyAreaRow> = client
        .list_all(POLICY_AREA_TABLE, &ListParams::new(REFERENCE_LIMIT))
        .await?;
    Ok(rows.into_iter().filter_map(PolicyAreaRow::into_tag).collect())
}

/// Countries offered in the research directory's country picker.
pub async fn fetch_countries(client: &NocoDbClient) -> Result<Vec<Country>, ObservatoryError> {
    let rows: Vec<CountryRow> = client
        .list_all(COUNTRY_TABLE, &ListParams::new(REFERENCE_LIMIT))
        .await?;
    Ok(rows.into_iter().filter_map(CountryRow::into_country).collect())
}

pub async fn fetch_sectors(client: &NocoDbClient) -> Result<Vec<String>, ObservatoryError> {
    let rows: Vec<SectorRow> = client
        .list_all(SECTOR_TABLE, &ListParams::new(REFERENCE_LIMIT))
        .await?;
    Ok(rows.into_iter().filter_map(|r| r.sector).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use crate::query::QueryBuilder;
    use std::time::Duration;

    fn client() -> Arc<NocoDbClient> {
        Arc::new(
            NocoDbClient::new("http://127.0.0.1:9/api", "t", Duration::from_secs(1)).unwrap(),
        )
    }

    #[test]
    fn policy_params_always_require_country() {
        let source = PolicySource::new(client(), 150);
        let params = source.params(&Query::match_all());
        assert_eq!(params.limit, 150);
        assert_eq!(params.where_clause.as_deref(), Some("(Country,isnot,null)"));
        assert_eq!(params.nested.len(), 3);
    }

    #[test]
    fn research_params_carry_filter() {
        let mut filter = FilterState::new();
        filter.toggle_sector("Health");
        filter.set_search("AI");
        let source = ResearchSource::new(client(), 250);
        let params = source.params(&QueryBuilder::local(&filter));
        assert_eq!(
            params.where_clause.as_deref(),
            Some("(Country,isnot,null)~and(Sectors,in,Health)~and(Original title,like,%AI%)")
        );
    }

    #[test]
    fn research_params_project_filtered_links() {
        let source = ResearchSource::new(client(), 250);
        let params = source.params(&Query::match_all());
        let projected: Vec<(&str, &[String])> = params
            .nested
            .iter()
            .map(|n| (n.field.as_str(), n.fields.as_slice()))
            .collect();

        for (field, key) in [
            ("Sectors", "Sector"),
            ("Research type", "Title"),
            ("Year published", "Year"),
        ] {
            assert!(
                projected
                    .iter()
                    .any(|(f, keys)| *f == field && keys.iter().any(|k| k == key)),
                "{field} is not projected with {key}"
            );
        }
    }

    #[tokio::test]
    async fn static_source_filters_in_memory() {
        let mut a = Record::titled(RecordKind::Policy, "Data Act");
        a.years = vec![2020];
        let b = Record::titled(RecordKind::Policy, "Skills plan");
        let source = StaticSource::new(vec![a, b]);

        let mut filter = FilterState::new();
        filter.set_search("Data");
        let found = source.fetch(&QueryBuilder::local(&filter)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].original_title, "Data Act");
    }
}
