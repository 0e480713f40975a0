//! The dashboard state machine: one [`FilterState`], one [`RecordStore`], and
//! the view derived from them. Every action goes through [`Dashboard::dispatch`].

use std::sync::Arc;

use observatory_common::{ObservatoryError, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::filter::{FilterState, SortField, SortKey};
use crate::query::{Query, QueryBuilder};
use crate::reference::ReferenceData;
use crate::source::RecordSource;
use crate::store::{LoadState, RecordStore};
use crate::view::{recompute, DerivedView};

/// Which panel is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Map,
    Policies,
    List,
}

/// Where filtering happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fetch everything once, filter and aggregate in memory (policy map).
    Local,
    /// Re-fetch with a server-side filter on every change (research directory).
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TogglePolicyArea(String),
    ToggleCountry(String),
    ToggleSector(String),
    ToggleResearchType(String),
    SetYearRange { start: i32, end: i32 },
    ClearYearRange,
    SetSearch(String),
    SelectSort(SortField),
    /// Set field and direction outright, independent of the current sort.
    SetSort(SortKey),
    ShowSection(Section),
    ResetFilters,
}

/// What the caller has to do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The derived view is up to date.
    Recomputed,
    /// The filter changed in remote mode; call [`Dashboard::refresh`].
    RefetchRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Empty,
    Loading,
    Ready,
}

pub struct Dashboard {
    mode: Mode,
    store: RecordStore,
    filter: FilterState,
    section: Section,
    reference: Arc<ReferenceData>,
    view: DerivedView,
}

impl Dashboard {
    pub fn new(mode: Mode, reference: Arc<ReferenceData>) -> Self {
        let store = RecordStore::new();
        let filter = FilterState::new();
        let view = recompute(store.records(), &filter, &reference);
        Self {
            mode,
            store,
            filter,
            section: Section::default(),
            reference,
            view,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn status(&self) -> Status {
        match self.store.state() {
            LoadState::Empty => Status::Empty,
            LoadState::Loading => Status::Loading,
            LoadState::Ready => Status::Ready,
        }
    }

    /// The derived view, or `None` while a fetch is outstanding.
    pub fn view(&self) -> Option<&DerivedView> {
        (!self.store.is_loading()).then_some(&self.view)
    }

    pub fn filtered_records(&self) -> Vec<&Record> {
        let records = self.store.records();
        self.view
            .filtered
            .iter()
            .filter_map(|&i| records.get(i))
            .collect()
    }

    /// Apply one user action.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        debug!(?action, "Dispatch");
        match action {
            Action::ShowSection(section) => {
                self.section = section;
                return Effect::Recomputed;
            }
            Action::SelectSort(field) => {
                // Sorting only reorders what is already loaded.
                self.filter.select_sort(field);
                self.recompute();
                return Effect::Recomputed;
            }
            Action::SetSort(key) => {
                self.filter.set_sort(key);
                self.recompute();
                return Effect::Recomputed;
            }
            Action::TogglePolicyArea(label) => self.filter.toggle_policy_area(label),
            Action::ToggleCountry(code) => self.filter.toggle_country(code),
            Action::ToggleSector(sector) => self.filter.toggle_sector(sector),
            Action::ToggleResearchType(t) => self.filter.toggle_research_type(t),
            Action::SetYearRange { start, end } => self.filter.set_year_range(start, end),
            Action::ClearYearRange => self.filter.clear_year_range(),
            Action::SetSearch(text) => self.filter.set_search(text),
            Action::ResetFilters => self.filter.reset(),
        }

        match self.mode {
            Mode::Local => {
                self.recompute();
                Effect::Recomputed
            }
            Mode::Remote => Effect::RefetchRequired,
        }
    }

    /// Rebuild the derived view from the store and filter.
    pub fn recompute(&mut self) {
        self.view = recompute(self.store.records(), &self.filter, &self.reference);
    }

    /// Query sent to the record source for the current state.
    pub fn fetch_query(&self) -> Query {
        match self.mode {
            Mode::Local => Query::match_all(),
            Mode::Remote => QueryBuilder::new(&self.reference.catalog).remote(&self.filter),
        }
    }

    /// Fetch records and recompute. Takes `&mut self`, so at most one fetch is
    /// outstanding per dashboard. On failure the previous records stay in place.
    pub async fn refresh(&mut self, source: &dyn RecordSource) -> Result<(), ObservatoryError> {
        let ticket = self.store.begin_load();
        let query = self.fetch_query();

        match source.fetch(&query).await {
            Ok(records) => {
                let count = records.len();
                if self.store.finish_load(ticket, records) {
                    self.recompute();
                    info!(
                        records = count,
                        matching = self.view.filtered.len(),
                        "Dashboard refreshed"
                    );
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Dashboard refresh failed");
                self.store.fail_load(ticket);
                self.recompute();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::CountryCatalog;
    use crate::source::StaticSource;
    use async_trait::async_trait;
    use observatory_common::{Country, RecordKind};

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch(&self, _query: &Query) -> Result<Vec<Record>, ObservatoryError> {
            Err(ObservatoryError::Config("offline".into()))
        }
    }

    fn reference() -> Arc<ReferenceData> {
        Arc::new(ReferenceData::new(CountryCatalog::new(vec![Country::new(
            "NGA", "Nigeria",
        )])))
    }

    fn record(title: &str) -> Record {
        let mut r = Record::titled(RecordKind::Policy, title);
        r.countries.push(Country::new("NGA", "Nigeria"));
        r
    }

    #[test]
    fn new_dashboard_is_empty_with_zero_counts() {
        let dash = Dashboard::new(Mode::Local, reference());
        assert_eq!(dash.status(), Status::Empty);
        let view = dash.view().unwrap();
        assert_eq!(view.country_index.get("NGA"), 0);
        assert_eq!(view.highlight_count, 0);
    }

    #[test]
    fn remote_mode_requests_refetch() {
        let mut dash = Dashboard::new(Mode::Remote, reference());
        assert_eq!(
            dash.dispatch(Action::SetSearch("AI".into())),
            Effect::RefetchRequired
        );
        assert_eq!(
            dash.dispatch(Action::ShowSection(Section::List)),
            Effect::Recomputed
        );
        assert_eq!(dash.section(), Section::List);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_records() {
        let mut dash = Dashboard::new(Mode::Local, reference());
        let source = StaticSource::new(vec![record("a"), record("b")]);
        dash.refresh(&source).await.unwrap();
        assert_eq!(dash.view().unwrap().highlight_count, 2);

        assert!(dash.refresh(&FailingSource).await.is_err());
        assert_eq!(dash.status(), Status::Ready);
        assert_eq!(dash.view().unwrap().highlight_count, 2);
    }

    #[tokio::test]
    async fn set_sort_is_absolute() {
        use crate::filter::SortOrder;

        let mut dash = Dashboard::new(Mode::Remote, reference());
        dash.refresh(&StaticSource::new(vec![record("b"), record("a")]))
            .await
            .unwrap();

        let key = SortKey {
            field: SortField::Title,
            order: SortOrder::Descending,
        };
        assert_eq!(dash.dispatch(Action::SetSort(key)), Effect::Recomputed);
        assert_eq!(dash.dispatch(Action::SetSort(key)), Effect::Recomputed);
        assert_eq!(dash.filter().sort(), key);

        let titles: Vec<_> = dash.view().unwrap().table.iter().map(|r| r.title.clone()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }
}
