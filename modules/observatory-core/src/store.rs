use chrono::{DateTime, Utc};
use observatory_common::Record;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing has been loaded yet.
    Empty,
    Loading,
    Ready,
}

/// Identifies one fetch. Only the most recently issued ticket may complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Raw fetched records. Replaced wholesale on every successful fetch.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    state: LoadState,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: LoadState::Empty,
            generation: 0,
            loaded_at: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Start a fetch. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Install fetched records. Returns false, leaving the store untouched,
    /// when the ticket has been superseded.
    pub fn finish_load(&mut self, ticket: FetchTicket, records: Vec<Record>) -> bool {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, current = self.generation, "Ignoring superseded fetch");
            return false;
        }
        self.records = records;
        self.state = LoadState::Ready;
        self.loaded_at = Some(Utc::now());
        true
    }

    /// Abandon a failed fetch. The store goes back to what it held before:
    /// the previous records if any were loaded, otherwise empty.
    pub fn fail_load(&mut self, ticket: FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = if self.loaded_at.is_some() {
            LoadState::Ready
        } else {
            LoadState::Empty
        };
        warn!(
            ticket = ticket.0,
            kept = self.records.len(),
            "Fetch failed, keeping previous records"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observatory_common::RecordKind;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::titled(RecordKind::Policy, format!("r{i}")))
            .collect()
    }

    #[test]
    fn superseded_ticket_is_ignored() {
        let mut store = RecordStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(store.finish_load(second, records(2)));
        assert!(!store.finish_load(first, records(5)));
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.state(), LoadState::Ready);
    }

    #[test]
    fn failure_restores_previous_state() {
        let mut store = RecordStore::new();
        let t = store.begin_load();
        assert!(store.fail_load(t));
        assert_eq!(store.state(), LoadState::Empty);

        let t = store.begin_load();
        store.finish_load(t, records(3));
        let t = store.begin_load();
        assert!(store.is_loading());
        store.fail_load(t);
        assert_eq!(store.state(), LoadState::Ready);
        assert_eq!(store.records().len(), 3);
    }
}
