use observatory_common::Record;

use crate::filter::{SortField, SortKey, SortOrder};

/// Display string a record is ordered by.
pub fn sort_value(record: &Record, field: SortField) -> String {
    match field {
        SortField::Title => record.display_title().to_string(),
        SortField::ResearchType => record.research_type_label(),
        SortField::YearPublished => record.years_label(),
    }
}

/// Order records for the table. Comparison is ordinal on the display string;
/// descending is the exact reverse of ascending, ties included.
pub fn sort_records(records: &mut [&Record], key: SortKey) {
    let mut keyed: Vec<(String, &Record)> = records
        .iter()
        .map(|r| (sort_value(r, key.field), *r))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    if key.order == SortOrder::Descending {
        keyed.reverse();
    }

    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
}
