pub mod aggregate;
pub mod color;
pub mod dashboard;
pub mod filter;
pub mod query;
pub mod reference;
pub mod sort;
pub mod source;
pub mod store;
pub mod view;

pub use aggregate::{country_index, highlight_count, histogram, CountryCountIndex, HistogramEntry};
pub use color::FillBand;
pub use dashboard::{Action, Dashboard, Effect, Mode, Section, Status};
pub use filter::{FilterState, SortField, SortKey, SortOrder, YearRange};
pub use query::{Clause, Field, Query, QueryBuilder};
pub use reference::{Boundaries, Centroids, CountryCatalog, ReferenceData};
pub use source::{PolicySource, RecordSource, ResearchSource, StaticSource};
pub use store::{FetchTicket, LoadState, RecordStore};
pub use view::{recompute, DerivedView};
