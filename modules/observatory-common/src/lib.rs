pub mod config;
pub mod error;
pub mod rows;
pub mod types;

pub use config::AppConfig;
pub use error::ObservatoryError;
pub use rows::{PolicyAreaRow, PolicyRow, ResearchRow, SectorRow, CountryRow};
pub use types::*;
