use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nocodb_client::NocoDbClient;
use observatory_common::AppConfig;
use observatory_core::source::{fetch_countries, fetch_policy_areas, fetch_sectors};
use observatory_core::{
    Action, Dashboard, Effect, Mode, PolicySource, RecordSource, ReferenceData, ResearchSource,
    Section, SortField, SortKey, SortOrder, StaticSource,
};

mod render;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SectionArg {
    Map,
    Policies,
    List,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Map => Section::Map,
            SectionArg::Policies => Section::Policies,
            SectionArg::List => Section::List,
        }
    }
}

/// Policy and research dashboard over the observatory tables.
#[derive(Debug, Parser)]
#[command(name = "observatory-dash")]
struct Args {
    /// Browse the research directory (server-side filtering) instead of the policy map.
    #[arg(long)]
    repository: bool,

    /// Policy-area label to select. Repeatable; order is kept.
    #[arg(long = "policy-area")]
    policy_areas: Vec<String>,

    /// ISO-3 country code to select. Repeatable.
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Sector to select. Repeatable.
    #[arg(long = "sector")]
    sectors: Vec<String>,

    /// Research type to select. Repeatable.
    #[arg(long = "research-type")]
    research_types: Vec<String>,

    /// First year of the range (inclusive).
    #[arg(long, requires = "to")]
    from: Option<i32>,

    /// Last year of the range (inclusive).
    #[arg(long, requires = "from")]
    to: Option<i32>,

    /// Case-sensitive substring of the original title.
    #[arg(long)]
    search: Option<String>,

    /// Table sort field: title, research-type or year.
    #[arg(long, default_value = "title")]
    sort: SortField,

    /// Sort the table in descending order.
    #[arg(long)]
    descending: bool,

    #[arg(long, value_enum, default_value = "map")]
    section: SectionArg,

    /// Read records from a JSON file instead of the API.
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Directory holding the reference data files.
    #[arg(long, env = "OBSERVATORY_REFERENCE_DIR")]
    reference_dir: Option<PathBuf>,

    /// Print the derived view as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        actions.extend(self.policy_areas.iter().cloned().map(Action::TogglePolicyArea));
        actions.extend(self.countries.iter().cloned().map(Action::ToggleCountry));
        actions.extend(self.sectors.iter().cloned().map(Action::ToggleSector));
        actions.extend(self.research_types.iter().cloned().map(Action::ToggleResearchType));
        if let (Some(start), Some(end)) = (self.from, self.to) {
            actions.push(Action::SetYearRange { start, end });
        }
        if let Some(ref text) = self.search {
            actions.push(Action::SetSearch(text.clone()));
        }
        let order = if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        actions.push(Action::SetSort(SortKey {
            field: self.sort,
            order,
        }));
        actions.push(Action::ShowSection(self.section.into()));
        actions
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("observatory=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mode = if args.repository { Mode::Remote } else { Mode::Local };

    let (source, reference_dir): (Box<dyn RecordSource>, PathBuf) = match args.fixture {
        Some(ref path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading fixture {}", path.display()))?;
            let dir = args.reference_dir.clone().unwrap_or_else(|| PathBuf::from("data"));
            (Box::new(StaticSource::from_json(&json)?), dir)
        }
        None => {
            let config = AppConfig::from_env()?;
            let client = Arc::new(NocoDbClient::new(
                &config.api_url,
                config.api_token.clone(),
                config.timeout,
            )?);

            if args.repository {
                match fetch_countries(&client).await {
                    Ok(countries) => info!(count = countries.len(), "Countries available"),
                    Err(e) => warn!(error = %e, "Could not load countries"),
                }
                match fetch_sectors(&client).await {
                    Ok(sectors) => info!(count = sectors.len(), "Sectors available"),
                    Err(e) => warn!(error = %e, "Could not load sectors"),
                }
            } else {
                match fetch_policy_areas(&client).await {
                    Ok(areas) => info!(count = areas.len(), "Policy areas available"),
                    Err(e) => warn!(error = %e, "Could not load policy areas"),
                }
            }

            let source: Box<dyn RecordSource> = if args.repository {
                Box::new(ResearchSource::new(client, config.page_size))
            } else {
                Box::new(PolicySource::new(client, config.page_size))
            };
            let dir = args.reference_dir.clone().unwrap_or(config.reference_dir);
            (source, dir)
        }
    };

    let reference = Arc::new(ReferenceData::load(&reference_dir)?);
    let mut dash = Dashboard::new(mode, reference);

    // Policy map: fetch once, then filter locally.
    if mode == Mode::Local {
        if let Err(e) = dash.refresh(source.as_ref()).await {
            warn!(error = %e, "Showing empty dashboard");
        }
    }

    let mut refetch = mode == Mode::Remote;
    for action in args.actions() {
        if dash.dispatch(action) == Effect::RefetchRequired {
            refetch = true;
        }
    }
    if refetch {
        if let Err(e) = dash.refresh(source.as_ref()).await {
            warn!(error = %e, "Showing previous results");
        }
    }

    if args.json {
        match dash.view() {
            Some(view) => println!("{}", serde_json::to_string_pretty(view)?),
            None => println!("null"),
        }
    } else {
        print!("{}", render::render(&dash));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use observatory_core::CountryCatalog;

    fn sort_after(argv: &[&str]) -> SortKey {
        let args = Args::parse_from(argv);
        let mut dash = Dashboard::new(
            Mode::Local,
            Arc::new(ReferenceData::new(CountryCatalog::default())),
        );
        for action in args.actions() {
            dash.dispatch(action);
        }
        dash.filter().sort()
    }

    #[test]
    fn default_sort_is_title_ascending() {
        assert_eq!(
            sort_after(&["observatory-dash"]),
            SortKey {
                field: SortField::Title,
                order: SortOrder::Ascending,
            }
        );
    }

    #[test]
    fn descending_flag_sorts_descending() {
        assert_eq!(
            sort_after(&["observatory-dash", "--descending"]).order,
            SortOrder::Descending
        );
        assert_eq!(
            sort_after(&["observatory-dash", "--sort", "year", "--descending"]),
            SortKey {
                field: SortField::YearPublished,
                order: SortOrder::Descending,
            }
        );
        assert_eq!(
            sort_after(&["observatory-dash", "--sort", "year"]).order,
            SortOrder::Ascending
        );
    }

    #[test]
    fn year_range_needs_both_bounds() {
        assert!(Args::try_parse_from(["observatory-dash", "--from", "2001"]).is_err());
        let args = Args::parse_from(["observatory-dash", "--from", "2001", "--to", "2010"]);
        assert!(args
            .actions()
            .contains(&Action::SetYearRange { start: 2001, end: 2010 }));
    }
}
