//! Terminal rendering of the dashboard panels.

use std::fmt::Write;

use observatory_core::{Dashboard, Section, Status};
use observatory_core::view::{BarChart, DerivedView};

const BAR_WIDTH: usize = 30;

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "══ {title} {}", "═".repeat(60usize.saturating_sub(title.len())));
}

pub fn render(dash: &Dashboard) -> String {
    let mut out = String::new();

    match (dash.status(), dash.view()) {
        (Status::Loading, _) | (_, None) => {
            out.push_str("Loading...\n");
            return out;
        }
        (_, Some(view)) => {
            render_highlights(&mut out, view);
            match dash.section() {
                Section::Map => {
                    render_map(&mut out, view);
                    render_chart(&mut out, &view.chart);
                }
                Section::Policies => render_policies(&mut out, view),
                Section::List => render_list(&mut out, view),
            }
        }
    }

    out
}

fn render_highlights(out: &mut String, view: &DerivedView) {
    header(out, "HIGHLIGHTS");
    let _ = writeln!(out, "AI Law and Policy Items  {}", view.highlight_count);
    out.push('\n');
}

fn render_map(out: &mut String, view: &DerivedView) {
    header(out, "MAP");
    if view.map.is_empty() {
        out.push_str("(no countries)\n\n");
        return;
    }
    for cell in view.map.iter().filter(|c| c.tracked) {
        let _ = writeln!(
            out,
            "{:<4} {:<34} {:>4}  {}",
            cell.code,
            cell.name,
            cell.count,
            cell.fill.hex()
        );
    }
    let untracked = view.map.iter().filter(|c| !c.tracked).count();
    if untracked > 0 {
        let _ = writeln!(out, "(+{untracked} untracked)");
    }
    out.push('\n');
}

fn render_chart(out: &mut String, chart: &BarChart) {
    header(out, "POLICY AREAS");
    if chart.bars.is_empty() {
        out.push_str("(no policy areas)\n\n");
        return;
    }
    for bar in &chart.bars {
        let filled = (bar.fraction * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<18} {}{} {}",
            bar.label,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH.saturating_sub(filled)),
            bar.count
        );
    }
    out.push('\n');
}

fn render_policies(out: &mut String, view: &DerivedView) {
    header(out, "RECENT POLICIES");
    if view.recent.is_empty() {
        out.push_str("(no dated policies)\n\n");
        return;
    }
    for entry in &view.recent {
        let _ = writeln!(out, "{}  {}", entry.year, entry.title);
        if !entry.countries.is_empty() {
            let _ = writeln!(out, "      {}", entry.countries.join(", "));
        }
        if let Some(ref url) = entry.url {
            let _ = writeln!(out, "      {url}");
        }
    }
    out.push('\n');
}

fn render_list(out: &mut String, view: &DerivedView) {
    header(out, "LIST");
    if view.table.is_empty() {
        out.push_str("(no records)\n\n");
        return;
    }
    for row in &view.table {
        let _ = writeln!(out, "{}", row.title);
        let _ = writeln!(
            out,
            "    countries: {} | sectors: {} | years: {}",
            row.countries.join(", "),
            row.sectors.join(", "),
            row.years
        );
        if let Some(ref summary) = row.summary {
            let _ = writeln!(out, "    {summary}");
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use observatory_common::{Country, PolicyAreaTag, Record, RecordKind};
    use observatory_core::{Action, CountryCatalog, Mode, ReferenceData, StaticSource};
    use std::sync::Arc;

    async fn dashboard() -> Dashboard {
        let reference = Arc::new(ReferenceData::new(CountryCatalog::new(vec![
            Country::new("ZAF", "South Africa"),
            Country::new("TUN", "Tunisia"),
        ])));
        let mut r = Record::titled(RecordKind::Policy, "White Paper on AI");
        r.countries.push(Country::new("ZAF", "South Africa"));
        r.years = vec![2024];
        r.policy_areas.push(PolicyAreaTag::new("governance", "Governance"));

        let mut dash = Dashboard::new(Mode::Local, reference);
        dash.refresh(&StaticSource::new(vec![r])).await.unwrap();
        dash
    }

    #[tokio::test]
    async fn map_section_shows_counts_and_chart() {
        let out = render(&dashboard().await);
        assert!(out.contains("AI Law and Policy Items  1"));
        assert!(out.contains("ZAF"));
        assert!(out.contains("#dee2e1"));
        assert!(out.contains("governance..."));
    }

    #[tokio::test]
    async fn policies_section_lists_recent() {
        let mut dash = dashboard().await;
        dash.dispatch(Action::ShowSection(Section::Policies));
        let out = render(&dash);
        assert!(out.contains("2024  White Paper on AI"));
    }

    #[tokio::test]
    async fn empty_filter_result_renders_placeholders() {
        let mut dash = dashboard().await;
        dash.dispatch(Action::SetSearch("nothing matches".into()));
        dash.dispatch(Action::ShowSection(Section::List));
        let out = render(&dash);
        assert!(out.contains("AI Law and Policy Items  0"));
        assert!(out.contains("(no records)"));
    }
}
