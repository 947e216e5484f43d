//! Text rendering for command output

use std::fmt::Write as _;

use domain::{
    AnalysisResult, ApplicationSummary, BcmsNotice, HeatmapPoint, InboxItem, KeyFacts, Page,
    PlanningApplication, ProgressEvent, PropertySale, Report, ZoningInfo,
};
use serde::Serialize;

/// Pretty JSON for `--json`
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

pub fn page_footer<T>(page: &Page<T>) -> String {
    format!(
        "Page {} of {} ({} total)",
        page.page,
        page.page_count(),
        page.total
    )
}

/// One line per application
pub fn application_table(page: &Page<ApplicationSummary>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<20} {:<11} {:<12} ADDRESS",
        "NUMBER", "AUTHORITY", "RECEIVED", "STATUS"
    );
    for app in &page.items {
        let received = app
            .received_date
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        let _ = writeln!(
            out,
            "{:<16} {:<20} {:<11} {:<12} {}",
            app.application_number,
            truncate(&app.planning_authority, 20),
            received,
            app.status.as_str(),
            truncate(&app.address, 60)
        );
    }
    out.push_str(&page_footer(page));
    out
}

/// A block per application
pub fn application_cards(page: &Page<ApplicationSummary>) -> String {
    let mut out = String::new();
    for app in &page.items {
        let _ = writeln!(out, "{} · {}", app.application_number, app.status.as_str());
        let _ = writeln!(out, "  {}", or_dash(Some(&app.address)));
        let _ = writeln!(out, "  {}", or_dash(Some(&app.planning_authority)));
        if let Some(description) = &app.description {
            let _ = writeln!(out, "  {}", truncate(description, 160));
        }
        out.push('\n');
    }
    out.push_str(&page_footer(page));
    out
}

/// `[lat, lng]` markers for applications with a location
pub fn application_markers(page: &Page<ApplicationSummary>) -> Vec<(String, [f64; 2])> {
    page.items
        .iter()
        .filter_map(|app| {
            app.location.map(|loc| {
                (
                    app.application_number.clone(),
                    [loc.latitude(), loc.longitude()],
                )
            })
        })
        .collect()
}

pub fn application_map(page: &Page<ApplicationSummary>) -> String {
    let markers = application_markers(page);
    let mut out = String::new();
    for (number, [lat, lng]) in &markers {
        let _ = writeln!(out, "{lat:.6},{lng:.6}  {number}");
    }
    let _ = write!(
        out,
        "{} of {} applications on this page have a location",
        markers.len(),
        page.items.len()
    );
    out
}

pub fn application_detail(app: &PlanningApplication) -> String {
    let s = &app.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", s.application_number, s.status.as_str());
    let _ = writeln!(out, "  Authority:   {}", or_dash(Some(&s.planning_authority)));
    let _ = writeln!(out, "  Address:     {}", or_dash(Some(&s.address)));
    let _ = writeln!(out, "  Applicant:   {}", or_dash(app.applicant_name.as_deref()));
    let _ = writeln!(out, "  Development: {}", or_dash(app.development_type.as_deref()));
    if let Some(received) = s.received_date {
        let _ = writeln!(out, "  Received:    {received}");
    }
    if let Some(decided) = s.decision_date {
        let _ = writeln!(out, "  Decided:     {decided} ({})", or_dash(app.decision.as_deref()));
    }
    if let Some(appeal) = &app.appeal_reference {
        let _ = writeln!(out, "  Appeal:      {appeal}");
    }
    let _ = write!(out, "  Documents:   {}", app.document_count);
    if let Some(description) = &s.description {
        let _ = write!(out, "\n\n{description}");
    }
    out
}

pub fn progress_line(event: &ProgressEvent) -> String {
    let mut line = format!(
        "[{:>3.0}%] {:<11} {}",
        event.percent(),
        event.stage.as_str(),
        event.message
    );
    if event.documents_total > 0 {
        let _ = write!(
            line,
            " ({}/{})",
            event.documents_complete, event.documents_total
        );
    }
    if let Some(doc) = &event.current_document {
        let _ = write!(line, " - {doc}");
    }
    line
}

pub fn analysis_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analysed {} of {} documents in {:.0} ms{}",
        result.documents_analyzed,
        result.documents_found,
        result.processing_time_ms,
        if result.cached { " (cached)" } else { "" }
    );
    if let Some(summary) = &result.summary {
        let _ = writeln!(out, "\n{summary}");
    }
    if !result.key_findings.is_empty() {
        out.push_str("\nKey findings:\n");
        for finding in &result.key_findings {
            let _ = writeln!(out, "  • {finding}");
        }
    }
    for analysis in &result.analyses {
        let _ = writeln!(
            out,
            "\n{} [{}]",
            analysis.document_name,
            or_dash(analysis.document_type.as_deref())
        );
        if let Some(summary) = &analysis.summary {
            let _ = writeln!(out, "  {}", truncate(summary, 300));
        }
        match &analysis.key_facts {
            KeyFacts::Named(facts) => {
                for (fact, value) in facts {
                    let _ = writeln!(out, "  {fact}: {}", fact_text(value));
                }
            },
            KeyFacts::Listed(facts) => {
                for value in facts {
                    let _ = writeln!(out, "  - {}", fact_text(value));
                }
            },
        }
        if !analysis.images.is_empty() {
            let _ = writeln!(out, "  {} image(s)", analysis.images.len());
        }
    }
    out.trim_end().to_string()
}

fn fact_text(value: &serde_json::Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToString::to_string)
}

pub fn inbox_lines(items: &[InboxItem], is_selected: impl Fn(&str) -> bool) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{} {} {:<10} {:<16} {:<20} {}",
            if is_selected(&item.id) { "[x]" } else { "[ ]" },
            if item.read { " " } else { "●" },
            item.id,
            item.application.application_number,
            truncate(or_dash(item.alert_name.as_deref()), 20),
            truncate(&item.application.address, 50)
        );
    }
    out
}

pub fn zoning(info: &ZoningInfo) -> String {
    let mut out = format!(
        "Zone {} ({})",
        info.zone_code,
        or_dash(info.zone_name.as_deref())
    );
    if let Some(objective) = &info.objective {
        let _ = write!(out, "\n  Objective: {objective}");
    }
    if let Some(plan) = &info.development_plan {
        let _ = write!(out, "\n  Plan:      {plan}");
    }
    if !info.permitted_uses.is_empty() {
        let _ = write!(out, "\n  Permitted in principle: {}", info.permitted_uses.join(", "));
    }
    if !info.open_for_consideration.is_empty() {
        let _ = write!(
            out,
            "\n  Open for consideration: {}",
            info.open_for_consideration.join(", ")
        );
    }
    out
}

pub fn bcms_notices(notices: &[BcmsNotice]) -> String {
    if notices.is_empty() {
        return "No BCMS notices".to_string();
    }
    let mut out = String::new();
    for notice in notices {
        let date = notice
            .commencement_date
            .or(notice.submitted_date)
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        let _ = writeln!(
            out,
            "{:<12} {:?} {}",
            date,
            notice.notice_type,
            or_dash(notice.description.as_deref())
        );
    }
    out.trim_end().to_string()
}

pub fn property_sales(sales: &[PropertySale]) -> String {
    if sales.is_empty() {
        return "No recorded sales".to_string();
    }
    let mut out = String::new();
    for sale in sales {
        let _ = writeln!(
            out,
            "{} €{:>12.0} {}{}",
            sale.sale_date,
            sale.price_eur,
            sale.address,
            if sale.is_new_dwelling { " (new)" } else { "" }
        );
    }
    out.trim_end().to_string()
}

pub fn heatmap(points: &[HeatmapPoint], triples: &[[f64; 3]]) -> String {
    let mut out = String::new();
    for [lat, lng, weight] in triples {
        let _ = writeln!(out, "{lat:.6},{lng:.6},{weight:.3}");
    }
    let _ = write!(out, "{} points", points.len());
    out
}

pub fn report(report: &Report) -> String {
    let mut out = format!("Report {}: {:?}", report.id, report.status);
    if let Some(url) = &report.download_url {
        let _ = write!(out, "\n  Download: {url}");
    }
    if let Some(error) = &report.error {
        let _ = write!(out, "\n  Error: {error}");
    }
    out
}

#[cfg(test)]
mod tests {
    use domain::{AnalysisStage, ApplicationStatus, GeoLocation};

    use super::*;

    fn summary(number: &str, location: Option<GeoLocation>) -> ApplicationSummary {
        ApplicationSummary {
            id: number.to_string(),
            application_number: number.to_string(),
            planning_authority: "Galway County Council".to_string(),
            address: "Main St, Oranmore".to_string(),
            description: None,
            status: ApplicationStatus::Granted,
            received_date: None,
            decision_date: None,
            location,
        }
    }

    fn page(items: Vec<ApplicationSummary>) -> Page<ApplicationSummary> {
        Page {
            total: 40,
            items,
            page: 2,
            page_size: 25,
        }
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn table_lists_rows_and_footer() {
        let text = application_table(&page(vec![summary("24/123", None)]));
        assert!(text.contains("24/123"));
        assert!(text.contains("granted"));
        assert!(text.ends_with("Page 2 of 2 (40 total)"));
    }

    #[test]
    fn map_markers_skip_unlocated() {
        let located = GeoLocation::new(53.27, -9.05).unwrap();
        let markers = application_markers(&page(vec![
            summary("24/1", Some(located)),
            summary("24/2", None),
        ]));
        assert_eq!(markers, vec![("24/1".to_string(), [53.27, -9.05])]);
    }

    #[test]
    fn progress_line_includes_document_counts() {
        let event = ProgressEvent {
            stage: AnalysisStage::Analyzing,
            message: "Reading drawings".to_string(),
            progress: 42.0,
            current_document: Some("site_layout.pdf".to_string()),
            documents_total: 5,
            documents_complete: 2,
        };
        let line = progress_line(&event);
        assert!(line.starts_with("[ 42%] analyzing"));
        assert!(line.contains("(2/5)"));
        assert!(line.ends_with("- site_layout.pdf"));
    }

    #[test]
    fn analysis_summary_lists_findings() {
        let result = AnalysisResult {
            documents_found: 3,
            documents_analyzed: 2,
            key_findings: vec!["Height exceeds 12m".to_string()],
            processing_time_ms: 850.0,
            cached: true,
            ..Default::default()
        };
        let text = analysis_summary(&result);
        assert!(text.starts_with("Analysed 2 of 3 documents in 850 ms (cached)"));
        assert!(text.contains("• Height exceeds 12m"));
    }

    #[test]
    fn analysis_summary_prints_listed_facts() {
        let result = AnalysisResult {
            analyses: vec![domain::DocumentAnalysis {
                document_name: "Elevations.pdf".to_string(),
                key_facts: KeyFacts::Listed(vec![serde_json::json!("9.5m high")]),
                ..Default::default()
            }],
            processing_time_ms: 5.12,
            ..Default::default()
        };
        let text = analysis_summary(&result);
        assert!(text.starts_with("Analysed 0 of 0 documents in 5 ms"));
        assert!(text.contains("Elevations.pdf [-]"));
        assert!(text.contains("  - 9.5m high"));
    }
}
