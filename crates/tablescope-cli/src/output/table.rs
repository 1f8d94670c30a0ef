//! Human-readable table output formatting.

use crate::report::{RelationReport, Report, Resolution};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Resolved")]
    resolved: String,
    #[tabled(rename = "Quoted")]
    quoted: String,
}

impl From<&Resolution> for Row {
    fn from(resolution: &Resolution) -> Self {
        match &resolution.resolved {
            Some(object) => Self {
                requested: resolution.requested.clone(),
                kind: object.kind.to_string(),
                resolved: match &object.schema {
                    Some(schema) => format!("{schema}.{}", object.name),
                    None => object.name.clone(),
                },
                quoted: object.quoted.clone(),
            },
            None => Self {
                requested: resolution.requested.clone(),
                kind: resolution.kind.to_string().to_lowercase(),
                resolved: "-".to_string(),
                quoted: "-".to_string(),
            },
        }
    }
}

/// Format the report as human-readable text with optional colors.
pub fn format_table(report: &Report, quiet: bool, use_colors: bool) -> String {
    let colored = use_colors && std::io::stdout().is_terminal();
    let mut out = String::new();

    write_header(&mut out, colored);
    write_summary(&mut out, report, colored);
    write_resolutions(&mut out, report);

    if let Some(relation) = &report.relation {
        write_relation(&mut out, relation, colored);
    }

    if !quiet {
        write_errors(&mut out, report, colored);
    }

    out
}

fn write_header(out: &mut String, colored: bool) {
    let title = "tablescope";
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_summary(out: &mut String, report: &Report, colored: bool) {
    let schema = if report.default_schema.is_empty() {
        "(none)"
    } else {
        report.default_schema.as_str()
    };
    let resolved = report
        .resolutions
        .iter()
        .filter(|r| r.resolved.is_some())
        .count();

    let stats = format!(
        "Default schema: {schema} | {resolved}/{} resolved",
        report.resolutions.len()
    );

    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }

    writeln!(out).unwrap();
}

fn write_resolutions(out: &mut String, report: &Report) {
    if report.resolutions.is_empty() {
        return;
    }

    let rows: Vec<Row> = report.resolutions.iter().map(Row::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());

    writeln!(out, "{table}").unwrap();
    writeln!(out).unwrap();
}

fn write_relation(out: &mut String, relation: &RelationReport, colored: bool) {
    let label = match relation.relation {
        Some(kind) => kind.to_string(),
        None => "unresolved".to_string(),
    };
    let arrow = if colored {
        "→".green().to_string()
    } else {
        "→".to_string()
    };

    writeln!(out, "Relation: {} {arrow} {}: {label}", relation.from, relation.to).unwrap();
    writeln!(out).unwrap();
}

fn write_errors(out: &mut String, report: &Report, colored: bool) {
    let errors: Vec<&str> = report
        .resolutions
        .iter()
        .filter_map(|r| r.error.as_deref())
        .chain(report.relation.iter().filter_map(|r| r.error.as_deref()))
        .collect();

    if errors.is_empty() {
        return;
    }

    let header = format!("Unresolved ({}):", errors.len());
    if colored {
        writeln!(out, "{}", header.bold()).unwrap();
    } else {
        writeln!(out, "{header}").unwrap();
    }

    for error in errors {
        let tag = if colored {
            "ERROR".red().to_string()
        } else {
            "ERROR".to_string()
        };
        writeln!(out, "  [{tag}] {error}").unwrap();
    }
}
