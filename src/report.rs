//! Rendering of audit reports.

use crate::audit::AuditReport;
use clap::ValueEnum;
use std::fmt::Write;

const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Boxed table (default)
    #[default]
    Table,
    /// One `login: emails` line per member
    Txt,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Txt => write!(f, "txt"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render `report` in `format`. `color` adds ANSI styling to table and
/// text output; JSON is never styled.
pub fn render(
    report: &AuditReport,
    format: OutputFormat,
    color: bool,
) -> Result<String, serde_json::Error> {
    let style = Style { color };
    match format {
        OutputFormat::Table => Ok(render_table(report, style)),
        OutputFormat::Txt => Ok(render_txt(report, style)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

#[derive(Clone, Copy)]
struct Style {
    color: bool,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn render_table(report: &AuditReport, style: Style) -> String {
    let mut out = String::new();
    write_incomplete_warning(&mut out, report, style);

    let missing = &report.result.missing_from_scim;
    let title = format!(
        "Members of {} without a SCIM identity: {}",
        report.organization,
        missing.len()
    );
    let _ = writeln!(out, "{}", style.paint(BOLD, &title));

    if missing.is_empty() {
        let clean = "Every member with a verified email is provisioned.";
        let _ = writeln!(out, "{}", style.paint(GREEN, clean));
    } else {
        let rows: Vec<(String, String)> = missing
            .iter()
            .map(|member| (member.login.clone(), member.verified_emails.join(", ")))
            .collect();
        write_table(&mut out, ("Login", "Verified emails"), &rows, style);
    }

    let unverified = &report.result.unverified_members;
    let _ = writeln!(out);
    let title = format!("Members without a verified email: {}", unverified.len());
    let _ = writeln!(out, "{}", style.paint(BOLD, &title));
    if !unverified.is_empty() {
        let rows: Vec<(String, String)> = unverified
            .iter()
            .enumerate()
            .map(|(i, login)| ((i + 1).to_string(), login.clone()))
            .collect();
        write_table(&mut out, ("#", "Login"), &rows, style);
    }

    let _ = writeln!(
        out,
        "\nChecked {} members against {} SCIM identities.",
        report.member_count, report.scim_identity_count
    );
    out
}

fn write_table(out: &mut String, header: (&str, &str), rows: &[(String, String)], style: Style) {
    let width = |text: &str| text.chars().count();
    let left = rows
        .iter()
        .map(|(a, _)| width(a))
        .chain(std::iter::once(width(header.0)))
        .max()
        .unwrap_or(0);
    let right = rows
        .iter()
        .map(|(_, b)| width(b))
        .chain(std::iter::once(width(header.1)))
        .max()
        .unwrap_or(0);

    let border = format!("+-{}-+-{}-+", "-".repeat(left), "-".repeat(right));
    let _ = writeln!(out, "{border}");
    let _ = writeln!(
        out,
        "| {} | {} |",
        style.paint(BOLD, &format!("{:<left$}", header.0)),
        style.paint(BOLD, &format!("{:<right$}", header.1))
    );
    let _ = writeln!(out, "{border}");
    for (a, b) in rows {
        let _ = writeln!(out, "| {:<left$} | {:<right$} |", a, b);
    }
    let _ = writeln!(out, "{border}");
}

fn render_txt(report: &AuditReport, style: Style) -> String {
    let mut out = String::new();
    write_incomplete_warning(&mut out, report, style);

    for member in &report.result.missing_from_scim {
        let _ = writeln!(out, "{}: {}", member.login, member.verified_emails.join(", "));
    }
    for login in &report.result.unverified_members {
        let _ = writeln!(out, "{}: {}", login, style.paint(RED, "no verified email"));
    }
    out
}

fn write_incomplete_warning(out: &mut String, report: &AuditReport, style: Style) {
    if let Some(reason) = &report.scim_incomplete {
        let warning = format!(
            "Warning: the SCIM listing ended early ({reason}); \
             some members below may be provisioned."
        );
        let _ = writeln!(out, "{}\n", style.paint(YELLOW, &warning));
    }
}
