//! Plain-text rendering of a [`DashboardReport`] for non-interactive use.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use leave_core::formatting::{format_count, format_days, format_number, percentage};
use leave_data::aggregator::{EmployeeTotal, PivotTable};
use leave_data::analysis::{DashboardReport, NO_DATA_MESSAGE};

fn pad(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(w)))
}

fn section(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(UnicodeWidthStr::width(title)));
    out.push('\n');
}

fn pivot(out: &mut String, table: &PivotTable<u64>) {
    if table.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
        return;
    }

    let widths: Vec<usize> = table
        .reasons
        .iter()
        .map(|r| UnicodeWidthStr::width(r.as_str()).max(6) + 2)
        .collect();

    out.push_str(&pad("Month", 11));
    for (reason, w) in table.reasons.iter().zip(&widths) {
        let _ = write!(out, "{:>w$}", reason, w = *w);
    }
    out.push_str("   Total\n");

    for (i, (month, values)) in table.months.iter().zip(&table.cells).enumerate() {
        out.push_str(&pad(month.name(), 11));
        for (value, w) in values.iter().zip(&widths) {
            let _ = write!(out, "{:>w$}", format_count(*value), w = *w);
        }
        let _ = writeln!(out, "{:>8}", format_count(table.row_total(i)));
    }

    out.push_str(&pad("TOTAL", 11));
    for (c, w) in widths.iter().enumerate() {
        let _ = write!(out, "{:>w$}", format_count(table.column_total(c)), w = *w);
    }
    let _ = writeln!(out, "{:>8}", format_count(table.grand_total()));
}

fn ranking(out: &mut String, entries: &[EmployeeTotal]) {
    if entries.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {:>10}",
            i + 1,
            pad(&entry.employee, 24),
            format_days(entry.total_days)
        );
    }
}

/// Render every section of `report` as aligned plain text.
///
/// Filter-dependent sections print the no-data message when the filter
/// leaves nothing; the frequency and all-employee count sections always
/// reflect the full dataset.
pub fn render_text_report(report: &DashboardReport) -> String {
    let mut out = String::new();
    let meta = &report.metadata;

    out.push_str("LEAVE TREND REPORT\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    let types = meta
        .leave_type_filter
        .as_ref()
        .map_or_else(|| "All".to_string(), |t| t.join(", "));
    let _ = writeln!(out, "Employee:     {}", meta.employee_filter);
    let _ = writeln!(out, "Leave types:  {}", if types.is_empty() { "(none)" } else { types.as_str() });
    let _ = writeln!(out, "Rows:         {} of {}", meta.rows_filtered, meta.rows_total);
    let _ = writeln!(out, "Generated at: {}", meta.generated_at);

    section(&mut out, "Summary");
    if report.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
    } else {
        let m = &report.metrics;
        let _ = writeln!(out, "Applications:      {}", format_count(m.total_applications));
        let _ = writeln!(out, "Total leave days:  {}", format_count(m.total_leave_days));
        let _ = writeln!(
            out,
            "Average duration:  {} days",
            format_number(m.average_duration, 2)
        );
        let _ = writeln!(out, "Working days:      {}", format_count(m.total_working_days));
        if let Some(peak) = report.peak_month {
            let _ = writeln!(
                out,
                "Peak month:        {} ({} applications)",
                peak.month, peak.applications
            );
        }
    }

    section(&mut out, "Leave type totals");
    for total in &report.type_totals.totals {
        let _ = writeln!(out, "{} {:>6}", pad(total.category.label(), 12), total.count);
    }
    let _ = writeln!(out, "{} {:>6}", pad("TOTAL", 12), report.type_totals.total());

    section(&mut out, "Applications by reason");
    if report.reason_counts.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
    }
    let whole = report.metrics.total_applications as f64;
    for r in &report.reason_counts {
        let _ = writeln!(
            out,
            "{} {:>6} {:>6.1}%",
            pad(&r.reason, 24),
            r.count,
            percentage(r.count as f64, whole, 1)
        );
    }

    section(&mut out, "Applications by month and reason");
    pivot(&mut out, &report.month_reason_counts);

    section(&mut out, "Leave days by month and reason");
    pivot(&mut out, &report.month_reason_duration);

    section(&mut out, &format!("Top {} employees by leave days", meta.top_n));
    ranking(&mut out, &report.ranking.top);

    section(&mut out, &format!("Bottom {} employees by leave days", meta.top_n));
    ranking(&mut out, &report.ranking.bottom);

    section(&mut out, "Leave frequency (all data)");
    match &report.frequency {
        Some(f) => {
            let _ = writeln!(out, "Most frequent:  {} ({})", f.most.employee, f.most.count);
            let _ = writeln!(out, "Least frequent: {} ({})", f.least.employee, f.least.count);
        }
        None => out.push_str("No leave applications recorded\n"),
    }

    section(&mut out, "Leave counts for all employees");
    if report.employee_counts.is_empty() {
        out.push_str("No leave applications recorded\n");
    }
    for c in &report.employee_counts {
        let _ = writeln!(out, "{} {:>6}", pad(&c.employee, 24), format_count(c.count));
    }

    section(&mut out, "Leave distribution");
    if report.distribution.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
    }
    for d in &report.distribution {
        let _ = writeln!(
            out,
            "{} {} {:>6}",
            pad(&d.reason, 20),
            pad(&d.employee, 24),
            d.total_days
        );
    }

    section(&mut out, "Leave records");
    if report.records.is_empty() {
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
    } else {
        let _ = writeln!(
            out,
            "{} {:<10} {:<10} {} {:>5} {:>7} {}",
            pad("Employee", 24),
            "Start",
            "End",
            pad("Reason", 20),
            "Days",
            "Working",
            "Month"
        );
    }
    for r in &report.records {
        let _ = writeln!(
            out,
            "{} {:<10} {:<10} {} {:>5} {:>7} {}",
            pad(r.employee(), 24),
            r.record.start_date.format("%Y-%m-%d"),
            r.record.end_date.format("%Y-%m-%d"),
            pad(r.reason(), 20),
            r.leave_duration,
            r.working_days,
            r.month
        );
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
