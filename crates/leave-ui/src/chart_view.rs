//! Chart-style views built from bar components.
//!
//! Each view is a single [`Paragraph`] whose lines are assembled by a
//! `build_*_lines` function so the content can be tested without a terminal.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use leave_core::formatting::format_days;
use leave_data::analysis::DashboardReport;

use crate::components::bars::{ShareBar, StackedBar, ValueBar};
use crate::components::indicators::{FrequencyIndicator, MetricIndicator};
use crate::table_view::render_no_data;
use crate::themes::Theme;

/// Width of the month label column in front of each bar.
const MONTH_LABEL_WIDTH: usize = 10;

fn section_title<'a>(title: &'static str, theme: &'a Theme) -> Line<'a> {
    Line::from(Span::styled(title, theme.bold))
}

fn month_label<'a>(name: &str, theme: &'a Theme) -> Span<'a> {
    Span::styled(format!("{:<width$}", name, width = MONTH_LABEL_WIDTH), theme.label)
}

/// Headline metrics, reason share and peak month for the filtered data,
/// followed by the all-data frequency extremes.
pub fn build_overview_lines<'a>(report: &'a DashboardReport, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(16);

    for metric in MetricIndicator::summary(&report.metrics, theme) {
        lines.push(metric.to_line());
    }
    lines.push(Line::from(""));

    lines.push(section_title("Leave share by reason", theme));
    let parts = report
        .reason_counts
        .iter()
        .map(|r| (r.reason.clone(), r.count))
        .collect();
    lines.push(ShareBar::new(parts, theme).to_line());
    lines.push(Line::from(""));

    if let Some(peak) = report.peak_month {
        lines.push(Line::from(vec![
            Span::styled("📈 Peak month: ", theme.label),
            Span::styled(peak.month.name(), theme.value),
            Span::styled(
                format!(" ({} applications, {})", peak.applications, format_days(peak.total_days)),
                theme.dim,
            ),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(section_title("Leave frequency (all data)", theme));
    lines.extend(FrequencyIndicator::new(report.frequency.as_ref(), theme).to_lines());

    lines
}

/// Stacked month × reason bars with a colour legend, then monthly totals.
pub fn build_trend_lines<'a>(report: &'a DashboardReport, theme: &'a Theme) -> Vec<Line<'a>> {
    let pivot = &report.month_reason_counts;
    let mut lines: Vec<Line<'a>> = Vec::new();

    // Legend: one coloured swatch per reason column.
    let mut legend = vec![Span::styled(" ".repeat(MONTH_LABEL_WIDTH), theme.label)];
    for (i, reason) in pivot.reasons.iter().enumerate() {
        legend.push(Span::styled(format!("■ {}  ", reason), theme.series_style(i)));
    }
    lines.push(Line::from(legend));
    lines.push(Line::from(""));

    lines.push(section_title("Applications per month by reason", theme));
    let scale = (0..pivot.months.len())
        .map(|i| pivot.row_total(i))
        .max()
        .unwrap_or(0);
    for (month, values) in pivot.months.iter().zip(&pivot.cells) {
        let segments = values.iter().copied().enumerate().collect();
        let bar = StackedBar::new(segments, scale, theme).to_line();
        let mut spans = vec![month_label(month.name(), theme)];
        spans.extend(bar.spans);
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));

    lines.push(section_title("Leave days per month", theme));
    let max_days = report
        .monthly_totals
        .iter()
        .map(|m| m.total_days)
        .max()
        .unwrap_or(0);
    for total in &report.monthly_totals {
        let bar = ValueBar::new(total.total_days, max_days, 0, theme).to_line();
        let mut spans = vec![month_label(total.month.name(), theme)];
        spans.extend(bar.spans);
        lines.push(Line::from(spans));
    }

    lines
}

fn render_lines(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'_>>,
    theme: &Theme,
) {
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(format!(" {} ", title)),
    );
    frame.render_widget(paragraph, area);
}

/// Render the overview; the frequency section is shown even when the
/// filters leave nothing else.
pub fn render_overview(frame: &mut Frame, area: Rect, report: &DashboardReport, theme: &Theme) {
    if report.is_empty() {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                leave_data::analysis::NO_DATA_MESSAGE,
                theme.warning,
            )),
            Line::from(""),
            section_title("Leave frequency (all data)", theme),
        ];
        lines.extend(FrequencyIndicator::new(report.frequency.as_ref(), theme).to_lines());
        render_lines(frame, area, "Overview", lines, theme);
        return;
    }
    let lines = build_overview_lines(report, theme);
    render_lines(frame, area, "Overview", lines, theme);
}

pub fn render_trend(frame: &mut Frame, area: Rect, report: &DashboardReport, theme: &Theme) {
    if report.is_empty() {
        render_no_data(frame, area, "Monthly Trend", theme);
        return;
    }
    let lines = build_trend_lines(report, theme);
    render_lines(frame, area, "Monthly Trend", lines, theme);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
