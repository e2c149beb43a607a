use crate::themes::Theme;
use leave_core::formatting::{format_count, format_number};
use leave_core::models::LeaveTypeSelection;
use leave_data::aggregator::{EmployeeCount, FrequencyExtremes, LeaveMetrics};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

// ── MetricIndicator ──────────────────────────────────────────────────────────

/// A single `icon label: value` headline figure.
pub struct MetricIndicator<'a> {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: String,
    pub theme: &'a Theme,
}

impl<'a> MetricIndicator<'a> {
    pub fn new(icon: &'static str, label: &'static str, value: String, theme: &'a Theme) -> Self {
        Self {
            icon,
            label,
            value,
            theme,
        }
    }

    /// The four headline figures shown at the top of the overview.
    pub fn summary(metrics: &LeaveMetrics, theme: &'a Theme) -> Vec<Self> {
        vec![
            Self::new(
                "📋",
                "Applications",
                format_count(metrics.total_applications),
                theme,
            ),
            Self::new(
                "📅",
                "Total leave days",
                format_count(metrics.total_leave_days),
                theme,
            ),
            Self::new(
                "⏱️",
                "Average duration",
                format!("{} days", format_number(metrics.average_duration, 2)),
                theme,
            ),
            Self::new(
                "💼",
                "Working days",
                format_count(metrics.total_working_days),
                theme,
            ),
        ]
    }

    /// Format: `"📋 Applications: 12"`
    pub fn to_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::raw(format!("{} ", self.icon)),
            Span::styled(format!("{}: ", self.label), self.theme.label),
            Span::styled(self.value.clone(), self.theme.value),
        ])
    }
}

// ── FrequencyIndicator ───────────────────────────────────────────────────────

/// Most and least frequent leave takers over the whole dataset.
pub struct FrequencyIndicator<'a> {
    pub extremes: Option<&'a FrequencyExtremes>,
    pub theme: &'a Theme,
}

impl<'a> FrequencyIndicator<'a> {
    pub fn new(extremes: Option<&'a FrequencyExtremes>, theme: &'a Theme) -> Self {
        Self { extremes, theme }
    }

    fn employee_line(&self, prefix: &'static str, entry: &EmployeeCount, style: Style) -> Line<'a> {
        let noun = if entry.count == 1 { "application" } else { "applications" };
        Line::from(vec![
            Span::styled(prefix, self.theme.label),
            Span::styled(entry.employee.clone(), style),
            Span::styled(format!(" ({} {})", format_count(entry.count), noun), self.theme.dim),
        ])
    }

    /// Two lines (most, least), or a single dim placeholder with no data.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        match self.extremes {
            Some(extremes) => vec![
                self.employee_line("🔝 Most frequent: ", &extremes.most, self.theme.warning),
                self.employee_line("🔻 Least frequent: ", &extremes.least, self.theme.info),
            ],
            None => vec![Line::from(Span::styled(
                "No leave applications recorded",
                self.theme.dim,
            ))],
        }
    }
}

// ── LeaveTypeToggles ─────────────────────────────────────────────────────────

/// Leave types shown per toggle page; the number keys address one page.
pub const TOGGLE_PAGE_SIZE: usize = 9;

/// Page holding the leave type at `cursor`.
pub fn toggle_page(cursor: usize) -> usize {
    cursor / TOGGLE_PAGE_SIZE
}

/// The numbered leave-type checklist for the page under the cursor:
/// `1:[x] Sick Leave  2:[ ] Annual Leave  (page 1/2)`.
pub struct LeaveTypeToggles<'a> {
    pub reasons: &'a [String],
    pub selection: &'a LeaveTypeSelection,
    pub cursor: usize,
    pub theme: &'a Theme,
}

impl<'a> LeaveTypeToggles<'a> {
    pub fn new(
        reasons: &'a [String],
        selection: &'a LeaveTypeSelection,
        cursor: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            reasons,
            selection,
            cursor,
            theme,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = vec![Span::styled("Leave types: ", self.theme.label)];
        let page = toggle_page(self.cursor);
        let first = page * TOGGLE_PAGE_SIZE;

        for (offset, reason) in self
            .reasons
            .iter()
            .enumerate()
            .skip(first)
            .take(TOGGLE_PAGE_SIZE)
            .map(|(i, r)| (i - first, r))
        {
            let on = self.selection.contains(reason);
            let mark = if on { "x" } else { " " };
            let mut style = if on {
                self.theme.filter_on
            } else {
                self.theme.filter_off
            };
            if first + offset == self.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(
                format!("{}:[{mark}] {reason}", offset + 1),
                style,
            ));
            spans.push(Span::raw("  "));
        }

        let pages = self.reasons.len().div_ceil(TOGGLE_PAGE_SIZE);
        if pages > 1 {
            spans.push(Span::styled(
                format!("(page {}/{} ↑/↓)", page + 1, pages),
                self.theme.dim,
            ));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
