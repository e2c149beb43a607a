use crate::themes::Theme;
use leave_core::models::{FilterState, LeaveTypeSelection};
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Dashboard header rendering four lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Active filter in `[ employee | leave types | rows ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub filter: &'a FilterState,
    /// Rows left after filtering.
    pub rows_shown: usize,
    /// Rows in the loaded dataset.
    pub rows_total: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(filter: &'a FilterState, rows_shown: usize, rows_total: usize, theme: &'a Theme) -> Self {
        Self {
            filter,
            rows_shown,
            rows_total,
            theme,
        }
    }

    fn leave_type_label(&self) -> String {
        match &self.filter.leave_types {
            LeaveTypeSelection::All => "all leave types".to_string(),
            LeaveTypeSelection::Only(set) if set.is_empty() => "no leave types".to_string(),
            LeaveTypeSelection::Only(set) if set.len() == 1 => {
                set.iter().next().cloned().unwrap_or_default()
            }
            LeaveTypeSelection::Only(set) => format!("{} leave types", set.len()),
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" LEAVE TREND DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(
                    format!("employee: {}", self.filter.employee.label()),
                    self.theme.value,
                ),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.leave_type_label(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!("{}/{} rows", self.rows_shown, self.rows_total),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
