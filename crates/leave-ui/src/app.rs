//! Main application state and TUI event loop for the leave dashboard.
//!
//! [`App`] owns the loaded rows, the current [`FilterState`] and the report
//! built from them. Every filter change rebuilds the report from scratch.

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::debug;

use leave_core::models::{EmployeeFilter, FilterState, LeaveRow, LeaveTypeSelection};
use leave_data::analysis::{build_report, DashboardReport, FilterOptions};

use crate::chart_view;
use crate::components::header::Header;
use crate::components::indicators::{toggle_page, LeaveTypeToggles, TOGGLE_PAGE_SIZE};
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which dashboard page is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Trend,
    Heatmap,
    Employees,
    Records,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Trend,
        Tab::Heatmap,
        Tab::Employees,
        Tab::Records,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Trend => "Trend",
            Tab::Heatmap => "Heatmap",
            Tab::Employees => "Employees",
            Tab::Records => "Records",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the leave dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    pub filter: FilterState,
    pub top_n: usize,
    /// Rows dropped by the loader, shown in the footer.
    pub skipped_rows: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Index into the leave types of the highlighted toggle.
    pub type_cursor: usize,
    rows: Vec<LeaveRow>,
    options: FilterOptions,
    report: DashboardReport,
}

impl App {
    pub fn new(
        rows: Vec<LeaveRow>,
        filter: FilterState,
        top_n: usize,
        theme_name: &str,
        skipped_rows: usize,
    ) -> Self {
        let options = FilterOptions::from_rows(&rows);
        let report = build_report(&rows, &filter, top_n);
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Overview,
            filter,
            top_n,
            skipped_rows,
            should_quit: false,
            type_cursor: 0,
            rows,
            options,
            report,
        }
    }

    pub fn report(&self) -> &DashboardReport {
        &self.report
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// on the current thread and the caller can race it against a signal.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }

            // Let a racing Ctrl+C signal future make progress.
            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Leave raw mode and the alternate screen when [`App::run`] is dropped
    /// before it could clean up, e.g. after an external interrupt.
    pub fn restore_terminal() -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press. Filter keys rebuild the report.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.previous(),
            KeyCode::Char('e') => self.cycle_employee(true),
            KeyCode::Char('E') => self.cycle_employee(false),
            KeyCode::Char('a') => self.set_leave_types(LeaveTypeSelection::All),
            KeyCode::Char('r') => {
                self.filter = FilterState::default();
                self.refresh();
            }
            KeyCode::Down => self.move_type_cursor(true),
            KeyCode::Up => self.move_type_cursor(false),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_leave_type(self.type_cursor),
            KeyCode::Char(c @ '1'..='9') => {
                // '1'..='9' always has a digit value.
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let index = toggle_page(self.type_cursor) * TOGGLE_PAGE_SIZE + n - 1;
                self.toggle_leave_type(index);
            }
            _ => {}
        }
    }

    fn refresh(&mut self) {
        debug!(
            "Filter changed: employee={}, leave_types={:?}",
            self.filter.employee.label(),
            self.filter.leave_types
        );
        self.report = build_report(&self.rows, &self.filter, self.top_n);
    }

    /// Step through `All` followed by every employee, wrapping around.
    fn cycle_employee(&mut self, forward: bool) {
        let choices = self.options.employee_choices();
        let current = choices
            .iter()
            .position(|c| c == self.filter.employee.label())
            .unwrap_or(0);
        let len = choices.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.filter.employee = EmployeeFilter::from_selection(&choices[next]);
        self.refresh();
    }

    /// Move the toggle cursor one leave type, wrapping at either end. The
    /// visible toggle page follows the cursor.
    fn move_type_cursor(&mut self, forward: bool) {
        let len = self.options.reasons.len();
        if len == 0 {
            return;
        }
        self.type_cursor = if forward {
            (self.type_cursor + 1) % len
        } else {
            (self.type_cursor + len - 1) % len
        };
    }

    /// Flip the `index`-th leave type in or out of the selection.
    ///
    /// Selecting every type collapses back to [`LeaveTypeSelection::All`].
    fn toggle_leave_type(&mut self, index: usize) {
        let Some(reason) = self.options.reasons.get(index) else {
            return;
        };
        let all: BTreeSet<String> = self.options.reasons.iter().cloned().collect();

        let mut selected = match &self.filter.leave_types {
            LeaveTypeSelection::All => all.clone(),
            LeaveTypeSelection::Only(set) => set.clone(),
        };
        if !selected.remove(reason) {
            selected.insert(reason.clone());
        }

        let selection = if selected == all {
            LeaveTypeSelection::All
        } else {
            LeaveTypeSelection::Only(selected)
        };
        self.set_leave_types(selection);
    }

    fn set_leave_types(&mut self, selection: LeaveTypeSelection) {
        self.filter.leave_types = selection;
        self.refresh();
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn tab_line(&self) -> Line<'_> {
        let mut spans = Vec::new();
        for tab in Tab::ALL {
            let style = if tab == self.tab {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!(" {} ", tab.title()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn footer_line(&self) -> Line<'_> {
        let mut spans = vec![Span::styled(
            "q quit | Tab/←/→ page | e/E employee | ↑/↓ space or 1-9 leave type | a all | r reset",
            self.theme.dim,
        )];
        if self.skipped_rows > 0 {
            spans.push(Span::styled(
                format!("  ⚠ {} invalid rows skipped", self.skipped_rows),
                self.theme.warning,
            ));
        }
        Line::from(spans)
    }

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, toggles_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let header = Header::new(
            &self.filter,
            self.report.metadata.rows_filtered,
            self.report.metadata.rows_total,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);
        frame.render_widget(Paragraph::new(self.tab_line()), tabs_area);
        let toggles = LeaveTypeToggles::new(
            &self.options.reasons,
            &self.filter.leave_types,
            self.type_cursor,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(toggles.to_line()), toggles_area);
        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);

        let report = &self.report;
        let theme = &self.theme;
        match self.tab {
            Tab::Overview => {
                let [left, right] =
                    Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                        .areas(body_area);
                chart_view::render_overview(frame, left, report, theme);
                table_view::render_type_totals(frame, right, &report.type_totals, theme);
            }
            Tab::Trend => {
                let [top, bottom] =
                    Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .areas(body_area);
                chart_view::render_trend(frame, top, report, theme);
                table_view::render_pivot_table(
                    frame,
                    bottom,
                    "Applications by Month and Reason",
                    &report.month_reason_counts,
                    false,
                    theme,
                );
            }
            Tab::Heatmap => table_view::render_pivot_table(
                frame,
                body_area,
                "Leave Days Heatmap (Month × Reason)",
                &report.month_reason_duration,
                true,
                theme,
            ),
            Tab::Employees => {
                let [rankings, counts] =
                    Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .areas(body_area);
                let [top, bottom] =
                    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                        .areas(rankings);
                table_view::render_ranking(
                    frame,
                    top,
                    &format!("Top {} by Leave Days", self.top_n),
                    &report.ranking.top,
                    theme,
                );
                table_view::render_ranking(
                    frame,
                    bottom,
                    &format!("Bottom {} by Leave Days", self.top_n),
                    &report.ranking.bottom,
                    theme,
                );
                table_view::render_employee_counts(frame, counts, &report.employee_counts, theme);
            }
            Tab::Records => {
                let [records, distribution] =
                    Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                        .areas(body_area);
                table_view::render_records(frame, records, &report.records, theme);
                table_view::render_distribution(frame, distribution, &report.distribution, theme);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leave_core::calculations::derive_row;
    use leave_core::models::LeaveRecord;
    use leave_data::analysis::NO_DATA_MESSAGE;
    use ratatui::backend::TestBackend;

    fn row(employee: &str, start: &str, end: &str, reason: &str) -> LeaveRow {
        derive_row(LeaveRecord {
            employee_name: employee.to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            reason: reason.to_string(),
        })
        .unwrap()
    }

    fn make_app() -> App {
        let rows = vec![
            row("Carol", "2025-01-06", "2025-01-10", "Annual Leave"),
            row("Alice", "2025-01-06", "2025-01-06", "Sick Leave"),
            row("Bob", "2025-03-03", "2025-03-04", "Unpaid Leave"),
            row("Alice", "2025-04-07", "2025-04-07", "Annual Leave"),
        ];
        App::new(rows, FilterState::default(), 5, "dark", 0)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Tab ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Overview.next(), Tab::Trend);
        assert_eq!(Tab::Records.next(), Tab::Overview);
        assert_eq!(Tab::Overview.previous(), Tab::Records);
        assert_eq!(Tab::Heatmap.previous(), Tab::Trend);
    }

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = make_app();
        assert_eq!(app.tab, Tab::Overview);
        assert!(!app.should_quit);
        assert_eq!(app.report().metrics.total_applications, 4);
        assert_eq!(app.options().employees, vec!["Alice", "Bob", "Carol"]);
    }

    // ── Keys ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = make_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = make_app();
        press(&mut app, KeyCode::Char('c'));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_tab_keys() {
        let mut app = make_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Trend);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.tab, Tab::Heatmap);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.tab, Tab::Overview);
    }

    #[test]
    fn test_employee_cycle_rebuilds_report() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.filter.employee, EmployeeFilter::Employee("Alice".to_string()));
        assert_eq!(app.report().metrics.total_applications, 2);
        assert_eq!(app.report().metadata.employee_filter, "Alice");

        press(&mut app, KeyCode::Char('E'));
        press(&mut app, KeyCode::Char('E'));
        assert_eq!(app.filter.employee, EmployeeFilter::Employee("Carol".to_string()));

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.filter.employee, EmployeeFilter::All);
        assert_eq!(app.report().metrics.total_applications, 4);
    }

    #[test]
    fn test_toggle_leave_types() {
        let mut app = make_app();
        // Reasons in first-appearance order: Annual, Sick, Unpaid.
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(
            app.filter.leave_types,
            LeaveTypeSelection::Only(BTreeSet::from([
                "Sick Leave".to_string(),
                "Unpaid Leave".to_string()
            ]))
        );
        assert_eq!(app.report().metrics.total_applications, 2);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.filter.leave_types, LeaveTypeSelection::All);

        // Out-of-range key does nothing.
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.filter.leave_types, LeaveTypeSelection::All);
    }

    #[test]
    fn test_cursor_reaches_leave_types_past_nine() {
        let rows: Vec<LeaveRow> = (1..=11)
            .map(|i| row("Alice", "2025-01-06", "2025-01-06", &format!("Type {i:02}")))
            .collect();
        let mut app = App::new(rows, FilterState::default(), 5, "dark", 0);

        // Up from the first type wraps to the last one, on the second page.
        press(&mut app, KeyCode::Up);
        assert_eq!(app.type_cursor, 10);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.report().metrics.total_applications, 10);
        assert!(!app.filter.leave_types.contains("Type 11"));

        // Number keys address the cursor's page: '1' is the tenth type.
        press(&mut app, KeyCode::Char('1'));
        assert!(!app.filter.leave_types.contains("Type 10"));
        assert_eq!(app.report().metrics.total_applications, 9);

        // Back on the first page '1' is the first type again.
        press(&mut app, KeyCode::Down);
        assert_eq!(app.type_cursor, 0);
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter.leave_types.contains("Type 01"));
        assert_eq!(app.report().metrics.total_applications, 8);
    }

    #[test]
    fn test_cursor_keys_with_no_leave_types() {
        let mut app = App::new(Vec::new(), FilterState::default(), 5, "dark", 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.type_cursor, 0);
        assert_eq!(app.filter.leave_types, LeaveTypeSelection::All);
    }

    #[test]
    fn test_deselecting_everything_gives_empty_report() {
        let mut app = make_app();
        for c in ['1', '2', '3'] {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(
            app.filter.leave_types,
            LeaveTypeSelection::Only(BTreeSet::new())
        );
        assert!(app.report().is_empty());
        // Frequency still covers all rows.
        assert_eq!(
            app.report().frequency.as_ref().unwrap().most.employee,
            "Alice"
        );

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.filter.leave_types, LeaveTypeSelection::All);
        assert!(!app.report().is_empty());
    }

    #[test]
    fn test_reset_filters() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.filter.is_unfiltered());
        assert_eq!(app.report().metrics.total_applications, 4);
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    #[test]
    fn test_render_every_tab_does_not_panic() {
        let mut app = make_app();
        for tab in Tab::ALL {
            app.tab = tab;
            let out = screen(&app);
            assert!(out.contains("LEAVE TREND DASHBOARD"), "tab {:?}", tab);
        }
    }

    #[test]
    fn test_render_every_tab_with_no_data() {
        let mut app = make_app();
        for c in ['1', '2', '3'] {
            press(&mut app, KeyCode::Char(c));
        }
        for tab in Tab::ALL {
            app.tab = tab;
            let out = screen(&app);
            if tab != Tab::Employees {
                assert!(out.contains(NO_DATA_MESSAGE), "tab {:?}", tab);
            }
        }
    }

    #[test]
    fn test_footer_reports_skipped_rows() {
        let app = App::new(Vec::new(), FilterState::default(), 5, "classic", 3);
        let out = screen(&app);
        assert!(out.contains("3 invalid rows skipped"));
        assert!(out.contains(NO_DATA_MESSAGE));
    }
}
