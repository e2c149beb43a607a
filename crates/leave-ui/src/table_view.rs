//! Bordered table views for the leave dashboard.
//!
//! Each function renders one [`ratatui::widgets::Table`] from an aggregate
//! view produced by the data layer; totals rows are highlighted with
//! `table_total`.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use leave_core::formatting::{format_count, percentage};
use leave_core::models::LeaveRow;
use leave_data::aggregator::{DistributionRow, EmployeeCount, EmployeeTotal, PivotTable, TypeTotals};
use leave_data::analysis::NO_DATA_MESSAGE;

use crate::themes::Theme;

fn titled_block(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

fn header_row<'a>(labels: impl IntoIterator<Item = String>, theme: &Theme) -> Row<'a> {
    Row::new(
        labels
            .into_iter()
            .map(|h| Cell::from(h).style(theme.table_header)),
    )
    .height(1)
}

fn column_width(label: &str, min: u16) -> Constraint {
    Constraint::Length((unicode_width::UnicodeWidthStr::width(label) as u16).max(min) + 1)
}

/// Render the six-category type totals with a totals row.
pub fn render_type_totals(frame: &mut Frame, area: Rect, totals: &TypeTotals, theme: &Theme) {
    let mut rows: Vec<Row> = totals
        .totals
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Row::new(vec![
                Cell::from(t.category.label()),
                Cell::from(format_count(t.count)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(format_count(totals.total())),
        ])
        .style(theme.table_total),
    );

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Length(10)])
        .header(header_row(["Leave Type".to_string(), "Count".to_string()], theme))
        .block(titled_block("Leave Type Totals", theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a month × reason pivot with row and column totals.
///
/// With `heat` set, each cell is coloured by its share of the largest cell.
pub fn render_pivot_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    pivot: &PivotTable<u64>,
    heat: bool,
    theme: &Theme,
) {
    if pivot.is_empty() {
        render_no_data(frame, area, title, theme);
        return;
    }

    let max = pivot.max_value();

    let mut labels = vec!["Month".to_string()];
    labels.extend(pivot.reasons.iter().cloned());
    labels.push("Total".to_string());

    let mut rows: Vec<Row> = pivot
        .months
        .iter()
        .zip(&pivot.cells)
        .enumerate()
        .map(|(i, (month, values))| {
            let mut cells = vec![Cell::from(month.name())];
            for value in values {
                let cell = Cell::from(format_count(*value));
                cells.push(if heat {
                    cell.style(theme.heat_style(percentage(*value as f64, max as f64, 1)))
                } else {
                    cell
                });
            }
            cells.push(Cell::from(format_count(pivot.row_total(i))).style(theme.table_total));
            Row::new(cells).style(theme.row_style(i))
        })
        .collect();

    let mut total_cells = vec![Cell::from("TOTAL")];
    total_cells.extend((0..pivot.reasons.len()).map(|c| Cell::from(format_count(pivot.column_total(c)))));
    total_cells.push(Cell::from(format_count(pivot.grand_total())));
    rows.push(Row::new(total_cells).style(theme.table_total));

    let mut widths = vec![Constraint::Length(10)];
    widths.extend(pivot.reasons.iter().map(|r| column_width(r, 6)));
    widths.push(Constraint::Length(7));

    let table = Table::new(rows, widths)
        .header(header_row(labels, theme))
        .block(titled_block(title, theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a ranked list of employees by total leave days.
pub fn render_ranking(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    ranking: &[EmployeeTotal],
    theme: &Theme,
) {
    if ranking.is_empty() {
        render_no_data(frame, area, title, theme);
        return;
    }

    let rows: Vec<Row> = ranking
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(t.employee.clone()),
                Cell::from(format_count(t.total_days)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(4), Constraint::Min(12), Constraint::Length(10)],
    )
    .header(header_row(
        ["#".to_string(), "Employee".to_string(), "Days".to_string()],
        theme,
    ))
    .block(titled_block(title, theme))
    .style(theme.text);

    frame.render_widget(table, area);
}

/// Render application counts per employee over the whole dataset.
pub fn render_employee_counts(
    frame: &mut Frame,
    area: Rect,
    counts: &[EmployeeCount],
    theme: &Theme,
) {
    let title = "Applications per Employee (all data)";
    if counts.is_empty() {
        render_no_data(frame, area, title, theme);
        return;
    }

    let rows: Vec<Row> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Row::new(vec![
                Cell::from(c.employee.clone()),
                Cell::from(format_count(c.count)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(14)])
        .header(header_row(
            ["Employee".to_string(), "Applications".to_string()],
            theme,
        ))
        .block(titled_block(title, theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the filtered leave records with their derived fields.
pub fn render_records(frame: &mut Frame, area: Rect, records: &[LeaveRow], theme: &Theme) {
    let title = format!("Leave Records ({})", records.len());
    if records.is_empty() {
        render_no_data(frame, area, &title, theme);
        return;
    }

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(r.employee().to_string()),
                Cell::from(r.record.start_date.format("%Y-%m-%d").to_string()),
                Cell::from(r.record.end_date.format("%Y-%m-%d").to_string()),
                Cell::from(r.reason().to_string()),
                Cell::from(r.leave_duration.to_string()),
                Cell::from(r.working_days.to_string()),
                Cell::from(r.month.name()),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(
            ["Employee", "Start", "End", "Reason", "Duration", "Working", "Month"]
                .map(String::from),
            theme,
        ))
        .block(titled_block(&title, theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render summed leave days per (reason, employee), smallest first.
pub fn render_distribution(
    frame: &mut Frame,
    area: Rect,
    distribution: &[DistributionRow],
    theme: &Theme,
) {
    let title = "Leave Distribution";
    if distribution.is_empty() {
        render_no_data(frame, area, title, theme);
        return;
    }

    let rows: Vec<Row> = distribution
        .iter()
        .enumerate()
        .map(|(i, d)| {
            Row::new(vec![
                Cell::from(d.reason.clone()),
                Cell::from(d.employee.clone()),
                Cell::from(format_count(d.total_days)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(18), Constraint::Min(12), Constraint::Length(8)],
    )
    .header(header_row(
        ["Reason".to_string(), "Employee".to_string(), "Days".to_string()],
        theme,
    ))
    .block(titled_block(title, theme))
    .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the neutral placeholder shown when the filters leave no rows.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(NO_DATA_MESSAGE, theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'a' to select all leave types or 'r' to reset filters.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(titled_block(title, theme)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
