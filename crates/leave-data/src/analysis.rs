//! Report pipeline.
//!
//! Applies a [`FilterState`] to the loaded rows and assembles every aggregate
//! view into a [`DashboardReport`] for the presentation layer. The report is
//! rebuilt from scratch on every call.

use std::collections::BTreeSet;

use chrono::Utc;
use leave_core::models::{FilterState, LeaveRow, LeaveTypeSelection, ALL_EMPLOYEES};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{
    DistributionRow, EmployeeCount, EmployeeRanking, FrequencyExtremes, LeaveAggregator,
    LeaveMetrics, MonthTotal, PivotTable, ReasonCount, TypeTotals,
};

/// Shown in place of any view whose filtered input is empty.
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters";

// ── Public types ──────────────────────────────────────────────────────────────

/// Values offered by the filter controls, taken from the full dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Distinct employee names, sorted.
    pub employees: Vec<String>,
    /// Distinct reasons in order of first appearance.
    pub reasons: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[LeaveRow]) -> Self {
        let employees: BTreeSet<&str> = rows.iter().map(LeaveRow::employee).collect();

        let mut reasons: Vec<String> = Vec::new();
        for row in rows {
            if !reasons.iter().any(|r| r == row.reason()) {
                reasons.push(row.reason().to_string());
            }
        }

        Self {
            employees: employees.into_iter().map(str::to_string).collect(),
            reasons,
        }
    }

    /// Employee selector entries with the `"All"` sentinel first.
    pub fn employee_choices(&self) -> Vec<String> {
        std::iter::once(ALL_EMPLOYEES.to_string())
            .chain(self.employees.iter().cloned())
            .collect()
    }
}

/// Describes how a report was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp of generation.
    pub generated_at: String,
    pub rows_total: usize,
    pub rows_filtered: usize,
    pub employee_filter: String,
    /// `None` when every leave type is selected.
    pub leave_type_filter: Option<Vec<String>>,
    pub top_n: usize,
}

/// Every view the dashboard shows, for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub metrics: LeaveMetrics,
    pub type_totals: TypeTotals,
    pub reason_counts: Vec<ReasonCount>,
    pub month_reason_counts: PivotTable<u64>,
    pub month_reason_duration: PivotTable<u64>,
    pub monthly_totals: Vec<MonthTotal>,
    pub peak_month: Option<MonthTotal>,
    pub ranking: EmployeeRanking,
    pub distribution: Vec<DistributionRow>,
    /// Computed over the unfiltered rows.
    pub frequency: Option<FrequencyExtremes>,
    /// Computed over the unfiltered rows.
    pub employee_counts: Vec<EmployeeCount>,
    /// The filtered rows themselves.
    pub records: Vec<LeaveRow>,
}

impl DashboardReport {
    /// `true` when the filter left nothing to aggregate.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Rows that survive `filter`, in their original order.
pub fn apply_filter(rows: &[LeaveRow], filter: &FilterState) -> Vec<LeaveRow> {
    rows.iter().filter(|row| filter.matches(row)).cloned().collect()
}

/// Build the full report for `filter`.
///
/// Filter-dependent views use the filtered rows. Frequency extremes and
/// per-employee counts always use `all_rows`.
pub fn build_report(all_rows: &[LeaveRow], filter: &FilterState, top_n: usize) -> DashboardReport {
    let records = apply_filter(all_rows, filter);

    debug!(
        "Building report: {} of {} rows match (employee={}, top_n={})",
        records.len(),
        all_rows.len(),
        filter.employee.label(),
        top_n
    );

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_total: all_rows.len(),
        rows_filtered: records.len(),
        employee_filter: filter.employee.label().to_string(),
        leave_type_filter: match &filter.leave_types {
            LeaveTypeSelection::All => None,
            LeaveTypeSelection::Only(set) => Some(set.iter().cloned().collect()),
        },
        top_n,
    };

    DashboardReport {
        metadata,
        metrics: LeaveAggregator::summary_metrics(&records),
        type_totals: LeaveAggregator::aggregate_type_totals(&records),
        reason_counts: LeaveAggregator::aggregate_reason_counts(&records),
        month_reason_counts: LeaveAggregator::aggregate_month_reason_counts(&records),
        month_reason_duration: LeaveAggregator::aggregate_month_reason_duration(&records),
        monthly_totals: LeaveAggregator::aggregate_monthly_totals(&records),
        peak_month: LeaveAggregator::peak_month(&records),
        ranking: LeaveAggregator::rank_employees_by_total_duration(&records, top_n),
        distribution: LeaveAggregator::aggregate_leave_distribution(&records),
        frequency: LeaveAggregator::most_and_least_frequent_employee(all_rows),
        employee_counts: LeaveAggregator::employee_leave_counts(all_rows),
        records,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leave_core::calculations::derive_row;
    use leave_core::models::{EmployeeFilter, LeaveCategory, LeaveRecord, Month};

    fn row(employee: &str, start: &str, end: &str, reason: &str) -> LeaveRow {
        derive_row(LeaveRecord {
            employee_name: employee.to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            reason: reason.to_string(),
        })
        .unwrap()
    }

    fn rows() -> Vec<LeaveRow> {
        vec![
            row("Zoe", "2025-02-03", "2025-02-07", "Sick Leave"),
            row("Adam", "2025-01-06", "2025-01-10", "Annual Leave"),
            row("Adam", "2025-03-03", "2025-03-03", "Unpaid Leave"),
            row("Mia", "2025-01-20", "2025-01-21", "Sick Leave"),
            row("Adam", "2025-04-07", "2025-04-08", "Sick Leave"),
        ]
    }

    fn only(reasons: &[&str]) -> LeaveTypeSelection {
        LeaveTypeSelection::Only(reasons.iter().map(|r| r.to_string()).collect())
    }

    // ── FilterOptions ─────────────────────────────────────────────────────────

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_rows(&rows());
        assert_eq!(options.employees, vec!["Adam", "Mia", "Zoe"]);
        assert_eq!(
            options.reasons,
            vec!["Sick Leave", "Annual Leave", "Unpaid Leave"]
        );
        assert_eq!(options.employee_choices(), vec!["All", "Adam", "Mia", "Zoe"]);
    }

    // ── apply_filter ──────────────────────────────────────────────────────────

    #[test]
    fn test_apply_filter_by_employee_and_type() {
        let filter = FilterState {
            employee: EmployeeFilter::from_selection("Adam"),
            leave_types: only(&["Sick Leave", "Unpaid Leave"]),
        };
        let filtered = apply_filter(&rows(), &filter);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.employee() == "Adam"));
        assert_eq!(filtered[0].month, Month::March);
    }

    // ── build_report ──────────────────────────────────────────────────────────

    #[test]
    fn test_build_report_unfiltered() {
        let report = build_report(&rows(), &FilterState::default(), 5);
        assert!(!report.is_empty());
        assert_eq!(report.metadata.rows_total, 5);
        assert_eq!(report.metadata.rows_filtered, 5);
        assert_eq!(report.metadata.leave_type_filter, None);
        assert_eq!(report.metrics.total_applications, 5);
        assert_eq!(report.type_totals.get(LeaveCategory::Sick), 3);
        assert_eq!(report.type_totals.total(), 4);
        assert_eq!(report.ranking.top.len(), 3);
        assert_eq!(report.ranking.top[0].employee, "Adam");
        assert_eq!(report.peak_month.unwrap().month, Month::January);
    }

    #[test]
    fn test_frequency_is_invariant_under_filter() {
        let all = rows();
        let unfiltered = build_report(&all, &FilterState::default(), 5);

        let filters = [
            FilterState {
                employee: EmployeeFilter::from_selection("Zoe"),
                leave_types: LeaveTypeSelection::All,
            },
            FilterState {
                employee: EmployeeFilter::All,
                leave_types: only(&["Unpaid Leave"]),
            },
            FilterState {
                employee: EmployeeFilter::All,
                leave_types: only(&[]),
            },
        ];
        for filter in &filters {
            let report = build_report(&all, filter, 5);
            assert_eq!(report.frequency, unfiltered.frequency);
            assert_eq!(report.employee_counts, unfiltered.employee_counts);
        }

        let extremes = unfiltered.frequency.unwrap();
        assert_eq!(extremes.most.employee, "Adam");
        assert_eq!(extremes.least.employee, "Mia");
    }

    #[test]
    fn test_empty_filter_yields_empty_views() {
        let filter = FilterState {
            employee: EmployeeFilter::All,
            leave_types: only(&[]),
        };
        let report = build_report(&rows(), &filter, 5);

        assert!(report.is_empty());
        assert_eq!(report.metrics, LeaveMetrics::default());
        assert_eq!(report.type_totals.totals.len(), 6);
        assert_eq!(report.type_totals.total(), 0);
        assert!(report.reason_counts.is_empty());
        assert!(report.month_reason_counts.is_empty());
        assert!(report.month_reason_duration.is_empty());
        assert!(report.monthly_totals.is_empty());
        assert!(report.peak_month.is_none());
        assert!(report.ranking.top.is_empty());
        assert!(report.ranking.bottom.is_empty());
        assert!(report.distribution.is_empty());
        assert_eq!(report.metadata.leave_type_filter, Some(vec![]));
    }

    #[test]
    fn test_unknown_employee_is_empty_not_error() {
        let filter = FilterState {
            employee: EmployeeFilter::from_selection("Nobody"),
            leave_types: LeaveTypeSelection::All,
        };
        let report = build_report(&rows(), &filter, 5);
        assert!(report.is_empty());
        assert!(report.frequency.is_some());
    }

    #[test]
    fn test_unpaid_leave_in_pivots_but_not_type_totals() {
        let report = build_report(&rows(), &FilterState::default(), 5);
        assert!(report
            .month_reason_counts
            .reasons
            .contains(&"Unpaid Leave".to_string()));
        assert_eq!(report.month_reason_counts.get(Month::March, "Unpaid Leave"), 1);
        assert_eq!(
            report.type_totals.total(),
            report.metrics.total_applications - 1
        );
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = build_report(&rows(), &FilterState::default(), 2);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["metrics"]["total_applications"], 5);
        assert_eq!(value["month_reason_counts"]["months"][0], "January");
        assert_eq!(value["ranking"]["top"].as_array().unwrap().len(), 2);
        assert_eq!(value["records"][0]["employee_name"], "Zoe");
    }
}
