//! Grouped views over validated leave rows.
//!
//! Every function here is pure: it takes a slice of [`LeaveRow`]s (already
//! filtered or not, as the caller decides) and returns a fresh structure.
//! Grouping goes through `BTreeMap` so month keys come out in calendar order
//! and string keys alphabetically.

use std::collections::{BTreeMap, BTreeSet};

use leave_core::formatting::round_to;
use leave_core::models::{LeaveCategory, LeaveRow, Month};
use serde::Serialize;

// ── TypeTotals ────────────────────────────────────────────────────────────────

/// Application count for one named category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeTotal {
    pub category: LeaveCategory,
    pub count: u64,
}

/// Counts for the six named categories, always all six in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub totals: Vec<TypeTotal>,
}

impl TypeTotals {
    fn zeroed() -> Self {
        Self {
            totals: LeaveCategory::ALL
                .into_iter()
                .map(|category| TypeTotal { category, count: 0 })
                .collect(),
        }
    }

    pub fn get(&self, category: LeaveCategory) -> u64 {
        self.totals
            .iter()
            .find(|t| t.category == category)
            .map_or(0, |t| t.count)
    }

    /// Sum over the six categories.
    pub fn total(&self) -> u64 {
        self.totals.iter().map(|t| t.count).sum()
    }
}

// ── PivotTable ────────────────────────────────────────────────────────────────

/// Month × reason grid.
///
/// `months` holds only months that have data, in calendar order; `reasons`
/// is alphabetical; `cells[i][j]` is the value for `months[i]`/`reasons[j]`
/// with absent combinations filled by `T::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable<T> {
    pub months: Vec<Month>,
    pub reasons: Vec<String>,
    pub cells: Vec<Vec<T>>,
}

impl<T> Default for PivotTable<T> {
    fn default() -> Self {
        Self {
            months: Vec::new(),
            reasons: Vec::new(),
            cells: Vec::new(),
        }
    }
}

impl<T: Copy + Default> PivotTable<T> {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Cell for `month`/`reason`, or the zero value if either axis lacks it.
    pub fn get(&self, month: Month, reason: &str) -> T {
        let row = self.months.iter().position(|m| *m == month);
        let col = self.reasons.iter().position(|r| r == reason);
        match (row, col) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => T::default(),
        }
    }
}

impl PivotTable<u64> {
    pub fn row_total(&self, row: usize) -> u64 {
        self.cells.get(row).map_or(0, |cells| cells.iter().sum())
    }

    pub fn column_total(&self, col: usize) -> u64 {
        self.cells.iter().filter_map(|cells| cells.get(col)).sum()
    }

    /// Largest single cell; drives heatmap intensity.
    pub fn max_value(&self) -> u64 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn grand_total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

// ── Row types ─────────────────────────────────────────────────────────────────

/// Raw record count for one reason label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: u64,
}

/// Summed leave duration for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTotal {
    pub employee: String,
    pub total_days: u64,
}

/// Top-N (descending) and bottom-N (ascending) employees by total days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeRanking {
    pub top: Vec<EmployeeTotal>,
    pub bottom: Vec<EmployeeTotal>,
}

/// Number of applications filed by one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeCount {
    pub employee: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyExtremes {
    pub most: EmployeeCount,
    pub least: EmployeeCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: Month,
    pub applications: u64,
    pub total_days: u64,
}

/// Summed duration for one (reason, employee) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRow {
    pub reason: String,
    pub employee: String,
    pub total_days: u64,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeaveMetrics {
    pub total_applications: u64,
    pub total_leave_days: u64,
    /// Mean `leave_duration`, rounded to two decimals; `0.0` with no rows.
    pub average_duration: f64,
    pub total_working_days: u64,
}

// ── LeaveAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that builds every aggregate view.
pub struct LeaveAggregator;

impl LeaveAggregator {
    /// Count applications per named category.
    ///
    /// Reasons outside the six categories are left out of this view; they
    /// still show up in [`Self::aggregate_reason_counts`] and the pivots.
    pub fn aggregate_type_totals(records: &[LeaveRow]) -> TypeTotals {
        let mut totals = TypeTotals::zeroed();
        for category in records.iter().filter_map(LeaveRow::category) {
            if let Some(slot) = totals.totals.iter_mut().find(|t| t.category == category) {
                slot.count += 1;
            }
        }
        totals
    }

    /// Raw per-reason counts, largest first, ties alphabetical.
    pub fn aggregate_reason_counts(records: &[LeaveRow]) -> Vec<ReasonCount> {
        let mut map: BTreeMap<&str, u64> = BTreeMap::new();
        for row in records {
            *map.entry(row.reason()).or_default() += 1;
        }

        let mut counts: Vec<ReasonCount> = map
            .into_iter()
            .map(|(reason, count)| ReasonCount {
                reason: reason.to_string(),
                count,
            })
            .collect();
        // Stable sort keeps the alphabetical order from the map on ties.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Number of applications per month × reason.
    pub fn aggregate_month_reason_counts(records: &[LeaveRow]) -> PivotTable<u64> {
        Self::pivot_by_month_and_reason(records, |_| 1)
    }

    /// Summed `leave_duration` per month × reason.
    pub fn aggregate_month_reason_duration(records: &[LeaveRow]) -> PivotTable<u64> {
        Self::pivot_by_month_and_reason(records, |row| u64::from(row.leave_duration))
    }

    /// Employees ranked by total leave days.
    ///
    /// Each list holds `min(n, distinct employees)` entries. `top` is
    /// descending and `bottom` ascending by total; equal totals are ordered
    /// by name in both.
    pub fn rank_employees_by_total_duration(records: &[LeaveRow], n: usize) -> EmployeeRanking {
        let mut map: BTreeMap<&str, u64> = BTreeMap::new();
        for row in records {
            *map.entry(row.employee()).or_default() += u64::from(row.leave_duration);
        }

        let totals: Vec<EmployeeTotal> = map
            .into_iter()
            .map(|(employee, total_days)| EmployeeTotal {
                employee: employee.to_string(),
                total_days,
            })
            .collect();

        let mut top = totals.clone();
        top.sort_by(|a, b| b.total_days.cmp(&a.total_days));
        top.truncate(n);

        let mut bottom = totals;
        bottom.sort_by_key(|t| t.total_days);
        bottom.truncate(n);

        EmployeeRanking { top, bottom }
    }

    /// Applications per employee, most first, ties alphabetical.
    pub fn employee_leave_counts(records: &[LeaveRow]) -> Vec<EmployeeCount> {
        let mut map: BTreeMap<&str, u64> = BTreeMap::new();
        for row in records {
            *map.entry(row.employee()).or_default() += 1;
        }

        let mut counts: Vec<EmployeeCount> = map
            .into_iter()
            .map(|(employee, count)| EmployeeCount {
                employee: employee.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// The employees with the most and the fewest applications.
    ///
    /// Meant to be called with the full dataset. Ties go to the
    /// alphabetically first name; `None` when there are no records.
    pub fn most_and_least_frequent_employee(records: &[LeaveRow]) -> Option<FrequencyExtremes> {
        let counts = Self::employee_leave_counts(records);
        let most = counts.first()?.clone();
        let least = counts
            .iter()
            .min_by(|a, b| a.count.cmp(&b.count).then_with(|| a.employee.cmp(&b.employee)))?
            .clone();
        Some(FrequencyExtremes { most, least })
    }

    /// Totals per month that has data, in calendar order.
    pub fn aggregate_monthly_totals(records: &[LeaveRow]) -> Vec<MonthTotal> {
        let mut map: BTreeMap<Month, MonthTotal> = BTreeMap::new();
        for row in records {
            let total = map.entry(row.month).or_insert(MonthTotal {
                month: row.month,
                applications: 0,
                total_days: 0,
            });
            total.applications += 1;
            total.total_days += u64::from(row.leave_duration);
        }
        map.into_values().collect()
    }

    /// Month with the most applications; the earliest month wins a tie.
    pub fn peak_month(records: &[LeaveRow]) -> Option<MonthTotal> {
        Self::aggregate_monthly_totals(records)
            .into_iter()
            .reduce(|best, m| if m.applications > best.applications { m } else { best })
    }

    /// Summed duration per (reason, employee), smallest first.
    pub fn aggregate_leave_distribution(records: &[LeaveRow]) -> Vec<DistributionRow> {
        let mut map: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for row in records {
            *map.entry((row.reason(), row.employee())).or_default() +=
                u64::from(row.leave_duration);
        }

        let mut rows: Vec<DistributionRow> = map
            .into_iter()
            .map(|((reason, employee), total_days)| DistributionRow {
                reason: reason.to_string(),
                employee: employee.to_string(),
                total_days,
            })
            .collect();
        rows.sort_by_key(|r| r.total_days);
        rows
    }

    pub fn summary_metrics(records: &[LeaveRow]) -> LeaveMetrics {
        let total_applications = records.len() as u64;
        let total_leave_days: u64 = records.iter().map(|r| u64::from(r.leave_duration)).sum();
        let total_working_days: u64 = records.iter().map(|r| u64::from(r.working_days)).sum();

        let average_duration = if total_applications == 0 {
            0.0
        } else {
            round_to(total_leave_days as f64 / total_applications as f64, 2)
        };

        LeaveMetrics {
            total_applications,
            total_leave_days,
            average_duration,
            total_working_days,
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn pivot_by_month_and_reason(
        records: &[LeaveRow],
        value_fn: impl Fn(&LeaveRow) -> u64,
    ) -> PivotTable<u64> {
        let mut grid: BTreeMap<Month, BTreeMap<&str, u64>> = BTreeMap::new();
        let mut reasons: BTreeSet<&str> = BTreeSet::new();

        for row in records {
            reasons.insert(row.reason());
            *grid
                .entry(row.month)
                .or_default()
                .entry(row.reason())
                .or_default() += value_fn(row);
        }

        let cells = grid
            .values()
            .map(|by_reason| {
                reasons
                    .iter()
                    .map(|reason| by_reason.get(reason).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        PivotTable {
            months: grid.keys().copied().collect(),
            reasons: reasons.into_iter().map(str::to_string).collect(),
            cells,
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

    fn row(employee: &str, start: &str, end: &str, reason: &str) -> LeaveRow {
        derive_row(LeaveRecord {
            employee_name: employee.to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            reason: reason.to_string(),
        })
        .unwrap()
    }

    fn sample() -> Vec<LeaveRow> {
        vec![
            row("Alice", "2025-03-03", "2025-03-07", "Annual Leave"),
            row("Bob", "2025-01-06", "2025-01-06", "Sick Leave"),
            row("Carol", "2025-03-10", "2025-03-11", "Unpaid Leave"),
            row("Alice", "2025-01-13", "2025-01-14", "Sick Leave"),
            row("Dave", "2025-12-01", "2025-12-10", "Study Leave"),
            row("Bob", "2025-08-04", "2025-08-04", "Annual Leave"),
        ]
    }

    // ── aggregate_type_totals ─────────────────────────────────────────────────

    #[test]
    fn test_type_totals_two_record_scenario() {
        let records = vec![
            row("A", "2025-01-06", "2025-01-10", "Annual Leave"),
            row("B", "2025-01-06", "2025-01-06", "Sick Leave"),
        ];
        assert_eq!(records[0].leave_duration, 5);
        assert_eq!(records[0].working_days, 5);
        assert_eq!(records[1].leave_duration, 1);

        let totals = LeaveAggregator::aggregate_type_totals(&records);
        assert_eq!(totals.get(LeaveCategory::Annual), 1);
        assert_eq!(totals.get(LeaveCategory::Sick), 1);
        for category in [
            LeaveCategory::Study,
            LeaveCategory::Casual,
            LeaveCategory::Maternity,
            LeaveCategory::Paternity,
        ] {
            assert_eq!(totals.get(category), 0);
        }
        assert_eq!(totals.totals.len(), 6);
    }

    #[test]
    fn test_type_totals_exclude_unnamed_reasons() {
        let records = sample();
        let totals = LeaveAggregator::aggregate_type_totals(&records);

        let named = records.iter().filter(|r| r.category().is_some()).count() as u64;
        assert_eq!(totals.total(), named);
        assert_eq!(totals.total(), 5);

        // "Unpaid Leave" is still counted in the raw reason view.
        let reasons = LeaveAggregator::aggregate_reason_counts(&records);
        assert!(reasons
            .iter()
            .any(|r| r.reason == "Unpaid Leave" && r.count == 1));
        let raw_total: u64 = reasons.iter().map(|r| r.count).sum();
        assert_eq!(raw_total, records.len() as u64);
    }

    #[test]
    fn test_type_totals_empty() {
        let totals = LeaveAggregator::aggregate_type_totals(&[]);
        assert_eq!(totals.totals.len(), 6);
        assert_eq!(totals.total(), 0);
    }

    // ── aggregate_reason_counts ───────────────────────────────────────────────

    #[test]
    fn test_reason_counts_sorted_by_count_then_name() {
        let counts = LeaveAggregator::aggregate_reason_counts(&sample());
        let order: Vec<(&str, u64)> = counts.iter().map(|c| (c.reason.as_str(), c.count)).collect();
        assert_eq!(
            order,
            vec![
                ("Annual Leave", 2),
                ("Sick Leave", 2),
                ("Study Leave", 1),
                ("Unpaid Leave", 1),
            ]
        );
    }

    // ── pivots ────────────────────────────────────────────────────────────────

    #[test]
    fn test_month_reason_counts_calendar_order_and_zero_fill() {
        let pivot = LeaveAggregator::aggregate_month_reason_counts(&sample());

        assert_eq!(
            pivot.months,
            vec![Month::January, Month::March, Month::August, Month::December]
        );
        assert_eq!(
            pivot.reasons,
            vec!["Annual Leave", "Sick Leave", "Study Leave", "Unpaid Leave"]
        );
        assert_eq!(pivot.get(Month::January, "Sick Leave"), 2);
        assert_eq!(pivot.get(Month::January, "Annual Leave"), 0);
        assert_eq!(pivot.get(Month::March, "Unpaid Leave"), 1);
        assert_eq!(pivot.get(Month::June, "Sick Leave"), 0);
        assert_eq!(pivot.get(Month::March, "Maternity Leave"), 0);
        assert_eq!(pivot.grand_total(), 6);
        assert!(pivot.cells.iter().all(|r| r.len() == pivot.reasons.len()));
    }

    #[test]
    fn test_month_rows_not_alphabetical() {
        // Alphabetically "April" would sort before "February".
        let records = vec![
            row("A", "2025-04-01", "2025-04-01", "Sick Leave"),
            row("A", "2025-02-03", "2025-02-03", "Sick Leave"),
        ];
        let pivot = LeaveAggregator::aggregate_month_reason_counts(&records);
        assert_eq!(pivot.months, vec![Month::February, Month::April]);
    }

    #[test]
    fn test_month_reason_duration_sums_days() {
        let pivot = LeaveAggregator::aggregate_month_reason_duration(&sample());
        // Bob 1 day + Alice 2 days.
        assert_eq!(pivot.get(Month::January, "Sick Leave"), 3);
        assert_eq!(pivot.get(Month::December, "Study Leave"), 10);
        assert_eq!(pivot.max_value(), 10);
        assert_eq!(pivot.row_total(0), 3);
        assert_eq!(pivot.column_total(0), 6);
    }

    #[test]
    fn test_pivot_empty_input() {
        let pivot = LeaveAggregator::aggregate_month_reason_counts(&[]);
        assert!(pivot.is_empty());
        assert!(pivot.reasons.is_empty());
        assert_eq!(pivot.max_value(), 0);
        assert_eq!(pivot.row_total(3), 0);
    }

    // ── rank_employees_by_total_duration ──────────────────────────────────────

    #[test]
    fn test_ranking_orders_and_sizes() {
        let ranking = LeaveAggregator::rank_employees_by_total_duration(&sample(), 5);
        // Alice 7, Bob 2, Carol 2, Dave 10.
        let top: Vec<(&str, u64)> = ranking
            .top
            .iter()
            .map(|t| (t.employee.as_str(), t.total_days))
            .collect();
        assert_eq!(top, vec![("Dave", 10), ("Alice", 7), ("Bob", 2), ("Carol", 2)]);

        let bottom: Vec<&str> = ranking.bottom.iter().map(|t| t.employee.as_str()).collect();
        assert_eq!(bottom, vec!["Bob", "Carol", "Alice", "Dave"]);
    }

    #[test]
    fn test_ranking_truncates_to_n() {
        let ranking = LeaveAggregator::rank_employees_by_total_duration(&sample(), 2);
        assert_eq!(ranking.top.len(), 2);
        assert_eq!(ranking.bottom.len(), 2);
        assert_eq!(ranking.top[0].employee, "Dave");
        assert_eq!(ranking.bottom[0].employee, "Bob");
    }

    #[test]
    fn test_ranking_min_of_n_and_distinct() {
        let records: Vec<LeaveRow> = (1..=8)
            .map(|i| row(&format!("E{i}"), "2025-05-05", "2025-05-05", "Casual Leave"))
            .collect();
        for n in [0, 3, 5, 8, 20] {
            let ranking = LeaveAggregator::rank_employees_by_total_duration(&records, n);
            assert_eq!(ranking.top.len(), n.min(8));
            assert_eq!(ranking.bottom.len(), n.min(8));
        }
    }

    #[test]
    fn test_ranking_empty() {
        let ranking = LeaveAggregator::rank_employees_by_total_duration(&[], 5);
        assert_eq!(ranking, EmployeeRanking::default());
    }

    // ── frequency ─────────────────────────────────────────────────────────────

    #[test]
    fn test_employee_leave_counts() {
        let counts = LeaveAggregator::employee_leave_counts(&sample());
        let order: Vec<(&str, u64)> = counts.iter().map(|c| (c.employee.as_str(), c.count)).collect();
        assert_eq!(
            order,
            vec![("Alice", 2), ("Bob", 2), ("Carol", 1), ("Dave", 1)]
        );
    }

    #[test]
    fn test_most_and_least_frequent_ties_by_name() {
        let extremes = LeaveAggregator::most_and_least_frequent_employee(&sample()).unwrap();
        assert_eq!(extremes.most.employee, "Alice");
        assert_eq!(extremes.most.count, 2);
        assert_eq!(extremes.least.employee, "Carol");
        assert_eq!(extremes.least.count, 1);
    }

    #[test]
    fn test_most_and_least_frequent_empty() {
        assert!(LeaveAggregator::most_and_least_frequent_employee(&[]).is_none());
    }

    #[test]
    fn test_single_employee_is_both_extremes() {
        let records = vec![row("Solo", "2025-01-06", "2025-01-06", "Unpaid Leave")];
        let extremes = LeaveAggregator::most_and_least_frequent_employee(&records).unwrap();
        assert_eq!(extremes.most, extremes.least);
    }

    // ── monthly totals ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_totals_and_peak() {
        let records = sample();
        let months = LeaveAggregator::aggregate_monthly_totals(&records);
        let keys: Vec<Month> = months.iter().map(|m| m.month).collect();
        assert_eq!(
            keys,
            vec![Month::January, Month::March, Month::August, Month::December]
        );
        assert_eq!(months[0].applications, 2);
        assert_eq!(months[0].total_days, 3);

        // January and March both have two; January comes first.
        let peak = LeaveAggregator::peak_month(&records).unwrap();
        assert_eq!(peak.month, Month::January);
        assert!(LeaveAggregator::peak_month(&[]).is_none());
    }

    // ── distribution ──────────────────────────────────────────────────────────

    #[test]
    fn test_leave_distribution_ascending() {
        let dist = LeaveAggregator::aggregate_leave_distribution(&sample());
        assert_eq!(dist.len(), 6);
        assert!(dist.windows(2).all(|w| w[0].total_days <= w[1].total_days));
        assert_eq!(dist.last().unwrap().employee, "Dave");
        assert_eq!(dist.last().unwrap().total_days, 10);
    }

    // ── summary_metrics ───────────────────────────────────────────────────────

    #[test]
    fn test_summary_metrics() {
        let metrics = LeaveAggregator::summary_metrics(&sample());
        assert_eq!(metrics.total_applications, 6);
        // 5 + 1 + 2 + 2 + 10 + 1
        assert_eq!(metrics.total_leave_days, 21);
        assert_eq!(metrics.average_duration, 3.5);
        // 5 + 1 + 2 + 2 + 8 + 1
        assert_eq!(metrics.total_working_days, 19);
    }

    #[test]
    fn test_summary_metrics_empty_is_zero() {
        let metrics = LeaveAggregator::summary_metrics(&[]);
        assert_eq!(metrics, LeaveMetrics::default());
    }

    #[test]
    fn test_summary_metrics_rounds_average() {
        let records = vec![
            row("A", "2025-01-06", "2025-01-06", "Sick Leave"),
            row("A", "2025-01-07", "2025-01-08", "Sick Leave"),
            row("B", "2025-01-09", "2025-01-10", "Sick Leave"),
        ];
        let metrics = LeaveAggregator::summary_metrics(&records);
        assert_eq!(metrics.average_duration, 1.67);
    }
}
