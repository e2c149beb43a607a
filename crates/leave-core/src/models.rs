use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Month ─────────────────────────────────────────────────────────────────────

/// Calendar month with a total ordering January → December.
///
/// Grouping by `Month` therefore sorts chronologically rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// The fixed 12-month sequence in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Full English month name, e.g. `"January"`.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── LeaveCategory ─────────────────────────────────────────────────────────────

/// The six named leave categories reported in the type-totals summary.
///
/// Any other reason label is still a valid leave record but has no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeaveCategory {
    Annual,
    Sick,
    Study,
    Casual,
    Maternity,
    Paternity,
}

impl LeaveCategory {
    /// Display order of the summary.
    pub const ALL: [LeaveCategory; 6] = [
        LeaveCategory::Annual,
        LeaveCategory::Sick,
        LeaveCategory::Study,
        LeaveCategory::Casual,
        LeaveCategory::Maternity,
        LeaveCategory::Paternity,
    ];

    /// Short label, e.g. `"Annual"`.
    pub fn label(self) -> &'static str {
        match self {
            LeaveCategory::Annual => "Annual",
            LeaveCategory::Sick => "Sick",
            LeaveCategory::Study => "Study",
            LeaveCategory::Casual => "Casual",
            LeaveCategory::Maternity => "Maternity",
            LeaveCategory::Paternity => "Paternity",
        }
    }

    /// The exact `Reason` value that maps to this category.
    pub fn reason(self) -> &'static str {
        match self {
            LeaveCategory::Annual => "Annual Leave",
            LeaveCategory::Sick => "Sick Leave",
            LeaveCategory::Study => "Study Leave",
            LeaveCategory::Casual => "Casual Leave",
            LeaveCategory::Maternity => "Maternity Leave",
            LeaveCategory::Paternity => "Paternity Leave",
        }
    }

    /// Resolve a reason label. Matching is exact; `"annual leave"` is not
    /// `Annual`.
    pub fn from_reason(reason: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.reason() == reason)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One leave application as read from the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// A validated [`LeaveRecord`] together with its derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRow {
    #[serde(flatten)]
    pub record: LeaveRecord,
    /// Weekdays in `[start_date, end_date]`.
    pub working_days: u32,
    /// Calendar days in `[start_date, end_date]`; never below 1.
    pub leave_duration: u32,
    /// Month of `start_date`.
    pub month: Month,
}

impl LeaveRow {
    pub fn employee(&self) -> &str {
        &self.record.employee_name
    }

    pub fn reason(&self) -> &str {
        &self.record.reason
    }

    pub fn category(&self) -> Option<LeaveCategory> {
        LeaveCategory::from_reason(&self.record.reason)
    }
}

// ── Filter state ──────────────────────────────────────────────────────────────

/// Sentinel used by the employee selector for "no employee filter".
pub const ALL_EMPLOYEES: &str = "All";

/// Employee part of the dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmployeeFilter {
    #[default]
    All,
    Employee(String),
}

impl EmployeeFilter {
    /// Build a filter from a selector value, treating `"All"` as no filter.
    pub fn from_selection(selection: &str) -> Self {
        if selection == ALL_EMPLOYEES {
            EmployeeFilter::All
        } else {
            EmployeeFilter::Employee(selection.to_string())
        }
    }

    /// Label shown in headers and chart titles.
    pub fn label(&self) -> &str {
        match self {
            EmployeeFilter::All => ALL_EMPLOYEES,
            EmployeeFilter::Employee(name) => name,
        }
    }
}

/// Leave-type part of the dashboard filter.
///
/// `Only` with an empty set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaveTypeSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl LeaveTypeSelection {
    pub fn contains(&self, reason: &str) -> bool {
        match self {
            LeaveTypeSelection::All => true,
            LeaveTypeSelection::Only(set) => set.contains(reason),
        }
    }
}

/// Explicit filter passed into every report computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub employee: EmployeeFilter,
    pub leave_types: LeaveTypeSelection,
}

impl FilterState {
    /// Whether `row` survives this filter.
    pub fn matches(&self, row: &LeaveRow) -> bool {
        let employee_ok = match &self.employee {
            EmployeeFilter::All => true,
            EmployeeFilter::Employee(name) => row.employee() == name,
        };
        employee_ok && self.leave_types.contains(row.reason())
    }

    /// `true` when nothing is filtered out.
    pub fn is_unfiltered(&self) -> bool {
        self.employee == EmployeeFilter::All && self.leave_types == LeaveTypeSelection::All
    }
}

// ── InvalidRowPolicy ──────────────────────────────────────────────────────────

/// What the loader does with a record that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Drop the row, remember why, and keep loading.
    #[default]
    Skip,
    /// Fail the whole load on the first bad row.
    Abort,
}

impl InvalidRowPolicy {
    /// Parse the CLI spelling (`"skip"` / `"abort"`). Unknown values fall back
    /// to [`InvalidRowPolicy::Skip`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "abort" => InvalidRowPolicy::Abort,
            _ => InvalidRowPolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(employee: &str, reason: &str) -> LeaveRow {
        LeaveRow {
            record: LeaveRecord {
                employee_name: employee.to_string(),
                start_date: date(2025, 1, 6),
                end_date: date(2025, 1, 6),
                reason: reason.to_string(),
            },
            working_days: 1,
            leave_duration: 1,
            month: Month::January,
        }
    }

    // ── Month ────────────────────────────────────────────────────────────────

    #[test]
    fn test_month_ordering_is_calendar_not_alphabetical() {
        // Alphabetically April < August < December < February.
        let mut months = vec![Month::December, Month::April, Month::February, Month::August];
        months.sort();
        assert_eq!(
            months,
            vec![Month::February, Month::April, Month::August, Month::December]
        );
    }

    #[test]
    fn test_month_names() {
        assert_eq!(Month::September.name(), "September");
        assert_eq!(Month::May.to_string(), "May");
    }

    // ── LeaveCategory ────────────────────────────────────────────────────────

    #[test]
    fn test_category_from_reason_exact_match() {
        assert_eq!(
            LeaveCategory::from_reason("Annual Leave"),
            Some(LeaveCategory::Annual)
        );
        assert_eq!(
            LeaveCategory::from_reason("Paternity Leave"),
            Some(LeaveCategory::Paternity)
        );
        assert_eq!(LeaveCategory::from_reason("annual leave"), None);
        assert_eq!(LeaveCategory::from_reason("Unpaid Leave"), None);
    }

    #[test]
    fn test_category_labels() {
        let labels: Vec<&str> = LeaveCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["Annual", "Sick", "Study", "Casual", "Maternity", "Paternity"]
        );
    }

    // ── FilterState ──────────────────────────────────────────────────────────

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = FilterState::default();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(&row("Alice", "Annual Leave")));
        assert!(filter.matches(&row("Bob", "Unpaid Leave")));
    }

    #[test]
    fn test_employee_filter() {
        let filter = FilterState {
            employee: EmployeeFilter::from_selection("Alice"),
            leave_types: LeaveTypeSelection::All,
        };
        assert!(!filter.is_unfiltered());
        assert!(filter.matches(&row("Alice", "Sick Leave")));
        assert!(!filter.matches(&row("Bob", "Sick Leave")));
    }

    #[test]
    fn test_employee_selection_sentinel() {
        assert_eq!(EmployeeFilter::from_selection("All"), EmployeeFilter::All);
        assert_eq!(EmployeeFilter::All.label(), "All");
        assert_eq!(
            EmployeeFilter::from_selection("Carol").label(),
            "Carol"
        );
    }

    #[test]
    fn test_leave_type_filter() {
        let filter = FilterState {
            employee: EmployeeFilter::All,
            leave_types: LeaveTypeSelection::Only(BTreeSet::from(["Sick Leave".to_string()])),
        };
        assert!(filter.matches(&row("Alice", "Sick Leave")));
        assert!(!filter.matches(&row("Alice", "Annual Leave")));
    }

    #[test]
    fn test_empty_leave_type_selection_matches_nothing() {
        let filter = FilterState {
            employee: EmployeeFilter::All,
            leave_types: LeaveTypeSelection::Only(BTreeSet::new()),
        };
        assert!(!filter.matches(&row("Alice", "Sick Leave")));
    }

    // ── InvalidRowPolicy ─────────────────────────────────────────────────────

    #[test]
    fn test_invalid_row_policy_from_name() {
        assert_eq!(InvalidRowPolicy::from_name("abort"), InvalidRowPolicy::Abort);
        assert_eq!(InvalidRowPolicy::from_name("ABORT"), InvalidRowPolicy::Abort);
        assert_eq!(InvalidRowPolicy::from_name("skip"), InvalidRowPolicy::Skip);
        assert_eq!(InvalidRowPolicy::from_name("whatever"), InvalidRowPolicy::Skip);
    }

    #[test]
    fn test_leave_row_serializes_flat() {
        let value = serde_json::to_value(row("Alice", "Annual Leave")).unwrap();
        assert_eq!(value["employee_name"], "Alice");
        assert_eq!(value["start_date"], "2025-01-06");
        assert_eq!(value["month"], "January");
        assert_eq!(value["leave_duration"], 1);
    }
}
