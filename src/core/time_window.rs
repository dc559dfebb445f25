//! Acquisition window resolution from lookback periods.

use crate::types::TimeWindow;
use chrono::{Duration, NaiveDate, Utc};

/// Lookback periods offered to the user, labeled as the UI shows them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackPeriod {
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
}

impl LookbackPeriod {
    pub const ALL: [LookbackPeriod; 3] = [
        LookbackPeriod::LastMonth,
        LookbackPeriod::LastThreeMonths,
        LookbackPeriod::LastSixMonths,
    ];

    pub fn days(&self) -> i64 {
        match self {
            LookbackPeriod::LastMonth => 30,
            LookbackPeriod::LastThreeMonths => 90,
            LookbackPeriod::LastSixMonths => 180,
        }
    }

    /// Spanish UI label
    pub fn label(&self) -> &'static str {
        match self {
            LookbackPeriod::LastMonth => "Último mes",
            LookbackPeriod::LastThreeMonths => "Últimos 3 meses",
            LookbackPeriod::LastSixMonths => "Últimos 6 meses",
        }
    }

    /// Parse a UI label. Unknown labels fall back to the last month.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Últimos 3 meses" => LookbackPeriod::LastThreeMonths,
            "Últimos 6 meses" => LookbackPeriod::LastSixMonths,
            _ => LookbackPeriod::LastMonth,
        }
    }
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        LookbackPeriod::LastMonth
    }
}

impl std::fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Resolve the half-open acquisition window `[today - days, today)`.
///
/// The end date is exclusive, so scenes acquired on `today` itself are
/// not yet considered.
pub fn resolve(period: LookbackPeriod, today: NaiveDate) -> TimeWindow {
    TimeWindow {
        start: today - Duration::days(period.days()),
        end: today,
    }
}

/// Resolve against the current UTC date.
pub fn resolve_today(period: LookbackPeriod) -> TimeWindow {
    resolve(period, Utc::now().date_naive())
}
