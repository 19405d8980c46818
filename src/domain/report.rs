//! Crowd-sourced lot reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of spots an availability report may flip to occupied.
pub const DEFAULT_BULK_UPDATE_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// "This lot is fuller than shown"
    Availability,
    Issue,
    Pricing,
    Amenity,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Availability => "AVAILABILITY",
            Self::Issue => "ISSUE",
            Self::Pricing => "PRICING",
            Self::Amenity => "AMENITY",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "AVAILABILITY" => Self::Availability,
            "PRICING" => Self::Pricing,
            "AMENITY" => Self::Amenity,
            _ => Self::Issue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub user_id: String,
    pub parking_lot_id: String,
    pub report_type: ReportType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Input of the report transaction
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: String,
    pub parking_lot_id: String,
    pub report_type: ReportType,
    pub description: String,
    pub update_spot_status: bool,
}

impl NewReport {
    /// Whether this report should also mark spots occupied.
    pub fn triggers_spot_update(&self) -> bool {
        self.update_spot_status && self.report_type == ReportType::Availability
    }
}

/// How an availability report corrects spot statuses.
///
/// This is a crowd heuristic: it flips an arbitrary bounded sample of
/// available spots, it does not know which spots are actually taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPolicy {
    pub bulk_update_limit: u64,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            bulk_update_limit: DEFAULT_BULK_UPDATE_LIMIT,
        }
    }
}

/// Result of the report transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub report: Report,
    /// Spots switched to `OCCUPIED` by this report
    pub occupied_spot_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(report_type: ReportType, update_spot_status: bool) -> NewReport {
        NewReport {
            user_id: "u".into(),
            parking_lot_id: "l".into(),
            report_type,
            description: "lot looks full today".into(),
            update_spot_status,
        }
    }

    #[test]
    fn only_flagged_availability_reports_touch_spots() {
        assert!(report(ReportType::Availability, true).triggers_spot_update());
        assert!(!report(ReportType::Availability, false).triggers_spot_update());
        assert!(!report(ReportType::Issue, true).triggers_spot_update());
    }

    #[test]
    fn default_policy_limit_is_five() {
        assert_eq!(ReportPolicy::default().bulk_update_limit, 5);
    }
}
