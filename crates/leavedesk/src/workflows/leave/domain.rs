use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submitted leave requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaveRequestId(pub String);

impl std::fmt::Display for LeaveRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory record for one employee. The manager link is a weak reference
/// resolved through the directory, never an owned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub department: String,
    pub joining_date: NaiveDate,
    pub manager: Option<EmployeeId>,
}

/// Closed enumeration of leave categories the ledger tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Emergency,
    Maternity,
    Unpaid,
}

impl LeaveType {
    pub const ALL: [LeaveType; 6] = [
        LeaveType::Vacation,
        LeaveType::Sick,
        LeaveType::Personal,
        LeaveType::Emergency,
        LeaveType::Maternity,
        LeaveType::Unpaid,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LeaveType::Vacation => "vacation",
            LeaveType::Sick => "sick",
            LeaveType::Personal => "personal",
            LeaveType::Emergency => "emergency",
            LeaveType::Maternity => "maternity",
            LeaveType::Unpaid => "unpaid",
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How much of each working day the request consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPortion {
    FullDay,
    HalfDay,
}

impl Default for DayPortion {
    fn default() -> Self {
        DayPortion::FullDay
    }
}

impl DayPortion {
    pub const fn multiplier(self) -> f64 {
        match self {
            DayPortion::FullDay => 1.0,
            DayPortion::HalfDay => 0.5,
        }
    }
}

/// Lifecycle of a leave request. Pending is the only state with outgoing
/// transitions; Rejected and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    AutoApproved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::AutoApproved => "auto_approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Rejected | LeaveStatus::Cancelled)
    }

    /// Whether a request in this status occupies calendar days for the
    /// overlap scan and the manager-availability check.
    pub const fn blocks_calendar(self) -> bool {
        matches!(
            self,
            LeaveStatus::Pending | LeaveStatus::Approved | LeaveStatus::AutoApproved
        )
    }
}

/// Candidate request as submitted by an employee, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub employee_id: EmployeeId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub portion: DayPortion,
    #[serde(default)]
    pub emergency: bool,
    /// Set when re-validating an existing request so the overlap scan skips
    /// the request's own calendar entry.
    #[serde(default)]
    pub exclude_request_id: Option<LeaveRequestId>,
}

/// One leave request as stored. Constructed on application and mutated only
/// by the approve/reject/cancel transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub portion: DayPortion,
    pub total_days: f64,
    pub status: LeaveStatus,
    pub emergency: bool,
    pub backdated: bool,
    pub submitted_on: NaiveDate,
    pub approver: Option<EmployeeId>,
    pub rejection_reason: Option<String>,
    pub decided_on: Option<NaiveDate>,
}

impl LeaveRequest {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn blocks_calendar(&self) -> bool {
        self.status.blocks_calendar()
    }

    /// Calendar year the ledger record for this request belongs to.
    pub fn ledger_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Ledger record for one employee, leave type, and calendar year.
///
/// `available_days == total_days - used_days` holds after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub employee_id: EmployeeId,
    pub leave_type: LeaveType,
    pub year: i32,
    pub total_days: f64,
    pub used_days: f64,
    pub available_days: f64,
}

impl LeaveBalance {
    pub fn new(employee_id: EmployeeId, leave_type: LeaveType, year: i32, total_days: f64) -> Self {
        Self {
            employee_id,
            leave_type,
            year,
            total_days,
            used_days: 0.0,
            available_days: total_days,
        }
    }

    pub fn has_sufficient(&self, requested: f64) -> bool {
        self.available_days >= requested
    }

    pub fn deduct(&mut self, days: f64) {
        self.used_days += days;
        self.available_days = self.total_days - self.used_days;
    }

    /// Returns days to the ledger. Over-restoring clamps used_days at zero
    /// and the excess is absorbed.
    pub fn restore(&mut self, days: f64) {
        self.used_days = (self.used_days - days).max(0.0);
        self.available_days = self.total_days - self.used_days;
    }
}

/// Inclusive interval intersection: a shared boundary day counts as overlap.
pub fn ranges_overlap(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> bool {
    !(end_a < start_b || start_a > end_b)
}

/// Classification of fatal conditions so callers can map them to distinct
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    NotFound,
    Conflict,
    Unauthorized,
    Invalid,
}

/// Non-blocking notices attached to a successful validation or transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LeaveWarning {
    LowBalance {
        leave_type: LeaveType,
        remaining: f64,
    },
    Backdated {
        start_date: NaiveDate,
    },
    WeekendOnly,
    AlternateApprover {
        approver: EmployeeId,
    },
    ManagementChainApprover {
        approver: EmployeeId,
    },
    TopLevelApprover {
        approver: EmployeeId,
    },
}

impl LeaveWarning {
    pub fn summary(&self) -> String {
        match self {
            LeaveWarning::LowBalance {
                leave_type,
                remaining,
            } => format!("only {remaining:.1} {leave_type} day(s) will remain after deduction"),
            LeaveWarning::Backdated { start_date } => {
                format!("backdated request starting {start_date} needs justification")
            }
            LeaveWarning::WeekendOnly => {
                "range covers only weekend days; zero working days will be deducted".to_string()
            }
            LeaveWarning::AlternateApprover { approver } => {
                format!("{approver} is acting as alternate approver")
            }
            LeaveWarning::ManagementChainApprover { approver } => {
                format!("{approver} approves from higher in the management chain")
            }
            LeaveWarning::TopLevelApprover { approver } => {
                format!("{approver} approves with top-level authority")
            }
        }
    }
}
