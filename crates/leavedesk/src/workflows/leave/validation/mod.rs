mod rules;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{
    Employee, EmployeeId, FaultKind, LeaveApplication, LeaveRequestId, LeaveType, LeaveWarning,
};
use super::policy::LeavePolicy;
use super::repository::{BalanceRepository, LeaveRequestRepository, RepositoryError};

/// Pure admissibility check for a candidate leave application. Checks run in
/// order and accumulate; only a missing employee short-circuits.
pub struct ValidationEngine<'a> {
    directory: &'a dyn EmployeeDirectory,
    requests: &'a dyn LeaveRequestRepository,
    balances: &'a dyn BalanceRepository,
    policy: &'a LeavePolicy,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(
        directory: &'a dyn EmployeeDirectory,
        requests: &'a dyn LeaveRequestRepository,
        balances: &'a dyn BalanceRepository,
        policy: &'a LeavePolicy,
    ) -> Self {
        Self {
            directory,
            requests,
            balances,
            policy,
        }
    }

    pub fn validate(
        &self,
        application: &LeaveApplication,
        today: NaiveDate,
    ) -> Result<ValidatedLeave, ValidationFault> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        rules::check_date_order(application, &mut errors);

        let employee = match self.directory.find_employee(&application.employee_id)? {
            Some(employee) => employee,
            None => {
                errors.push(ValidationError::UnknownEmployee(
                    application.employee_id.clone(),
                ));
                return Err(ValidationFault::Refused(ValidationFailure { errors }));
            }
        };

        rules::check_joining_date(application, &employee, &mut errors);

        let (working_days, total_days) = rules::check_working_days(application, &mut errors);

        let skip_balance =
            application.emergency && total_days <= self.policy.auto_approve_limit_days;
        if !skip_balance {
            let year = application.start_date.year();
            let balance = self.balances.fetch(
                &application.employee_id,
                application.leave_type,
                year,
            )?;
            rules::check_balance(
                application,
                balance.as_ref(),
                total_days,
                year,
                self.policy.low_balance_threshold,
                &mut errors,
                &mut warnings,
            );
        }

        let conflicts = self.requests.find_overlapping(
            &application.employee_id,
            application.start_date,
            application.end_date,
            application.exclude_request_id.as_ref(),
        )?;
        rules::check_overlaps(&conflicts, &mut errors);

        let backdated = rules::check_backdating(
            application,
            today,
            self.policy.backdate_window_days,
            &mut errors,
            &mut warnings,
        );

        rules::check_weekend_only(application, working_days, &mut warnings);

        if errors.is_empty() {
            Ok(ValidatedLeave {
                employee,
                working_days,
                total_days,
                backdated,
                warnings,
            })
        } else {
            Err(ValidationFault::Refused(ValidationFailure { errors }))
        }
    }
}

/// Admissible application together with everything the validator had to
/// compute along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLeave {
    pub employee: Employee,
    pub working_days: u32,
    pub total_days: f64,
    pub backdated: bool,
    pub warnings: Vec<LeaveWarning>,
}

/// A single fatal validation finding.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum ValidationError {
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("employee {0} not found")]
    UnknownEmployee(EmployeeId),
    #[error("leave starts {start}, before the joining date {joined}")]
    BeforeJoining { start: NaiveDate, joined: NaiveDate },
    #[error("no working days between {start} and {end}")]
    NoWorkingDays { start: NaiveDate, end: NaiveDate },
    #[error("no {leave_type} balance recorded for {year}")]
    MissingBalance { leave_type: LeaveType, year: i32 },
    #[error(
        "insufficient {leave_type} balance: requested {requested:.1}, available {available:.1}"
    )]
    InsufficientBalance {
        leave_type: LeaveType,
        requested: f64,
        available: f64,
    },
    #[error("overlaps request {id} ({start}..{end}, {status})")]
    Overlapping {
        id: LeaveRequestId,
        start: NaiveDate,
        end: NaiveDate,
        status: &'static str,
    },
    #[error("start date {start} is more than {window} days in the past")]
    BackdatedTooFar { start: NaiveDate, window: i64 },
}

impl ValidationError {
    pub fn fault(&self) -> FaultKind {
        match self {
            ValidationError::UnknownEmployee(_) | ValidationError::MissingBalance { .. } => {
                FaultKind::NotFound
            }
            ValidationError::Overlapping { .. } => FaultKind::Conflict,
            _ => FaultKind::Invalid,
        }
    }
}

/// All fatal findings for one refused application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    /// Fault classification of the bundle, taken from the first finding.
    pub fn fault(&self) -> FaultKind {
        self.errors
            .first()
            .map(ValidationError::fault)
            .unwrap_or(FaultKind::Invalid)
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Validation outcome when the application could not be admitted: either the
/// rules refused it or a collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum ValidationFault {
    #[error("leave application refused: {0}")]
    Refused(ValidationFailure),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl ValidationFault {
    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            ValidationFault::Refused(failure) => Some(failure.fault()),
            ValidationFault::Directory(_) | ValidationFault::Storage(_) => None,
        }
    }
}
