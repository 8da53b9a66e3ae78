use chrono::NaiveDate;

use super::super::calendar;
use super::super::domain::{Employee, LeaveApplication, LeaveBalance, LeaveRequest, LeaveWarning};
use super::ValidationError;

pub(crate) fn check_date_order(application: &LeaveApplication, errors: &mut Vec<ValidationError>) {
    if application.end_date < application.start_date {
        errors.push(ValidationError::EndBeforeStart {
            start: application.start_date,
            end: application.end_date,
        });
    }
}

pub(crate) fn check_joining_date(
    application: &LeaveApplication,
    employee: &Employee,
    errors: &mut Vec<ValidationError>,
) {
    if application.start_date < employee.joining_date {
        errors.push(ValidationError::BeforeJoining {
            start: application.start_date,
            joined: employee.joining_date,
        });
    }
}

/// Computes the working-day count and resulting total; zero working days is
/// fatal.
pub(crate) fn check_working_days(
    application: &LeaveApplication,
    errors: &mut Vec<ValidationError>,
) -> (u32, f64) {
    let working_days =
        calendar::working_days_between(application.start_date, application.end_date);
    let total_days = f64::from(working_days) * application.portion.multiplier();

    if working_days == 0 {
        errors.push(ValidationError::NoWorkingDays {
            start: application.start_date,
            end: application.end_date,
        });
    }

    (working_days, total_days)
}

pub(crate) fn check_balance(
    application: &LeaveApplication,
    balance: Option<&LeaveBalance>,
    requested: f64,
    year: i32,
    low_balance_threshold: f64,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<LeaveWarning>,
) {
    let Some(balance) = balance else {
        errors.push(ValidationError::MissingBalance {
            leave_type: application.leave_type,
            year,
        });
        return;
    };

    if !balance.has_sufficient(requested) {
        errors.push(ValidationError::InsufficientBalance {
            leave_type: application.leave_type,
            requested,
            available: balance.available_days,
        });
        return;
    }

    let remaining = balance.available_days - requested;
    if remaining < low_balance_threshold {
        warnings.push(LeaveWarning::LowBalance {
            leave_type: application.leave_type,
            remaining,
        });
    }
}

/// One error per conflicting request, naming its id, range, and status.
pub(crate) fn check_overlaps(conflicts: &[LeaveRequest], errors: &mut Vec<ValidationError>) {
    for conflict in conflicts {
        errors.push(ValidationError::Overlapping {
            id: conflict.id.clone(),
            start: conflict.start_date,
            end: conflict.end_date,
            status: conflict.status.label(),
        });
    }
}

/// Returns whether the application is backdated. A start inside the window
/// is a warning; past the window it is fatal.
pub(crate) fn check_backdating(
    application: &LeaveApplication,
    today: NaiveDate,
    window_days: i64,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<LeaveWarning>,
) -> bool {
    if application.start_date >= today {
        return false;
    }

    let gap = (today - application.start_date).num_days();
    if gap > window_days {
        errors.push(ValidationError::BackdatedTooFar {
            start: application.start_date,
            window: window_days,
        });
    } else {
        warnings.push(LeaveWarning::Backdated {
            start_date: application.start_date,
        });
    }

    true
}

pub(crate) fn check_weekend_only(
    application: &LeaveApplication,
    working_days: u32,
    warnings: &mut Vec<LeaveWarning>,
) {
    if working_days == 0 && application.start_date <= application.end_date {
        warnings.push(LeaveWarning::WeekendOnly);
    }
}
