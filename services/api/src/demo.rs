use crate::infra::{build_service, load_directory, LeaveService};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Args;
use leavedesk::error::AppError;
use leavedesk::workflows::leave::{
    DayPortion, EmployeeId, InMemoryDirectory, LeaveApplication, LeaveRequestView, LeaveType,
    RecordingNotifier,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Employee roster CSV to seed the directory (defaults to a built-in
    /// sample org chart)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Override the reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { roster, today } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let start = next_monday(today);
    let directory = Arc::new(load_directory(roster.as_deref())?);
    let (service, notifier) = build_service(directory.clone(), today.year())?;
    if start.year() != today.year() {
        // A late-December run files requests against next year's ledger.
        for employee in directory.employees() {
            service.initialize_balances(&employee.id, start.year())?;
        }
    }

    println!("Leave workflow demo (today: {today})");
    print_roster(&directory);

    let employees = directory.employees();
    let Some(requester_entry) = employees.iter().find(|e| e.manager.is_some()) else {
        println!("\nNo managed employees in the roster; nothing to demonstrate.");
        return Ok(());
    };
    let requester = requester_entry.id.clone();
    let manager = requester_entry
        .manager
        .clone()
        .unwrap_or_else(|| requester.clone());
    let colleague = employees
        .iter()
        .find(|e| e.manager.is_some() && e.id != requester)
        .map(|e| e.id.clone())
        .unwrap_or_else(|| requester.clone());

    println!("\n-- Vacation request --");
    let outcome = service.apply(
        LeaveApplication {
            employee_id: requester.clone(),
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: start + Duration::days(2),
            portion: DayPortion::FullDay,
            emergency: false,
            exclude_request_id: None,
        },
        today,
    )?;
    let pending_id = outcome.request.id.clone();
    render_view(&outcome.request.status_view(&outcome.warnings));

    println!("\n-- Manager approval --");
    let outcome = service.approve(&pending_id, &manager, today)?;
    render_view(&outcome.request.status_view(&outcome.warnings));
    print_balance(&service, &requester, LeaveType::Vacation, start.year());

    println!("\n-- Overlapping attempt --");
    let refused = service.apply(
        LeaveApplication {
            employee_id: requester.clone(),
            leave_type: LeaveType::Personal,
            start_date: start + Duration::days(1),
            end_date: start + Duration::days(3),
            portion: DayPortion::FullDay,
            emergency: false,
            exclude_request_id: None,
        },
        today,
    );
    match refused {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(err) => println!("  refused: {err}"),
    }

    println!("\n-- Emergency (auto-approval) --");
    let emergency_start = start + Duration::days(7);
    let outcome = service.apply(
        LeaveApplication {
            employee_id: colleague.clone(),
            leave_type: LeaveType::Emergency,
            start_date: emergency_start,
            end_date: emergency_start,
            portion: DayPortion::FullDay,
            emergency: true,
            exclude_request_id: None,
        },
        today,
    )?;
    render_view(&outcome.request.status_view(&outcome.warnings));
    print_balance(&service, &colleague, LeaveType::Emergency, emergency_start.year());

    print_notices(&notifier);
    Ok(())
}

fn next_monday(today: NaiveDate) -> NaiveDate {
    let offset = 7 - today.weekday().num_days_from_monday();
    today + Duration::days(i64::from(offset))
}

fn print_roster(directory: &InMemoryDirectory) {
    println!("Directory:");
    for employee in directory.employees() {
        let manager = employee
            .manager
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        println!(
            "  {:<8} {:<16} {:<12} manager: {}",
            employee.id.0, employee.full_name, employee.department, manager
        );
    }
}

fn render_view(view: &LeaveRequestView) {
    println!(
        "  {} [{}] {} {} .. {} ({} days)",
        view.request_id, view.status, view.leave_type, view.start_date, view.end_date,
        view.total_days
    );
    if let Some(approver) = &view.approver {
        println!("  approver: {approver}");
    }
    for warning in &view.warnings {
        println!("  warning: {warning}");
    }
}

fn print_balance(
    service: &Arc<LeaveService>,
    employee: &EmployeeId,
    leave_type: LeaveType,
    year: i32,
) {
    match service.balance(employee, leave_type, year) {
        Ok(balance) => println!(
            "  {} {} ledger {}: total {} / used {} / available {}",
            employee,
            leave_type.label(),
            year,
            balance.total_days,
            balance.used_days,
            balance.available_days
        ),
        Err(err) => println!("  ledger lookup failed: {err}"),
    }
}

fn print_notices(notifier: &Arc<RecordingNotifier>) {
    println!("\nNotifications dispatched:");
    for notice in notifier.events() {
        println!("  {} for {}", notice.template, notice.request_id);
    }
}
