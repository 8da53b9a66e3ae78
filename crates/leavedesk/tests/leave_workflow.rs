//! End-to-end scenarios for the leave workflow through the public facade:
//! application, approval with ledger deduction, auto-approval of short
//! emergency requests, and the delegation fallbacks.

use std::sync::Arc;

use chrono::NaiveDate;

use leavedesk::workflows::leave::{
    BalanceRepository, DayPortion, Employee, EmployeeId, InMemoryBalances, InMemoryDirectory,
    InMemoryLeaveRequests,
    LeaveApplication, LeaveBalance, LeavePolicy, LeaveStatus, LeaveType, LeaveWarning,
    LeaveWorkflowService, RecordingNotifier,
};

type Service = LeaveWorkflowService<
    InMemoryDirectory,
    InMemoryLeaveRequests,
    InMemoryBalances,
    RecordingNotifier,
>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn employee(id: &str, department: &str, joined: NaiveDate, manager: Option<&str>) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        full_name: format!("Employee {id}"),
        department: department.to_string(),
        joining_date: joined,
        manager: manager.map(|m| EmployeeId(m.to_string())),
    }
}

fn build_service() -> (Arc<Service>, Arc<InMemoryBalances>, Arc<RecordingNotifier>) {
    let directory = Arc::new(InMemoryDirectory::default());
    directory.insert(employee("mgr-01", "Support", date(2019, 6, 3), None));
    directory.insert(employee(
        "mgr-02",
        "Support",
        date(2020, 9, 7),
        Some("mgr-01"),
    ));
    directory.insert(employee(
        "emp-01",
        "Support",
        date(2023, 1, 1),
        Some("mgr-02"),
    ));

    let requests = Arc::new(InMemoryLeaveRequests::default());
    let balances = Arc::new(InMemoryBalances::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(LeaveWorkflowService::new(
        directory,
        requests,
        balances.clone(),
        notifier.clone(),
        LeavePolicy::standard(),
    ));

    (service, balances, notifier)
}

fn vacation(start: NaiveDate, end: NaiveDate) -> LeaveApplication {
    LeaveApplication {
        employee_id: EmployeeId("emp-01".to_string()),
        leave_type: LeaveType::Vacation,
        start_date: start,
        end_date: end,
        portion: DayPortion::FullDay,
        emergency: false,
        exclude_request_id: None,
    }
}

#[test]
fn vacation_lifecycle_from_application_to_deduction() {
    let (service, balances, _) = build_service();
    let today = date(2024, 3, 1);
    service
        .initialize_balances(&EmployeeId("emp-01".to_string()), 2024)
        .expect("ledger initialized from allocation policy");

    // Wednesday through Friday: three working days.
    let outcome = service
        .apply(vacation(date(2024, 3, 13), date(2024, 3, 15)), today)
        .expect("application admissible");
    assert_eq!(outcome.request.status, LeaveStatus::Pending);
    assert_eq!(outcome.request.total_days, 3.0);

    let approved = service
        .approve(&outcome.request.id, &EmployeeId("mgr-02".to_string()), today)
        .expect("direct manager approves");
    assert_eq!(approved.request.status, LeaveStatus::Approved);

    let ledger = service
        .balance(&EmployeeId("emp-01".to_string()), LeaveType::Vacation, 2024)
        .expect("ledger record exists");
    assert_eq!(ledger.total_days, 20.0);
    assert_eq!(ledger.used_days, 3.0);
    assert_eq!(ledger.available_days, 17.0);

    // A second application overlapping the first is refused.
    let overlap = service.apply(vacation(date(2024, 3, 15), date(2024, 3, 18)), today);
    assert!(overlap.is_err());
}

#[test]
fn same_day_emergency_is_auto_approved_without_a_human_step() {
    let (service, _, notifier) = build_service();
    let today = date(2024, 2, 20);
    service
        .initialize_balances(&EmployeeId("emp-01".to_string()), 2024)
        .expect("ledger initialized");

    let application = LeaveApplication {
        employee_id: EmployeeId("emp-01".to_string()),
        leave_type: LeaveType::Emergency,
        start_date: today,
        end_date: today,
        portion: DayPortion::FullDay,
        emergency: true,
        exclude_request_id: None,
    };

    let outcome = service
        .apply(application, today)
        .expect("emergency admissible");
    assert_eq!(outcome.request.status, LeaveStatus::AutoApproved);
    assert_eq!(outcome.request.decided_on, Some(today));

    let ledger = service
        .balance(&EmployeeId("emp-01".to_string()), LeaveType::Emergency, 2024)
        .expect("ledger record exists");
    assert_eq!(ledger.used_days, 1.0);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "leave_auto_approved");
}

#[test]
fn away_manager_delegates_to_their_own_manager() {
    let (service, balances, _) = build_service();
    let today = date(2024, 3, 1);
    service
        .initialize_balances(&EmployeeId("emp-01".to_string()), 2024)
        .expect("ledger initialized");
    balances
        .save(LeaveBalance::new(
            EmployeeId("mgr-02".to_string()),
            LeaveType::Vacation,
            2024,
            20.0,
        ))
        .expect("manager ledger seeded");

    // Put the direct manager on approved leave covering today.
    let manager_leave = LeaveApplication {
        employee_id: EmployeeId("mgr-02".to_string()),
        leave_type: LeaveType::Vacation,
        start_date: today,
        end_date: date(2024, 3, 4),
        portion: DayPortion::FullDay,
        emergency: false,
        exclude_request_id: None,
    };
    let managers_request = service
        .apply(manager_leave, today)
        .expect("manager's own leave admissible");
    service
        .approve(
            &managers_request.request.id,
            &EmployeeId("mgr-01".to_string()),
            today,
        )
        .expect("top-level manager approves");

    let outcome = service
        .apply(vacation(date(2024, 3, 13), date(2024, 3, 15)), today)
        .expect("application admissible");
    let approved = service
        .approve(&outcome.request.id, &EmployeeId("mgr-01".to_string()), today)
        .expect("alternate approver accepted");

    assert_eq!(
        approved.warnings,
        vec![LeaveWarning::AlternateApprover {
            approver: EmployeeId("mgr-01".to_string()),
        }]
    );
}
