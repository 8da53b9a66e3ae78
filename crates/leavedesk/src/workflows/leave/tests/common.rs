use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::leave::directory::InMemoryDirectory;
use crate::workflows::leave::domain::{
    DayPortion, Employee, EmployeeId, LeaveApplication, LeaveBalance, LeaveRequest,
    LeaveRequestId, LeaveStatus, LeaveType,
};
use crate::workflows::leave::policy::LeavePolicy;
use crate::workflows::leave::repository::{
    BalanceRepository, InMemoryBalances, InMemoryLeaveRequests, LeaveRequestRepository,
    RecordingNotifier, RepositoryError,
};
use crate::workflows::leave::service::LeaveWorkflowService;

pub(super) type TestService = LeaveWorkflowService<
    InMemoryDirectory,
    InMemoryLeaveRequests,
    InMemoryBalances,
    RecordingNotifier,
>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) directory: Arc<InMemoryDirectory>,
    pub(super) requests: Arc<InMemoryLeaveRequests>,
    pub(super) balances: Arc<InMemoryBalances>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) policy: LeavePolicy,
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Fixed "today" for deterministic scenarios: Friday 2024-03-01.
pub(super) fn today() -> NaiveDate {
    date(2024, 3, 1)
}

pub(super) fn employee_id(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

fn employee(
    id: &str,
    full_name: &str,
    department: &str,
    joined: NaiveDate,
    manager: Option<&str>,
) -> Employee {
    Employee {
        id: employee_id(id),
        full_name: full_name.to_string(),
        department: department.to_string(),
        joining_date: joined,
        manager: manager.map(employee_id),
    }
}

/// Sample org chart shared across the suite.
///
/// Engineering: emp-100 (top level) manages emp-200 and emp-210; emp-200
/// manages emp-300 and emp-310; emp-210 manages emp-320.
/// People: hr-900 (top level) manages hr-910.
pub(super) fn sample_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::default();
    directory.insert(employee(
        "emp-100",
        "Asha Rao",
        "Engineering",
        date(2020, 1, 6),
        None,
    ));
    directory.insert(employee(
        "emp-200",
        "Bruno Costa",
        "Engineering",
        date(2021, 2, 1),
        Some("emp-100"),
    ));
    directory.insert(employee(
        "emp-210",
        "Carla Mendes",
        "Engineering",
        date(2021, 3, 1),
        Some("emp-100"),
    ));
    directory.insert(employee(
        "emp-300",
        "Deepak Iyer",
        "Engineering",
        date(2023, 1, 1),
        Some("emp-200"),
    ));
    directory.insert(employee(
        "emp-310",
        "Elena Petrova",
        "Engineering",
        date(2022, 5, 2),
        Some("emp-200"),
    ));
    directory.insert(employee(
        "emp-320",
        "Farid Khan",
        "Engineering",
        date(2022, 6, 1),
        Some("emp-210"),
    ));
    directory.insert(employee(
        "hr-900",
        "Grace Okafor",
        "People",
        date(2019, 3, 4),
        None,
    ));
    directory.insert(employee(
        "hr-910",
        "Hana Cho",
        "People",
        date(2021, 8, 16),
        Some("hr-900"),
    ));
    directory
}

pub(super) fn harness() -> Harness {
    let directory = Arc::new(sample_directory());
    let requests = Arc::new(InMemoryLeaveRequests::default());
    let balances = Arc::new(InMemoryBalances::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = LeavePolicy::standard();

    let service = Arc::new(LeaveWorkflowService::new(
        directory.clone(),
        requests.clone(),
        balances.clone(),
        notifier.clone(),
        policy.clone(),
    ));

    Harness {
        service,
        directory,
        requests,
        balances,
        notifier,
        policy,
    }
}

pub(super) fn application(
    employee: &str,
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveApplication {
    LeaveApplication {
        employee_id: employee_id(employee),
        leave_type,
        start_date: start,
        end_date: end,
        portion: DayPortion::FullDay,
        emergency: false,
        exclude_request_id: None,
    }
}

pub(super) fn seed_balance(
    harness: &Harness,
    employee: &str,
    leave_type: LeaveType,
    year: i32,
    total: f64,
) {
    harness
        .balances
        .save(LeaveBalance::new(
            employee_id(employee),
            leave_type,
            year,
            total,
        ))
        .expect("balance store accepts seed");
}

/// Inserts an already-approved request directly, bypassing the workflow, so
/// availability scenarios can be staged.
pub(super) fn seed_approved_leave(
    harness: &Harness,
    id: &str,
    employee: &str,
    start: NaiveDate,
    end: NaiveDate,
) {
    let request = LeaveRequest {
        id: LeaveRequestId(id.to_string()),
        employee_id: employee_id(employee),
        leave_type: LeaveType::Vacation,
        start_date: start,
        end_date: end,
        portion: DayPortion::FullDay,
        total_days: 1.0,
        status: LeaveStatus::Approved,
        emergency: false,
        backdated: false,
        submitted_on: start,
        approver: Some(employee_id("emp-100")),
        rejection_reason: None,
        decided_on: Some(start),
    };
    harness
        .requests
        .insert(request)
        .expect("request store accepts seed");
}

/// Request repository double whose every call fails.
pub(super) struct UnavailableRequests;

impl LeaveRequestRepository for UnavailableRequests {
    fn insert(&self, _request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("requests offline".to_string()))
    }

    fn update(&self, _request: LeaveRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("requests offline".to_string()))
    }

    fn fetch(&self, _id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("requests offline".to_string()))
    }

    fn find_overlapping(
        &self,
        _employee_id: &EmployeeId,
        _start: NaiveDate,
        _end: NaiveDate,
        _exclude: Option<&LeaveRequestId>,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("requests offline".to_string()))
    }

    fn find_active_on(
        &self,
        _employee_id: &EmployeeId,
        _date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("requests offline".to_string()))
    }
}

pub(super) async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
