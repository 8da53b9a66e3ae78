use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use leavedesk::error::AppError;
use leavedesk::workflows::leave::{
    Employee, EmployeeId, InMemoryBalances, InMemoryDirectory, InMemoryLeaveRequests, LeavePolicy,
    LeaveWorkflowService, RecordingNotifier, RosterImporter,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LeaveService = LeaveWorkflowService<
    InMemoryDirectory,
    InMemoryLeaveRequests,
    InMemoryBalances,
    RecordingNotifier,
>;

/// Directory from a roster CSV when one is given, otherwise the built-in
/// sample org chart.
pub(crate) fn load_directory(roster: Option<&Path>) -> Result<InMemoryDirectory, AppError> {
    match roster {
        Some(path) => Ok(RosterImporter::from_path(path)?),
        None => Ok(sample_directory()),
    }
}

/// Small org chart used when no roster is supplied: a top-level head of
/// people, two team leads, and their reports.
pub(crate) fn sample_directory() -> InMemoryDirectory {
    fn employee(
        id: &str,
        full_name: &str,
        department: &str,
        joined: (i32, u32, u32),
        manager: Option<&str>,
    ) -> Employee {
        Employee {
            id: EmployeeId(id.to_string()),
            full_name: full_name.to_string(),
            department: department.to_string(),
            joining_date: NaiveDate::from_ymd_opt(joined.0, joined.1, joined.2)
                .expect("valid sample date"),
            manager: manager.map(|m| EmployeeId(m.to_string())),
        }
    }

    let directory = InMemoryDirectory::default();
    directory.insert(employee(
        "emp-100",
        "Asha Rao",
        "People",
        (2018, 4, 2),
        None,
    ));
    directory.insert(employee(
        "emp-200",
        "Bruno Costa",
        "Engineering",
        (2020, 9, 7),
        Some("emp-100"),
    ));
    directory.insert(employee(
        "emp-210",
        "Carla Mendes",
        "Engineering",
        (2021, 1, 11),
        Some("emp-100"),
    ));
    directory.insert(employee(
        "emp-300",
        "Deepak Iyer",
        "Engineering",
        (2023, 1, 1),
        Some("emp-200"),
    ));
    directory.insert(employee(
        "emp-310",
        "Elena Petrova",
        "Engineering",
        (2022, 5, 2),
        Some("emp-200"),
    ));
    directory.insert(employee(
        "emp-320",
        "Farid Khan",
        "Engineering",
        (2022, 6, 1),
        Some("emp-210"),
    ));
    directory
}

/// Builds the workflow service over fresh in-memory stores and initializes
/// every directory member's ledger for the given year.
pub(crate) fn build_service(
    directory: Arc<InMemoryDirectory>,
    year: i32,
) -> Result<(Arc<LeaveService>, Arc<RecordingNotifier>), AppError> {
    let requests = Arc::new(InMemoryLeaveRequests::default());
    let balances = Arc::new(InMemoryBalances::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(LeaveWorkflowService::new(
        directory.clone(),
        requests,
        balances,
        notifier.clone(),
        LeavePolicy::standard(),
    ));

    for employee in directory.employees() {
        service.initialize_balances(&employee.id, year)?;
    }

    Ok((service, notifier))
}

pub(crate) fn current_year() -> i32 {
    chrono::Local::now().date_naive().year()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
