use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ranges_overlap, EmployeeId, LeaveBalance, LeaveRequest, LeaveRequestId, LeaveType,
    LeaveWarning,
};

/// Storage abstraction for leave requests so the workflow service can be
/// exercised in isolation. `find_overlapping` must apply the inclusive
/// boundary semantics of [`ranges_overlap`] and scan only requests whose
/// status blocks the calendar.
pub trait LeaveRequestRepository: Send + Sync {
    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError>;
    fn update(&self, request: LeaveRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError>;
    fn find_overlapping(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<&LeaveRequestId>,
    ) -> Result<Vec<LeaveRequest>, RepositoryError>;
    /// Approved or auto-approved requests of the employee covering the date.
    fn find_active_on(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError>;
}

/// Storage abstraction for the balance ledger. `save` upserts.
pub trait BalanceRepository: Send + Sync {
    fn fetch(
        &self,
        employee_id: &EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, RepositoryError>;
    fn save(&self, balance: LeaveBalance) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook for decision events (e-mail or chat adapters).
pub trait LeaveNotifier: Send + Sync {
    fn notify(&self, notice: LeaveNotice) -> Result<(), NotifyError>;
}

/// Notification payload so routes and tests can assert integration
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveNotice {
    pub template: String,
    pub request_id: LeaveRequestId,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a request for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveRequestView {
    pub request_id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub leave_type: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: &'static str,
    pub total_days: f64,
    pub emergency: bool,
    pub backdated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<EmployeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub warnings: Vec<String>,
}

impl LeaveRequest {
    pub fn status_view(&self, warnings: &[LeaveWarning]) -> LeaveRequestView {
        LeaveRequestView {
            request_id: self.id.clone(),
            employee_id: self.employee_id.clone(),
            leave_type: self.leave_type.label(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.label(),
            total_days: self.total_days,
            emergency: self.emergency,
            backdated: self.backdated,
            approver: self.approver.clone(),
            rejection_reason: self.rejection_reason.clone(),
            warnings: warnings.iter().map(LeaveWarning::summary).collect(),
        }
    }
}

/// In-memory request store used by the serve binary, the demo, and tests.
#[derive(Default, Clone)]
pub struct InMemoryLeaveRequests {
    records: Arc<Mutex<BTreeMap<LeaveRequestId, LeaveRequest>>>,
}

impl LeaveRequestRepository for InMemoryLeaveRequests {
    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update(&self, request: LeaveRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("request mutex poisoned");
        if guard.contains_key(&request.id) {
            guard.insert(request.id.clone(), request);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_overlapping(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<&LeaveRequestId>,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| &request.employee_id == employee_id)
            .filter(|request| request.blocks_calendar())
            .filter(|request| Some(&request.id) != exclude)
            .filter(|request| ranges_overlap(request.start_date, request.end_date, start, end))
            .cloned()
            .collect())
    }

    fn find_active_on(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| &request.employee_id == employee_id)
            .filter(|request| {
                matches!(
                    request.status,
                    super::domain::LeaveStatus::Approved | super::domain::LeaveStatus::AutoApproved
                )
            })
            .filter(|request| request.covers(date))
            .cloned()
            .collect())
    }
}

/// In-memory ledger keyed by (employee, leave type, year).
#[derive(Default, Clone)]
pub struct InMemoryBalances {
    records: Arc<Mutex<BTreeMap<(EmployeeId, LeaveType, i32), LeaveBalance>>>,
}

impl BalanceRepository for InMemoryBalances {
    fn fetch(
        &self,
        employee_id: &EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, RepositoryError> {
        let guard = self.records.lock().expect("balance mutex poisoned");
        Ok(guard
            .get(&(employee_id.clone(), leave_type, year))
            .cloned())
    }

    fn save(&self, balance: LeaveBalance) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("balance mutex poisoned");
        guard.insert(
            (balance.employee_id.clone(), balance.leave_type, balance.year),
            balance,
        );
        Ok(())
    }
}

/// Notifier that records every notice for later inspection.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<LeaveNotice>>>,
}

impl LeaveNotifier for RecordingNotifier {
    fn notify(&self, notice: LeaveNotice) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<LeaveNotice> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}
