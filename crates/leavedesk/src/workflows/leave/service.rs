use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::delegation::{DelegationError, DelegationResolver};
use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{
    EmployeeId, FaultKind, LeaveApplication, LeaveBalance, LeaveRequest, LeaveRequestId,
    LeaveStatus, LeaveType, LeaveWarning,
};
use super::policy::LeavePolicy;
use super::repository::{
    BalanceRepository, LeaveNotice, LeaveNotifier, LeaveRequestRepository, NotifyError,
    RepositoryError,
};
use super::validation::{ValidationEngine, ValidationFault};

/// Workflow facade composing validation, delegation, the ledger, and the
/// notifier behind the apply/approve/reject/cancel transitions.
pub struct LeaveWorkflowService<D, R, B, N> {
    directory: Arc<D>,
    requests: Arc<R>,
    balances: Arc<B>,
    notifier: Arc<N>,
    policy: LeavePolicy,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> LeaveRequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeaveRequestId(format!("leave-{id:06}"))
}

/// Successful transition result: the stored request plus any non-blocking
/// notices gathered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub request: LeaveRequest,
    pub warnings: Vec<LeaveWarning>,
}

impl<D, R, B, N> LeaveWorkflowService<D, R, B, N>
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    pub fn new(
        directory: Arc<D>,
        requests: Arc<R>,
        balances: Arc<B>,
        notifier: Arc<N>,
        policy: LeavePolicy,
    ) -> Self {
        Self {
            directory,
            requests,
            balances,
            notifier,
            policy,
        }
    }

    /// Validate and store a new request. Short emergency requests are
    /// auto-approved in the same call, with the approver stamped from the
    /// delegation resolver and the ledger deducted immediately.
    pub fn apply(
        &self,
        application: LeaveApplication,
        today: NaiveDate,
    ) -> Result<LeaveOutcome, LeaveServiceError> {
        let engine = ValidationEngine::new(
            self.directory.as_ref(),
            self.requests.as_ref(),
            self.balances.as_ref(),
            &self.policy,
        );
        let validated = engine.validate(&application, today)?;

        let mut request = LeaveRequest {
            id: next_request_id(),
            employee_id: application.employee_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            portion: application.portion,
            total_days: validated.total_days,
            status: LeaveStatus::Pending,
            emergency: application.emergency,
            backdated: validated.backdated,
            submitted_on: today,
            approver: None,
            rejection_reason: None,
            decided_on: None,
        };
        let warnings = validated.warnings;

        let auto_approve =
            request.emergency && request.total_days <= self.policy.auto_approve_limit_days;
        if auto_approve {
            let resolver =
                DelegationResolver::new(self.directory.as_ref(), self.requests.as_ref(), &self.policy);
            let approver = resolver.find_approver(&validated.employee, today)?;

            request.status = LeaveStatus::AutoApproved;
            request.approver = approver.map(|employee| employee.id);
            request.decided_on = Some(today);

            self.deduct_balance(&request)?;
            let stored = self.requests.insert(request)?;
            self.send_notice("leave_auto_approved", &stored, None)?;

            info!(request = %stored.id, employee = %stored.employee_id, "leave auto-approved");
            return Ok(LeaveOutcome {
                request: stored,
                warnings,
            });
        }

        let stored = self.requests.insert(request)?;
        info!(request = %stored.id, employee = %stored.employee_id, "leave application recorded");
        if !warnings.is_empty() {
            warn!(request = %stored.id, count = warnings.len(), "application recorded with warnings");
        }

        Ok(LeaveOutcome {
            request: stored,
            warnings,
        })
    }

    /// Approve a pending request. Authorization runs against the delegation
    /// rules; the ledger for the request's start year is deducted before the
    /// request record is updated.
    pub fn approve(
        &self,
        request_id: &LeaveRequestId,
        approver_id: &EmployeeId,
        today: NaiveDate,
    ) -> Result<LeaveOutcome, LeaveServiceError> {
        let mut request = self.fetch_pending(request_id)?;
        let requester = self.requester(&request)?;

        let resolver =
            DelegationResolver::new(self.directory.as_ref(), self.requests.as_ref(), &self.policy);
        let authorized = resolver.authorize(approver_id, &requester, today)?;

        self.deduct_balance(&request)?;

        request.status = LeaveStatus::Approved;
        request.approver = Some(authorized.approver.id.clone());
        request.decided_on = Some(today);
        self.requests.update(request.clone())?;
        self.send_notice("leave_approved", &request, None)?;

        info!(request = %request.id, approver = %authorized.approver.id, "leave approved");
        Ok(LeaveOutcome {
            request,
            warnings: authorized.warnings,
        })
    }

    /// Reject a pending request. The reason is mandatory and the ledger is
    /// left untouched.
    pub fn reject(
        &self,
        request_id: &LeaveRequestId,
        approver_id: &EmployeeId,
        reason: &str,
        today: NaiveDate,
    ) -> Result<LeaveOutcome, LeaveServiceError> {
        let mut request = self.fetch_pending(request_id)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LeaveServiceError::MissingReason);
        }

        let requester = self.requester(&request)?;
        let resolver =
            DelegationResolver::new(self.directory.as_ref(), self.requests.as_ref(), &self.policy);
        let authorized = resolver.authorize(approver_id, &requester, today)?;

        request.status = LeaveStatus::Rejected;
        request.rejection_reason = Some(reason.to_string());
        request.approver = Some(authorized.approver.id.clone());
        request.decided_on = Some(today);
        self.requests.update(request.clone())?;
        self.send_notice("leave_rejected", &request, Some(reason))?;

        info!(request = %request.id, approver = %authorized.approver.id, "leave rejected");
        Ok(LeaveOutcome {
            request,
            warnings: authorized.warnings,
        })
    }

    /// Cancel a request. Only the owning employee may cancel, and only while
    /// the request is still pending, so an approved deduction is never
    /// reversed through this path.
    pub fn cancel(
        &self,
        request_id: &LeaveRequestId,
        employee_id: &EmployeeId,
    ) -> Result<LeaveOutcome, LeaveServiceError> {
        let mut request = self
            .requests
            .fetch(request_id)?
            .ok_or_else(|| LeaveServiceError::RequestNotFound(request_id.clone()))?;

        if &request.employee_id != employee_id {
            return Err(LeaveServiceError::NotOwner {
                id: request.id,
                employee: employee_id.clone(),
            });
        }
        if request.status != LeaveStatus::Pending {
            return Err(LeaveServiceError::NotPending {
                id: request.id,
                status: request.status.label(),
            });
        }

        request.status = LeaveStatus::Cancelled;
        self.requests.update(request.clone())?;

        info!(request = %request.id, "leave cancelled");
        Ok(LeaveOutcome {
            request,
            warnings: Vec::new(),
        })
    }

    pub fn get(&self, request_id: &LeaveRequestId) -> Result<LeaveRequest, LeaveServiceError> {
        self.requests
            .fetch(request_id)?
            .ok_or_else(|| LeaveServiceError::RequestNotFound(request_id.clone()))
    }

    pub fn balance(
        &self,
        employee_id: &EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<LeaveBalance, LeaveServiceError> {
        self.balances
            .fetch(employee_id, leave_type, year)?
            .ok_or_else(|| LeaveServiceError::MissingBalance {
                employee: employee_id.clone(),
                leave_type,
                year,
            })
    }

    /// Upsert a fresh ledger record per leave type from the allocation
    /// policy, skipping keys that already hold a record so re-runs never
    /// clobber live used_days.
    pub fn initialize_balances(
        &self,
        employee_id: &EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveServiceError> {
        if self.directory.find_employee(employee_id)?.is_none() {
            return Err(LeaveServiceError::EmployeeNotFound(employee_id.clone()));
        }

        let mut records = Vec::with_capacity(LeaveType::ALL.len());
        for leave_type in LeaveType::ALL {
            let existing = self.balances.fetch(employee_id, leave_type, year)?;
            let record = match existing {
                Some(balance) => balance,
                None => {
                    let fresh = LeaveBalance::new(
                        employee_id.clone(),
                        leave_type,
                        year,
                        self.policy.allocations.allocation_for(leave_type),
                    );
                    self.balances.save(fresh.clone())?;
                    fresh
                }
            };
            records.push(record);
        }

        Ok(records)
    }

    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    fn fetch_pending(
        &self,
        request_id: &LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        let request = self
            .requests
            .fetch(request_id)?
            .ok_or_else(|| LeaveServiceError::RequestNotFound(request_id.clone()))?;

        if request.status != LeaveStatus::Pending {
            return Err(LeaveServiceError::NotPending {
                id: request.id,
                status: request.status.label(),
            });
        }

        Ok(request)
    }

    fn requester(
        &self,
        request: &LeaveRequest,
    ) -> Result<super::domain::Employee, LeaveServiceError> {
        self.directory
            .find_employee(&request.employee_id)?
            .ok_or_else(|| LeaveServiceError::EmployeeNotFound(request.employee_id.clone()))
    }

    fn deduct_balance(&self, request: &LeaveRequest) -> Result<(), LeaveServiceError> {
        let year = request.ledger_year();
        let mut balance = self
            .balances
            .fetch(&request.employee_id, request.leave_type, year)?
            .ok_or_else(|| LeaveServiceError::MissingBalance {
                employee: request.employee_id.clone(),
                leave_type: request.leave_type,
                year,
            })?;

        balance.deduct(request.total_days);
        self.balances.save(balance)?;
        Ok(())
    }

    fn send_notice(
        &self,
        template: &str,
        request: &LeaveRequest,
        reason: Option<&str>,
    ) -> Result<(), LeaveServiceError> {
        let mut details = BTreeMap::new();
        details.insert("status".to_string(), request.status.label().to_string());
        details.insert("total_days".to_string(), format!("{:.1}", request.total_days));
        if let Some(approver) = &request.approver {
            details.insert("approver".to_string(), approver.0.clone());
        }
        if let Some(reason) = reason {
            details.insert("reason".to_string(), reason.to_string());
        }

        self.notifier.notify(LeaveNotice {
            template: template.to_string(),
            request_id: request.id.clone(),
            details,
        })?;
        Ok(())
    }
}

/// Error raised by the workflow service.
#[derive(Debug, thiserror::Error)]
pub enum LeaveServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationFault),
    #[error(transparent)]
    Delegation(#[from] DelegationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("request {0} not found")]
    RequestNotFound(LeaveRequestId),
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("request {id} is {status}, not pending")]
    NotPending {
        id: LeaveRequestId,
        status: &'static str,
    },
    #[error("a rejection reason is required")]
    MissingReason,
    #[error("only the owner of request {id} may cancel it, not {employee}")]
    NotOwner {
        id: LeaveRequestId,
        employee: EmployeeId,
    },
    #[error("no {leave_type} balance recorded for {employee} in {year}")]
    MissingBalance {
        employee: EmployeeId,
        leave_type: LeaveType,
        year: i32,
    },
}

impl LeaveServiceError {
    /// Classification for response mapping; `None` marks infrastructure
    /// failures.
    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            LeaveServiceError::Validation(fault) => fault.fault(),
            LeaveServiceError::Delegation(error) => error.fault(),
            LeaveServiceError::RequestNotFound(_)
            | LeaveServiceError::EmployeeNotFound(_)
            | LeaveServiceError::MissingBalance { .. } => Some(FaultKind::NotFound),
            LeaveServiceError::NotPending { .. } => Some(FaultKind::Conflict),
            LeaveServiceError::MissingReason => Some(FaultKind::Invalid),
            LeaveServiceError::NotOwner { .. } => Some(FaultKind::Unauthorized),
            LeaveServiceError::Repository(RepositoryError::NotFound) => Some(FaultKind::NotFound),
            LeaveServiceError::Repository(RepositoryError::Conflict) => Some(FaultKind::Conflict),
            LeaveServiceError::Directory(_)
            | LeaveServiceError::Repository(RepositoryError::Unavailable(_))
            | LeaveServiceError::Notify(_) => None,
        }
    }
}
