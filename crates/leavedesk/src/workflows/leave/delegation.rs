use chrono::NaiveDate;

use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{Employee, EmployeeId, FaultKind, LeaveWarning};
use super::policy::LeavePolicy;
use super::repository::{LeaveRequestRepository, RepositoryError};

/// Resolves who may approve a request, falling back through alternates when
/// the direct manager is away on approved leave.
pub struct DelegationResolver<'a> {
    directory: &'a dyn EmployeeDirectory,
    requests: &'a dyn LeaveRequestRepository,
    policy: &'a LeavePolicy,
}

/// Availability verdict for a manager plus the ordered fallback tier that
/// applies when they are away.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerAvailability {
    pub available: bool,
    pub alternates: Vec<Employee>,
}

/// Successful authorization, with notices when the approver is not the
/// direct manager.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedApprover {
    pub approver: Employee,
    pub warnings: Vec<LeaveWarning>,
}

/// Delegation failure.
#[derive(Debug, thiserror::Error)]
pub enum DelegationError {
    #[error("approver {0} not found")]
    ApproverNotFound(EmployeeId),
    #[error("employees cannot approve their own leave")]
    SelfApproval,
    #[error("{approver} is not authorized to approve leave for {employee}")]
    NotAuthorized {
        approver: EmployeeId,
        employee: EmployeeId,
    },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl DelegationError {
    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            DelegationError::ApproverNotFound(_) => Some(FaultKind::NotFound),
            DelegationError::SelfApproval | DelegationError::NotAuthorized { .. } => {
                Some(FaultKind::Unauthorized)
            }
            DelegationError::Directory(_) | DelegationError::Storage(_) => None,
        }
    }
}

impl<'a> DelegationResolver<'a> {
    pub fn new(
        directory: &'a dyn EmployeeDirectory,
        requests: &'a dyn LeaveRequestRepository,
        policy: &'a LeavePolicy,
    ) -> Self {
        Self {
            directory,
            requests,
            policy,
        }
    }

    /// A manager is unavailable iff an approved or auto-approved request of
    /// theirs covers the given date. Alternates are filled only for an
    /// unavailable manager, first non-empty tier wins: the manager's own
    /// manager, then department peers with subordinates, then the
    /// manager-less population.
    pub fn manager_availability(
        &self,
        manager_id: &EmployeeId,
        on_date: NaiveDate,
    ) -> Result<ManagerAvailability, DelegationError> {
        let active = self.requests.find_active_on(manager_id, on_date)?;
        if active.is_empty() {
            return Ok(ManagerAvailability {
                available: true,
                alternates: Vec::new(),
            });
        }

        Ok(ManagerAvailability {
            available: false,
            alternates: self.alternates_for(manager_id)?,
        })
    }

    /// Picks the approver for a request: the direct manager when available,
    /// otherwise the first alternate; employees with no manager fall back
    /// straight to the top-level population. The requester is never chosen.
    pub fn find_approver(
        &self,
        requester: &Employee,
        today: NaiveDate,
    ) -> Result<Option<Employee>, DelegationError> {
        let manager = match &requester.manager {
            Some(manager_id) => self.directory.find_employee(manager_id)?,
            None => None,
        };

        let Some(manager) = manager else {
            // No manager on record (or a dangling reference): top level.
            let pool = self.directory.employees_without_manager()?;
            return Ok(first_candidate(pool, &requester.id));
        };

        let availability = self.manager_availability(&manager.id, today)?;
        if availability.available {
            return Ok(Some(manager));
        }

        Ok(first_candidate(availability.alternates, &requester.id))
    }

    /// Decides whether an explicitly named approver may act on the
    /// requester's leave. First match wins, in the documented precedence.
    pub fn authorize(
        &self,
        approver_id: &EmployeeId,
        requester: &Employee,
        today: NaiveDate,
    ) -> Result<AuthorizedApprover, DelegationError> {
        let approver = self
            .directory
            .find_employee(approver_id)?
            .ok_or_else(|| DelegationError::ApproverNotFound(approver_id.clone()))?;

        if approver.id == requester.id {
            return Err(DelegationError::SelfApproval);
        }

        if requester.manager.as_ref() == Some(&approver.id) {
            return Ok(AuthorizedApprover {
                approver,
                warnings: Vec::new(),
            });
        }

        if let Some(manager_id) = &requester.manager {
            let availability = self.manager_availability(manager_id, today)?;
            if !availability.available
                && availability
                    .alternates
                    .iter()
                    .any(|alternate| alternate.id == approver.id)
            {
                let warning = LeaveWarning::AlternateApprover {
                    approver: approver.id.clone(),
                };
                return Ok(AuthorizedApprover {
                    approver,
                    warnings: vec![warning],
                });
            }
        }

        let chain = self
            .directory
            .manager_chain(&requester.id, self.policy.manager_chain_depth)?;
        if chain.iter().any(|link| link.id == approver.id) {
            let warning = LeaveWarning::ManagementChainApprover {
                approver: approver.id.clone(),
            };
            return Ok(AuthorizedApprover {
                approver,
                warnings: vec![warning],
            });
        }

        if approver.manager.is_none() {
            let warning = LeaveWarning::TopLevelApprover {
                approver: approver.id.clone(),
            };
            return Ok(AuthorizedApprover {
                approver,
                warnings: vec![warning],
            });
        }

        Err(DelegationError::NotAuthorized {
            approver: approver.id,
            employee: requester.id.clone(),
        })
    }

    fn alternates_for(&self, manager_id: &EmployeeId) -> Result<Vec<Employee>, DelegationError> {
        let manager = self.directory.find_employee(manager_id)?;

        if let Some(manager) = &manager {
            if let Some(senior_id) = &manager.manager {
                if let Some(senior) = self.directory.find_employee(senior_id)? {
                    return Ok(vec![senior]);
                }
            }

            let peers: Vec<Employee> = self
                .directory
                .department_managers(&manager.department)?
                .into_iter()
                .filter(|peer| &peer.id != manager_id)
                .collect();
            if !peers.is_empty() {
                return Ok(peers);
            }
        }

        Ok(self.directory.employees_without_manager()?)
    }
}

fn first_candidate(pool: Vec<Employee>, requester_id: &EmployeeId) -> Option<Employee> {
    pool.into_iter()
        .find(|candidate| &candidate.id != requester_id)
}
