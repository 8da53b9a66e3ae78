//! Leave-request validation, balance consistency, and approval delegation.
//!
//! The engine decides whether an application is admissible, how many working
//! days it consumes, who is allowed to approve it, and what happens to the
//! ledger on each state transition. HTTP marshaling and storage mechanics
//! stay behind the router and repository seams.

pub mod calendar;
pub(crate) mod delegation;
pub mod directory;
pub mod domain;
pub mod policy;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use delegation::{
    AuthorizedApprover, DelegationError, DelegationResolver, ManagerAvailability,
};
pub use directory::{DirectoryError, EmployeeDirectory, InMemoryDirectory};
pub use domain::{
    ranges_overlap, DayPortion, Employee, EmployeeId, FaultKind, LeaveApplication, LeaveBalance,
    LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, LeaveWarning,
};
pub use policy::{AllocationPolicy, LeavePolicy};
pub use repository::{
    BalanceRepository, InMemoryBalances, InMemoryLeaveRequests, LeaveNotice, LeaveNotifier,
    LeaveRequestRepository, LeaveRequestView, NotifyError, RecordingNotifier, RepositoryError,
};
pub use roster::{RosterImportError, RosterImporter};
pub use router::leave_router;
pub use service::{LeaveOutcome, LeaveServiceError, LeaveWorkflowService};
pub use validation::{
    ValidatedLeave, ValidationEngine, ValidationError, ValidationFailure, ValidationFault,
};
