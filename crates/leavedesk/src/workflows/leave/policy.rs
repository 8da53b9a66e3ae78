use serde::{Deserialize, Serialize};

use super::domain::LeaveType;

/// Yearly day allocation per leave type. An explicit value handed to balance
/// initialization rather than process-wide state, and an exhaustive match so
/// adding a leave type is a compile-time change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    pub vacation_days: f64,
    pub sick_days: f64,
    pub personal_days: f64,
    pub emergency_days: f64,
    pub maternity_days: f64,
    pub unpaid_days: f64,
}

impl AllocationPolicy {
    pub fn standard() -> Self {
        Self {
            vacation_days: 20.0,
            sick_days: 10.0,
            personal_days: 5.0,
            emergency_days: 5.0,
            maternity_days: 90.0,
            unpaid_days: 30.0,
        }
    }

    pub fn allocation_for(&self, leave_type: LeaveType) -> f64 {
        match leave_type {
            LeaveType::Vacation => self.vacation_days,
            LeaveType::Sick => self.sick_days,
            LeaveType::Personal => self.personal_days,
            LeaveType::Emergency => self.emergency_days,
            LeaveType::Maternity => self.maternity_days,
            LeaveType::Unpaid => self.unpaid_days,
        }
    }
}

/// Tunables for validation, auto-approval, and delegation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    pub allocations: AllocationPolicy,
    /// Emergency requests at or under this total are auto-approved and skip
    /// the balance-sufficiency check.
    pub auto_approve_limit_days: f64,
    /// Backdated starts further than this many days in the past are refused.
    pub backdate_window_days: i64,
    /// Remaining balance under this threshold attaches a low-balance warning.
    pub low_balance_threshold: f64,
    /// Upper bound on manager-chain walks so a cyclic directory cannot hang
    /// authorization.
    pub manager_chain_depth: usize,
}

impl LeavePolicy {
    pub fn standard() -> Self {
        Self {
            allocations: AllocationPolicy::standard(),
            auto_approve_limit_days: 2.0,
            backdate_window_days: 30,
            low_balance_threshold: 5.0,
            manager_chain_depth: 10,
        }
    }
}
