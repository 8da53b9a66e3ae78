use super::common::*;

use crate::workflows::leave::delegation::{DelegationError, DelegationResolver};
use crate::workflows::leave::directory::EmployeeDirectory;
use crate::workflows::leave::domain::{Employee, LeaveWarning};

fn resolver(harness: &Harness) -> DelegationResolver<'_> {
    DelegationResolver::new(
        harness.directory.as_ref(),
        harness.requests.as_ref(),
        &harness.policy,
    )
}

fn lookup(harness: &Harness, id: &str) -> Employee {
    harness
        .directory
        .find_employee(&employee_id(id))
        .expect("directory responds")
        .expect("employee present")
}

#[test]
fn available_manager_is_the_approver() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    let approver = resolver(&h)
        .find_approver(&requester, today())
        .expect("resolution succeeds")
        .expect("an approver exists");

    assert_eq!(approver.id, employee_id("emp-200"));
}

#[test]
fn manager_on_leave_today_is_unavailable() {
    let h = harness();
    seed_approved_leave(&h, "seed-001", "emp-200", date(2024, 2, 28), date(2024, 3, 4));

    let availability = resolver(&h)
        .manager_availability(&employee_id("emp-200"), today())
        .expect("availability computes");

    assert!(!availability.available);
    let ids: Vec<&str> = availability
        .alternates
        .iter()
        .map(|e| e.id.0.as_str())
        .collect();
    assert_eq!(ids, ["emp-100"], "first tier is the manager's own manager");
}

#[test]
fn manager_back_from_leave_is_available_again() {
    let h = harness();
    seed_approved_leave(&h, "seed-001", "emp-200", date(2024, 2, 26), date(2024, 2, 29));

    let availability = resolver(&h)
        .manager_availability(&employee_id("emp-200"), today())
        .expect("availability computes");

    assert!(availability.available);
    assert!(availability.alternates.is_empty());
}

#[test]
fn unavailable_manager_falls_back_to_their_manager() {
    let h = harness();
    seed_approved_leave(&h, "seed-001", "emp-200", date(2024, 3, 1), date(2024, 3, 1));
    let requester = lookup(&h, "emp-300");

    let approver = resolver(&h)
        .find_approver(&requester, today())
        .expect("resolution succeeds")
        .expect("an approver exists");

    assert_eq!(approver.id, employee_id("emp-100"));
}

#[test]
fn top_level_manager_falls_back_to_department_peers() {
    let h = harness();
    // emp-100 has no manager of their own; peers with subordinates step in.
    seed_approved_leave(&h, "seed-001", "emp-100", date(2024, 3, 1), date(2024, 3, 1));
    let requester = lookup(&h, "emp-200");

    let approver = resolver(&h)
        .find_approver(&requester, today())
        .expect("resolution succeeds")
        .expect("an approver exists");

    // emp-200 would be first in id order but is the requester.
    assert_eq!(approver.id, employee_id("emp-210"));
}

#[test]
fn department_without_peer_managers_falls_back_to_top_level() {
    let h = harness();
    seed_approved_leave(&h, "seed-001", "hr-900", date(2024, 3, 1), date(2024, 3, 1));

    let availability = resolver(&h)
        .manager_availability(&employee_id("hr-900"), today())
        .expect("availability computes");

    assert!(!availability.available);
    let ids: Vec<&str> = availability
        .alternates
        .iter()
        .map(|e| e.id.0.as_str())
        .collect();
    assert_eq!(ids, ["emp-100", "hr-900"], "manager-less population in id order");
}

#[test]
fn requester_without_manager_uses_the_top_level_pool() {
    let h = harness();
    let requester = lookup(&h, "emp-100");

    let approver = resolver(&h)
        .find_approver(&requester, today())
        .expect("resolution succeeds")
        .expect("an approver exists");

    // The pool contains emp-100 and hr-900; the requester is skipped.
    assert_eq!(approver.id, employee_id("hr-900"));
}

#[test]
fn self_approval_is_always_unauthorized() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    let result = resolver(&h).authorize(&employee_id("emp-300"), &requester, today());
    assert!(matches!(result, Err(DelegationError::SelfApproval)));
}

#[test]
fn unknown_approver_is_rejected() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    let result = resolver(&h).authorize(&employee_id("ghost"), &requester, today());
    assert!(matches!(result, Err(DelegationError::ApproverNotFound(id)) if id == employee_id("ghost")));
}

#[test]
fn direct_manager_is_authorized_without_warnings() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    let authorized = resolver(&h)
        .authorize(&employee_id("emp-200"), &requester, today())
        .expect("direct manager authorized");

    assert_eq!(authorized.approver.id, employee_id("emp-200"));
    assert!(authorized.warnings.is_empty());
}

#[test]
fn alternate_approver_is_authorized_with_warning() {
    let h = harness();
    seed_approved_leave(&h, "seed-001", "emp-200", date(2024, 3, 1), date(2024, 3, 1));
    let requester = lookup(&h, "emp-300");

    let authorized = resolver(&h)
        .authorize(&employee_id("emp-100"), &requester, today())
        .expect("alternate authorized");

    assert_eq!(
        authorized.warnings,
        vec![LeaveWarning::AlternateApprover {
            approver: employee_id("emp-100"),
        }]
    );
}

#[test]
fn management_chain_approver_is_authorized_with_warning() {
    let h = harness();
    // emp-200 is present and available, so emp-100 qualifies through the
    // chain rule rather than the alternate set.
    let requester = lookup(&h, "emp-300");

    let authorized = resolver(&h)
        .authorize(&employee_id("emp-100"), &requester, today())
        .expect("chain approver authorized");

    assert_eq!(
        authorized.warnings,
        vec![LeaveWarning::ManagementChainApprover {
            approver: employee_id("emp-100"),
        }]
    );
}

#[test]
fn top_level_approver_outside_the_chain_is_authorized_with_warning() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    let authorized = resolver(&h)
        .authorize(&employee_id("hr-900"), &requester, today())
        .expect("top-level approver authorized");

    assert_eq!(
        authorized.warnings,
        vec![LeaveWarning::TopLevelApprover {
            approver: employee_id("hr-900"),
        }]
    );
}

#[test]
fn unrelated_peer_is_not_authorized() {
    let h = harness();
    let requester = lookup(&h, "emp-300");

    // emp-310 shares the manager but has no authority of their own.
    let result = resolver(&h).authorize(&employee_id("emp-310"), &requester, today());
    assert!(matches!(result, Err(DelegationError::NotAuthorized { .. })));
}
