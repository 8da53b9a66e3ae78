use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use super::domain::{Employee, EmployeeId};

/// Organization directory queries consumed by validation and delegation.
///
/// Implementations must return employees in stable id order wherever a list
/// is produced, so alternate-approver selection stays deterministic.
pub trait EmployeeDirectory: Send + Sync {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError>;

    /// Managers above the employee, nearest first. The walk must be bounded
    /// by `max_depth` and stop on a repeated id, so a cyclic manager graph
    /// cannot hang the caller.
    fn manager_chain(
        &self,
        id: &EmployeeId,
        max_depth: usize,
    ) -> Result<Vec<Employee>, DirectoryError>;

    /// Employees in the department who have at least one subordinate.
    fn department_managers(&self, department: &str) -> Result<Vec<Employee>, DirectoryError>;

    /// Employees without a manager, treated as the HR/top level.
    fn employees_without_manager(&self) -> Result<Vec<Employee>, DirectoryError>;

    fn subordinate_count(&self, id: &EmployeeId) -> Result<usize, DirectoryError>;
}

/// Directory lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Id-indexed employee table backing the serve binary, the demo, and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    employees: Arc<Mutex<BTreeMap<EmployeeId, Employee>>>,
}

impl InMemoryDirectory {
    pub fn insert(&self, employee: Employee) {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        guard.insert(employee.id.clone(), employee);
    }

    pub fn employees(&self) -> Vec<Employee> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        guard.values().cloned().collect()
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn manager_chain(
        &self,
        id: &EmployeeId,
        max_depth: usize,
    ) -> Result<Vec<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");

        let mut chain = Vec::new();
        let mut seen: HashSet<EmployeeId> = HashSet::new();
        seen.insert(id.clone());

        let mut cursor = guard.get(id).and_then(|employee| employee.manager.clone());
        while let Some(manager_id) = cursor {
            if chain.len() >= max_depth || !seen.insert(manager_id.clone()) {
                break;
            }
            match guard.get(&manager_id) {
                Some(manager) => {
                    chain.push(manager.clone());
                    cursor = manager.manager.clone();
                }
                // Dangling reference: the chain ends here.
                None => break,
            }
        }

        Ok(chain)
    }

    fn department_managers(&self, department: &str) -> Result<Vec<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");

        let managers = guard
            .values()
            .filter(|employee| employee.department == department)
            .filter(|employee| {
                guard
                    .values()
                    .any(|other| other.manager.as_ref() == Some(&employee.id))
            })
            .cloned()
            .collect();

        Ok(managers)
    }

    fn employees_without_manager(&self) -> Result<Vec<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|employee| employee.manager.is_none())
            .cloned()
            .collect())
    }

    fn subordinate_count(&self, id: &EmployeeId) -> Result<usize, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|employee| employee.manager.as_ref() == Some(id))
            .count())
    }
}
