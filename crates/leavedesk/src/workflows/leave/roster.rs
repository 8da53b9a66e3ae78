use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::directory::InMemoryDirectory;
use super::domain::{Employee, EmployeeId};

/// Hydrates an [`InMemoryDirectory`] from an employee roster CSV export.
///
/// Expected header: `Employee ID, Full Name, Department, Joining Date,
/// Manager ID`. An empty manager cell means the employee reports to no one.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryDirectory, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryDirectory, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let directory = InMemoryDirectory::default();
        let mut seen: HashSet<EmployeeId> = HashSet::new();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            let line = index + 2; // header occupies line 1
            let employee = row.into_employee(line)?;

            if !seen.insert(employee.id.clone()) {
                return Err(RosterImportError::InvalidRow {
                    line,
                    reason: format!("duplicate employee id {}", employee.id),
                });
            }
            if employee.manager.as_ref() == Some(&employee.id) {
                return Err(RosterImportError::InvalidRow {
                    line,
                    reason: format!("employee {} reports to themself", employee.id),
                });
            }

            directory.insert(employee);
        }

        Ok(directory)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Employee ID")]
    employee_id: String,
    #[serde(rename = "Full Name")]
    full_name: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Joining Date")]
    joining_date: String,
    #[serde(rename = "Manager ID", default, deserialize_with = "empty_string_as_none")]
    manager_id: Option<String>,
}

impl RosterRow {
    fn into_employee(self, line: usize) -> Result<Employee, RosterImportError> {
        if self.employee_id.is_empty() {
            return Err(RosterImportError::InvalidRow {
                line,
                reason: "missing employee id".to_string(),
            });
        }

        let joining_date = NaiveDate::parse_from_str(&self.joining_date, "%Y-%m-%d").map_err(
            |err| RosterImportError::InvalidRow {
                line,
                reason: format!("joining date '{}' is not YYYY-MM-DD ({err})", self.joining_date),
            },
        )?;

        Ok(Employee {
            id: EmployeeId(self.employee_id),
            full_name: self.full_name,
            department: self.department,
            joining_date,
            manager: self.manager_id.map(EmployeeId),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Roster ingestion failure.
#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::InvalidRow { line, reason } => {
                write!(f, "invalid roster row at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
