//! Fixture value objects handed to page-object actions.
//!
//! Optional fields are skipped by the actions that consume them, so a
//! fixture with `None` leaves the corresponding form field untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Employee record for the employee form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeData {
    /// Employee code, `EMP` plus digits
    pub code: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Work email
    pub email: String,
    /// Hire date, `YYYY-MM-DD`
    pub hire_date: String,
    /// Exit date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<String>,
    /// Employment status option value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Internal designation title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_designation: Option<String>,
    /// Designation shown to clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_designation: Option<String>,
}

impl EmployeeData {
    /// Employee with only the mandatory fields
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        hire_date: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            hire_date: hire_date.into(),
            exit_date: None,
            status: None,
            internal_designation: None,
            billing_designation: None,
        }
    }

    /// `first last`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Skill entry for an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillData {
    /// Skill name
    pub name: String,
    /// Proficiency level, `0` to `4`
    pub proficiency: String,
    /// Years of experience
    pub experience: String,
    /// Last used date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_date: Option<String>,
}

/// Partial update of an existing skill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUpdate {
    /// New proficiency
    pub proficiency: Option<String>,
    /// New experience
    pub experience: Option<String>,
    /// New last used date
    pub last_used_date: Option<String>,
}

/// Designation form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignationData {
    /// Title
    pub title: Option<String>,
    /// Department option value
    pub department: Option<String>,
    /// Level option value
    pub level: Option<String>,
}

/// OrangeHRM leave application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Leave type label, e.g. `CAN - Personal`
    pub leave_type: String,
    /// First day, `YYYY-MM-DD`
    pub from_date: String,
    /// Last day, `YYYY-MM-DD`
    pub to_date: String,
    /// Free-text comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Portfolio company form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioCompanyData {
    /// Company name
    pub name: Option<String>,
    /// Company code
    pub code: Option<String>,
    /// Contract start, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Contract end, `YYYY-MM-DD`
    pub end_date: Option<String>,
}

/// Project under a portfolio company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Project name
    pub name: String,
    /// Project code, unique per portfolio company
    pub code: Option<String>,
    /// Start date
    pub start_date: Option<String>,
    /// End date
    pub end_date: Option<String>,
}

/// Engagement under a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementData {
    /// Engagement name
    pub name: String,
    /// Engagement code
    pub code: Option<String>,
    /// Start date
    pub start_date: Option<String>,
    /// End date
    pub end_date: Option<String>,
    /// Budget amount
    pub budget: Option<String>,
}

/// Position within an engagement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionData {
    /// Position name
    pub name: String,
    /// Required proficiency
    pub proficiency: Option<String>,
    /// Number of people needed
    pub resource_count: Option<String>,
}

/// OrangeHRM system user form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFormData {
    /// User role option (`Admin`, `ESS`)
    pub role: String,
    /// Employee name typed into the autocomplete
    pub employee_name: String,
    /// Status option (`Enabled`, `Disabled`)
    pub status: String,
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
    /// Confirmation; `None` repeats `password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// OrangeHRM job title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    /// Job title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Specification notes
    pub specification: Option<String>,
}

/// OrangeHRM candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateData {
    /// Given name
    pub first_name: String,
    /// Middle name
    pub middle_name: Option<String>,
    /// Family name
    pub last_name: String,
    /// Email
    pub email: String,
    /// Contact number
    pub phone: Option<String>,
    /// Vacancy option
    pub vacancy: Option<String>,
}

/// OrangeHRM vacancy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyData {
    /// Vacancy name
    pub name: String,
    /// Job title option
    pub job_title: String,
    /// Number of positions
    pub positions: Option<u32>,
    /// Hiring manager typed into the autocomplete
    pub hiring_manager: Option<String>,
}

/// OrangeHRM timesheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    /// Employee typed into the autocomplete
    pub employee_name: String,
    /// Project option
    pub project: String,
    /// Hours keyed by weekday column (0 = first day of the week)
    pub hours: BTreeMap<usize, String>,
}

/// OrangeHRM candidate search filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CandidateFilter {
    /// Job title dropdown
    JobTitle(String),
    /// Candidate status dropdown
    Status(String),
    /// Application method dropdown
    Source(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    mod serde_tests {
        use super::*;

        #[test]
        fn test_optional_fields_skipped() {
            let employee = EmployeeData::new("EMP001", "John", "Doe", "john.doe@testcompany.com", "2023-01-15");
            let json = serde_json::to_value(&employee).unwrap();
            assert_eq!(json["first_name"], "John");
            assert!(json.get("exit_date").is_none());
            assert_eq!(employee.full_name(), "John Doe");
        }

        #[test]
        fn test_candidate_filter_tagged() {
            let filter: CandidateFilter =
                serde_json::from_str(r#"{"kind":"status","value":"Shortlisted"}"#).unwrap();
            assert_eq!(filter, CandidateFilter::Status("Shortlisted".into()));
        }
    }
}
