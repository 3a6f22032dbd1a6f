//! Immutable reference data shared by scenarios.
//!
//! Passed explicitly through the test context rather than read from
//! globals, so a run can swap credentials without touching scenarios.

use super::fixtures::{EmployeeData, SkillData};
use serde::{Deserialize, Serialize};

/// Login credentials and the role they carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
    /// Role label
    pub role: String,
}

impl TestUser {
    fn new(username: &str, password: &str, role: &str) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }
}

/// Users the suite logs in as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUsers {
    /// PeopleOps resource manager
    pub resource_manager: TestUser,
    /// PeopleOps employee
    pub employee: TestUser,
    /// OrangeHRM administrator
    pub hrm_admin: TestUser,
}

/// Employment statuses offered by the employee form
pub mod employee_status {
    /// Active
    pub const ACTIVE: &str = "Active";
    /// Inactive
    pub const INACTIVE: &str = "Inactive";
    /// Exited
    pub const EXITED: &str = "Exited";
    /// On leave
    pub const ON_LEAVE: &str = "On Leave";
}

/// Proficiency levels, `0` (beginner) to `4` (expert)
pub mod proficiency {
    /// 0
    pub const BEGINNER: &str = "0";
    /// 1
    pub const BASIC: &str = "1";
    /// 2
    pub const INTERMEDIATE: &str = "2";
    /// 3
    pub const ADVANCED: &str = "3";
    /// 4
    pub const EXPERT: &str = "4";
}

/// Months after which a skill counts as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessThresholds {
    /// Default threshold
    pub default_months: u32,
    /// Warning threshold
    pub warning_months: u32,
    /// Critical threshold
    pub critical_months: u32,
}

/// Employee form messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeMessages {
    pub required_first_name: String,
    pub required_last_name: String,
    pub required_email: String,
    pub required_hire_date: String,
    pub duplicate_code: String,
    pub invalid_date_range: String,
    pub allocated_to_engagement: String,
}

/// Skill form messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMessages {
    pub required_skill_name: String,
    pub required_proficiency: String,
    pub invalid_proficiency: String,
    pub negative_experience: String,
    pub future_last_used: String,
    pub duplicate_skill: String,
}

/// Designation form messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignationMessages {
    pub required_designation: String,
    pub required_effective_date: String,
}

/// Validation messages the application shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessages {
    /// Employee form
    pub employee: EmployeeMessages,
    /// Skill form
    pub skill: SkillMessages,
    /// Designation form
    pub designation: DesignationMessages,
}

/// Expected row on the bench analytics dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchRecord {
    /// Display name
    pub name: String,
    /// Utilization percent
    pub utilization: u32,
    /// Skill names
    pub skills: Vec<String>,
    /// Availability date, `YYYY-MM-DD`
    pub available_from: String,
    /// `active` or `inactive`
    pub status: String,
}

impl BenchRecord {
    fn new(name: &str, utilization: u32, skills: &[&str], available_from: &str, status: &str) -> Self {
        Self {
            name: name.into(),
            utilization,
            skills: skills.iter().map(|s| (*s).to_string()).collect(),
            available_from: available_from.into(),
            status: status.into(),
        }
    }

    /// Active and not fully allocated
    #[must_use]
    pub fn is_on_bench(&self) -> bool {
        self.utilization < 100 && self.status == "active"
    }
}

/// Everything scenarios compare against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Accounts
    pub users: TestUsers,
    /// Skill freshness thresholds
    pub freshness: FreshnessThresholds,
    /// Validation message strings
    pub messages: ValidationMessages,
    /// EMP001 John Doe, EMP002 Jane Smith
    pub sample_employees: Vec<EmployeeData>,
    /// JavaScript, TypeScript, Python
    pub sample_skills: Vec<SkillData>,
    /// Seeded bench analytics rows
    pub bench_employees: Vec<BenchRecord>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            users: TestUsers {
                resource_manager: TestUser::new("admin", "password123", "Resource Manager"),
                employee: TestUser::new("employee", "employee123", "Employee"),
                hrm_admin: TestUser::new("Admin", "admin123", "Admin"),
            },
            freshness: FreshnessThresholds {
                default_months: 12,
                warning_months: 9,
                critical_months: 18,
            },
            messages: ValidationMessages {
                employee: EmployeeMessages {
                    required_first_name: "First Name is required".into(),
                    required_last_name: "Last Name is required".into(),
                    required_email: "Email is required".into(),
                    required_hire_date: "Hire Date is required".into(),
                    duplicate_code: "Employee code already exists".into(),
                    invalid_date_range: "Exit Date cannot be before Hire Date".into(),
                    allocated_to_engagement: "Cannot change status - employee allocated to engagement".into(),
                },
                skill: SkillMessages {
                    required_skill_name: "Skill name is required".into(),
                    required_proficiency: "Proficiency is required".into(),
                    invalid_proficiency: "Proficiency must be between 0 and 4".into(),
                    negative_experience: "Experience cannot be negative".into(),
                    future_last_used: "Last Used Date cannot be in the future".into(),
                    duplicate_skill: "Skill already exists".into(),
                },
                designation: DesignationMessages {
                    required_designation: "Designation is required".into(),
                    required_effective_date: "Effective Date is required".into(),
                },
            },
            sample_employees: vec![
                EmployeeData {
                    status: Some(employee_status::ACTIVE.into()),
                    internal_designation: Some("Software Engineer".into()),
                    billing_designation: Some("Senior Software Engineer".into()),
                    ..EmployeeData::new("EMP001", "John", "Doe", "john.doe@testcompany.com", "2023-01-15")
                },
                EmployeeData {
                    status: Some(employee_status::ACTIVE.into()),
                    internal_designation: Some("Senior Developer".into()),
                    billing_designation: Some("Technical Lead".into()),
                    ..EmployeeData::new("EMP002", "Jane", "Smith", "jane.smith@testcompany.com", "2022-06-01")
                },
            ],
            sample_skills: vec![
                sample_skill("JavaScript", proficiency::ADVANCED, "5", "2024-01-15"),
                sample_skill("TypeScript", proficiency::EXPERT, "3", "2024-02-01"),
                sample_skill("Python", proficiency::INTERMEDIATE, "2", "2023-06-15"),
            ],
            bench_employees: vec![
                BenchRecord::new("Alice Johnson", 0, &["Java", "Spring Boot"], "2026-01-15", "active"),
                BenchRecord::new("Bob Smith", 50, &["React", "TypeScript"], "2026-03-01", "active"),
                BenchRecord::new("Carol White", 100, &["Python"], "2026-06-30", "active"),
                BenchRecord::new("David Brown", 20, &["AWS", "Docker"], "2026-01-20", "inactive"),
            ],
        }
    }
}

fn sample_skill(name: &str, level: &str, experience: &str, last_used: &str) -> SkillData {
    SkillData {
        name: name.into(),
        proficiency: level.into(),
        experience: experience.into(),
        last_used_date: Some(last_used.into()),
    }
}

impl ReferenceData {
    /// EMP001 John Doe
    #[must_use]
    pub fn employee_1(&self) -> Option<&EmployeeData> {
        self.sample_employees.first()
    }

    /// Bench rows expected to be listed
    pub fn bench_list(&self) -> impl Iterator<Item = &BenchRecord> {
        self.bench_employees.iter().filter(|e| e.is_on_bench())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod reference_tests {
        use super::*;

        #[test]
        fn test_sample_employees() {
            let data = ReferenceData::default();
            let john = data.employee_1().unwrap();
            assert_eq!(john.code, "EMP001");
            assert_eq!(john.full_name(), "John Doe");
            assert_eq!(data.sample_employees[1].code, "EMP002");
        }

        #[test]
        fn test_bench_list_excludes_full_and_inactive() {
            let data = ReferenceData::default();
            let names: Vec<&str> = data.bench_list().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["Alice Johnson", "Bob Smith"]);
        }

        #[test]
        fn test_thresholds() {
            let data = ReferenceData::default();
            assert_eq!(data.freshness.default_months, 12);
            assert!(data.freshness.warning_months < data.freshness.critical_months);
            assert_eq!(data.users.hrm_admin.username, "Admin");
        }
    }
}
