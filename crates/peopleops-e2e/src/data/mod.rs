//! Test data: generated fixtures and fixed reference data.

pub mod constants;
pub mod fixtures;
pub mod generator;

pub use constants::{BenchRecord, ReferenceData, TestUser, TestUsers};
pub use fixtures::{
    CandidateData, CandidateFilter, DesignationData, EmployeeData, EngagementData, JobData,
    LeaveRequest, PortfolioCompanyData, PositionData, ProjectData, SkillData, SkillUpdate,
    TimesheetEntry, UserFormData, VacancyData,
};
pub use generator::{email, unique_suffix, TestDataGenerator};
