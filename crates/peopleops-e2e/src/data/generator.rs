//! Random fixture generation from fixed pools.
//!
//! Generators are pure apart from their RNG and the clock used by
//! [`unique_suffix`]. Seed one with
//! [`TestDataGenerator::seeded`] and pin "today" with
//! [`TestDataGenerator::with_today`] for reproducible runs.

use super::constants::employee_status;
use super::fixtures::{
    DesignationData, EmployeeData, EngagementData, LeaveRequest, PortfolioCompanyData, PositionData,
    ProjectData, SkillData, UserFormData,
};
use crate::result::{E2eError, E2eResult};
use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// Given names
pub const FIRST_NAMES: [&str; 12] = [
    "John", "Jane", "Michael", "Emily", "David", "Sarah", "Robert", "Jennifer", "William", "Jessica",
    "James", "Lisa",
];

/// Family names
pub const LAST_NAMES: [&str; 12] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez",
];

/// Skill names
pub const SKILLS: [&str; 20] = [
    "JavaScript", "TypeScript", "Python", "Java", "C#", "React", "Angular", "Vue.js", "Node.js",
    "Express", "SQL", "MongoDB", "PostgreSQL", "AWS", "Azure", "Docker", "Kubernetes", "Jenkins",
    "Git", "Agile",
];

/// Designation titles
pub const DESIGNATIONS: [&str; 9] = [
    "Software Engineer",
    "Senior Software Engineer",
    "Lead Engineer",
    "Technical Architect",
    "QA Engineer",
    "DevOps Engineer",
    "Product Manager",
    "Project Manager",
    "Business Analyst",
];

/// Departments offered by the designation form
pub const DEPARTMENTS: [&str; 4] = ["Engineering", "Quality Assurance", "Product", "Operations"];

/// OrangeHRM leave types
pub const LEAVE_TYPES: [&str; 3] = ["CAN - Personal", "CAN - Vacation", "CAN - Bereavement"];

/// Domain of generated emails
pub const EMAIL_DOMAIN: &str = "testcompany.com";

static SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `first.last@testcompany.com`, lowercased
pub fn email(first: &str, last: &str) -> String {
    format!("{}.{}@{EMAIL_DOMAIN}", first.to_lowercase(), last.to_lowercase())
}

/// Millisecond timestamp with the full process-wide counter appended.
///
/// The timestamp has a fixed width, so suffixes are distinct for every call
/// within a process.
pub fn unique_suffix() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let n = SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis}{n:02}")
}

/// Fixture generator over any RNG
#[derive(Debug, Clone)]
pub struct TestDataGenerator<R = StdRng> {
    rng: R,
    today: NaiveDate,
}

impl TestDataGenerator<StdRng> {
    /// Entropy-seeded generator anchored at the local date
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for TestDataGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TestDataGenerator<R> {
    /// Generator over a caller-supplied RNG
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            today: Local::now().date_naive(),
        }
    }

    /// Anchor relative dates at `today`
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Date relative dates are computed from
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// `EMP` followed by six digits
    pub fn employee_code(&mut self) -> String {
        format!("EMP{}", self.rng.gen_range(100_000..=999_999))
    }

    /// Random given name
    pub fn first_name(&mut self) -> String {
        self.pick(&FIRST_NAMES).to_string()
    }

    /// Random family name
    pub fn last_name(&mut self) -> String {
        self.pick(&LAST_NAMES).to_string()
    }

    /// `YYYY-MM-DD`, `offset_days` from today
    pub fn date(&self, offset_days: i64) -> String {
        (self.today + Duration::days(offset_days))
            .format("%Y-%m-%d")
            .to_string()
    }

    /// A year ago
    pub fn hire_date(&self) -> String {
        self.date(-365)
    }

    /// A month ahead
    pub fn exit_date(&self) -> String {
        self.date(30)
    }

    /// `0`..=`4`
    pub fn proficiency(&mut self) -> String {
        self.rng.gen_range(0..=4_u8).to_string()
    }

    /// `0`..=`20` years
    pub fn experience_years(&mut self) -> String {
        self.rng.gen_range(0..=20_u8).to_string()
    }

    /// Random skill name
    pub fn skill_name(&mut self) -> String {
        self.pick(&SKILLS).to_string()
    }

    /// Random designation title
    pub fn designation(&mut self) -> String {
        self.pick(&DESIGNATIONS).to_string()
    }

    /// Active employee hired a year ago
    pub fn employee_data(&mut self) -> EmployeeData {
        let first = self.first_name();
        let last = self.last_name();
        let email = email(&first, &last);
        let code = self.employee_code();
        let hire = self.hire_date();
        EmployeeData {
            status: Some(employee_status::ACTIVE.to_string()),
            internal_designation: Some(self.designation()),
            billing_designation: Some(self.designation()),
            ..EmployeeData::new(&code, &first, &last, &email, &hire)
        }
    }

    /// Skill last used a month ago
    pub fn skill_data(&mut self) -> SkillData {
        SkillData {
            name: self.skill_name(),
            proficiency: self.proficiency(),
            experience: self.experience_years(),
            last_used_date: Some(self.date(-30)),
        }
    }

    /// `count` skills with distinct names, each used within the last year
    pub fn multiple_skills(&mut self, count: usize) -> E2eResult<Vec<SkillData>> {
        if count > SKILLS.len() {
            return Err(E2eError::DataError {
                message: format!("requested {count} distinct skills, pool has {}", SKILLS.len()),
            });
        }
        let names: Vec<&str> = SKILLS.choose_multiple(&mut self.rng, count).copied().collect();
        Ok(names
            .into_iter()
            .map(|name| {
                let days_ago = self.rng.gen_range(0..365_i64);
                SkillData {
                    name: name.to_string(),
                    proficiency: self.proficiency(),
                    experience: self.experience_years(),
                    last_used_date: Some(self.date(-days_ago)),
                }
            })
            .collect())
    }

    /// Designation with a unique title
    pub fn designation_data(&mut self) -> DesignationData {
        DesignationData {
            title: Some(format!("{} {}", self.designation(), unique_suffix())),
            department: Some(self.pick(&DEPARTMENTS).to_string()),
            level: Some(format!("Level {}", self.rng.gen_range(1..=5_u8))),
        }
    }

    /// Leave one to three weeks out
    pub fn leave_request(&mut self) -> LeaveRequest {
        let start = self.rng.gen_range(7..=21_i64);
        let length = self.rng.gen_range(0..=4_i64);
        LeaveRequest {
            leave_type: self.pick(&LEAVE_TYPES).to_string(),
            from_date: self.date(start),
            to_date: self.date(start + length),
            comment: Some("Automated leave request".to_string()),
        }
    }

    /// Portfolio company with unique name and code
    pub fn portfolio_company_data(&mut self) -> PortfolioCompanyData {
        let suffix = unique_suffix();
        PortfolioCompanyData {
            name: Some(format!("PortCo {suffix}")),
            code: Some(format!("PC{suffix}")),
            start_date: Some(self.date(0)),
            end_date: Some(self.date(365)),
        }
    }

    /// Project running for six months
    pub fn project_data(&mut self) -> ProjectData {
        let suffix = unique_suffix();
        ProjectData {
            name: format!("Project {suffix}"),
            code: Some(format!("PRJ{suffix}")),
            start_date: Some(self.date(0)),
            end_date: Some(self.date(180)),
        }
    }

    /// Engagement running for three months
    pub fn engagement_data(&mut self) -> EngagementData {
        let suffix = unique_suffix();
        EngagementData {
            name: format!("Engagement {suffix}"),
            code: Some(format!("ENG{suffix}")),
            start_date: Some(self.date(0)),
            end_date: Some(self.date(90)),
            budget: Some((self.rng.gen_range(10..=500_u32) * 1000).to_string()),
        }
    }

    /// Position for a random skill
    pub fn position_data(&mut self) -> PositionData {
        PositionData {
            name: format!("{} Developer", self.skill_name()),
            proficiency: Some(self.proficiency()),
            resource_count: Some(self.rng.gen_range(1..=5_u8).to_string()),
        }
    }

    /// Enabled ESS user with a unique username
    pub fn user_form_data(&mut self, employee_name: &str) -> UserFormData {
        let password = format!("Passw0rd!{}", self.rng.gen_range(100..=999_u16));
        UserFormData {
            role: "ESS".to_string(),
            employee_name: employee_name.to_string(),
            status: "Enabled".to_string(),
            username: format!("user{}", unique_suffix()),
            confirm_password: Some(password.clone()),
            password,
        }
    }
}
