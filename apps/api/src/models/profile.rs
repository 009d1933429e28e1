use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub portfolio: Option<String>,
    pub applied_jobs: Option<String>,
}

/// Partial update of a candidate profile; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub portfolio: Option<String>,
}

impl CandidateProfile {
    pub fn apply(&mut self, update: CandidateUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if update.skills.is_some() {
            self.skills = update.skills;
        }
        if update.experience.is_some() {
            self.experience = update.experience;
        }
        if update.education.is_some() {
            self.education = update.education;
        }
        if update.portfolio.is_some() {
            self.portfolio = update.portfolio;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub job_openings: Option<String>,
}
