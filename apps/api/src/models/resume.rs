use serde::{Deserialize, Serialize};

/// A résumé as edited in the dashboard. The layout engine only reads it.
///
/// Every field defaults to empty so partially filled drafts deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<SkillCategory>,
    pub projects: Vec<Project>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: String,
    pub summary: String,
}

impl PersonalInfo {
    /// True when any identity field (everything except the summary) has content.
    pub fn has_identity(&self) -> bool {
        [
            &self.full_name,
            &self.job_title,
            &self.email,
            &self.phone,
            &self.location,
            &self.links,
        ]
        .iter()
        .any(|f| is_filled(f))
    }

    /// Contact fields that are present, in display order.
    pub fn contact_items(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location, &self.links]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    /// Free text; each non-empty line is rendered as its own bullet.
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillCategory {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    pub name: String,
    pub position: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

/// Entries that report whether the user typed anything into them.
///
/// Blank rows are common in the editor (an "add" click with no input) and must not
/// produce an empty section heading on the page.
pub trait Populated {
    fn is_populated(&self) -> bool;
}

impl Populated for Education {
    fn is_populated(&self) -> bool {
        [
            &self.institution,
            &self.degree,
            &self.field_of_study,
            &self.start_date,
            &self.end_date,
            &self.grade,
            &self.description,
        ]
        .iter()
        .any(|f| is_filled(f))
    }
}

impl Populated for Experience {
    fn is_populated(&self) -> bool {
        [
            &self.company,
            &self.position,
            &self.location,
            &self.start_date,
            &self.end_date,
            &self.description,
        ]
        .iter()
        .any(|f| is_filled(f))
    }
}

impl Populated for SkillCategory {
    fn is_populated(&self) -> bool {
        is_filled(&self.category) || self.skills.iter().any(|s| is_filled(s))
    }
}

impl Populated for Project {
    fn is_populated(&self) -> bool {
        is_filled(&self.name)
            || is_filled(&self.description)
            || is_filled(&self.link)
            || self.technologies.iter().any(|t| is_filled(t))
    }
}

impl Populated for Reference {
    fn is_populated(&self) -> bool {
        [
            &self.name,
            &self.position,
            &self.company,
            &self.email,
            &self.phone,
        ]
        .iter()
        .any(|f| is_filled(f))
    }
}

pub fn is_filled(s: &str) -> bool {
    !s.trim().is_empty()
}
