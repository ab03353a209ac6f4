//! Block Builder: turns a `ResumeRecord` into the ordered content blocks to lay out.
//!
//! Blocks follow a fixed section order; empty sections produce none. Sections the
//! template places in its sidebar are split off and never paginated. Missing fields
//! become placeholder text; nothing here fails.

use serde::{Deserialize, Serialize};

use crate::layout::theme::TemplateSpec;
use crate::models::resume::{
    is_filled, Education, Experience, Populated, Project, Reference, ResumeRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    References,
}

/// Fixed section order on the page.
pub const SECTION_ORDER: [SectionKind; 7] = [
    SectionKind::Header,
    SectionKind::Summary,
    SectionKind::Experience,
    SectionKind::Education,
    SectionKind::Skills,
    SectionKind::Projects,
    SectionKind::References,
];

impl SectionKind {
    /// Lower-case identifier used in markup.
    pub fn slug(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::References => "references",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Header => "",
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
            SectionKind::References => "References",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    Name,
    Headline,
    Contact,
    SectionTitle,
    EntryTitle,
    Meta,
    Body,
    Bullet,
}

impl RunStyle {
    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            RunStyle::Name | RunStyle::SectionTitle | RunStyle::EntryTitle
        )
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RunStyle::Name => "run-name",
            RunStyle::Headline => "run-headline",
            RunStyle::Contact => "run-contact",
            RunStyle::SectionTitle => "run-section-title",
            RunStyle::EntryTitle => "run-entry-title",
            RunStyle::Meta => "run-meta",
            RunStyle::Body => "run-body",
            RunStyle::Bullet => "run-bullet",
        }
    }
}

/// One styled paragraph inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub style: RunStyle,
    pub text: String,
}

impl TextRun {
    fn new(style: RunStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// An indivisible unit of page content. `index` is its position in its column's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub index: usize,
    pub section: SectionKind,
    pub runs: Vec<TextRun>,
}

/// Blocks split by destination: the paginated flow and the page-one sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPlan {
    pub sidebar: Vec<ContentBlock>,
    pub flow: Vec<ContentBlock>,
}

// ────────────────────────────────────────────────────────────────────────────
// Section emptiness
// ────────────────────────────────────────────────────────────────────────────

/// True when a section has nothing to show and should be left off the page.
pub fn is_section_empty(record: &ResumeRecord, kind: SectionKind) -> bool {
    match kind {
        SectionKind::Header => !record.personal_info.has_identity(),
        SectionKind::Summary => !is_filled(&record.personal_info.summary),
        SectionKind::Experience => !record.experience.iter().any(Populated::is_populated),
        SectionKind::Education => !record.education.iter().any(Populated::is_populated),
        SectionKind::Skills => !record.skills.iter().any(Populated::is_populated),
        SectionKind::Projects => !record.projects.iter().any(Populated::is_populated),
        SectionKind::References => !record.references.iter().any(Populated::is_populated),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds the block plan for a record under a template's section placement.
///
/// Header and summary are one block each; list sections get one block per populated
/// entry, the section title riding on the first, so no block grows with entry count.
pub fn build_blocks(record: &ResumeRecord, template: &TemplateSpec) -> BlockPlan {
    let mut plan = BlockPlan::default();

    for kind in SECTION_ORDER {
        if is_section_empty(record, kind) {
            continue;
        }
        let target = if template.is_sidebar_section(kind) {
            &mut plan.sidebar
        } else {
            &mut plan.flow
        };
        for (i, mut runs) in section_entries(record, kind).into_iter().enumerate() {
            if i == 0 && kind != SectionKind::Header {
                runs.insert(0, TextRun::new(RunStyle::SectionTitle, kind.title()));
            }
            target.push(ContentBlock {
                index: target.len(),
                section: kind,
                runs,
            });
        }
    }

    plan
}

/// Runs for each entry of a section, without the section title.
fn section_entries(record: &ResumeRecord, kind: SectionKind) -> Vec<Vec<TextRun>> {
    match kind {
        SectionKind::Header => {
            let info = &record.personal_info;
            let mut runs = vec![
                TextRun::new(RunStyle::Name, or_placeholder(&info.full_name, "Your Name")),
                TextRun::new(
                    RunStyle::Headline,
                    or_placeholder(&info.job_title, "Professional Title"),
                ),
            ];
            let contact = info.contact_items();
            if !contact.is_empty() {
                runs.push(TextRun::new(RunStyle::Contact, contact.join("  |  ")));
            }
            vec![runs]
        }
        SectionKind::Summary => vec![vec![TextRun::new(
            RunStyle::Body,
            record.personal_info.summary.trim(),
        )]],
        SectionKind::Experience => record
            .experience
            .iter()
            .filter(|e| e.is_populated())
            .map(experience_runs)
            .collect(),
        SectionKind::Education => record
            .education
            .iter()
            .filter(|e| e.is_populated())
            .map(education_runs)
            .collect(),
        SectionKind::Skills => record
            .skills
            .iter()
            .filter(|c| c.is_populated())
            .map(|cat| {
                let skills: Vec<&str> = cat
                    .skills
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                let text = match (is_filled(&cat.category), skills.is_empty()) {
                    (true, false) => format!("{}: {}", cat.category.trim(), skills.join(", ")),
                    (true, true) => cat.category.trim().to_string(),
                    (false, _) => skills.join(", "),
                };
                vec![TextRun::new(RunStyle::Body, text)]
            })
            .collect(),
        SectionKind::Projects => record
            .projects
            .iter()
            .filter(|p| p.is_populated())
            .map(project_runs)
            .collect(),
        SectionKind::References => record
            .references
            .iter()
            .filter(|r| r.is_populated())
            .map(reference_runs)
            .collect(),
    }
}

fn experience_runs(exp: &Experience) -> Vec<TextRun> {
    let mut runs = vec![TextRun::new(
        RunStyle::EntryTitle,
        or_placeholder(&exp.position, "Position"),
    )];
    let end = if exp.current {
        "Present"
    } else {
        exp.end_date.trim()
    };
    let meta = join_present(&[
        or_placeholder(&exp.company, "Company"),
        exp.location.trim(),
        date_range(&exp.start_date, end).as_str(),
    ]);
    runs.push(TextRun::new(RunStyle::Meta, meta));
    runs.extend(
        description_lines(&exp.description).map(|line| TextRun::new(RunStyle::Bullet, line)),
    );
    runs
}

fn education_runs(edu: &Education) -> Vec<TextRun> {
    let degree = or_placeholder(&edu.degree, "Degree");
    let title = if is_filled(&edu.field_of_study) {
        format!("{degree} in {}", edu.field_of_study.trim())
    } else {
        degree.to_string()
    };
    let meta = join_present(&[
        or_placeholder(&edu.institution, "Institution"),
        date_range(&edu.start_date, &edu.end_date).as_str(),
        edu.grade.trim(),
    ]);
    let mut runs = vec![
        TextRun::new(RunStyle::EntryTitle, title),
        TextRun::new(RunStyle::Meta, meta),
    ];
    if is_filled(&edu.description) {
        runs.push(TextRun::new(RunStyle::Body, edu.description.trim()));
    }
    runs
}

fn project_runs(project: &Project) -> Vec<TextRun> {
    let mut runs = vec![TextRun::new(
        RunStyle::EntryTitle,
        or_placeholder(&project.name, "Untitled Project"),
    )];
    let technologies: Vec<&str> = project
        .technologies
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let meta = join_present(&[technologies.join(", ").as_str(), project.link.trim()]);
    if !meta.is_empty() {
        runs.push(TextRun::new(RunStyle::Meta, meta));
    }
    if is_filled(&project.description) {
        runs.push(TextRun::new(RunStyle::Body, project.description.trim()));
    }
    runs
}

fn reference_runs(reference: &Reference) -> Vec<TextRun> {
    let mut runs = vec![TextRun::new(
        RunStyle::EntryTitle,
        or_placeholder(&reference.name, "Reference"),
    )];
    let role = join_present(&[reference.position.trim(), reference.company.trim()]);
    if !role.is_empty() {
        runs.push(TextRun::new(RunStyle::Meta, role));
    }
    let contact = join_present(&[reference.email.trim(), reference.phone.trim()]);
    if !contact.is_empty() {
        runs.push(TextRun::new(RunStyle::Body, contact));
    }
    runs
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => s.to_string(),
        ("", e) => e.to_string(),
        (s, e) => format!("{s} - {e}"),
    }
}

fn join_present(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("  ·  ")
}

/// Splits a free-text description into bullet lines, dropping list markers the user typed.
fn description_lines(description: &str) -> impl Iterator<Item = &str> {
    description
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| !l.is_empty())
}
