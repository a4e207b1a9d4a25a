//! Portfolio Content Models
//! Public portfolio records and the payloads the admin panel sends

use crate::api::FieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner profile shown in the hero/about sections. Singleton row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: Option<String>,
    pub resume_url: Option<String>,
    pub resume_type: Option<ResumeKind>,
    pub resume_name: Option<String>,
    pub resume_size: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
}

/// How the resume is provided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResumeKind {
    File,
    Link,
}

impl ResumeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeKind::File => "file",
            ResumeKind::Link => "link",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(ResumeKind::File),
            "link" => Some(ResumeKind::Link),
            _ => None,
        }
    }
}

/// Body of `PUT /api/personal`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoInput {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: Option<String>,
}

impl PersonalInfoInput {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let required = [
            ("name", &self.name, "Name is required"),
            ("title", &self.title, "Title is required"),
            ("bio", &self.bio, "Bio is required"),
            ("email", &self.email, "Email is required"),
            ("phone", &self.phone, "Phone is required"),
            ("location", &self.location, "Location is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, message));
            }
        }
        errors
    }
}

/// Display name stored for linked resumes.
pub const RESUME_LINK_NAME: &str = "Resume (Link)";

/// Body of `POST /api/personal/resume/link`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLinkInput {
    #[serde(default)]
    pub resume_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Emoji or short image token
    pub image: String,
    pub tech_stack: Vec<String>,
    pub demo_link: String,
    pub github_link: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Trimmed technologies with blanks dropped.
pub fn normalize_tech_stack(stack: Vec<String>) -> Vec<String> {
    stack
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Body of `POST /api/projects`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image: String,
    pub tech_stack: Vec<String>,
    pub demo_link: String,
    pub github_link: String,
    pub featured: bool,
}

impl NewProject {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if self.image.trim().is_empty() {
            errors.push(FieldError::new("image", "Image/emoji is required"));
        }
        if self.tech_stack.iter().all(|t| t.trim().is_empty()) {
            errors.push(FieldError::new(
                "techStack",
                "At least one technology is required",
            ));
        }
        errors
    }
}

/// Body of `PUT /api/projects/:id`; absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub demo_link: Option<String>,
    pub github_link: Option<String>,
    pub featured: Option<bool>,
}

impl ProjectPatch {
    /// Check only the fields present in the patch.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self
            .description
            .as_deref()
            .is_some_and(|v| v.trim().is_empty())
        {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if self.image.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(FieldError::new("image", "Image/emoji is required"));
        }
        if let Some(stack) = &self.tech_stack {
            if stack.iter().all(|t| t.trim().is_empty()) {
                errors.push(FieldError::new(
                    "techStack",
                    "At least one technology is required",
                ));
            }
        }
        errors
    }

    pub fn apply(self, project: &mut Project) {
        if let Some(v) = self.title {
            project.title = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if let Some(v) = self.image {
            project.image = v;
        }
        if let Some(v) = self.tech_stack {
            project.tech_stack = normalize_tech_stack(v);
        }
        if let Some(v) = self.demo_link {
            project.demo_link = v;
        }
        if let Some(v) = self.github_link {
            project.github_link = v;
        }
        if let Some(v) = self.featured {
            project.featured = v;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    /// Icon class name rendered by the frontend
    pub icon: String,
    pub featured: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSkill {
    pub name: String,
    pub icon: String,
    pub featured: bool,
}

impl NewSkill {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Skill name is required"));
        }
        if self.icon.trim().is_empty() {
            errors.push(FieldError::new("icon", "Icon is required"));
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub featured: Option<bool>,
}

impl SkillPatch {
    /// Check only the fields present in the patch.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(FieldError::new("name", "Skill name is required"));
        }
        if self.icon.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(FieldError::new("icon", "Icon is required"));
        }
        errors
    }

    pub fn apply(self, skill: &mut Skill) {
        if let Some(v) = self.name {
            skill.name = v.trim().to_string();
        }
        if let Some(v) = self.icon {
            skill.icon = v.trim().to_string();
        }
        if let Some(v) = self.featured {
            skill.featured = v;
        }
    }
}

/// Message left through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl NewContactMessage {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.subject, &self.message]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeaturedToggle {
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReadToggle {
    pub read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_patch_keeps_absent_fields() {
        let mut project = Project {
            id: "p1".to_string(),
            title: "Old".to_string(),
            description: "Desc".to_string(),
            image: "🚀".to_string(),
            tech_stack: vec!["Rust".to_string()],
            demo_link: String::new(),
            github_link: String::new(),
            featured: false,
            created_at: Utc::now(),
        };

        let patch: ProjectPatch =
            serde_json::from_str(r#"{"title":"New","techStack":["Rust","SQLite"]}"#).unwrap();
        patch.apply(&mut project);

        assert_eq!(project.title, "New");
        assert_eq!(project.description, "Desc");
        assert_eq!(project.tech_stack.len(), 2);
        assert!(!project.featured);
    }

    #[test]
    fn test_project_patch_validates_present_fields() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"demoLink":""}"#).unwrap();
        assert!(patch.validate().is_empty());

        let patch: ProjectPatch =
            serde_json::from_str(r#"{"title":"  ","techStack":[" "]}"#).unwrap();
        let fields: Vec<_> = patch.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "techStack"]);
    }

    #[test]
    fn test_patch_normalizes_values() {
        let mut project = Project {
            id: "p1".to_string(),
            title: "Folio".to_string(),
            description: "Desc".to_string(),
            image: "🚀".to_string(),
            tech_stack: vec!["Rust".to_string()],
            demo_link: String::new(),
            github_link: String::new(),
            featured: false,
            created_at: Utc::now(),
        };
        let patch: ProjectPatch =
            serde_json::from_str(r#"{"techStack":[" axum ","","SQLite"]}"#).unwrap();
        patch.apply(&mut project);
        assert_eq!(project.tech_stack, vec!["axum", "SQLite"]);

        let mut skill = Skill {
            id: "s1".to_string(),
            name: "Rust".to_string(),
            icon: "devicon-rust-plain".to_string(),
            featured: false,
        };
        let patch: SkillPatch = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_eq!(patch.validate()[0].field, "name");
        let patch: SkillPatch = serde_json::from_str(r#"{"name":" Go "}"#).unwrap();
        assert!(patch.validate().is_empty());
        patch.apply(&mut skill);
        assert_eq!(skill.name, "Go");
    }

    #[test]
    fn test_new_project_validation() {
        let empty = NewProject::default();
        let fields: Vec<_> = empty.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description", "image", "techStack"]);

        let project: NewProject = serde_json::from_str(
            r#"{"title":"Folio","description":"Site","image":"🌐","techStack":["Rust"]}"#,
        )
        .unwrap();
        assert!(project.validate().is_empty());
        assert!(!project.featured);
    }

    #[test]
    fn test_contact_message_completeness() {
        let msg: NewContactMessage =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com","subject":"Hi"}"#)
                .unwrap();
        assert!(!msg.is_complete());

        let msg = NewContactMessage {
            message: "Hello".to_string(),
            ..msg
        };
        assert!(msg.is_complete());
    }

    #[test]
    fn test_personal_info_serializes_camel_case() {
        let info = PersonalInfo {
            id: 1,
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Bio".to_string(),
            email: "ada@example.com".to_string(),
            phone: "123".to_string(),
            location: "London".to_string(),
            linkedin: String::new(),
            github: String::new(),
            website: None,
            resume_url: Some("https://github.com/ada/cv.pdf".to_string()),
            resume_type: Some(ResumeKind::Link),
            resume_name: None,
            resume_size: None,
            upload_date: None,
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["resumeUrl"], "https://github.com/ada/cv.pdf");
        assert_eq!(json["resumeType"], "link");
    }

    #[test]
    fn test_resume_kind_round_trip() {
        assert_eq!(ResumeKind::parse("link"), Some(ResumeKind::Link));
        assert_eq!(ResumeKind::File.as_str(), "file");
        assert_eq!(ResumeKind::parse("pdf"), None);
    }
}
