//! Portfolio Content Storage
//!
//! SQLite persistence for the owner profile, projects, skills and contact
//! messages. One connection guarded by a mutex, WAL journal.

use crate::content::models::{
    normalize_tech_stack, ContactMessage, NewContactMessage, NewProject, NewSkill, PersonalInfo,
    PersonalInfoInput, Project, ProjectPatch, ResumeKind, Skill, SkillPatch, RESUME_LINK_NAME,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const PERSONAL_ROW_ID: i64 = 1;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS personal_info (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    bio TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    location TEXT NOT NULL,
    linkedin TEXT NOT NULL DEFAULT '',
    github TEXT NOT NULL DEFAULT '',
    website TEXT,
    resume_url TEXT,
    resume_type TEXT,
    resume_name TEXT,
    resume_size TEXT,
    upload_date TEXT
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    image TEXT NOT NULL,
    tech_stack TEXT NOT NULL,      -- JSON array
    demo_link TEXT NOT NULL DEFAULT '',
    github_link TEXT NOT NULL DEFAULT '',
    featured INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_created ON projects(created_at DESC);

CREATE TABLE IF NOT EXISTS skills (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    icon TEXT NOT NULL,
    featured INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_messages (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_contact_timestamp ON contact_messages(timestamp DESC);
"#;

const PROJECT_COLUMNS: &str =
    "id, title, description, image, tech_stack, demo_link, github_link, featured, created_at";
const SKILL_COLUMNS: &str = "id, name, icon, featured";
const CONTACT_COLUMNS: &str = "id, name, email, subject, message, timestamp, read";

/// SQLite-backed portfolio content
pub struct ContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl ContentStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open content database at {}", db_path))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize content schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ------------------------------------------------------------------
    // Personal info
    // ------------------------------------------------------------------

    pub fn personal_info(&self) -> Result<Option<PersonalInfo>> {
        let conn = self.conn.lock();
        Self::select_personal(&conn)
    }

    /// Create or replace the profile. Resume fields are left untouched.
    pub fn upsert_personal_info(&self, input: &PersonalInfoInput) -> Result<PersonalInfo> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO personal_info
                (id, name, title, bio, email, phone, location, linkedin, github, website)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                title = excluded.title,
                bio = excluded.bio,
                email = excluded.email,
                phone = excluded.phone,
                location = excluded.location,
                linkedin = excluded.linkedin,
                github = excluded.github,
                website = excluded.website",
            params![
                PERSONAL_ROW_ID,
                input.name,
                input.title,
                input.bio,
                input.email,
                input.phone,
                input.location,
                input.linkedin,
                input.github,
                input.website,
            ],
        )
        .context("Failed to save personal info")?;

        Self::select_personal(&conn)?.context("Personal info missing after save")
    }

    /// Point the resume at an external link. Creates an empty profile row
    /// when none exists yet.
    pub fn set_resume_link(&self, url: &str) -> Result<PersonalInfo> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO personal_info
                (id, name, title, bio, email, phone, location, linkedin, github, website,
                 resume_url, resume_type, resume_name, resume_size, upload_date)
             VALUES (?1, '', '', '', '', '', '', '', '', '', ?2, ?3, ?4, NULL, ?5)
             ON CONFLICT(id) DO UPDATE SET
                resume_url = excluded.resume_url,
                resume_type = excluded.resume_type,
                resume_name = excluded.resume_name,
                resume_size = NULL,
                upload_date = excluded.upload_date",
            params![
                PERSONAL_ROW_ID,
                url,
                ResumeKind::Link.as_str(),
                RESUME_LINK_NAME,
                Utc::now(),
            ],
        )
        .context("Failed to save resume link")?;

        Self::select_personal(&conn)?.context("Personal info missing after resume link")
    }

    /// Drop the resume reference. A no-op when nothing is stored.
    pub fn clear_resume(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE personal_info
             SET resume_url = NULL, resume_type = NULL, resume_name = NULL,
                 resume_size = NULL, upload_date = NULL
             WHERE id = ?1",
            params![PERSONAL_ROW_ID],
        )
        .context("Failed to clear resume")?;
        Ok(())
    }

    fn select_personal(conn: &Connection) -> Result<Option<PersonalInfo>> {
        conn.query_row(
            "SELECT id, name, title, bio, email, phone, location, linkedin, github, website,
                    resume_url, resume_type, resume_name, resume_size, upload_date
             FROM personal_info WHERE id = ?1",
            params![PERSONAL_ROW_ID],
            |row| {
                let resume_type: Option<String> = row.get(11)?;
                Ok(PersonalInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    title: row.get(2)?,
                    bio: row.get(3)?,
                    email: row.get(4)?,
                    phone: row.get(5)?,
                    location: row.get(6)?,
                    linkedin: row.get(7)?,
                    github: row.get(8)?,
                    website: row.get(9)?,
                    resume_url: row.get(10)?,
                    resume_type: resume_type.as_deref().and_then(ResumeKind::parse),
                    resume_name: row.get(12)?,
                    resume_size: row.get(13)?,
                    upload_date: row.get::<_, Option<DateTime<Utc>>>(14)?,
                })
            },
        )
        .optional()
        .context("Failed to read personal info")
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// All projects, newest first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_project)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list projects")
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.conn.lock();
        Self::select_project(&conn, id)
    }

    pub fn create_project(&self, input: NewProject) -> Result<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            image: input.image,
            tech_stack: normalize_tech_stack(input.tech_stack),
            demo_link: input.demo_link,
            github_link: input.github_link,
            featured: input.featured,
            created_at: Utc::now(),
        };

        let conn = self.conn.lock();
        Self::write_project(&conn, &project, true)?;
        info!(id = %project.id, title = %project.title, "Project created");
        Ok(project)
    }

    /// Apply a partial update. `None` when the project does not exist.
    pub fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<Option<Project>> {
        let conn = self.conn.lock();
        let Some(mut project) = Self::select_project(&conn, id)? else {
            return Ok(None);
        };
        patch.apply(&mut project);
        Self::write_project(&conn, &project, false)?;
        Ok(Some(project))
    }

    pub fn set_project_featured(&self, id: &str, featured: bool) -> Result<Option<Project>> {
        let conn = self.conn.lock();
        let updated = conn
            .execute(
                "UPDATE projects SET featured = ?2 WHERE id = ?1",
                params![id, featured],
            )
            .context("Failed to toggle project featured flag")?;
        if updated == 0 {
            return Ok(None);
        }
        Self::select_project(&conn, id)
    }

    pub fn delete_project(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .context("Failed to delete project")?;
        Ok(deleted > 0)
    }

    fn write_project(conn: &Connection, project: &Project, insert: bool) -> Result<()> {
        let tech_stack = serde_json::to_string(&project.tech_stack)?;
        let sql = if insert {
            "INSERT INTO projects
                (id, title, description, image, tech_stack, demo_link, github_link, featured, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        } else {
            "UPDATE projects
             SET title = ?2, description = ?3, image = ?4, tech_stack = ?5,
                 demo_link = ?6, github_link = ?7, featured = ?8, created_at = ?9
             WHERE id = ?1"
        };
        conn.execute(
            sql,
            params![
                project.id,
                project.title,
                project.description,
                project.image,
                tech_stack,
                project.demo_link,
                project.github_link,
                project.featured,
                project.created_at,
            ],
        )
        .context("Failed to save project")?;
        Ok(())
    }

    fn select_project(conn: &Connection, id: &str) -> Result<Option<Project>> {
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
            Self::row_to_project,
        )
        .optional()
        .context("Failed to read project")
    }

    fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
        let tech_stack: String = row.get(4)?;
        Ok(Project {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image: row.get(3)?,
            tech_stack: serde_json::from_str(&tech_stack).unwrap_or_default(),
            demo_link: row.get(5)?,
            github_link: row.get(6)?,
            featured: row.get(7)?,
            created_at: row.get::<_, DateTime<Utc>>(8)?,
        })
    }

    // ------------------------------------------------------------------
    // Skills
    // ------------------------------------------------------------------

    /// All skills in creation order.
    pub fn list_skills(&self) -> Result<Vec<Skill>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_skill)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list skills")
    }

    pub fn create_skill(&self, input: NewSkill) -> Result<Skill> {
        let skill = Skill {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            icon: input.icon.trim().to_string(),
            featured: input.featured,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO skills (id, name, icon, featured, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![skill.id, skill.name, skill.icon, skill.featured, Utc::now()],
        )
        .context("Failed to save skill")?;
        Ok(skill)
    }

    pub fn update_skill(&self, id: &str, patch: SkillPatch) -> Result<Option<Skill>> {
        let conn = self.conn.lock();
        let Some(mut skill) = Self::select_skill(&conn, id)? else {
            return Ok(None);
        };
        patch.apply(&mut skill);
        conn.execute(
            "UPDATE skills SET name = ?2, icon = ?3, featured = ?4 WHERE id = ?1",
            params![skill.id, skill.name, skill.icon, skill.featured],
        )
        .context("Failed to update skill")?;
        Ok(Some(skill))
    }

    pub fn set_skill_featured(&self, id: &str, featured: bool) -> Result<Option<Skill>> {
        let conn = self.conn.lock();
        let updated = conn
            .execute(
                "UPDATE skills SET featured = ?2 WHERE id = ?1",
                params![id, featured],
            )
            .context("Failed to toggle skill featured flag")?;
        if updated == 0 {
            return Ok(None);
        }
        Self::select_skill(&conn, id)
    }

    pub fn delete_skill(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM skills WHERE id = ?1", params![id])
            .context("Failed to delete skill")?;
        Ok(deleted > 0)
    }

    fn select_skill(conn: &Connection, id: &str) -> Result<Option<Skill>> {
        conn.query_row(
            &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1"),
            params![id],
            Self::row_to_skill,
        )
        .optional()
        .context("Failed to read skill")
    }

    fn row_to_skill(row: &Row<'_>) -> rusqlite::Result<Skill> {
        Ok(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            featured: row.get(3)?,
        })
    }

    // ------------------------------------------------------------------
    // Contact messages
    // ------------------------------------------------------------------

    pub fn create_contact_message(&self, input: NewContactMessage) -> Result<ContactMessage> {
        let message = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            subject: input.subject.trim().to_string(),
            message: input.message,
            timestamp: Utc::now(),
            read: false,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO contact_messages ({CONTACT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                message.id,
                message.name,
                message.email,
                message.subject,
                message.message,
                message.timestamp,
                message.read,
            ],
        )
        .context("Failed to save contact message")?;
        Ok(message)
    }

    /// All messages, newest first.
    pub fn list_contact_messages(&self) -> Result<Vec<ContactMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY timestamp DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_contact)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list contact messages")
    }

    pub fn set_contact_read(&self, id: &str, read: bool) -> Result<Option<ContactMessage>> {
        let conn = self.conn.lock();
        let updated = conn
            .execute(
                "UPDATE contact_messages SET read = ?2 WHERE id = ?1",
                params![id, read],
            )
            .context("Failed to update contact message")?;
        if updated == 0 {
            return Ok(None);
        }
        conn.query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = ?1"),
            params![id],
            Self::row_to_contact,
        )
        .optional()
        .context("Failed to read contact message")
    }

    pub fn delete_contact_message(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM contact_messages WHERE id = ?1", params![id])
            .context("Failed to delete contact message")?;
        Ok(deleted > 0)
    }

    fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
        Ok(ContactMessage {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            subject: row.get(3)?,
            message: row.get(4)?,
            timestamp: row.get::<_, DateTime<Utc>>(5)?,
            read: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn profile() -> PersonalInfoInput {
        PersonalInfoInput {
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Builds things".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            location: "London".to_string(),
            ..Default::default()
        }
    }

    fn project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: "A project".to_string(),
            image: "🚀".to_string(),
            tech_stack: vec!["Rust".to_string(), " ".to_string(), "SQLite".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_personal_info_upsert_and_resume() {
        let store = ContentStore::in_memory().unwrap();
        assert!(store.personal_info().unwrap().is_none());

        let saved = store.upsert_personal_info(&profile()).unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.name, "Ada");
        assert!(saved.resume_url.is_none());

        let linked = store.set_resume_link("https://x/cv.pdf").unwrap();
        assert_eq!(linked.resume_type, Some(ResumeKind::Link));
        assert_eq!(linked.resume_name.as_deref(), Some(RESUME_LINK_NAME));
        assert!(linked.upload_date.is_some());
        assert_eq!(linked.name, "Ada");

        // Profile edits keep the resume
        let mut edited = profile();
        edited.title = "Staff Engineer".to_string();
        let saved = store.upsert_personal_info(&edited).unwrap();
        assert_eq!(saved.title, "Staff Engineer");
        assert_eq!(saved.resume_url.as_deref(), Some("https://x/cv.pdf"));

        store.clear_resume().unwrap();
        let cleared = store.personal_info().unwrap().unwrap();
        assert!(cleared.resume_url.is_none());
        assert!(cleared.resume_type.is_none());
        store.clear_resume().unwrap();
    }

    #[test]
    fn test_resume_link_creates_empty_profile() {
        let store = ContentStore::in_memory().unwrap();
        store.clear_resume().unwrap();

        let linked = store.set_resume_link("https://x/cv.pdf").unwrap();
        assert_eq!(linked.id, 1);
        assert_eq!(linked.name, "");
        assert_eq!(linked.resume_url.as_deref(), Some("https://x/cv.pdf"));

        // A later profile save fills the row without dropping the link
        let saved = store.upsert_personal_info(&profile()).unwrap();
        assert_eq!(saved.name, "Ada");
        assert_eq!(saved.resume_url.as_deref(), Some("https://x/cv.pdf"));
    }

    #[test]
    fn test_project_lifecycle() {
        let store = ContentStore::in_memory().unwrap();

        let first = store.create_project(project("First")).unwrap();
        let second = store.create_project(project("Second")).unwrap();
        assert_eq!(first.tech_stack, vec!["Rust", "SQLite"]);

        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        let patch = ProjectPatch {
            description: Some("Updated".to_string()),
            ..Default::default()
        };
        let updated = store.update_project(&first.id, patch).unwrap().unwrap();
        assert_eq!(updated.description, "Updated");
        assert_eq!(updated.title, "First");
        assert_eq!(
            store.get_project(&first.id).unwrap().unwrap().description,
            "Updated"
        );

        let featured = store.set_project_featured(&first.id, true).unwrap().unwrap();
        assert!(featured.featured);

        assert!(store.delete_project(&first.id).unwrap());
        assert!(!store.delete_project(&first.id).unwrap());
        assert!(store
            .update_project(&first.id, ProjectPatch::default())
            .unwrap()
            .is_none());
        assert!(store.set_project_featured("missing", true).unwrap().is_none());
    }

    #[test]
    fn test_skill_lifecycle() {
        let store = ContentStore::in_memory().unwrap();

        let rust = store
            .create_skill(NewSkill {
                name: " Rust ".to_string(),
                icon: "devicon-rust-plain".to_string(),
                featured: false,
            })
            .unwrap();
        assert_eq!(rust.name, "Rust");

        let patch = SkillPatch {
            featured: Some(true),
            ..Default::default()
        };
        let updated = store.update_skill(&rust.id, patch).unwrap().unwrap();
        assert!(updated.featured);
        assert_eq!(updated.icon, "devicon-rust-plain");

        let toggled = store.set_skill_featured(&rust.id, false).unwrap().unwrap();
        assert!(!toggled.featured);

        assert_eq!(store.list_skills().unwrap().len(), 1);
        assert!(store.delete_skill(&rust.id).unwrap());
        assert!(store.list_skills().unwrap().is_empty());
    }

    #[test]
    fn test_contact_messages() {
        let store = ContentStore::in_memory().unwrap();

        let msg = store
            .create_contact_message(NewContactMessage {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                subject: "Hello".to_string(),
                message: "Nice site".to_string(),
            })
            .unwrap();
        assert!(!msg.read);

        let read = store.set_contact_read(&msg.id, true).unwrap().unwrap();
        assert!(read.read);
        assert!(store.set_contact_read("missing", true).unwrap().is_none());

        let listed = store.list_contact_messages().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].read);

        assert!(store.delete_contact_message(&msg.id).unwrap());
        assert!(store.list_contact_messages().unwrap().is_empty());
    }

    #[test]
    fn test_content_survives_reopen() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let id = {
            let store = ContentStore::new(path).unwrap();
            store.upsert_personal_info(&profile()).unwrap();
            store.create_project(project("Kept")).unwrap().id
        };

        let store = ContentStore::new(path).unwrap();
        assert_eq!(store.personal_info().unwrap().unwrap().name, "Ada");
        assert_eq!(store.get_project(&id).unwrap().unwrap().title, "Kept");
    }
}
