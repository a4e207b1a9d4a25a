//! Portfolio Content Endpoints
//! Public reads for the site, token-gated writes for the admin panel

use crate::api::{ApiError, ApiJson, AppState, FieldError};
use crate::auth::middleware::admin_token_middleware;
use crate::content::models::{
    ContactMessage, FeaturedToggle, NewContactMessage, NewProject, NewSkill, PersonalInfo,
    PersonalInfoInput, Project, ProjectPatch, ReadToggle, ResumeKind, ResumeLinkInput, Skill,
    SkillPatch, RESUME_LINK_NAME,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

/// Routes under `/api/personal`, `/api/projects`, `/api/skills` and `/api/contact`.
pub fn content_router(state: AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.gate.clone(), admin_token_middleware);

    let public = Router::new()
        .route("/api/personal", get(get_personal_info))
        .route("/api/projects", get(list_projects))
        .route("/api/skills", get(list_skills))
        .route("/api/contact/submit", post(submit_contact));

    let admin = Router::new()
        .route("/api/personal", put(update_personal_info))
        .route("/api/personal/resume/link", post(set_resume_link))
        .route("/api/personal/resume", delete(delete_resume))
        .route("/api/projects", post(create_project))
        .route(
            "/api/projects/:id",
            put(update_project).delete(delete_project),
        )
        .route("/api/projects/:id/featured", patch(toggle_project_featured))
        .route("/api/skills", post(create_skill))
        .route("/api/skills/:id", put(update_skill).delete(delete_skill))
        .route("/api/skills/:id/featured", patch(toggle_skill_featured))
        .route("/api/contact", get(list_contact_messages))
        .route("/api/contact/:id/read", patch(mark_contact_read))
        .route("/api/contact/:id", delete(delete_contact_message))
        .route_layer(gate);

    public.merge(admin).with_state(state)
}

fn validated(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn deleted(kind: &str) -> Json<Value> {
    Json(json!({ "message": format!("{kind} deleted successfully") }))
}

fn not_found(kind: &str) -> ApiError {
    ApiError::NotFound(format!("{kind} not found"))
}

// ----------------------------------------------------------------------
// Personal info
// ----------------------------------------------------------------------

/// GET /api/personal
pub async fn get_personal_info(
    State(state): State<AppState>,
) -> Result<Json<Option<PersonalInfo>>, ApiError> {
    Ok(Json(state.content.personal_info()?))
}

/// PUT /api/personal
pub async fn update_personal_info(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PersonalInfoInput>,
) -> Result<Json<PersonalInfo>, ApiError> {
    validated(payload.validate())?;
    let saved = state.content.upsert_personal_info(&payload)?;
    info!("Personal info updated");
    Ok(Json(saved))
}

/// POST /api/personal/resume/link
pub async fn set_resume_link(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResumeLinkInput>,
) -> Result<Json<Value>, ApiError> {
    let url = payload.resume_url.trim();
    if url.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "resumeUrl",
            "Resume URL is required",
        )]));
    }

    let saved = state.content.set_resume_link(url)?;
    info!("Resume link updated");

    Ok(Json(json!({
        "message": "Resume link added successfully",
        "resumeUrl": url,
        "resumeInfo": {
            "fileName": saved.resume_name.as_deref().unwrap_or(RESUME_LINK_NAME),
            "uploadDate": saved.upload_date,
            "resumeType": ResumeKind::Link,
        },
    })))
}

/// DELETE /api/personal/resume
pub async fn delete_resume(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.content.clear_resume()?;
    Ok(Json(json!({ "message": "Resume removed successfully" })))
}

// ----------------------------------------------------------------------
// Projects
// ----------------------------------------------------------------------

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.content.list_projects()?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    validated(payload.validate())?;
    let project = state.content.create_project(payload)?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProjectPatch>,
) -> Result<Json<Project>, ApiError> {
    validated(payload.validate())?;
    state
        .content
        .update_project(&id, payload)?
        .map(Json)
        .ok_or_else(|| not_found("Project"))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.content.delete_project(&id)? {
        return Err(not_found("Project"));
    }
    Ok(deleted("Project"))
}

/// PATCH /api/projects/:id/featured
pub async fn toggle_project_featured(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<FeaturedToggle>,
) -> Result<Json<Project>, ApiError> {
    state
        .content
        .set_project_featured(&id, payload.featured)?
        .map(Json)
        .ok_or_else(|| not_found("Project"))
}

// ----------------------------------------------------------------------
// Skills
// ----------------------------------------------------------------------

/// GET /api/skills
pub async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, ApiError> {
    Ok(Json(state.content.list_skills()?))
}

/// POST /api/skills
pub async fn create_skill(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewSkill>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    validated(payload.validate())?;
    let skill = state.content.create_skill(payload)?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// PUT /api/skills/:id
pub async fn update_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<SkillPatch>,
) -> Result<Json<Skill>, ApiError> {
    validated(payload.validate())?;
    state
        .content
        .update_skill(&id, payload)?
        .map(Json)
        .ok_or_else(|| not_found("Skill"))
}

/// DELETE /api/skills/:id
pub async fn delete_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.content.delete_skill(&id)? {
        return Err(not_found("Skill"));
    }
    Ok(deleted("Skill"))
}

/// PATCH /api/skills/:id/featured
pub async fn toggle_skill_featured(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<FeaturedToggle>,
) -> Result<Json<Skill>, ApiError> {
    state
        .content
        .set_skill_featured(&id, payload.featured)?
        .map(Json)
        .ok_or_else(|| not_found("Skill"))
}

// ----------------------------------------------------------------------
// Contact
// ----------------------------------------------------------------------

/// POST /api/contact/submit
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    if !payload.is_complete() {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    }

    let message = state.content.create_contact_message(payload)?;
    info!(id = %message.id, "📬 Contact message received");

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/contact
pub async fn list_contact_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(state.content.list_contact_messages()?))
}

/// PATCH /api/contact/:id/read
pub async fn mark_contact_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ReadToggle>,
) -> Result<Json<ContactMessage>, ApiError> {
    state
        .content
        .set_contact_read(&id, payload.read)?
        .map(Json)
        .ok_or_else(|| not_found("Message"))
}

/// DELETE /api/contact/:id
pub async fn delete_contact_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.content.delete_contact_message(&id)? {
        return Err(not_found("Message"));
    }
    Ok(deleted("Message"))
}
