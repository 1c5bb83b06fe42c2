use crate::auth::auth::AuthUser;
use crate::workflow::WorkflowEngine;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FacultyQuery {
    /// Restrict to one department (the submission form filters tutors this way)
    pub department: Option<String>,
}

/// Departments available on the submission form
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [crate::model::department::Department]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reference"
)]
pub async fn list_departments(
    _auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
) -> actix_web::Result<impl Responder> {
    let departments = engine.departments().await?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Faculty available on the submission form
#[utoipa::path(
    get,
    path = "/api/v1/faculty",
    params(FacultyQuery),
    responses(
        (status = 200, description = "Matching faculty", body = [crate::model::faculty::Faculty]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reference"
)]
pub async fn list_faculty(
    _auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    query: web::Query<FacultyQuery>,
) -> actix_web::Result<impl Responder> {
    let faculty = engine.faculty(query.department.as_deref()).await?;

    Ok(HttpResponse::Ok().json(faculty))
}
