use crate::auth::auth::AuthUser;
use crate::model::od_request::{OdRequest, OdRequestDraft};
use crate::model::status::OdAction;
use crate::workflow::WorkflowEngine;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "version": 1,
            "student_name": "John Doe",
            "register_no": "21BCA042",
            "reason": "Participating in inter-college event",
            "date": "2026-01-01",
            "department": "BCA",
            "faculty_name": "Jane Smith",
            "faculty_email": "jane.smith@college.edu",
            "status": "pending"
        }
    ],
    "total": 1
}))]
pub struct OdListResponse {
    pub data: Vec<OdRequest>,
    #[schema(example = 1)]
    pub total: usize,
}

/* =========================
Submit OD request (student)
========================= */
/// Swagger doc for submit_od endpoint
#[utoipa::path(
    post,
    path = "/api/v1/od",
    request_body(
        content = OdRequestDraft,
        description = "OD request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "OD request submitted successfully", body = OdRequest),
        (status = 400, description = "Missing field or unknown department/faculty"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn submit_od(
    auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<OdRequestDraft>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let request = engine.submit(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(request))
}

/* =========================
List OD requests for the caller's role
========================= */
/// Swagger doc for list_od endpoint
#[utoipa::path(
    get,
    path = "/api/v1/od",
    responses(
        (status = 200, description = "Requests visible to the caller", body = OdListResponse),
        (status = 400, description = "Caller has no register number"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn list_od(
    auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
) -> actix_web::Result<impl Responder> {
    let data = engine.list_for_role(&auth.actor()).await?;
    let total = data.len();

    Ok(HttpResponse::Ok().json(OdListResponse { data, total }))
}

/// for getting one OD request endpoint
#[utoipa::path(
    get,
    path = "/api/v1/od/{id}",
    params(
        ("id" = String, Path, description = "ID of the OD request to fetch")
    ),
    responses(
        (status = 200, description = "OD request found", body = OdRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "OD request not found", body = Object, example = json!({
            "message": "OD request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn get_od(
    _auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let request = engine.get(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Approve OD (assigned tutor, or HOD after forward)
========================= */
/// Swagger doc for approve_od endpoint
#[utoipa::path(
    put,
    path = "/api/v1/od/{id}/approve",
    params(
        ("id" = String, Path, description = "ID of the OD request to approve")
    ),
    responses(
        (status = 200, description = "OD request approved", body = OdRequest),
        (status = 400, description = "Transition not allowed for this actor/state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "OD request not found"),
        (status = 409, description = "Concurrent update lost the race")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn approve_od(
    auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .transition(&path.into_inner(), &auth.actor(), OdAction::Approve)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Reject OD (assigned tutor, or HOD after forward)
========================= */
/// Swagger doc for reject_od endpoint
#[utoipa::path(
    put,
    path = "/api/v1/od/{id}/reject",
    params(
        ("id" = String, Path, description = "ID of the OD request to reject")
    ),
    responses(
        (status = 200, description = "OD request rejected", body = OdRequest),
        (status = 400, description = "Transition not allowed for this actor/state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "OD request not found"),
        (status = 409, description = "Concurrent update lost the race")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn reject_od(
    auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .transition(&path.into_inner(), &auth.actor(), OdAction::Reject)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Forward OD to the HOD (assigned tutor)
========================= */
/// Swagger doc for forward_od endpoint
#[utoipa::path(
    put,
    path = "/api/v1/od/{id}/forward",
    params(
        ("id" = String, Path, description = "ID of the OD request to forward")
    ),
    responses(
        (status = 200, description = "OD request forwarded to the HOD", body = OdRequest),
        (status = 400, description = "Transition not allowed for this actor/state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "OD request not found"),
        (status = 409, description = "Concurrent update lost the race")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "OD"
)]
pub async fn forward_od(
    auth: AuthUser,
    engine: web::Data<WorkflowEngine>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .transition(&path.into_inner(), &auth.actor(), OdAction::Forward)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}
