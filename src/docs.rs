use crate::api::od_request::OdListResponse;
use crate::api::track::TrackResponse;
use crate::model::department::Department;
use crate::model::faculty::Faculty;
use crate::model::od_request::{OdRequest, OdRequestDraft};
use crate::model::status::{OdAction, OdStatus};
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OMS API",
        version = "1.0.0",
        description = r#"
## On-Duty (OD) Request Management System

This API powers a campus **OD request** workflow: students apply for
on-duty leave, tutors review the applications, and department heads give
the final decision on forwarded requests.

### 🔹 Key Features
- **OD Requests**
  - Submit an application, review it as the assigned tutor
    (approve / reject / forward), decide forwarded requests as the HOD
- **Status Tracking**
  - Public lookup of application status by register number
- **Reference Data**
  - Department and tutor listings for the submission form

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Tutor and HOD actions are tied to the reviewer recorded on each request.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::od_request::submit_od,
        crate::api::od_request::list_od,
        crate::api::od_request::get_od,
        crate::api::od_request::approve_od,
        crate::api::od_request::reject_od,
        crate::api::od_request::forward_od,

        crate::api::track::track_status,

        crate::api::reference::list_departments,
        crate::api::reference::list_faculty,
    ),
    components(
        schemas(
            OdRequest,
            OdRequestDraft,
            OdStatus,
            OdAction,
            OdListResponse,
            TrackResponse,
            Department,
            Faculty,
            RegisterReq,
            LoginReqDto
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "OD", description = "OD request workflow APIs"),
        (name = "Track", description = "Public status tracking APIs"),
        (name = "Reference", description = "Department and faculty reference APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
