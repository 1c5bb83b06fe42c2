use crate::model::status::OdStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored OD request. `id` and `version` come from the document store
/// envelope; `version` is the optimistic-concurrency token transitions
/// compare-and-swap on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
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
}))]
pub struct OdRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    pub student_name: String,
    pub register_no: String,
    pub reason: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub department: String,
    pub faculty_name: String,
    pub faculty_email: String,
    pub status: OdStatus,
}

/// Student submission payload. Every field is required; `faculty_name`
/// and `status` are filled in by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OdRequestDraft {
    #[schema(example = "John Doe")]
    pub student_name: String,
    #[schema(example = "21BCA042")]
    pub register_no: String,
    #[schema(example = "Participating in inter-college event")]
    pub reason: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "BCA")]
    pub department: String,
    #[schema(example = "jane.smith@college.edu", format = "email", value_type = String)]
    pub faculty_email: String,
}
