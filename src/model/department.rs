use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference data: maps a department to its HOD's email. Seeded out of
/// band; the workflow only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[schema(example = "BCA")]
    pub name: String,
    #[schema(example = "hod.bca@college.edu", format = "email", value_type = String)]
    pub hod_email: String,
}
