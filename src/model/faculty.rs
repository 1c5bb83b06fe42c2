use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference data: a tutor who can receive OD requests. The email ties
/// requests to their first-stage reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Faculty {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[schema(example = "Jane Smith")]
    pub name: String,
    #[schema(example = "jane.smith@college.edu", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "BCA")]
    pub department: String,
}
