use serde::{Deserialize, Serialize};

/// Reference data: a department head. Authorizes hod-side transitions by
/// department match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hod {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    pub name: String,
    pub email: String,
    pub department: String,
}
