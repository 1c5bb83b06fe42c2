use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@college.edu", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
    #[schema(example = "student")]
    pub role: String,
    /// Required for students; ties the account to its OD requests
    #[schema(example = "21BCA042", nullable = true)]
    pub register_no: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "john.doe@college.edu", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
}

/// User account document in the users collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    /// Present only if this user is linked to a student register number
    pub register_no: Option<String>,
    pub last_login_at: Option<String>,
}

/// Refresh token document; `jti` is the lookup key and revocation flag
/// lives here rather than in the token itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    pub jti: String,
    pub email: String,
    pub expires_at: usize,
    pub revoked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub name: String,
    pub role: String, // role label
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to a student register number
    pub register_no: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
