use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of the users document. `username` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Body of `POST /login` and `POST /register`. Missing fields are treated as empty.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PasswordCheckRequest {
    #[serde(default)]
    pub password: String,
}

/// Uniform JSON envelope returned by every API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "userExists", default, skip_serializing_if = "Option::is_none")]
    pub user_exists: Option<bool>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), user_exists: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), user_exists: None }
    }

    pub fn with_user_exists(mut self) -> Self {
        self.user_exists = Some(true);
        self
    }
}
