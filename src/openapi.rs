use crate::models::{ApiResponse, Credentials, PasswordCheckRequest};
use crate::policy::PasswordAssessment;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::login,
        crate::routes::register,
        crate::routes::password_check,
    ),
    components(schemas(ApiResponse, Credentials, PasswordCheckRequest, PasswordAssessment)),
    tags(
        (name = "accounts", description = "Registration and login"),
    )
)]
pub struct ApiDoc;
