use std::sync::Arc;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{debug, error};

use crate::config::{ServerConfig, StoreBackend};
use crate::error::ApiError;
use crate::frontend::Frontend;
use crate::models::{ApiResponse, Credentials, PasswordCheckRequest};
use crate::policy::{PasswordAssessment, PasswordPolicy};
use crate::service::{AccountError, AccountService};
use crate::store::{json::JsonFileStore, memory::MemoryStore, UserStore};

pub const LOGIN_OK_MESSAGE: &str = "login successful";
pub const INVALID_BODY_MESSAGE: &str = "invalid request body";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(web::resource("/").route(web::get().to(index)))
        .service(
            web::resource("/login")
                .route(web::get().to(login_page))
                .route(web::post().to(login)),
        )
        .service(
            web::resource("/register")
                .route(web::get().to(register_page))
                .route(web::post().to(register)),
        )
        .service(web::resource("/api/password-check").route(web::post().to(password_check)))
        // everything else under the frontend root (css/, js/, ...)
        .route("/{asset:.*}", web::get().to(static_asset));
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub frontend: Frontend,
}

impl AppState {
    pub fn new(accounts: AccountService, frontend: Frontend) -> Self {
        Self { accounts: Arc::new(accounts), frontend }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        let store: Arc<dyn UserStore> = match &cfg.store {
            StoreBackend::File(path) => Arc::new(JsonFileStore::new(path)),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let mut accounts = AccountService::new(store);
        if cfg.serialize_writes {
            accounts = accounts.serialized();
        }
        if cfg.enforce_password_policy {
            accounts = accounts.with_password_policy(PasswordPolicy::default());
        }
        Self::new(accounts, Frontend::from_dir(cfg.frontend_dir.clone()))
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("rejected request body: {err}");
    let body = ApiResponse::failure(INVALID_BODY_MESSAGE);
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

// run a blocking account operation off the async workers
async fn blocking<T, F>(data: &web::Data<AppState>, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&AccountService) -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    let accounts = data.accounts.clone();
    web::block(move || op(&accounts))
        .await
        .map_err(|e| {
            error!("blocking pool error: {e}");
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

async fn index() -> HttpResponse {
    debug!("root requested, redirecting to /login");
    HttpResponse::Found().insert_header(("Location", "/login")).finish()
}

async fn login_page(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    serve(&data.frontend, "login.html")
}

async fn register_page(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    serve(&data.frontend, "register.html")
}

async fn static_asset(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    serve(&data.frontend, &path.into_inner())
}

fn serve(frontend: &Frontend, path: &str) -> Result<HttpResponse, ApiError> {
    let asset = frontend.get(path).ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().content_type(asset.content_type).body(asset.bytes.into_owned()))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials match a stored user", body = ApiResponse),
        (status = 401, description = "Unknown user or wrong password", body = ApiResponse),
        (status = 400, description = "Malformed request body", body = ApiResponse)
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let Credentials { username, password } = payload.into_inner();
    let (username, password) = (username.unwrap_or_default(), password.unwrap_or_default());
    blocking(&data, move |accounts| {
        accounts.authenticate(&username, &password)?.ok_or(AccountError::AuthFailure)
    })
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(LOGIN_OK_MESSAGE)))
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = Credentials,
    responses(
        (status = 200, description = "User registered", body = ApiResponse),
        (status = 400, description = "Missing username/password or weak password", body = ApiResponse),
        (status = 409, description = "Username already exists (userExists = true)", body = ApiResponse)
    )
)]
pub async fn register(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let Credentials { username, password } = payload.into_inner();
    let (username, password) = (username.unwrap_or_default(), password.unwrap_or_default());
    let registered =
        blocking(&data, move |accounts| accounts.register(&username, &password)).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(registered.message)))
}

#[utoipa::path(
    post,
    path = "/api/password-check",
    request_body = PasswordCheckRequest,
    responses(
        (status = 200, description = "Policy verdict and strength percentage", body = PasswordAssessment)
    )
)]
pub async fn password_check(
    data: web::Data<AppState>,
    payload: web::Json<PasswordCheckRequest>,
) -> HttpResponse {
    let policy = data.accounts.password_policy().copied().unwrap_or_default();
    HttpResponse::Ok().json(policy.assess(&payload.password))
}
