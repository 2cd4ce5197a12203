use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use roster::config::StoreBackend;
use roster::openapi::ApiDoc;
use roster::{config, AppState, SecurityHeaders, ServerConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds; deployments set real env vars.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping roster server");
    let cfg = ServerConfig::from_env().context("invalid configuration")?;

    match &cfg.store {
        StoreBackend::File(path) => info!("Using JSON user store at '{}'", path.display()),
        StoreBackend::Memory => info!("Using in-memory user store (nothing is persisted)"),
    }
    info!(
        "Write serialization: {}, password policy: {}",
        if cfg.serialize_writes { "on" } else { "off" },
        if cfg.enforce_password_policy { "enforced" } else { "off" },
    );

    let state = AppState::from_config(&cfg);
    // first access creates the document and surfaces a malformed one before serving
    let users = state.accounts.user_count().context("user store is not usable")?;
    info!("User store ready with {users} user(s)");

    let openapi = ApiDoc::openapi();
    let origins = cfg.allowed_origins.clone();
    let hsts = cfg.enable_hsts;

    let server = HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |c, origin| c.allowed_origin(origin))
            .allowed_methods(["GET", "POST", "OPTIONS"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(SecurityHeaders::new(hsts))
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            // registered before `config` so the asset catch-all does not shadow it
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(config)
    })
    .bind((cfg.bind_addr.as_str(), cfg.port))
    .with_context(|| format!("failed to bind {}:{}", cfg.bind_addr, cfg.port))?;

    info!("Listening on http://{}:{}", cfg.bind_addr, cfg.port);

    server.run().await?;
    Ok(())
}
