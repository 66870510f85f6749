use dotenvy::dotenv;
use std::sync::Arc;

use feed_server::application::FeedService;
use feed_server::data::{
    group_repository::PostgresGroupRepository, post_repository::PostgresPostRepository,
    user_repository::PostgresUserRepository,
};
use feed_server::infrastructure::{
    config::AppConfig,
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::init_logging,
};
use feed_server::presentation::{current_user::AuthSettings, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    init_logging();

    let config = AppConfig::from_env()?;

    tracing::info!("Starting feed server...");
    tracing::info!("HTTP server will listen on {}", config.http_addr());
    tracing::info!("Posts per page: {}", config.posts_per_page);
    tracing::info!("Login URL: {}", config.login_url);

    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;

    tracing::info!("Initializing services...");

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret));

    // Repositories
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let group_repo = Arc::new(PostgresGroupRepository::new(pool.clone()));
    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));

    let feed_service = Arc::new(FeedService::new(
        post_repo,
        group_repo,
        user_repo,
        config.posts_per_page,
    ));

    let auth_settings = AuthSettings {
        login_url: config.login_url.clone(),
        session_cookie: config.session_cookie.clone(),
    };

    tracing::info!("Services initialized successfully");

    run_http_server(&config, feed_service, jwt_service, auth_settings).await?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in allowed_origins.split(',').map(str::trim) {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    config: &AppConfig,
    feed_service: Arc<FeedService>,
    jwt_service: Arc<JwtService>,
    auth_settings: AuthSettings,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};

    let addr = config.http_addr();
    let cors_allowed_origins = config.cors_allowed_origins.clone();
    let auth_settings = web::Data::new(auth_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .app_data(web::Data::new(feed_service.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(auth_settings.clone())
            .configure(routes::configure)
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
