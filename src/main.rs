use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use chrono::Utc;

use docquiz_server::{
    app_state::AppState, auth::JwtService, config::Config, handlers::configure_routes,
    middleware::RequestIdMiddleware,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if !cfg!(debug_assertions) {
        config.validate_for_production();
    }

    let state = AppState::new(config.clone())
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

    let sessions = state.quiz_service.sessions().clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let dropped = sessions.drop_on_expiry(Utc::now()).await;
            if dropped > 0 {
                log::info!("Dropped {} expired quiz sessions", dropped);
            }
        }
    });

    let bind_addr = (config.web_server_host.clone(), config.web_server_port);
    log::info!(
        "Starting HTTP server on {}:{} (model {})",
        bind_addr.0,
        bind_addr.1,
        config.generation.model
    );

    let state = web::Data::new(state);
    let jwt_service = web::Data::new(jwt_service);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_allowed_origin)
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(jwt_service.clone())
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
