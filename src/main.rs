use std::io;

use actix_web::{middleware, web, App, HttpServer};
use bookstore::auth::Tokens;
use bookstore::config::Config;
use bookstore::{handlers, logging, store, AppState};
use chrono::Duration;
use dotenv::dotenv;
use tracing::info;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    logging::init(&config.log);
    info!(
        port = config.port,
        token_ttl_days = config.token_ttl_days,
        log_format = %config.log.format,
        "configuration loaded"
    );

    let store = store::connect(&config.database_url).map_err(|e| io::Error::other(e.to_string()))?;
    let tokens = Tokens::new(&config.jwt_secret, Duration::days(config.token_ttl_days));
    let state = web::Data::new(AppState::new(store, tokens, config.bcrypt_cost));

    let address = (config.host.clone(), config.port);
    info!("Binding to {}:{}", address.0, address.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
    })
    .bind(address)?
    .run()
    .await
}
