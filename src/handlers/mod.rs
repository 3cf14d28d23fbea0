//! HTTP layer. Handlers pull the caller out of the request with the
//! [`AuthUser`](crate::auth::AuthUser)/[`AdminUser`](crate::auth::AdminUser)
//! guards, hand the work to the blocking pool and shape the JSON response.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::AppError;

mod admin;
mod auth;
mod books;
mod cart;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/books")
                        .route("", web::get().to(books::list))
                        .route("", web::post().to(books::create))
                        .route("/my", web::get().to(books::mine))
                        .route("/{id}", web::get().to(books::get))
                        .route("/{id}", web::delete().to(books::delete)),
                )
                .service(
                    web::scope("/admin")
                        .route("/books", web::get().to(admin::list_books))
                        .route("/books", web::post().to(admin::create_book)),
                )
                .service(
                    web::scope("/cart")
                        .route("", web::get().to(cart::get))
                        .route("/add", web::post().to(cart::add))
                        .route("/update", web::put().to(cart::update))
                        .route("/remove/{book_id}", web::delete().to(cart::remove)),
                ),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::validation(err.to_string()).into())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Bookstore API is running" }))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::not_found("Route not found"))
}
