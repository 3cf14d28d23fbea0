use actix_web::{web, HttpResponse};

use crate::auth::AdminUser;
use crate::catalog::{self, validation::EntryPoint};
use crate::error::AppError;
use crate::models::BookPayload;
use crate::AppState;

pub async fn list_books(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
    let books = state.run(catalog::list_all_books).await?;
    Ok(HttpResponse::Ok().json(books))
}

pub async fn create_book(
    state: web::Data<AppState>,
    AdminUser(admin): AdminUser,
    body: web::Json<BookPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();
    let book = state
        .run(move |store| catalog::create_book(store, payload, EntryPoint::Admin, admin.id))
        .await?;
    Ok(HttpResponse::Created().json(book))
}
