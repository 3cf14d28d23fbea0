use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::{AdminUser, AuthUser};
use crate::catalog::{self, query::ListParams, validation::EntryPoint};
use crate::error::AppError;
use crate::models::BookPayload;
use crate::AppState;

pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let books = state
        .run(move |store| catalog::list_books(store, &params))
        .await?;
    Ok(HttpResponse::Ok().json(books))
}

pub async fn get(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let book = state.run(move |store| catalog::get_book(store, &id)).await?;
    Ok(HttpResponse::Ok().json(book))
}

pub async fn create(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<BookPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();
    let book = state
        .run(move |store| catalog::create_book(store, payload, EntryPoint::Publish, user.id))
        .await?;
    Ok(HttpResponse::Created().json(book))
}

pub async fn mine(state: web::Data<AppState>, AuthUser(user): AuthUser) -> Result<HttpResponse, AppError> {
    let books = state
        .run(move |store| catalog::list_books_by(store, user.id))
        .await?;
    Ok(HttpResponse::Ok().json(books))
}

pub async fn delete(
    state: web::Data<AppState>,
    _admin: AdminUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    state.run(move |store| catalog::delete_book(store, &id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Book removed" })))
}
