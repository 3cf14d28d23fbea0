use actix_web::{web, HttpResponse};

use crate::auth::AuthUser;
use crate::cart;
use crate::error::AppError;
use crate::models::{AddItemRequest, UpdateItemRequest};
use crate::AppState;

pub async fn get(state: web::Data<AppState>, AuthUser(user): AuthUser) -> Result<HttpResponse, AppError> {
    let view = state.run(move |store| cart::get_cart(store, user.id)).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn add(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let view = state
        .run(move |store| cart::add_item(store, user.id, request))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn update(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let view = state
        .run(move |store| cart::update_item(store, user.id, request))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn remove(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    book_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let book_id = book_id.into_inner();
    let view = state
        .run(move |store| cart::remove_item(store, user.id, &book_id))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}
