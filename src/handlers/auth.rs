use actix_web::{web, HttpResponse};

use crate::auth::{self as accounts, AuthUser};
use crate::error::AppError;
use crate::models::{LoginRequest, PublicUser, RegisterRequest};
use crate::AppState;

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let tokens = state.tokens.clone();
    let cost = state.bcrypt_cost;

    let response = state
        .run(move |store| accounts::register(store, &tokens, cost, request))
        .await?;
    Ok(HttpResponse::Created().json(response))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let tokens = state.tokens.clone();

    let response = state
        .run(move |store| accounts::login(store, &tokens, request))
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn me(AuthUser(user): AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(PublicUser::from(&user))
}
