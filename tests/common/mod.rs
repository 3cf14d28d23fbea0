#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use actix_web::web;
use bookstore::auth::Tokens;
use bookstore::models::Role;
use bookstore::store::{MemoryStore, UserStore};
use bookstore::AppState;
use chrono::Duration;
use serde_json::{json, Value};

pub const BCRYPT_COST: u32 = 4;
pub const PASSWORD: &str = "secret123";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = Tokens::new("test-secret", Duration::days(30));
        let state = web::Data::new(AppState::new(store.clone(), tokens, BCRYPT_COST));
        TestContext { store, state }
    }

    pub fn promote(&self, email: &str) {
        self.store
            .set_role(email, Role::Admin)
            .unwrap()
            .expect("user should exist");
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn book_json(title: &str, genre: &str, price: f64) -> Value {
    json!({
        "title": title,
        "author": "Test Author",
        "description": "A test book",
        "genre": genre,
        "price": price,
        "imageUrl": "/images/books/test.jpg",
    })
}

/// Builds the API service around a [`TestContext`].
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .configure(bookstore::handlers::configure),
        )
        .await
    };
}

/// Sends a `TestRequest` and returns the status with the JSON body.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let res = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = res.status();
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        (status, body)
    }};
}

/// Registers an account and returns `(id, token)`.
macro_rules! register_user {
    ($app:expr, $email:expr) => {{
        let (status, body) = send!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(serde_json::json!({
                    "name": "Reader",
                    "email": $email,
                    "password": common::PASSWORD,
                }))
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "register failed: {body}");
        (
            body["_id"].as_u64().expect("id"),
            body["token"].as_str().expect("token").to_string(),
        )
    }};
}

/// Registers an admin account and returns its token.
macro_rules! register_admin {
    ($ctx:expr, $app:expr, $email:expr) => {{
        let (_, token) = register_user!($app, $email);
        $ctx.promote($email);
        token
    }};
}
