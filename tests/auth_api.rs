#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, book_json, TestContext, PASSWORD};

#[actix_rt::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (status, body) = send!(app, TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bookstore API is running");
}

#[actix_rt::test]
async fn test_register_login_and_me() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (id, token) = register_user!(app, "reader@example.com");

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "Reader@Example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], id);
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().is_some());
    assert!(body.get("password").is_none(), "password hash must not leak");

    let (status, body) = send!(
        app,
        TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "_id": id, "name": "Reader", "email": "reader@example.com", "role": "user" })
    );
}

#[actix_rt::test]
async fn test_register_rejects_duplicates_and_missing_fields() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    register_user!(app, "reader@example.com");

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "name": "Again", "email": "reader@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists with this email");

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "other@example.com" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields");
}

#[actix_rt::test]
async fn test_login_failures() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    register_user!(app, "reader@example.com");

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "reader@example.com", "password": "not-it" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "nobody@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "reader@example.com" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide email and password");
}

#[actix_rt::test]
async fn test_admin_login_mode() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    register_user!(app, "reader@example.com");

    let admin_login = json!({ "email": "reader@example.com", "password": PASSWORD, "loginType": "admin" });

    let (status, body) = send!(app, TestRequest::post().uri("/api/auth/login").set_json(&admin_login));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admin privileges required.");
    assert_eq!(body["role"], "user");

    let wrong_password = json!({ "email": "reader@example.com", "password": "nope!!", "loginType": "admin" });
    let (status, _) = send!(app, TestRequest::post().uri("/api/auth/login").set_json(&wrong_password));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.promote("reader@example.com");
    let (status, body) = send!(app, TestRequest::post().uri("/api/auth/login").set_json(&admin_login));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[actix_rt::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let (status, body) = send!(app, TestRequest::get().uri("/api/cart"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token provided");

    let (status, body) = send!(
        app,
        TestRequest::get().uri("/api/auth/me").insert_header(bearer("not.a.token"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[actix_rt::test]
async fn test_token_for_deleted_account_is_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, token) = register_user!(app, "reader@example.com");

    // Same secret, fresh store: the token verifies but the user is gone.
    let other = TestContext::new();
    let other_app = init_app!(other);
    let (status, body) = send!(
        other_app,
        TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");
}

#[actix_rt::test]
async fn test_user_token_is_forbidden_on_admin_routes() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, token) = register_user!(app, "reader@example.com");

    let admin_requests = vec![
        TestRequest::get().uri("/api/admin/books"),
        TestRequest::post()
            .uri("/api/admin/books")
            .set_json(book_json("X", "Fiction", 100.0)),
        TestRequest::delete().uri("/api/books/1"),
    ];
    for req in admin_requests {
        let (status, body) = send!(app, req.insert_header(bearer(&token)));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Admin access only");
        assert_eq!(body["userRole"], "user");
    }

    let user_requests = vec![
        TestRequest::get().uri("/api/auth/me"),
        TestRequest::get().uri("/api/cart"),
        TestRequest::get().uri("/api/books/my"),
    ];
    for req in user_requests {
        let (status, _) = send!(app, req.insert_header(bearer(&token)));
        assert_eq!(status, StatusCode::OK);
    }
}

#[actix_rt::test]
async fn test_role_change_applies_without_new_login() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, token) = register_user!(app, "reader@example.com");

    let (status, _) = send!(
        app,
        TestRequest::get().uri("/api/admin/books").insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.promote("reader@example.com");

    let (status, body) = send!(
        app,
        TestRequest::get().uri("/api/admin/books").insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}
