//! Accounts, bearer tokens and the request guards built on them.
//!
//! Tokens carry the user id and the role at issue time, but guards always
//! reload the user and take the role from the store, so a promotion or
//! demotion applies to the next request without a new login.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{
    AuthResponse, LoginRequest, NewUser, PublicUser, RegisterRequest, Role, User, UserId,
};
use crate::store::Store;
use crate::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))
    }
}

/// Signing keys and lifetime for issued tokens.
#[derive(Clone)]
pub struct Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Tokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Tokens {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AppError::server)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token verification failed");
                AppError::unauthorized("Not authorized, token failed")
            })
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    Ok(verify(password, password_hash)?)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn register(
    store: &dyn Store,
    tokens: &Tokens,
    cost: u32,
    request: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        required(&request.name),
        required(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Please provide all required fields"));
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let email = normalize_email(email);
    if store.find_user_by_email(&email)?.is_some() {
        return Err(AppError::validation("User already exists with this email"));
    }

    let user = store.create_user(NewUser {
        name: name.to_string(),
        email,
        password_hash: hash_password(password, cost)?,
        role: Role::User,
    })?;
    info!(email = %user.email, "user registered");

    Ok(AuthResponse {
        token: tokens.issue(&user)?,
        user: PublicUser::from(&user),
    })
}

/// Verifies credentials. With `loginType: "admin"` the account must also be
/// an admin; that check only runs once the password is known to be right.
pub fn login(store: &dyn Store, tokens: &Tokens, request: LoginRequest) -> Result<AuthResponse, AppError> {
    let (Some(email), Some(password)) = (
        required(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Please provide email and password"));
    };

    let email = normalize_email(email);
    let Some(user) = store.find_user_by_email(&email)? else {
        warn!(%email, "login failed: unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(%email, "login failed: wrong password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    if request.wants_admin() && !user.role.is_admin() {
        warn!(%email, role = %user.role, "admin login refused");
        return Err(AppError::AdminLoginDenied { role: user.role });
    }

    info!(%email, role = %user.role, "login successful");
    Ok(AuthResponse {
        token: tokens.issue(&user)?,
        user: PublicUser::from(&user),
    })
}

/// Resolves a bearer token to the current user record.
pub fn authenticate(store: &dyn Store, tokens: &Tokens, token: &str) -> Result<User, AppError> {
    let claims = tokens.verify(token)?;
    store
        .find_user(claims.user_id()?)?
        .ok_or_else(|| AppError::unauthorized("User not found"))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Guard for routes that need a signed-in user.
#[derive(Debug)]
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| AppError::server("application state is not configured"))?;
            let token = token.ok_or_else(|| AppError::unauthorized("Not authorized, no token provided"))?;

            let tokens = state.tokens.clone();
            let user = state
                .run(move |store| authenticate(store, &tokens, &token))
                .await?;
            debug!(email = %user.email, role = %user.role, "authenticated request");
            Ok(AuthUser(user))
        })
    }
}

/// Guard for admin-only routes, layered on [`AuthUser`].
#[derive(Debug)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = AuthUser::from_request(req, payload);

        Box::pin(async move {
            let AuthUser(user) = user.await?;
            if !user.role.is_admin() {
                warn!(email = %user.email, role = %user.role, "admin access denied");
                return Err(AppError::AdminOnly { role: user.role });
            }
            Ok(AdminUser(user))
        })
    }
}
