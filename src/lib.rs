//! Bookstore REST API: catalog browsing, accounts, per-user carts and admin
//! book management over a pluggable store.

use std::sync::Arc;

use actix_web::web;

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod store;

use auth::Tokens;
use error::AppError;
use store::Store;

/// Shared by every worker. Holds no mutable state of its own.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Tokens,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: Tokens, bcrypt_cost: u32) -> Self {
        AppState {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// Runs blocking store work (and password hashing) off the async workers.
    pub async fn run<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        web::block(move || f(store.as_ref())).await?
    }
}
