//! Persistence for users, books and carts.
//!
//! Store calls are blocking; handlers run them on the blocking pool. Each call
//! reads or writes one record (a cart is saved as a unit), so there is nothing
//! to roll back across calls. Concurrent writes to the same cart are last
//! write wins.

use std::sync::Arc;

use tracing::info;

use crate::catalog::query::CatalogQuery;
use crate::error::StoreError;
use crate::models::{Book, BookId, Cart, NewBook, NewUser, Role, User, UserId};

mod memory;
mod mysql;

pub use self::memory::MemoryStore;
pub use self::mysql::MySqlStore;

pub const MEMORY_URL: &str = "memory://";

pub trait UserStore {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Returns the updated user, or `None` when no account has that email.
    fn set_role(&self, email: &str, role: Role) -> Result<Option<User>, StoreError>;
}

pub trait BookStore {
    /// Runs [`NewBook::check_price_bounds`] before writing.
    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;
    fn find_book(&self, id: BookId) -> Result<Option<Book>, StoreError>;
    fn find_books(&self, query: &CatalogQuery) -> Result<Vec<Book>, StoreError>;
    /// Books with the given ids, in no particular order. Unknown ids are skipped.
    fn find_books_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, StoreError>;
    /// `false` when there was nothing to delete.
    fn delete_book(&self, id: BookId) -> Result<bool, StoreError>;
    fn delete_all_books(&self) -> Result<u64, StoreError>;
}

pub trait CartStore {
    fn find_cart(&self, user: UserId) -> Result<Option<Cart>, StoreError>;
    /// Replaces the stored cart for `cart.user_id`, creating it if needed.
    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError>;
}

pub trait Store: UserStore + BookStore + CartStore + Send + Sync {}

impl<T> Store for T where T: UserStore + BookStore + CartStore + Send + Sync {}

pub(crate) fn check_new_book(book: &NewBook) -> Result<(), StoreError> {
    book.check_price_bounds().map_err(StoreError::Constraint)
}

/// Opens the store named by `url`: [`MEMORY_URL`] for an in-process store,
/// anything else is handed to MySQL.
pub fn connect(url: &str) -> Result<Arc<dyn Store>, StoreError> {
    if url == MEMORY_URL {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = MySqlStore::connect(url)?;
    store.migrate()?;
    info!("Connected to MySQL");
    Ok(Arc::new(store))
}
