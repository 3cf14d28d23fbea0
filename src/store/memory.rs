use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{check_new_book, BookStore, CartStore, UserStore};
use crate::catalog::query::CatalogQuery;
use crate::error::StoreError;
use crate::models::{Book, BookId, Cart, NewBook, NewUser, Role, User, UserId};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    books: Vec<Book>,
    carts: HashMap<UserId, Cart>,
    next_user_id: UserId,
    next_book_id: BookId,
}

/// In-process store for tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl UserStore for MemoryStore {
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("User already exists with this email".into()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.clone())
    }

    fn set_role(&self, email: &str, role: Role) -> Result<Option<User>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.users.iter_mut().find(|u| u.email == email).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

impl BookStore for MemoryStore {
    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        check_new_book(&book)?;

        let mut tables = self.write()?;
        tables.next_book_id += 1;
        let book = book.into_book(tables.next_book_id, Utc::now());
        tables.books.push(book.clone());
        Ok(book)
    }

    fn find_book(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.read()?.books.iter().find(|b| b.id == id).cloned())
    }

    fn find_books(&self, query: &CatalogQuery) -> Result<Vec<Book>, StoreError> {
        Ok(query.apply(&self.read()?.books))
    }

    fn find_books_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .read()?
            .books
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    fn delete_book(&self, id: BookId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let before = tables.books.len();
        tables.books.retain(|b| b.id != id);
        Ok(tables.books.len() != before)
    }

    fn delete_all_books(&self) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let removed = tables.books.len() as u64;
        tables.books.clear();
        Ok(removed)
    }
}

impl CartStore for MemoryStore {
    fn find_cart(&self, user: UserId) -> Result<Option<Cart>, StoreError> {
        Ok(self.read()?.carts.get(&user).cloned())
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        self.write()?.carts.insert(cart.user_id, cart.clone());
        Ok(())
    }
}
