//! Per-user carts and the stock rules applied when they change.
//!
//! Quantities are checked against a book's stock only when the cart is
//! mutated. Later stock changes don't shrink existing items.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;
use crate::models::{AddItemRequest, Book, BookId, BookRef, Cart, CartItem, CartLine, CartView, UpdateItemRequest, UserId};
use crate::store::Store;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Insufficient stock available")]
    InsufficientStock,

    #[error("Item not found in cart")]
    NotInCart,
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidQuantity | CartError::InsufficientStock => AppError::Validation(err.to_string()),
            CartError::NotInCart => AppError::NotFound(err.to_string()),
        }
    }
}

impl Cart {
    /// Adds `quantity` copies of `book`, merging with an existing item. The
    /// cart is untouched when the merged quantity would exceed stock.
    pub fn add(&mut self, book: &Book, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let existing = self.item(book.id).map_or(0, |item| item.quantity);
        let requested = existing
            .checked_add(quantity)
            .ok_or(CartError::InsufficientStock)?;
        if requested > book.stock {
            return Err(CartError::InsufficientStock);
        }

        match self.items.iter_mut().find(|item| item.book_id == book.id) {
            Some(item) => item.quantity = requested,
            None => self.items.push(CartItem {
                book_id: book.id,
                quantity,
            }),
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the quantity of an existing item.
    pub fn update(&mut self, book: &Book, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity > book.stock {
            return Err(CartError::InsufficientStock);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.book_id == book.id)
            .ok_or(CartError::NotInCart)?;
        item.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drops the item for `book_id`, if any. Returns whether it was present.
    pub fn remove(&mut self, book_id: BookId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.book_id != book_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

fn requested_quantity(raw: i64) -> Result<u32, CartError> {
    if raw < 1 {
        return Err(CartError::InvalidQuantity);
    }
    Ok(u32::try_from(raw).unwrap_or(u32::MAX))
}

fn find_book(store: &dyn Store, book: &BookRef) -> Result<Book, AppError> {
    let not_found = || AppError::not_found("Book not found");
    let id = book.resolve().ok_or_else(not_found)?;
    store.find_book(id)?.ok_or_else(not_found)
}

fn load_or_create(store: &dyn Store, user: UserId) -> Result<Cart, AppError> {
    if let Some(cart) = store.find_cart(user)? {
        return Ok(cart);
    }
    let cart = Cart::empty(user);
    store.save_cart(&cart)?;
    debug!(user, "created cart");
    Ok(cart)
}

/// Replaces book references with the current book records.
pub fn populate(store: &dyn Store, cart: Cart) -> Result<CartView, AppError> {
    let mut books: HashMap<BookId, Book> = store
        .find_books_by_ids(&cart.book_ids())?
        .into_iter()
        .map(|book| (book.id, book))
        .collect();

    let items = cart
        .items
        .iter()
        .map(|item| CartLine {
            book: books.remove(&item.book_id),
            quantity: item.quantity,
        })
        .collect();

    Ok(CartView {
        user_id: cart.user_id,
        items,
        created_at: cart.created_at,
        updated_at: cart.updated_at,
    })
}

pub fn get_cart(store: &dyn Store, user: UserId) -> Result<CartView, AppError> {
    let cart = load_or_create(store, user)?;
    populate(store, cart)
}

pub fn add_item(store: &dyn Store, user: UserId, request: AddItemRequest) -> Result<CartView, AppError> {
    let book_ref = request
        .book_id
        .ok_or_else(|| AppError::validation("Book ID is required"))?;
    let quantity = requested_quantity(request.quantity.unwrap_or(1))?;

    let book = find_book(store, &book_ref)?;
    if quantity > book.stock {
        return Err(CartError::InsufficientStock.into());
    }

    let mut cart = load_or_create(store, user)?;
    cart.add(&book, quantity)?;
    store.save_cart(&cart)?;
    debug!(user, book = book.id, quantity, "added to cart");

    populate(store, cart)
}

pub fn update_item(store: &dyn Store, user: UserId, request: UpdateItemRequest) -> Result<CartView, AppError> {
    let (Some(book_ref), Some(quantity)) = (request.book_id, request.quantity) else {
        return Err(AppError::validation("Book ID and quantity are required"));
    };
    let quantity = requested_quantity(quantity)?;

    let book = find_book(store, &book_ref)?;
    if quantity > book.stock {
        return Err(CartError::InsufficientStock.into());
    }

    let mut cart = store
        .find_cart(user)?
        .ok_or_else(|| AppError::not_found("Cart not found"))?;
    cart.update(&book, quantity)?;
    store.save_cart(&cart)?;
    debug!(user, book = book.id, quantity, "updated cart item");

    populate(store, cart)
}

/// Removing something that isn't in the cart is not an error.
pub fn remove_item(store: &dyn Store, user: UserId, book: &str) -> Result<CartView, AppError> {
    let mut cart = load_or_create(store, user)?;
    let removed = BookRef::Text(book.to_string())
        .resolve()
        .is_some_and(|id| cart.remove(id));
    if removed {
        store.save_cart(&cart)?;
        debug!(user, book, "removed from cart");
    }

    populate(store, cart)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn book(id: BookId, stock: u32) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: "Author".into(),
            description: "Description".into(),
            genre: crate::models::Genre::Fiction,
            language: "English".into(),
            price: 100.0,
            min_price: None,
            max_price: None,
            stock,
            image_url: None,
            rating: 4.0,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_item() {
        let mut cart = Cart::empty(1);
        let book = book(7, 10);

        cart.add(&book, 3).unwrap();
        cart.add(&book, 4).unwrap();

        assert_eq!(cart.items, vec![CartItem { book_id: 7, quantity: 7 }]);
    }

    #[test]
    fn add_over_stock_leaves_cart_unchanged() {
        let mut cart = Cart::empty(1);
        let book = book(7, 5);
        cart.add(&book, 3).unwrap();
        let before = cart.clone();

        assert_eq!(cart.add(&book, 3), Err(CartError::InsufficientStock));
        assert_eq!(cart, before);

        let mut empty = Cart::empty(1);
        assert_eq!(empty.add(&book, 6), Err(CartError::InsufficientStock));
        assert!(empty.items.is_empty());
    }

    #[test]
    fn items_keep_insertion_order() {
        let mut cart = Cart::empty(1);
        cart.add(&book(2, 5), 1).unwrap();
        cart.add(&book(1, 5), 1).unwrap();
        cart.add(&book(2, 5), 1).unwrap();

        assert_eq!(cart.book_ids(), vec![2, 1]);
    }

    #[test]
    fn update_replaces_quantity() {
        let mut cart = Cart::empty(1);
        let book = book(7, 10);
        cart.add(&book, 3).unwrap();

        cart.update(&book, 8).unwrap();
        assert_eq!(cart.item(7).map(|i| i.quantity), Some(8));

        assert_eq!(cart.update(&book, 0), Err(CartError::InvalidQuantity));
        assert_eq!(cart.update(&book, 11), Err(CartError::InsufficientStock));
        assert_eq!(cart.item(7).map(|i| i.quantity), Some(8));
    }

    #[test]
    fn update_requires_existing_item() {
        let mut cart = Cart::empty(1);
        assert_eq!(cart.update(&book(7, 10), 1), Err(CartError::NotInCart));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::empty(1);
        cart.add(&book(7, 10), 1).unwrap();

        assert!(cart.remove(7));
        assert!(!cart.remove(7));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn requested_quantity_must_be_positive() {
        assert_eq!(requested_quantity(0), Err(CartError::InvalidQuantity));
        assert_eq!(requested_quantity(-2), Err(CartError::InvalidQuantity));
        assert_eq!(requested_quantity(3), Ok(3));
    }
}
