use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::{Book, BookId};
use super::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub book_id: BookId,
    pub quantity: u32,
}

/// One cart per user, items kept in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn empty(user_id: UserId) -> Self {
        let now = Utc::now();
        Cart {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item(&self, book_id: BookId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.book_id == book_id)
    }

    pub fn book_ids(&self) -> Vec<BookId> {
        self.items.iter().map(|item| item.book_id).collect()
    }
}

/// A cart with its book references replaced by the book records. A book
/// deleted after it was added shows up as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    #[serde(rename = "bookId")]
    pub book: Option<Book>,
    pub quantity: u32,
}

/// A book reference as sent by clients: either the numeric `_id` or its string
/// form taken from a URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BookRef {
    Id(BookId),
    Text(String),
}

impl BookRef {
    /// `None` when the reference can't name any book.
    pub fn resolve(&self) -> Option<BookId> {
        match self {
            BookRef::Id(id) => Some(*id),
            BookRef::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub book_id: Option<BookRef>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub book_id: Option<BookRef>,
    pub quantity: Option<i64>,
}
