pub mod query;
pub mod seed;
pub mod validation;

use tracing::info;

use crate::error::AppError;
use crate::models::{Book, BookId, BookList, BookPayload, UserId};
use crate::store::Store;

use self::query::{CatalogQuery, ListParams};
use self::validation::{build_new_book, EntryPoint};

/// Path ids that aren't numbers can't name a book, so they are reported as
/// missing rather than malformed.
fn parse_id(raw: &str) -> Result<BookId, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::not_found("Book not found"))
}

pub fn list_books(store: &dyn Store, params: &ListParams) -> Result<BookList, AppError> {
    let query = CatalogQuery::from_params(params)?;
    Ok(store.find_books(&query)?.into())
}

pub fn list_all_books(store: &dyn Store) -> Result<BookList, AppError> {
    Ok(store.find_books(&CatalogQuery::all())?.into())
}

pub fn list_books_by(store: &dyn Store, user: UserId) -> Result<BookList, AppError> {
    Ok(store.find_books(&CatalogQuery::created_by(user))?.into())
}

pub fn get_book(store: &dyn Store, id: &str) -> Result<Book, AppError> {
    store
        .find_book(parse_id(id)?)?
        .ok_or_else(|| AppError::not_found("Book not found"))
}

pub fn create_book(
    store: &dyn Store,
    payload: BookPayload,
    entry: EntryPoint,
    owner: UserId,
) -> Result<Book, AppError> {
    let book = build_new_book(payload, entry, Some(owner))?;
    let book = store.insert_book(book)?;
    info!(id = book.id, title = %book.title, owner, ?entry, "book created");
    Ok(book)
}

pub fn delete_book(store: &dyn Store, id: &str) -> Result<(), AppError> {
    let id = parse_id(id)?;
    if !store.delete_book(id)? {
        return Err(AppError::not_found("Book not found"));
    }
    info!(id, "book deleted");
    Ok(())
}
