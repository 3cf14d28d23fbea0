use crate::error::AppError;
use crate::models::book::{DEFAULT_LANGUAGE, DEFAULT_RATING, DEFAULT_STOCK};
use crate::models::{BookPayload, Genre, NewBook, UserId};

/// Which endpoint a book is created through. Only the admin endpoint insists
/// on a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Publish,
    Admin,
}

/// Returns every rule the payload breaks, in a stable order. An empty list
/// means the payload can be turned into a [`NewBook`].
pub fn validate_book_payload(payload: &BookPayload, entry: EntryPoint) -> Vec<String> {
    let mut errors = Vec::new();

    let required_text = [
        ("title", &payload.title),
        ("author", &payload.author),
        ("description", &payload.description),
        ("genre", &payload.genre),
    ];
    for (field, value) in required_text {
        if blank(value) {
            errors.push(format!("{field} is required"));
        }
    }
    if payload.price.is_none() {
        errors.push("price is required".to_string());
    }
    if entry == EntryPoint::Admin && blank(&payload.image_url) {
        errors.push("imageUrl is required".to_string());
    }

    if let Some(genre) = payload.genre.as_deref().filter(|g| !g.trim().is_empty()) {
        if let Err(e) = genre.trim().parse::<Genre>() {
            errors.push(e);
        }
    }

    let numeric = [
        ("price", payload.price),
        ("stock", payload.stock.map(|s| s as f64)),
        ("minPrice", payload.min_price),
        ("maxPrice", payload.max_price),
    ];
    for (field, value) in numeric {
        if value.is_some_and(|v| v < 0.0) {
            errors.push(format!("{field} cannot be negative"));
        }
    }
    if payload.stock.is_some_and(|s| s > i64::from(u32::MAX)) {
        errors.push("stock is too large".to_string());
    }

    if let (Some(min), Some(max)) = (payload.min_price, payload.max_price) {
        if min > max {
            errors.push("Minimum price cannot exceed maximum price".to_string());
        }
    }

    errors
}

/// Validates the payload and fills in defaults: language, stock, rating and
/// the owning user.
pub fn build_new_book(
    payload: BookPayload,
    entry: EntryPoint,
    owner: Option<UserId>,
) -> Result<NewBook, AppError> {
    let errors = validate_book_payload(&payload, entry);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join(", ")));
    }

    // Presence and shape were checked above.
    let genre = payload
        .genre
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .parse::<Genre>()
        .map_err(AppError::Validation)?;

    Ok(NewBook {
        title: trimmed(payload.title),
        author: trimmed(payload.author),
        description: payload.description.unwrap_or_default(),
        genre,
        language: payload
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        price: payload.price.unwrap_or_default(),
        min_price: payload.min_price,
        max_price: payload.max_price,
        stock: payload
            .stock
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(DEFAULT_STOCK),
        image_url: payload
            .image_url
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty()),
        rating: DEFAULT_RATING,
        created_by: owner,
    })
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
