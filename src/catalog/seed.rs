//! Sample catalog loaded by `bookstore-admin seed`.

use tracing::info;

use crate::error::AppError;
use crate::models::book::DEFAULT_LANGUAGE;
use crate::models::{Genre, NewBook};
use crate::store::Store;

struct Sample {
    title: &'static str,
    author: &'static str,
    genre: Genre,
    price: f64,
    rating: f64,
    stock: u32,
}

const SAMPLES: &[Sample] = &[
    Sample { title: "The Immortals of Meluha", author: "Amish Tripathi", genre: Genre::Mythical, price: 299.0, rating: 4.5, stock: 50 },
    Sample { title: "The Secret of the Nagas", author: "Amish Tripathi", genre: Genre::Mythical, price: 299.0, rating: 4.4, stock: 45 },
    Sample { title: "The Oath of the Vayuputras", author: "Amish Tripathi", genre: Genre::Mythical, price: 299.0, rating: 4.3, stock: 40 },
    Sample { title: "The Palace of Illusions", author: "Chitra Banerjee Divakaruni", genre: Genre::Mythical, price: 349.0, rating: 4.6, stock: 55 },
    Sample { title: "The White Tiger", author: "Aravind Adiga", genre: Genre::Fiction, price: 399.0, rating: 4.2, stock: 52 },
    Sample { title: "The God of Small Things", author: "Arundhati Roy", genre: Genre::Fiction, price: 449.0, rating: 4.3, stock: 47 },
    Sample { title: "A Suitable Boy", author: "Vikram Seth", genre: Genre::Fiction, price: 599.0, rating: 4.4, stock: 43 },
    Sample { title: "The Guide", author: "R.K. Narayan", genre: Genre::Fiction, price: 349.0, rating: 4.4, stock: 49 },
    Sample { title: "Wings of Fire", author: "A.P.J. Abdul Kalam", genre: Genre::Biography, price: 399.0, rating: 4.7, stock: 65 },
    Sample { title: "My Experiments with Truth", author: "Mahatma Gandhi", genre: Genre::Biography, price: 349.0, rating: 4.6, stock: 58 },
    Sample { title: "The Discovery of India", author: "Jawaharlal Nehru", genre: Genre::History, price: 499.0, rating: 4.5, stock: 44 },
    Sample { title: "The Argumentative Indian", author: "Amartya Sen", genre: Genre::NonFiction, price: 449.0, rating: 4.3, stock: 46 },
    Sample { title: "Gitanjali", author: "Rabindranath Tagore", genre: Genre::Fiction, price: 199.0, rating: 4.8, stock: 62 },
    Sample { title: "Midnight's Children", author: "Salman Rushdie", genre: Genre::Fiction, price: 549.0, rating: 4.4, stock: 41 },
];

/// `/images/books/<slug>.jpg`, the path the client serves covers from.
fn cover_path(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    format!("/images/books/{slug}.jpg")
}

pub fn sample_books() -> Vec<NewBook> {
    SAMPLES
        .iter()
        .map(|sample| NewBook {
            title: sample.title.to_string(),
            author: sample.author.to_string(),
            description: format!("{} by {}.", sample.title, sample.author),
            genre: sample.genre,
            language: DEFAULT_LANGUAGE.to_string(),
            price: sample.price,
            min_price: None,
            max_price: None,
            stock: sample.stock,
            image_url: Some(cover_path(sample.title)),
            rating: sample.rating,
            created_by: None,
        })
        .collect()
}

/// Clears the catalog and inserts the sample books. Returns how many were
/// inserted.
pub fn seed(store: &dyn Store) -> Result<usize, AppError> {
    let removed = store.delete_all_books()?;
    info!(removed, "cleared existing books");

    let books = sample_books();
    let count = books.len();
    for book in books {
        store.insert_book(book)?;
    }
    info!(count, "seeded books");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::CatalogQuery;
    use crate::store::{BookStore, MemoryStore};

    #[test]
    fn cover_paths_are_slugged() {
        assert_eq!(cover_path("Midnight's Children"), "/images/books/midnight-s-children.jpg");
        assert_eq!(cover_path("A Suitable Boy"), "/images/books/a-suitable-boy.jpg");
    }

    #[test]
    fn seeding_replaces_the_catalog() {
        let store = MemoryStore::new();
        seed(&store).unwrap();
        let count = seed(&store).unwrap();

        assert_eq!(store.find_books(&CatalogQuery::all()).unwrap().len(), count);
    }
}
