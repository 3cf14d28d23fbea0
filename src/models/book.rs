use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::user::UserId;

pub type BookId = u64;

pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_STOCK: u32 = 50;
pub const DEFAULT_RATING: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    Mythical,
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Biography,
    History,
    Romance,
    Thriller,
    #[serde(rename = "Self-Help")]
    SelfHelp,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::Mythical,
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Biography,
        Genre::History,
        Genre::Romance,
        Genre::Thriller,
        Genre::SelfHelp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Mythical => "Mythical",
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Biography => "Biography",
            Genre::History => "History",
            Genre::Romance => "Romance",
            Genre::Thriller => "Thriller",
            Genre::SelfHelp => "Self-Help",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .find(|genre| genre.label() == s)
            .copied()
            .ok_or_else(|| {
                let labels: Vec<&str> = Genre::ALL.iter().map(Genre::label).collect();
                format!("genre must be one of {}", labels.join(", "))
            })
    }
}

/// A catalog record.
///
/// Older records used `category` for the genre and `image` for the cover
/// reference. Only the canonical fields are held here; the aliases are
/// produced when the record is serialized, so both names always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: Genre,
    pub language: String,
    pub price: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub rating: f64,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument<'a> {
    #[serde(rename = "_id")]
    id: BookId,
    title: &'a str,
    author: &'a str,
    description: &'a str,
    genre: Genre,
    category: Genre,
    language: &'a str,
    price: f64,
    min_price: Option<f64>,
    max_price: Option<f64>,
    stock: u32,
    image_url: Option<&'a str>,
    image: Option<&'a str>,
    rating: f64,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookDocument {
            id: self.id,
            title: &self.title,
            author: &self.author,
            description: &self.description,
            genre: self.genre,
            category: self.genre,
            language: &self.language,
            price: self.price,
            min_price: self.min_price,
            max_price: self.max_price,
            stock: self.stock,
            image_url: self.image_url.as_deref(),
            image: self.image_url.as_deref(),
            rating: self.rating,
            created_by: self.created_by,
            created_at: self.created_at,
        }
        .serialize(serializer)
    }
}

/// A validated book ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: Genre,
    pub language: String,
    pub price: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub rating: f64,
    pub created_by: Option<UserId>,
}

impl NewBook {
    /// Save-time check every store runs before writing. A bound of zero is
    /// treated as unset.
    pub fn check_price_bounds(&self) -> Result<(), String> {
        let min = self.min_price.filter(|v| *v > 0.0);
        let max = self.max_price.filter(|v| *v > 0.0);

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err("Minimum price cannot be greater than maximum price".into());
            }
        }
        if let Some(min) = min {
            if self.price < min {
                return Err("Price cannot be less than minimum price".into());
            }
        }
        if let Some(max) = max {
            if self.price > max {
                return Err("Price cannot be greater than maximum price".into());
            }
        }
        Ok(())
    }

    pub fn into_book(self, id: BookId, created_at: DateTime<Utc>) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            genre: self.genre,
            language: self.language,
            price: self.price,
            min_price: self.min_price,
            max_price: self.max_price,
            stock: self.stock,
            image_url: self.image_url,
            rating: self.rating,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// Incoming create payload. `category` and `image` are accepted as the legacy
/// names of `genre` and `imageUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "category")]
    pub genre: Option<String>,
    pub language: Option<String>,
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stock: Option<i64>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookList {
    pub count: usize,
    pub books: Vec<Book>,
}

impl From<Vec<Book>> for BookList {
    fn from(books: Vec<Book>) -> Self {
        BookList {
            count: books.len(),
            books,
        }
    }
}
