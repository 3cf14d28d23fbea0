//! Translates `GET /api/books` parameters into a store-independent query.
//!
//! A query is a conjunction of [`Condition`]s plus a [`SortOrder`]. Stores
//! either evaluate conditions against records ([`Condition::matches`]) or
//! render them into their own query language.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Book, UserId};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring match on title OR author. The needle is
    /// stored lower-cased.
    TitleOrAuthorContains(String),
    /// Exact match on the genre, including records that only carry the
    /// legacy category field.
    GenreIs(String),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    LanguageIs(String),
    CreatedBy(UserId),
}

impl Condition {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Condition::TitleOrAuthorContains(needle) => {
                book.title.to_lowercase().contains(needle.as_str())
                    || book.author.to_lowercase().contains(needle.as_str())
            }
            Condition::GenreIs(genre) => book.genre.label() == genre,
            Condition::PriceAtLeast(min) => book.price >= *min,
            Condition::PriceAtMost(max) => book.price <= *max,
            Condition::LanguageIs(language) => &book.language == language,
            Condition::CreatedBy(user) => book.created_by == Some(*user),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Unknown keys fall back to newest first.
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some("price-asc") => SortOrder::PriceAsc,
            Some("price-desc") => SortOrder::PriceDesc,
            _ => SortOrder::Newest,
        }
    }

    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortOrder::Newest => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            SortOrder::PriceAsc => a.price.total_cmp(&b.price).then(a.id.cmp(&b.id)),
            SortOrder::PriceDesc => b.price.total_cmp(&a.price).then(a.id.cmp(&b.id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub conditions: Vec<Condition>,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Every book, newest first.
    pub fn all() -> Self {
        CatalogQuery::default()
    }

    pub fn created_by(user: UserId) -> Self {
        CatalogQuery {
            conditions: vec![Condition::CreatedBy(user)],
            sort: SortOrder::Newest,
        }
    }

    /// Builds the query for a listing request. Empty parameters are ignored;
    /// price bounds that aren't numbers are rejected.
    pub fn from_params(params: &ListParams) -> Result<Self, AppError> {
        let mut conditions = Vec::new();
        let mut errors = Vec::new();

        if let Some(search) = present(&params.search) {
            conditions.push(Condition::TitleOrAuthorContains(search.to_lowercase()));
        }
        if let Some(genre) = present(&params.genre) {
            conditions.push(Condition::GenreIs(genre.to_string()));
        }
        match parse_bound("minPrice", &params.min_price) {
            Ok(Some(min)) => conditions.push(Condition::PriceAtLeast(min)),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
        match parse_bound("maxPrice", &params.max_price) {
            Ok(Some(max)) => conditions.push(Condition::PriceAtMost(max)),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
        if let Some(language) = present(&params.language) {
            conditions.push(Condition::LanguageIs(language.to_string()));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors.join(", ")));
        }

        Ok(CatalogQuery {
            conditions,
            sort: SortOrder::from_key(params.sort_by.as_deref()),
        })
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.conditions.iter().all(|condition| condition.matches(book))
    }

    /// Filters and orders `books` in memory.
    pub fn apply<'a, I>(&self, books: I) -> Vec<Book>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        let mut matched: Vec<Book> = books
            .into_iter()
            .filter(|book| self.matches(book))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));
        matched
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, value: &Option<String>) -> Result<Option<f64>, String> {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(bound) if bound.is_finite() => Ok(Some(bound)),
        _ => Err(format!("{name} must be a number")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::Genre;

    fn book(id: u64, title: &str, author: &str, genre: Genre, price: f64) -> Book {
        Book {
            id,
            title: title.into(),
            author: author.into(),
            description: "d".into(),
            genre,
            language: "English".into(),
            price,
            min_price: None,
            max_price: None,
            stock: 10,
            image_url: None,
            rating: 4.0,
            created_by: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::minutes(id as i64),
        }
    }

    fn catalog() -> Vec<Book> {
        vec![
            book(1, "The Immortals of Meluha", "Amish Tripathi", Genre::Mythical, 299.0),
            book(2, "The White Tiger", "Aravind Adiga", Genre::Fiction, 399.0),
            book(3, "The Guide", "R.K. Narayan", Genre::Fiction, 349.0),
            book(4, "Wings of Fire", "A.P.J. Abdul Kalam", Genre::Biography, 250.0),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => params.search = value,
                "genre" => params.genre = value,
                "minPrice" => params.min_price = value,
                "maxPrice" => params.max_price = value,
                "language" => params.language = value,
                "sortBy" => params.sort_by = value,
                other => panic!("unknown param {other}"),
            }
        }
        params
    }

    fn ids(books: &[Book]) -> Vec<u64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn empty_params_list_everything_newest_first() {
        let query = CatalogQuery::from_params(&ListParams::default()).unwrap();
        assert!(query.conditions.is_empty());
        assert_eq!(ids(&query.apply(&catalog())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_or_author() {
        let query = CatalogQuery::from_params(&params(&[("search", "NARAYAN")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![3]);

        let query = CatalogQuery::from_params(&params(&[("search", "the")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![3, 2, 1]);
    }

    #[test]
    fn search_and_genre_are_conjoined() {
        let query = CatalogQuery::from_params(&params(&[("search", "the"), ("genre", "Fiction")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![3, 2]);
    }

    #[test]
    fn price_bounds_apply_independently() {
        let query = CatalogQuery::from_params(&params(&[("minPrice", "300")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![3, 2]);

        let query = CatalogQuery::from_params(&params(&[("maxPrice", "299")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![4, 1]);

        let query = CatalogQuery::from_params(&params(&[("minPrice", "250"), ("maxPrice", "299")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![4, 1]);
    }

    #[test]
    fn non_numeric_bounds_are_rejected() {
        let err = CatalogQuery::from_params(&params(&[("minPrice", "cheap"), ("maxPrice", "NaN")])).unwrap_err();
        assert_eq!(err.to_string(), "minPrice must be a number, maxPrice must be a number");
    }

    #[test]
    fn empty_strings_are_ignored() {
        let query = CatalogQuery::from_params(&params(&[("search", ""), ("minPrice", ""), ("genre", "")])).unwrap();
        assert!(query.conditions.is_empty());
    }

    #[test]
    fn blank_bounds_are_ignored() {
        let query = CatalogQuery::from_params(&params(&[("minPrice", " "), ("maxPrice", "\t")])).unwrap();
        assert!(query.conditions.is_empty());

        let query = CatalogQuery::from_params(&params(&[("minPrice", " 300 ")])).unwrap();
        assert_eq!(query.conditions, vec![Condition::PriceAtLeast(300.0)]);
    }

    #[test]
    fn sort_keys() {
        let query = CatalogQuery::from_params(&params(&[("sortBy", "price-asc")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![4, 1, 3, 2]);

        let query = CatalogQuery::from_params(&params(&[("sortBy", "price-desc")])).unwrap();
        assert_eq!(ids(&query.apply(&catalog())), vec![2, 3, 1, 4]);

        let query = CatalogQuery::from_params(&params(&[("sortBy", "rating")])).unwrap();
        assert_eq!(query.sort, SortOrder::Newest);
    }

    #[test]
    fn language_is_exact() {
        let query = CatalogQuery::from_params(&params(&[("language", "english")])).unwrap();
        assert!(query.apply(&catalog()).is_empty());
    }
}
