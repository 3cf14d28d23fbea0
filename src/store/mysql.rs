use ::mysql::prelude::*;
use ::mysql::{params, Opts, Params, Pool, PooledConn, Row, TxOpts, Value};
use chrono::{DateTime, TimeZone, Utc};

use super::{check_new_book, BookStore, CartStore, UserStore};
use crate::catalog::query::{CatalogQuery, Condition, SortOrder};
use crate::error::StoreError;
use crate::models::{Book, BookId, Cart, CartItem, Genre, NewBook, NewUser, Role, User, UserId};

const SCHEMA: &str = include_str!("schema.sql");

const DUPLICATE_ENTRY: u16 = 1062;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

const BOOK_COLUMNS: &str = "id, title, author, description, \
    COALESCE(genre, category) AS genre, language, price, min_price, max_price, stock, \
    COALESCE(image_url, image) AS image_url, rating, created_by, created_at";

pub struct MySqlStore {
    pool: Pool,
}

impl MySqlStore {
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let opts = Opts::from_url(database_url).map_err(::mysql::Error::from)?;
        let pool = Pool::new(opts)?;
        Ok(MySqlStore { pool })
    }

    /// Creates missing tables. Existing tables are left alone.
    pub fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            conn.query_drop(statement)?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<PooledConn, StoreError> {
        Ok(self.pool.get_conn()?)
    }
}

impl UserStore for MySqlStore {
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.conn()?;
        let created_at = Utc::now();
        let result = conn.exec_drop(
            "INSERT INTO users (name, email, password_hash, role, created_at) \
             VALUES (:name, :email, :password_hash, :role, :created_at)",
            params! {
                "name" => user.name.as_str(),
                "email" => user.email.as_str(),
                "password_hash" => user.password_hash.as_str(),
                "role" => user.role.as_str(),
                "created_at" => created_at.timestamp_millis(),
            },
        );
        match result {
            Ok(()) => {}
            Err(::mysql::Error::MySqlError(e)) if e.code == DUPLICATE_ENTRY => {
                return Err(StoreError::Duplicate("User already exists with this email".into()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id: conn.last_insert_id(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at,
        })
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row: Option<Row> = self.conn()?.exec_first(sql, (id,))?;
        row.map(user_from_row).transpose()
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row: Option<Row> = self.conn()?.exec_first(sql, (email,))?;
        row.map(user_from_row).transpose()
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows: Vec<Row> = self.conn()?.query(sql)?;
        rows.into_iter().map(user_from_row).collect()
    }

    fn set_role(&self, email: &str, role: Role) -> Result<Option<User>, StoreError> {
        self.conn()?
            .exec_drop("UPDATE users SET role = ? WHERE email = ?", (role.as_str(), email))?;
        self.find_user_by_email(email)
    }
}

impl BookStore for MySqlStore {
    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        check_new_book(&book)?;

        let mut conn = self.conn()?;
        let created_at = Utc::now();
        conn.exec_drop(
            "INSERT INTO books (title, author, description, genre, language, price, min_price, \
             max_price, stock, image_url, rating, created_by, created_at) \
             VALUES (:title, :author, :description, :genre, :language, :price, :min_price, \
             :max_price, :stock, :image_url, :rating, :created_by, :created_at)",
            params! {
                "title" => book.title.as_str(),
                "author" => book.author.as_str(),
                "description" => book.description.as_str(),
                "genre" => book.genre.label(),
                "language" => book.language.as_str(),
                "price" => book.price,
                "min_price" => book.min_price,
                "max_price" => book.max_price,
                "stock" => book.stock,
                "image_url" => book.image_url.as_deref(),
                "rating" => book.rating,
                "created_by" => book.created_by,
                "created_at" => created_at.timestamp_millis(),
            },
        )?;

        let id = conn.last_insert_id();
        Ok(book.into_book(id, created_at))
    }

    fn find_book(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?");
        let row: Option<Row> = self.conn()?.exec_first(sql, (id,))?;
        row.map(book_from_row).transpose()
    }

    fn find_books(&self, query: &CatalogQuery) -> Result<Vec<Book>, StoreError> {
        let (clause, values) = where_clause(&query.conditions);
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books{clause} ORDER BY {}",
            order_by(query.sort)
        );
        let rows: Vec<Row> = self.conn()?.exec(sql, positional(values))?;
        rows.into_iter().map(book_from_row).collect()
    }

    fn find_books_by_ids(&self, ids: &[BookId]) -> Result<Vec<Book>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id IN ({placeholders})");
        let values = ids.iter().map(|id| Value::from(*id)).collect();
        let rows: Vec<Row> = self.conn()?.exec(sql, positional(values))?;
        rows.into_iter().map(book_from_row).collect()
    }

    fn delete_book(&self, id: BookId) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        conn.exec_drop("DELETE FROM books WHERE id = ?", (id,))?;
        Ok(conn.affected_rows() > 0)
    }

    fn delete_all_books(&self) -> Result<u64, StoreError> {
        let mut conn = self.conn()?;
        conn.query_drop("DELETE FROM books")?;
        Ok(conn.affected_rows())
    }
}

impl CartStore for MySqlStore {
    fn find_cart(&self, user: UserId) -> Result<Option<Cart>, StoreError> {
        let mut conn = self.conn()?;
        let row: Option<(i64, i64)> =
            conn.exec_first("SELECT created_at, updated_at FROM carts WHERE user_id = ?", (user,))?;
        let Some((created_at, updated_at)) = row else {
            return Ok(None);
        };

        let items = conn
            .exec::<(u64, u32), _, _>(
                "SELECT book_id, quantity FROM cart_items WHERE user_id = ? ORDER BY position",
                (user,),
            )?
            .into_iter()
            .map(|(book_id, quantity)| CartItem { book_id, quantity })
            .collect();

        Ok(Some(Cart {
            user_id: user,
            items,
            created_at: from_millis("created_at", created_at)?,
            updated_at: from_millis("updated_at", updated_at)?,
        }))
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let mut tx = conn.start_transaction(TxOpts::default())?;

        tx.exec_drop(
            "INSERT INTO carts (user_id, created_at, updated_at) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE updated_at = VALUES(updated_at)",
            (
                cart.user_id,
                cart.created_at.timestamp_millis(),
                cart.updated_at.timestamp_millis(),
            ),
        )?;
        tx.exec_drop("DELETE FROM cart_items WHERE user_id = ?", (cart.user_id,))?;
        if !cart.items.is_empty() {
            tx.exec_batch(
                "INSERT INTO cart_items (user_id, position, book_id, quantity) VALUES (?, ?, ?, ?)",
                cart.items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| (cart.user_id, position as u32, item.book_id, item.quantity)),
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn where_clause(conditions: &[Condition]) -> (String, Vec<Value>) {
    if conditions.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut values = Vec::new();
    let clauses: Vec<String> = conditions
        .iter()
        .map(|condition| match condition {
            Condition::TitleOrAuthorContains(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                values.push(Value::from(pattern.as_str()));
                values.push(Value::from(pattern));
                "(LOWER(title) LIKE ? OR LOWER(author) LIKE ?)".to_string()
            }
            Condition::GenreIs(genre) => {
                values.push(Value::from(genre.as_str()));
                values.push(Value::from(genre.as_str()));
                "(genre = ? OR category = ?)".to_string()
            }
            Condition::PriceAtLeast(min) => {
                values.push(Value::from(*min));
                "price >= ?".to_string()
            }
            Condition::PriceAtMost(max) => {
                values.push(Value::from(*max));
                "price <= ?".to_string()
            }
            Condition::LanguageIs(language) => {
                values.push(Value::from(language.as_str()));
                "language = ?".to_string()
            }
            Condition::CreatedBy(user) => {
                values.push(Value::from(*user));
                "created_by = ?".to_string()
            }
        })
        .collect();

    (format!(" WHERE {}", clauses.join(" AND ")), values)
}

fn order_by(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Newest => "created_at DESC, id DESC",
        SortOrder::PriceAsc => "price ASC, id ASC",
        SortOrder::PriceDesc => "price DESC, id ASC",
    }
}

fn positional(values: Vec<Value>) -> Params {
    if values.is_empty() {
        Params::Empty
    } else {
        Params::Positional(values)
    }
}

/// Escapes LIKE wildcards so the needle is matched literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn column<T: FromValue>(row: &mut Row, name: &str) -> Result<T, StoreError> {
    match row.take_opt::<T, _>(name) {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(StoreError::Decode {
            column: name.to_string(),
            message: format!("{e:?}"),
        }),
        None => Err(StoreError::Decode {
            column: name.to_string(),
            message: "missing column".to_string(),
        }),
    }
}

fn from_millis(name: &str, millis: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| StoreError::Decode {
            column: name.to_string(),
            message: format!("timestamp {millis} out of range"),
        })
}

fn parsed<T: std::str::FromStr<Err = String>>(name: &str, raw: String) -> Result<T, StoreError> {
    raw.parse().map_err(|message| StoreError::Decode {
        column: name.to_string(),
        message,
    })
}

fn user_from_row(mut row: Row) -> Result<User, StoreError> {
    Ok(User {
        id: column(&mut row, "id")?,
        name: column(&mut row, "name")?,
        email: column(&mut row, "email")?,
        password_hash: column(&mut row, "password_hash")?,
        role: parsed::<Role>("role", column(&mut row, "role")?)?,
        created_at: from_millis("created_at", column(&mut row, "created_at")?)?,
    })
}

fn book_from_row(mut row: Row) -> Result<Book, StoreError> {
    let genre: Option<String> = column(&mut row, "genre")?;
    let genre = genre.ok_or_else(|| StoreError::Decode {
        column: "genre".to_string(),
        message: "neither genre nor category is set".to_string(),
    })?;

    Ok(Book {
        id: column(&mut row, "id")?,
        title: column(&mut row, "title")?,
        author: column(&mut row, "author")?,
        description: column(&mut row, "description")?,
        genre: parsed::<Genre>("genre", genre)?,
        language: column(&mut row, "language")?,
        price: column(&mut row, "price")?,
        min_price: column(&mut row, "min_price")?,
        max_price: column(&mut row, "max_price")?,
        stock: column(&mut row, "stock")?,
        image_url: column(&mut row, "image_url")?,
        rating: column(&mut row, "rating")?,
        created_by: column(&mut row, "created_by")?,
        created_at: from_millis("created_at", column(&mut row, "created_at")?)?,
    })
}
