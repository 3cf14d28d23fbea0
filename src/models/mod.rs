pub mod book;
pub mod cart;
pub mod user;

pub use book::{Book, BookId, BookList, BookPayload, Genre, NewBook};
pub use cart::{AddItemRequest, BookRef, Cart, CartItem, CartLine, CartView, UpdateItemRequest};
pub use user::{AuthResponse, LoginRequest, NewUser, PublicUser, RegisterRequest, Role, User, UserId};
