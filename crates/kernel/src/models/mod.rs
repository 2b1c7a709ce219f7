//! In-memory content and user models.

pub mod item;
pub mod user;

pub use item::{Comment, Item, ItemStore};
pub use user::{User, UserStore};
