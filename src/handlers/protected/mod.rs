// handlers/protected/mod.rs - endpoints behind the authentication middleware
pub mod articles;
pub mod user;

pub use articles::{create_article, delete_article, get_article, list_articles, update_article};
pub use user::{get_current_user, update_user};
