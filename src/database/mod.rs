pub mod article_service;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod service;
pub mod user_service;

pub use article_service::PgArticleService;
pub use manager::{DatabaseError, DatabaseManager};
pub use service::{ArticleService, UserService};
pub use user_service::PgUserService;
