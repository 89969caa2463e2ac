pub mod article;
pub mod user;

pub use article::{Article, ArticleFilter, ArticlePatch};
pub use user::{User, UserFilter, UserPatch};
