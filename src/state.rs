use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::database::{ArticleService, UserService};

/// Shared per-request dependencies, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub articles: Arc<dyn ArticleService>,
    pub tokens: Arc<TokenIssuer>,
    /// bcrypt cost for newly hashed passwords
    pub password_cost: u32,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserService>,
        articles: Arc<dyn ArticleService>,
        tokens: TokenIssuer,
        password_cost: u32,
    ) -> Self {
        Self {
            users,
            articles,
            tokens: Arc::new(tokens),
            password_cost,
        }
    }
}
