// handlers/public/mod.rs - endpoints reachable without a bearer token
pub mod health;
pub mod users;

pub use health::health;
pub use users::{create_user, login_user};
