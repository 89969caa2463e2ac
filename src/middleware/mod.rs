pub mod auth;
pub mod response;

pub use auth::{optional_auth, require_auth, BearerToken, CurrentUser, Identity};
pub use response::{ApiResponse, ApiResult};
