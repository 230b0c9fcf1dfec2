pub mod auth;
pub mod response;

pub use auth::{session_middleware, CurrentIdentity};
pub use response::{ApiResponse, ApiResult};
