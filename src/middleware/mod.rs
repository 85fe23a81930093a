pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{auth_gate, AllowList};
pub use extract::{JsonBody, PathParam, QueryParams};
pub use response::{ApiResponse, ApiResult};
