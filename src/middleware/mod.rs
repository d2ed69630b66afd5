pub mod auth;
pub mod request_id;

pub use auth::ApiKeyAuth;
pub use request_id::RequestId;
