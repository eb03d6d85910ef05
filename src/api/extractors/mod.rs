pub mod auth_ctx;
pub mod input;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use input::{ApiJson, ResourceId};
