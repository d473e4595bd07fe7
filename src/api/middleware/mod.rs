mod request_id;
mod user_context;

pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdMiddleware};
pub use user_context::UserHeader;
