pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use cors::create_cors_layer;
pub use rate_limit::{ReviewThrottle, apply_review_throttle};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
