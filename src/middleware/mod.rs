pub mod extract;
pub mod response;
pub mod session;

pub use extract::{non_empty, parse_id, parse_optional_id, ApiJson};
pub use response::{ApiResponse, ApiResult};
pub use session::{principal_from_jar, session_middleware, Principal};
