pub mod auth;
pub mod rate_limit;

pub use auth::{ActivatedUser, AuthContext, AuthenticatedUser, BearerAuth};
pub use rate_limit::{extract_client_ip, RateLimit};
