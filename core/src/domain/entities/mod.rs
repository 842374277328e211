//! Domain entities representing core business objects.

pub mod movie;
pub mod token;
pub mod user;


// Re-export commonly used types
pub use movie::{Movie, MovieDraft, MoviePatch};
pub use token::{AuthToken, IssuedToken, TokenHash, TokenScope, TOKEN_BYTES, TOKEN_LENGTH};
pub use user::{NewUser, Password, User};
