pub mod movie;
pub mod token;
pub mod user;
pub mod versioned;

pub use movie::{InMemoryMovieRepository, MovieRepository};
pub use token::{InMemoryTokenRepository, TokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};
pub use versioned::VersionedRepository;
