//! MySQL repository implementations

pub mod movie_repository_impl;
pub mod token_repository_impl;
pub mod user_repository_impl;

pub use movie_repository_impl::MySqlMovieRepository;
pub use token_repository_impl::MySqlTokenRepository;
pub use user_repository_impl::MySqlUserRepository;
