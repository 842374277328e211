//! Optimistic concurrency for versioned entities

mod store;


pub use store::VersionedStore;
