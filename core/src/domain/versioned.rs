//! Optimistic concurrency contract for stored entities.

/// An entity whose stored row carries a monotonically increasing version.
///
/// Versions start at 1 and every accepted update increments the stored value
/// by exactly one. The in-memory copy is only bumped after the conditional
/// write has been accepted.
pub trait Versioned: Clone + Send + Sync + 'static {
    /// Resource name used in `NotFound` errors
    const RESOURCE: &'static str;

    fn id(&self) -> i64;

    fn version(&self) -> i32;

    fn set_version(&mut self, version: i32);
}
