//! Deferred, memoized resource loading.
//!
//! A [`CachedResource`] decodes its content at most once per load cycle and
//! keeps the value in a [`ReclaimableSlot`], which may drop it again under
//! the configured [`crate::config::Retention`] policy.

pub mod resource;
pub mod slot;

pub use resource::CachedResource;
pub use slot::ReclaimableSlot;
