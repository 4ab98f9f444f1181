//! Shared services held in application state.
//!
//! Redis caching of computed views, the in-process reference dataset cache
//! and per-bid recompute guards.

pub mod cache;
pub mod datasets;
pub mod locks;

pub use cache::RedisCache;
pub use datasets::DatasetCache;
pub use locks::BidLocks;
