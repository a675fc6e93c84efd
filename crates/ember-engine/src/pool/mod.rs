//! Reusable-object pooling for short-lived, high-churn records.
//!
//! Gameplay code acquires records (particles, bullets, floating numbers, …),
//! mutates them for a few frames, hands their appearance to the sprite renderer
//! and releases them again. Pools are plain values owned by the subsystem that
//! needs them; there are no process-wide instances.

mod object_pool;

pub use object_pool::{ObjectPool, PoolConfig, PoolStats};
