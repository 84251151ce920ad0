//! Lupine Queue
//!
//! Ordering for many graph instances: a plain insertion-ordered FIFO
//! primitive, the level-keyed priority queue built from one FIFO per
//! level, and the serializable snapshot shape used to persist a queue.
//!
//! Higher integer level means higher priority; within a level, graphs are
//! served in insertion order. The queue tracks the current maximum active
//! level so the head lookup is O(1); the cache is recomputed by scanning
//! the remaining levels when an eviction drains the maximal one.

mod error;
mod fifo;
mod priority;
mod snapshot;

pub use error::QueueError;
pub use fifo::Fifo;
pub use priority::{PriorityQueue, SharedGraph};
pub use snapshot::QueueSnapshot;
