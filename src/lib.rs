//! Lupine
//!
//! An embeddable execution engine that runs many independent, prioritized
//! finite-state workflows ("graphs") against a shared stream of input
//! signals. One signal advances at most one graph; when the head graph
//! completes, the next-highest-priority graph is promoted automatically.
//!
//! The workspace is split by concern:
//! - `lupine-graph`: places, transitions, and the graph that walks between
//!   them under embedder-supplied decision logic
//! - `lupine-queue`: the level-keyed priority queue ordering graph
//!   instances, plus its serializable snapshot shape
//! - `lupine-scheduler`: the orchestrator combining the two, and the
//!   storage/builder layer for restoring persisted queues
//!
//! This crate re-exports the public API of all three so embedders can
//! depend on `lupine` alone.

pub use lupine_graph::{
  BoxError, Graph, GraphError, GraphHandler, GraphSnapshot, Place, PlaceHandler, Transition,
  TransitionHandler,
};
pub use lupine_queue::{Fifo, PriorityQueue, QueueError, QueueSnapshot, SharedGraph};
pub use lupine_scheduler::{Builder, Scheduler, SchedulerError, Storage};
