//! Lupine Scheduler
//!
//! The orchestrator combining the graph layer with the priority queue. New
//! graphs enter the queue with preemption rules, each external signal
//! drives the head graph one step, and a finished graph is evicted with the
//! next one promoted automatically (consuming the configured zero signal)
//! until the queue empties or the new head needs real input.

mod builder;
mod error;
mod scheduler;

pub use builder::{Builder, Storage};
pub use error::SchedulerError;
pub use scheduler::Scheduler;
