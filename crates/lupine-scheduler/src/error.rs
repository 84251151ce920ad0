//! Scheduler errors.

use lupine_graph::{BoxError, GraphError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
  /// The storage collaborator failed while resolving persisted state.
  #[error("loading scheduler state")]
  LoadState {
    #[source]
    source: BoxError,
  },

  /// A newly added graph failed to auto-start.
  #[error("starting graph '{graph}' added at level {level}")]
  StartGraph {
    level: i64,
    graph: String,
    #[source]
    source: GraphError,
  },

  /// The head graph failed while processing a signal.
  #[error("acting on graph '{graph}' at level {level} with signal '{signal}'")]
  Act {
    level: i64,
    graph: String,
    signal: String,
    #[source]
    source: GraphError,
  },

  /// The head graph reached its finish place but its finishing callbacks
  /// failed.
  #[error("finishing graph '{graph}' at level {level}")]
  FinishGraph {
    level: i64,
    graph: String,
    #[source]
    source: GraphError,
  },

  /// The queue reported active levels but no head could be peeked:
  /// corrupted scheduler state.
  #[error("queue reported graphs but no head could be peeked")]
  HeadUnavailable,

  /// Nothing to evict at the level a graph just finished on: corrupted
  /// scheduler state.
  #[error("no graph to evict at level {level} after '{graph}' finished")]
  EvictionMissing { level: i64, graph: String },

  /// The evicted graph is not the one that finished: corrupted scheduler
  /// state.
  #[error("evicted graph '{evicted}' does not match finished graph '{finished}' at level {level}")]
  GraphMismatch {
    level: i64,
    finished: String,
    evicted: String,
  },
}
