//! Queue errors.

use lupine_graph::BoxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
  /// The embedder's rebuild callback could not reconstruct a graph while
  /// restoring a queue from its snapshot.
  #[error("rebuilding graph '{graph}' at level {level} from snapshot")]
  Restore {
    level: i64,
    graph: String,
    #[source]
    source: BoxError,
  },
}
