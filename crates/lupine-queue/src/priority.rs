//! Level-keyed priority queue over shared graph instances.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use lupine_graph::{BoxError, Graph, GraphSnapshot};

use crate::error::QueueError;
use crate::fifo::Fifo;
use crate::snapshot::QueueSnapshot;

/// A graph slot shared between the queue and its callers. The queue hands
/// out clones of the pointer; whoever holds one drives the graph through
/// its own lock.
pub type SharedGraph<S, I> = Arc<Mutex<Graph<S, I>>>;

/// A mapping from integer priority level to a FIFO of graph instances at
/// that level, with a cached maximum active level.
///
/// A level key exists iff its FIFO is non-empty, and the cached maximum
/// equals the greatest key present (it is only meaningful while the queue
/// is non-empty). Each method acquires the internal lock once for its own
/// duration; there is **no atomicity across calls**. A caller performing
/// `peek` followed by `pop_priority` can race with other callers between
/// the two; use [`PriorityQueue::pop_head_if`] when the pair must be one
/// critical section.
pub struct PriorityQueue<S, I> {
  inner: Mutex<Inner<S, I>>,
}

struct Inner<S, I> {
  levels: HashMap<i64, Fifo<SharedGraph<S, I>>>,
  max_level: i64,
}

impl<S, I> Inner<S, I> {
  /// Pop the front of the FIFO at `level`, deleting the level entry when
  /// it drains (or was stale) and recomputing the cached maximum if the
  /// drained level was maximal.
  fn pop_at(&mut self, level: i64) -> Option<SharedGraph<S, I>> {
    let (graph, drained) = match self.levels.get_mut(&level) {
      Some(bucket) => {
        let graph = bucket.pop();
        (graph, bucket.is_empty())
      }
      None => return None,
    };

    if drained {
      self.levels.remove(&level);
      if level == self.max_level {
        // O(active levels); levels are expected to be few
        self.max_level = self.levels.keys().copied().max().unwrap_or(0);
      }
    }

    graph
  }
}

impl<S, I> PriorityQueue<S, I> {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        levels: HashMap::new(),
        max_level: 0,
      }),
    }
  }

  /// Append `graph` to the FIFO at `level`, creating the level lazily and
  /// raising the cached maximum when the newcomer exceeds it.
  pub fn push(&self, level: i64, graph: SharedGraph<S, I>) {
    let mut inner = self.inner.lock().unwrap();
    if inner.levels.is_empty() || level > inner.max_level {
      inner.max_level = level;
    }
    inner.levels.entry(level).or_default().push(graph);
  }

  /// The front of the FIFO at the current maximum level, without mutation.
  pub fn peek(&self) -> Option<(SharedGraph<S, I>, i64)> {
    let inner = self.inner.lock().unwrap();
    if inner.levels.is_empty() {
      return None;
    }
    let bucket = inner.levels.get(&inner.max_level)?;
    bucket.peek().map(|graph| (Arc::clone(graph), inner.max_level))
  }

  /// Remove and return the front of the FIFO at `level`.
  pub fn pop_priority(&self, level: i64) -> Option<SharedGraph<S, I>> {
    let mut inner = self.inner.lock().unwrap();
    inner.pop_at(level)
  }

  /// Remove and return the front of the FIFO at the current maximum level.
  pub fn pop(&self) -> Option<SharedGraph<S, I>> {
    let mut inner = self.inner.lock().unwrap();
    let level = inner.max_level;
    inner.pop_at(level)
  }

  /// Peek the head and pop it in one lock scope when `decide` approves.
  ///
  /// This is the combined variant for callers that cannot tolerate the
  /// race between a separate `peek` and `pop_priority`.
  pub fn pop_head_if<F>(&self, decide: F) -> Option<(SharedGraph<S, I>, i64)>
  where
    F: FnOnce(&SharedGraph<S, I>, i64) -> bool,
  {
    let mut inner = self.inner.lock().unwrap();
    if inner.levels.is_empty() {
      return None;
    }
    let level = inner.max_level;
    let approved = match inner.levels.get(&level).and_then(|bucket| bucket.peek()) {
      Some(head) => decide(head, level),
      None => false,
    };
    if !approved {
      return None;
    }
    inner.pop_at(level).map(|graph| (graph, level))
  }

  /// The cached maximum active level. Only meaningful while the queue is
  /// non-empty.
  pub fn max_level(&self) -> i64 {
    self.inner.lock().unwrap().max_level
  }

  /// Number of distinct active priority levels.
  pub fn len(&self) -> usize {
    self.inner.lock().unwrap().levels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().unwrap().levels.is_empty()
  }
}

impl<S, I> PriorityQueue<S, I>
where
  S: fmt::Display,
  I: Clone + Eq + Hash + fmt::Display,
{
  /// Point-in-time persisted form of the queue: level grouping and
  /// in-level order preserved exactly.
  ///
  /// Takes the queue lock and then each graph's lock in turn; quiesce the
  /// scheduler driving this queue before snapshotting.
  pub fn snapshot(&self) -> QueueSnapshot<I> {
    let inner = self.inner.lock().unwrap();
    let levels = inner
      .levels
      .iter()
      .map(|(level, bucket)| {
        let graphs = bucket
          .iter()
          .map(|graph| graph.lock().unwrap().snapshot())
          .collect();
        (*level, graphs)
      })
      .collect();
    QueueSnapshot { levels }
  }

  /// Rebuild a queue from its persisted form.
  ///
  /// `rebuild` reattaches topology and handlers for one graph record; the
  /// queue then re-seats the graph's current place from the record and
  /// restores level grouping and in-level order.
  pub fn from_snapshot<F>(snapshot: QueueSnapshot<I>, mut rebuild: F) -> Result<Self, QueueError>
  where
    F: FnMut(&GraphSnapshot<I>) -> Result<Graph<S, I>, BoxError>,
  {
    let queue = Self::new();
    for (level, graphs) in snapshot.levels {
      for record in graphs {
        let mut graph = rebuild(&record).map_err(|e| QueueError::Restore {
          level,
          graph: record.id.to_string(),
          source: e,
        })?;
        graph.set_current(record.current.clone());
        queue.push(level, Arc::new(Mutex::new(graph)));
      }
    }
    Ok(queue)
  }
}

impl<S, I> Default for PriorityQueue<S, I> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S, I> fmt::Debug for PriorityQueue<S, I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PriorityQueue").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lupine_graph::GraphHandler;

  struct NoopGraph;

  impl GraphHandler for NoopGraph {
    fn handle_in(&self) -> Result<(), BoxError> {
      Ok(())
    }

    fn handle_out(&self) -> Result<(), BoxError> {
      Ok(())
    }
  }

  fn test_graph(id: &str) -> SharedGraph<String, String> {
    Arc::new(Mutex::new(Graph::new(
      id.to_string(),
      "s".to_string(),
      "f".to_string(),
      Box::new(NoopGraph),
    )))
  }

  #[test]
  fn peek_returns_head_of_highest_level() {
    let queue = PriorityQueue::new();
    queue.push(0, test_graph("low"));
    queue.push(5, test_graph("high"));
    queue.push(0, test_graph("low2"));

    let (head, level) = queue.peek().unwrap();

    assert_eq!(level, 5);
    assert_eq!(head.lock().unwrap().id(), "high");
    // peek does not mutate
    assert_eq!(queue.len(), 2);
  }

  #[test]
  fn pop_within_a_level_is_fifo() {
    let queue = PriorityQueue::new();
    let first = test_graph("first");
    let second = test_graph("second");
    queue.push(3, Arc::clone(&first));
    queue.push(3, Arc::clone(&second));

    assert!(Arc::ptr_eq(&queue.pop().unwrap(), &first));
    assert!(Arc::ptr_eq(&queue.pop().unwrap(), &second));
    assert!(queue.pop().is_none());
  }

  #[test]
  fn draining_the_max_level_recomputes_the_cache() {
    let queue = PriorityQueue::new();
    queue.push(1, test_graph("low"));
    queue.push(5, test_graph("high"));

    let popped = queue.pop().unwrap();

    assert_eq!(popped.lock().unwrap().id(), "high");
    assert_eq!(queue.max_level(), 1);
    assert_eq!(queue.len(), 1);
    let (head, level) = queue.peek().unwrap();
    assert_eq!(level, 1);
    assert_eq!(head.lock().unwrap().id(), "low");
  }

  #[test]
  fn pop_priority_at_an_unknown_level_returns_none() {
    let queue = PriorityQueue::new();
    queue.push(1, test_graph("g"));

    assert!(queue.pop_priority(9).is_none());
    assert_eq!(queue.len(), 1);
  }

  #[test]
  fn negative_levels_are_ordinary_priorities() {
    let queue = PriorityQueue::new();
    queue.push(-3, test_graph("neg"));

    let (head, level) = queue.peek().unwrap();
    assert_eq!(level, -3);
    assert_eq!(head.lock().unwrap().id(), "neg");

    queue.push(-1, test_graph("less_neg"));
    assert_eq!(queue.max_level(), -1);
  }

  #[test]
  fn empty_queue_has_no_head() {
    let queue: PriorityQueue<String, String> = PriorityQueue::new();

    assert!(queue.peek().is_none());
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
  }

  #[test]
  fn pop_head_if_pops_only_when_approved() {
    let queue = PriorityQueue::new();
    let graph = test_graph("g");
    queue.push(2, Arc::clone(&graph));

    assert!(queue.pop_head_if(|_, _| false).is_none());
    assert_eq!(queue.len(), 1);

    let (popped, level) = queue.pop_head_if(|head, level| {
      assert_eq!(level, 2);
      head.lock().unwrap().id() == "g"
    })
    .unwrap();

    assert_eq!(level, 2);
    assert!(Arc::ptr_eq(&popped, &graph));
    assert!(queue.is_empty());
  }

  #[test]
  fn len_counts_distinct_levels() {
    let queue = PriorityQueue::new();
    queue.push(0, test_graph("a"));
    queue.push(0, test_graph("b"));
    queue.push(7, test_graph("c"));

    assert_eq!(queue.len(), 2);
  }
}
