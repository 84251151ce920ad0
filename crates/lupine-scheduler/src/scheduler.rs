//! The aggregate scheduler: priority dispatch plus the completion cascade.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use lupine_queue::{PriorityQueue, SharedGraph};
use tracing::{debug, error, info};

use crate::error::SchedulerError;

/// Drives many prioritized graphs against one stream of signals.
///
/// The scheduler shares its queue by pointer: the builder that loaded it
/// and any observer holding a clone see the same instance. Queue methods
/// are individually locked, but the scheduler's own call sequences
/// (`peek` then `pop_priority` inside [`Scheduler::act`], the
/// emptiness/level reads inside [`Scheduler::add_graph`]) span several
/// critical sections. Embedders must serialize `act` and `add_graph`
/// invocations against one scheduler instance, either with one owning
/// thread or an external mutex around the calls.
pub struct Scheduler<S, I> {
  queue: Arc<PriorityQueue<S, I>>,
  zero_signal: S,
}

impl<S, I> Scheduler<S, I> {
  /// `zero_signal` is the neutral input used to resume cascaded draining;
  /// handlers must treat it as a safe, idempotent default choice.
  pub fn new(queue: Arc<PriorityQueue<S, I>>, zero_signal: S) -> Self {
    Self { queue, zero_signal }
  }

  pub fn queue(&self) -> &Arc<PriorityQueue<S, I>> {
    &self.queue
  }

  pub fn zero_signal(&self) -> &S {
    &self.zero_signal
  }
}

impl<S, I> Scheduler<S, I>
where
  S: Clone + fmt::Display,
  I: Clone + Eq + Hash + fmt::Display,
{
  /// Push `graph` into the queue at `level`.
  ///
  /// A graph that already has a current place was pre-started externally
  /// and is left alone. Otherwise it auto-starts right away only when the
  /// queue was empty before the push or `level` strictly exceeds the
  /// maximum level before the push: a strictly-higher-priority newcomer
  /// begins executing immediately, while an equal-or-lower one stays
  /// unstarted until a later [`Scheduler::act`] reaches it as head of the
  /// queue.
  pub fn add_graph(&self, level: i64, graph: SharedGraph<S, I>) -> Result<(), SchedulerError> {
    let was_empty = self.queue.is_empty();
    let max_before = self.queue.max_level();
    self.queue.push(level, Arc::clone(&graph));

    let mut head = graph.lock().unwrap();
    if head.current().is_some() {
      return Ok(());
    }
    if !was_empty && level <= max_before {
      debug!(graph = %head.id(), level, "graph_queued");
      return Ok(());
    }

    head.start_graph().map_err(|e| SchedulerError::StartGraph {
      level,
      graph: head.id().to_string(),
      source: e,
    })?;
    info!(graph = %head.id(), level, "graph_started");
    Ok(())
  }

  /// Drive one signal through the highest-priority graph.
  ///
  /// No-op on an empty queue. When the head graph reaches its finish
  /// place, it is finished, evicted (with an identity check against the
  /// graph that was actually popped), and the loop continues with the zero
  /// signal so graphs that finish back-to-back drain in this same call.
  pub fn act(&self, signal: S) -> Result<(), SchedulerError> {
    let mut signal = signal;
    loop {
      if self.queue.is_empty() {
        return Ok(());
      }
      let (graph, level) = self.queue.peek().ok_or(SchedulerError::HeadUnavailable)?;

      let mut head = graph.lock().unwrap();
      head.act(&signal).map_err(|e| SchedulerError::Act {
        level,
        graph: head.id().to_string(),
        signal: signal.to_string(),
        source: e,
      })?;

      if !head.is_on_finish() {
        return Ok(());
      }

      head.finish_graph().map_err(|e| SchedulerError::FinishGraph {
        level,
        graph: head.id().to_string(),
        source: e,
      })?;
      let finished = head.id().clone();
      drop(head);

      let evicted = self
        .queue
        .pop_priority(level)
        .ok_or_else(|| SchedulerError::EvictionMissing {
          level,
          graph: finished.to_string(),
        })?;
      let evicted_id = evicted.lock().unwrap().id().clone();
      if evicted_id != finished {
        error!(level, finished = %finished, evicted = %evicted_id, "queue_corrupted");
        return Err(SchedulerError::GraphMismatch {
          level,
          finished: finished.to_string(),
          evicted: evicted_id.to_string(),
        });
      }
      info!(graph = %finished, level, "graph_finished");

      // the promoted head may already sit on its finish place, or may
      // auto-start and run to finish on the neutral signal alone
      signal = self.zero_signal.clone();
    }
  }
}
