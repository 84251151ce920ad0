//! Loading persisted scheduler state.

use std::sync::Arc;

use lupine_graph::BoxError;
use lupine_queue::PriorityQueue;
use tracing::debug;

use crate::error::SchedulerError;
use crate::scheduler::Scheduler;

/// Resolves a persisted priority queue by an external identifier.
///
/// `Ok(None)` means "no prior state" and is not an error; the builder
/// then constructs an empty queue.
pub trait Storage<S, I, U> {
  fn get(&self, key: &U) -> Result<Option<PriorityQueue<S, I>>, BoxError>;
}

/// Fetches (or creates) a priority queue and produces a ready scheduler.
pub struct Builder<S, I, U, R> {
  id: U,
  storage: R,
  queue: Option<PriorityQueue<S, I>>,
}

impl<S, I, U, R> Builder<S, I, U, R>
where
  R: Storage<S, I, U>,
{
  pub fn new(id: U, storage: R) -> Self {
    Self {
      id,
      storage,
      queue: None,
    }
  }

  /// Fetch the persisted queue for this builder's identifier, seeding an
  /// empty one when the storage has no prior state.
  pub fn load_state(&mut self) -> Result<(), SchedulerError> {
    let stored = self
      .storage
      .get(&self.id)
      .map_err(|e| SchedulerError::LoadState { source: e })?;

    if stored.is_none() {
      debug!("no persisted state, starting from an empty queue");
    }
    self.queue = Some(stored.unwrap_or_default());
    Ok(())
  }

  /// Produce a ready scheduler around the loaded queue. Building without
  /// [`Builder::load_state`] yields an empty queue.
  pub fn build(self, zero_signal: S) -> Scheduler<S, I> {
    let queue = self.queue.unwrap_or_default();
    Scheduler::new(Arc::new(queue), zero_signal)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::Mutex;

  use lupine_graph::{BoxError, Graph, GraphHandler};

  use super::*;

  struct NoopGraph;

  impl GraphHandler for NoopGraph {
    fn handle_in(&self) -> Result<(), BoxError> {
      Ok(())
    }

    fn handle_out(&self) -> Result<(), BoxError> {
      Ok(())
    }
  }

  /// Hands out stored queues by key; each queue can be taken once.
  struct MockStorage {
    queues: Mutex<HashMap<String, PriorityQueue<String, String>>>,
  }

  impl MockStorage {
    fn new() -> Self {
      Self {
        queues: Mutex::new(HashMap::new()),
      }
    }

    fn insert(&self, key: &str, queue: PriorityQueue<String, String>) {
      self.queues.lock().unwrap().insert(key.to_string(), queue);
    }
  }

  impl Storage<String, String, String> for MockStorage {
    fn get(&self, key: &String) -> Result<Option<PriorityQueue<String, String>>, BoxError> {
      Ok(self.queues.lock().unwrap().remove(key))
    }
  }

  struct BrokenStorage;

  impl Storage<String, String, String> for BrokenStorage {
    fn get(&self, _key: &String) -> Result<Option<PriorityQueue<String, String>>, BoxError> {
      Err("storage unreachable".into())
    }
  }

  #[test]
  fn load_state_resolves_the_persisted_queue() {
    let storage = MockStorage::new();
    let queue = PriorityQueue::new();
    queue.push(
      3,
      Arc::new(Mutex::new(Graph::new(
        "restored".to_string(),
        "s".to_string(),
        "f".to_string(),
        Box::new(NoopGraph),
      ))),
    );
    storage.insert("job-42", queue);

    let mut builder = Builder::new("job-42".to_string(), storage);
    builder.load_state().unwrap();
    let scheduler = builder.build(String::new());

    assert_eq!(scheduler.queue().len(), 1);
    assert_eq!(scheduler.queue().max_level(), 3);
  }

  #[test]
  fn missing_state_builds_an_empty_queue() {
    let mut builder = Builder::new("unknown".to_string(), MockStorage::new());
    builder.load_state().unwrap();
    let scheduler = builder.build(String::new());

    assert!(scheduler.queue().is_empty());
  }

  #[test]
  fn building_without_loading_yields_an_empty_queue() {
    let builder = Builder::new("ignored".to_string(), MockStorage::new());
    let scheduler = builder.build(String::new());

    assert!(scheduler.queue().is_empty());
  }

  #[test]
  fn storage_failures_surface_as_load_errors() {
    let mut builder = Builder::new("any".to_string(), BrokenStorage);

    let err = builder.load_state().unwrap_err();

    assert!(matches!(err, SchedulerError::LoadState { .. }));
  }
}
