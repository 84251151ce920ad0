//! Serializable persisted-state shape for a priority queue.

use std::collections::BTreeMap;

use lupine_graph::GraphSnapshot;
use serde::{Deserialize, Serialize};

/// Persisted form of a priority queue: each level maps to its graphs in
/// FIFO order. Levels are kept sorted so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot<I> {
  pub levels: BTreeMap<i64, Vec<GraphSnapshot<I>>>,
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use lupine_graph::{BoxError, Graph, GraphHandler};
  use serde_json::json;

  use crate::priority::PriorityQueue;

  struct NoopGraph;

  impl GraphHandler for NoopGraph {
    fn handle_in(&self) -> Result<(), BoxError> {
      Ok(())
    }

    fn handle_out(&self) -> Result<(), BoxError> {
      Ok(())
    }
  }

  fn test_graph(id: &str) -> Graph<String, String> {
    Graph::new(
      id.to_string(),
      "s".to_string(),
      "f".to_string(),
      Box::new(NoopGraph),
    )
  }

  #[test]
  fn snapshot_preserves_level_grouping_and_order() {
    let queue = PriorityQueue::new();
    queue.push(0, Arc::new(Mutex::new(test_graph("a"))));
    queue.push(0, Arc::new(Mutex::new(test_graph("b"))));
    let mut started = test_graph("c");
    started.set_current(Some("s".to_string()));
    queue.push(2, Arc::new(Mutex::new(started)));

    let snapshot = queue.snapshot();

    assert_eq!(
      serde_json::to_value(&snapshot).unwrap(),
      json!({
        "levels": {
          "0": [
            { "id": "a", "start": "s", "finish": "f", "current": null },
            { "id": "b", "start": "s", "finish": "f", "current": null },
          ],
          "2": [
            { "id": "c", "start": "s", "finish": "f", "current": "s" },
          ],
        }
      })
    );
  }

  #[test]
  fn from_snapshot_restores_order_and_position() {
    let queue = PriorityQueue::new();
    queue.push(0, Arc::new(Mutex::new(test_graph("a"))));
    queue.push(0, Arc::new(Mutex::new(test_graph("b"))));
    let mut started = test_graph("c");
    started.set_current(Some("s".to_string()));
    queue.push(2, Arc::new(Mutex::new(started)));

    let snapshot = queue.snapshot();
    let restored: PriorityQueue<String, String> =
      PriorityQueue::from_snapshot(snapshot, |record| Ok(test_graph(&record.id))).unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.max_level(), 2);

    let head = restored.pop().unwrap();
    {
      let head = head.lock().unwrap();
      assert_eq!(head.id(), "c");
      assert!(head.is_on_start());
    }

    assert_eq!(restored.pop().unwrap().lock().unwrap().id(), "a");
    assert_eq!(restored.pop().unwrap().lock().unwrap().id(), "b");
    assert!(restored.is_empty());
  }

  #[test]
  fn from_snapshot_surfaces_rebuild_failures() {
    let queue = PriorityQueue::new();
    queue.push(1, Arc::new(Mutex::new(test_graph("broken"))));

    let err = PriorityQueue::<String, String>::from_snapshot(queue.snapshot(), |record| {
      Err(format!("no topology registered for '{}'", record.id).into())
    })
    .unwrap_err();

    assert!(err.to_string().contains("broken"));
  }
}
