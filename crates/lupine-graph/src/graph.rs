//! The workflow graph: one running instance of a topology.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;
use crate::handler::GraphHandler;
use crate::place::Place;
use crate::transition::Transition;

/// One instance of a workflow topology with a current position.
///
/// Places and transitions live in arenas keyed by identifier; adjacency is
/// stored as identifier sets on each node, so self-referential topologies
/// need no shared ownership. Start and finish are fixed at construction.
/// `current` is `None` until the graph starts, either explicitly through
/// [`Graph::start_graph`] or automatically on the first [`Graph::act`].
pub struct Graph<S, I> {
  id: I,
  start: I,
  finish: I,
  current: Option<I>,
  places: HashMap<I, Place<S, I>>,
  transitions: HashMap<I, Transition<S, I>>,
  handler: Box<dyn GraphHandler + Send>,
}

impl<S, I> Graph<S, I>
where
  S: fmt::Display,
  I: Clone + Eq + Hash + fmt::Display,
{
  pub fn new(id: I, start: I, finish: I, handler: Box<dyn GraphHandler + Send>) -> Self {
    Self {
      id,
      start,
      finish,
      current: None,
      places: HashMap::new(),
      transitions: HashMap::new(),
      handler,
    }
  }

  pub fn insert_place(&mut self, place: Place<S, I>) -> &mut Self {
    self.places.insert(place.id().clone(), place);
    self
  }

  pub fn insert_transition(&mut self, transition: Transition<S, I>) -> &mut Self {
    self.transitions.insert(transition.id().clone(), transition);
    self
  }

  pub fn id(&self) -> &I {
    &self.id
  }

  pub fn start(&self) -> &I {
    &self.start
  }

  pub fn finish(&self) -> &I {
    &self.finish
  }

  /// The place the graph currently occupies, or `None` before the graph
  /// has started.
  pub fn current(&self) -> Option<&I> {
    self.current.as_ref()
  }

  /// Re-seat the graph's position, e.g. when restoring a persisted
  /// instance. The caller is responsible for passing a place identifier
  /// that exists in this graph's topology.
  pub fn set_current(&mut self, current: Option<I>) {
    self.current = current;
  }

  /// Whether the graph currently sits on its start place. `false` for a
  /// graph that has not started.
  pub fn is_on_start(&self) -> bool {
    self.current.as_ref().is_some_and(|c| *c == self.start)
  }

  /// Whether the graph currently sits on its finish place. `false` for a
  /// graph that has not started.
  pub fn is_on_finish(&self) -> bool {
    self.current.as_ref().is_some_and(|c| *c == self.finish)
  }

  /// Start the graph: invoke the graph-level entry callback, move onto the
  /// start place, and invoke its entry callback.
  ///
  /// If the graph-level callback fails, `current` is left unset. If the
  /// start place's callback fails, the graph has already moved onto it.
  pub fn start_graph(&mut self) -> Result<(), GraphError> {
    self.handler.handle_in().map_err(|e| GraphError::GraphEnter {
      graph: self.id.to_string(),
      source: e,
    })?;

    self.current = Some(self.start.clone());
    debug!(graph = %self.id, start = %self.start, "graph_started");

    let start = self
      .places
      .get(&self.start)
      .ok_or_else(|| GraphError::PlaceNotFound {
        graph: self.id.to_string(),
        place: self.start.to_string(),
      })?;

    start
      .handler()
      .handle_in(None)
      .map_err(|e| GraphError::PlaceEnter {
        graph: self.id.to_string(),
        place: self.start.to_string(),
        source: e,
      })
  }

  /// Drive the graph one step with `signal`.
  ///
  /// A not-yet-started graph is started first and then advanced with the
  /// same signal. The step asks the current place to choose a transition,
  /// validates it against the out-edge set, asks the transition for the
  /// destination, validates it against the destination set, runs the exit
  /// callback, commits the move, and runs the entry callback.
  ///
  /// The move commits as soon as the exit callback succeeds: if the entry
  /// callback of the destination then fails, the error is surfaced but the
  /// graph stays on the destination place.
  pub fn act(&mut self, signal: &S) -> Result<(), GraphError> {
    if self.current.is_none() {
      self.start_graph().map_err(|e| GraphError::AutoStart {
        graph: self.id.to_string(),
        source: Box::new(e),
      })?;
    }

    let current_id = match &self.current {
      Some(id) => id.clone(),
      None => {
        return Err(GraphError::NotStarted {
          graph: self.id.to_string(),
        });
      }
    };

    let place = self
      .places
      .get(&current_id)
      .ok_or_else(|| GraphError::PlaceNotFound {
        graph: self.id.to_string(),
        place: current_id.to_string(),
      })?;

    let transition_id =
      place
        .handler()
        .choose_to(signal)
        .map_err(|e| GraphError::ChooseTransition {
          graph: self.id.to_string(),
          place: current_id.to_string(),
          signal: signal.to_string(),
          source: e,
        })?;

    if !place.allows_transition(&transition_id) {
      return Err(GraphError::ForbiddenTransition {
        graph: self.id.to_string(),
        place: current_id.to_string(),
        transition: transition_id.to_string(),
      });
    }

    let transition =
      self
        .transitions
        .get(&transition_id)
        .ok_or_else(|| GraphError::TransitionNotFound {
          graph: self.id.to_string(),
          transition: transition_id.to_string(),
        })?;

    let next_id =
      transition
        .handler()
        .handle(&current_id, signal)
        .map_err(|e| GraphError::TransitionHandle {
          graph: self.id.to_string(),
          transition: transition_id.to_string(),
          signal: signal.to_string(),
          source: e,
        })?;

    if !transition.allows_destination(&next_id) {
      return Err(GraphError::ForbiddenPlace {
        graph: self.id.to_string(),
        transition: transition_id.to_string(),
        place: next_id.to_string(),
      });
    }

    let next_place = self
      .places
      .get(&next_id)
      .ok_or_else(|| GraphError::PlaceNotFound {
        graph: self.id.to_string(),
        place: next_id.to_string(),
      })?;

    place
      .handler()
      .handle_out(Some(&next_id))
      .map_err(|e| GraphError::PlaceExit {
        graph: self.id.to_string(),
        place: current_id.to_string(),
        source: e,
      })?;

    let old_id = current_id;
    self.current = Some(next_id.clone());
    debug!(
      graph = %self.id,
      from = %old_id,
      transition = %transition_id,
      to = %next_id,
      "graph_advanced"
    );

    next_place
      .handler()
      .handle_in(Some(&old_id))
      .map_err(|e| GraphError::PlaceEnter {
        graph: self.id.to_string(),
        place: next_id.to_string(),
        source: e,
      })
  }

  /// Run the finishing callbacks: the current place's exit callback with no
  /// destination, then the graph-level exit callback.
  ///
  /// `current` is not cleared and no terminal flag is set: termination is
  /// a convention enforced by the scheduler, which stops driving the graph
  /// and evicts it.
  pub fn finish_graph(&self) -> Result<(), GraphError> {
    let current_id = match &self.current {
      Some(id) => id.clone(),
      None => {
        return Err(GraphError::NotStarted {
          graph: self.id.to_string(),
        });
      }
    };

    let place = self
      .places
      .get(&current_id)
      .ok_or_else(|| GraphError::PlaceNotFound {
        graph: self.id.to_string(),
        place: current_id.to_string(),
      })?;

    place
      .handler()
      .handle_out(None)
      .map_err(|e| GraphError::PlaceExit {
        graph: self.id.to_string(),
        place: current_id.to_string(),
        source: e,
      })?;

    self.handler.handle_out().map_err(|e| GraphError::GraphExit {
      graph: self.id.to_string(),
      source: e,
    })?;

    debug!(graph = %self.id, "graph_finished");
    Ok(())
  }

  /// Point-in-time record of this graph's identity and position, used by
  /// the persistence layer. Topology and handlers are reattached on reload
  /// by the embedder.
  pub fn snapshot(&self) -> GraphSnapshot<I> {
    GraphSnapshot {
      id: self.id.clone(),
      start: self.start.clone(),
      finish: self.finish.clone(),
      current: self.current.clone(),
    }
  }
}

impl<S, I: fmt::Debug> fmt::Debug for Graph<S, I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Graph")
      .field("id", &self.id)
      .field("start", &self.start)
      .field("finish", &self.finish)
      .field("current", &self.current)
      .finish_non_exhaustive()
  }
}

/// Serializable record of a graph's identity and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot<I> {
  pub id: I,
  pub start: I,
  pub finish: I,
  pub current: Option<I>,
}
