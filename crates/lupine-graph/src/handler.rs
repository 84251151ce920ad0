//! Handler capabilities supplied by the embedder.
//!
//! Handlers carry all domain-specific decision logic; the graph layer only
//! validates what they return against the declared adjacency sets. Methods
//! take `&self`; implementations that need to record or accumulate state
//! use interior mutability.

use crate::error::BoxError;

/// Callbacks attached to a place.
///
/// `S` is the signal type driving the graph, `I` the identifier type shared
/// by places and transitions.
pub trait PlaceHandler<S, I> {
  /// Invoked when control enters this place. `from` is `None` only when
  /// this place is the graph's start and the graph is just starting.
  fn handle_in(&self, from: Option<&I>) -> Result<(), BoxError>;

  /// Invoked when control is about to leave this place. `to` is `None`
  /// only when this place is the graph's finish and the graph is
  /// finishing.
  fn handle_out(&self, to: Option<&I>) -> Result<(), BoxError>;

  /// Decide which outgoing transition to take for `signal`. The returned
  /// identifier is validated against the place's registered out-edges;
  /// returning an unregistered transition is a forbidden-transition error.
  fn choose_to(&self, signal: &S) -> Result<I, BoxError>;
}

/// Callback attached to a transition.
pub trait TransitionHandler<S, I> {
  /// Compute the destination place for `signal` arriving from `from`. The
  /// returned identifier is validated against the transition's registered
  /// destinations.
  fn handle(&self, from: &I, signal: &S) -> Result<I, BoxError>;
}

/// Graph-level lifecycle callbacks, invoked once when the graph starts and
/// once when it finishes.
pub trait GraphHandler {
  fn handle_in(&self) -> Result<(), BoxError>;
  fn handle_out(&self) -> Result<(), BoxError>;
}
