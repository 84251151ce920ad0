use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::handler::PlaceHandler;
use crate::transition::Transition;

/// A named node in a workflow graph.
///
/// The out-edge set is append-only: transitions may be registered but never
/// removed, and membership defines the only legal moves out of this place.
pub struct Place<S, I> {
  id: I,
  handler: Box<dyn PlaceHandler<S, I> + Send>,
  out: HashSet<I>,
}

impl<S, I> Place<S, I>
where
  I: Clone + Eq + Hash,
{
  pub fn new(id: I, handler: Box<dyn PlaceHandler<S, I> + Send>) -> Self {
    Self {
      id,
      handler,
      out: HashSet::new(),
    }
  }

  pub fn id(&self) -> &I {
    &self.id
  }

  /// Register `transition` as a legal way out of this place.
  ///
  /// Idempotent: registering the same transition twice leaves the out-edge
  /// set unchanged.
  pub fn add_transition(&mut self, transition: &Transition<S, I>) -> &mut Self {
    self.out.insert(transition.id().clone());
    self
  }

  /// Whether `transition` may be taken out of this place.
  pub fn allows_transition(&self, transition: &I) -> bool {
    self.out.contains(transition)
  }

  /// The registered out-edges.
  pub fn out_edges(&self) -> &HashSet<I> {
    &self.out
  }

  pub(crate) fn handler(&self) -> &(dyn PlaceHandler<S, I> + Send) {
    self.handler.as_ref()
  }
}

impl<S, I: fmt::Debug> fmt::Debug for Place<S, I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Place")
      .field("id", &self.id)
      .field("out", &self.out)
      .finish_non_exhaustive()
  }
}
