use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::handler::TransitionHandler;
use crate::place::Place;

/// A named, signal-driven edge-selector between places.
///
/// The destination set must include every place the transition's handler
/// can legally return; the graph rejects anything outside it.
pub struct Transition<S, I> {
  id: I,
  handler: Box<dyn TransitionHandler<S, I> + Send>,
  to: HashSet<I>,
}

impl<S, I> Transition<S, I>
where
  I: Clone + Eq + Hash,
{
  pub fn new(id: I, handler: Box<dyn TransitionHandler<S, I> + Send>) -> Self {
    Self {
      id,
      handler,
      to: HashSet::new(),
    }
  }

  pub fn id(&self) -> &I {
    &self.id
  }

  /// Register `place` as a legal destination of this transition.
  ///
  /// Idempotent: registering the same place twice leaves the destination
  /// set unchanged.
  pub fn add_to(&mut self, place: &Place<S, I>) -> &mut Self {
    self.to.insert(place.id().clone());
    self
  }

  /// Whether `place` is a legal destination of this transition.
  pub fn allows_destination(&self, place: &I) -> bool {
    self.to.contains(place)
  }

  /// The registered destinations.
  pub fn destinations(&self) -> &HashSet<I> {
    &self.to
  }

  pub(crate) fn handler(&self) -> &(dyn TransitionHandler<S, I> + Send) {
    self.handler.as_ref()
  }
}

impl<S, I: fmt::Debug> fmt::Debug for Transition<S, I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transition")
      .field("id", &self.id)
      .field("to", &self.to)
      .finish_non_exhaustive()
  }
}
