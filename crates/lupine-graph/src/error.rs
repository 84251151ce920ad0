//! Graph-layer errors.

use thiserror::Error;

/// Error type returned by embedder-supplied handler callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("entering graph '{graph}'")]
  GraphEnter {
    graph: String,
    #[source]
    source: BoxError,
  },

  #[error("leaving graph '{graph}'")]
  GraphExit {
    graph: String,
    #[source]
    source: BoxError,
  },

  #[error("auto-starting graph '{graph}'")]
  AutoStart {
    graph: String,
    #[source]
    source: Box<GraphError>,
  },

  #[error("graph '{graph}' has not been started")]
  NotStarted { graph: String },

  #[error("entering place '{place}' in graph '{graph}'")]
  PlaceEnter {
    graph: String,
    place: String,
    #[source]
    source: BoxError,
  },

  #[error("leaving place '{place}' in graph '{graph}'")]
  PlaceExit {
    graph: String,
    place: String,
    #[source]
    source: BoxError,
  },

  #[error("choosing a transition out of place '{place}' in graph '{graph}' for signal '{signal}'")]
  ChooseTransition {
    graph: String,
    place: String,
    signal: String,
    #[source]
    source: BoxError,
  },

  #[error("forbidden transition '{transition}' out of place '{place}' in graph '{graph}'")]
  ForbiddenTransition {
    graph: String,
    place: String,
    transition: String,
  },

  #[error("transition '{transition}' handling signal '{signal}' in graph '{graph}'")]
  TransitionHandle {
    graph: String,
    transition: String,
    signal: String,
    #[source]
    source: BoxError,
  },

  #[error("forbidden place '{place}' out of transition '{transition}' in graph '{graph}'")]
  ForbiddenPlace {
    graph: String,
    transition: String,
    place: String,
  },

  #[error("place '{place}' is not part of graph '{graph}'")]
  PlaceNotFound { graph: String, place: String },

  #[error("transition '{transition}' is not part of graph '{graph}'")]
  TransitionNotFound { graph: String, transition: String },
}
