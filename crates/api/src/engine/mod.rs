//! Generation engine.
//!
//! The four collaborators behind the streaming endpoints:
//!
//! - [`guard`] -- single-flight admission (create / resume / reject)
//! - [`dispatcher`] -- fire-and-forget hand-off to the external executor
//! - [`bridge`] -- the poll-and-push progress stream loop
//! - [`resolver`] -- turns a completed entry's reference into the artifact

pub mod bridge;
pub mod dispatcher;
pub mod guard;
pub mod resolver;
