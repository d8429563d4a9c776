//! Conflict graphs over transaction templates.

pub mod dependency;

pub use dependency::{Edge, EdgeKind, GraphConfig, StaticDependencyGraph};
