//! Isolation-level allocation for mixed-isolation transactional workloads.
//!
//! `isoalloc_core` works on a static workload: a [`TemplateSet`] of named
//! transaction templates, each an ordered list of reads, writes and updates
//! over string keys. From the read/write footprints alone it
//!
//! 1. **allocates** to every template the weakest isolation level that is
//!    safe for it ([`allocate()`]), picking among Read Atomic, Prefix
//!    Consistency, Parallel Snapshot Isolation and Serializability;
//! 2. **verifies** an assignment by building the static dependency graph of
//!    write-read, write-write and read-write conflicts
//!    ([`StaticDependencyGraph`]) and searching it for a critical cycle
//!    ([`has_critical_cycle()`]), a necessary condition for an anomaly when
//!    isolation levels are mixed in one database.
//!
//! Six isolation levels are understood by the detector: Serializability,
//! Snapshot Isolation, Prefix Consistency, Parallel Snapshot Isolation,
//! Causal Consistency and Read Atomic.
//!
//! ```rust,ignore
//! use isoalloc_core::{allocate, has_critical_cycle, StaticDependencyGraph};
//!
//! let allocated = allocate(&templates);
//! let graph = StaticDependencyGraph::new(&allocated);
//! assert_eq!(has_critical_cycle(&graph), Ok(false));
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` on the workload types,
//!   matching the JSON workload format
//!   (`{"templates": [{"name", "isolationLevel", "operations"}]}`).
//! - **`schemars`** -- derives `JsonSchema` for the workload format.
//!
//! This crate is `no_std` compatible (requires `alloc`).

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod analysis;
pub mod graph;
pub mod template;

pub use analysis::{allocate, allocate_and_verify, find_critical_cycle, has_critical_cycle};
pub use graph::{GraphConfig, StaticDependencyGraph};
pub use template::types::{
    IsolationLevel, OperationKind, ProgramInstance, StaticOperation, TemplateId, TemplateSet,
};
