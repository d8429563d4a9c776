//! Greedy isolation-level allocation.
//!
//! Every template is assigned the weakest level its own shape and its
//! pairwise conflicts with the rest of the workload allow:
//!
//! 1. write-only or single-read templates run under Read Atomic;
//! 2. other read-only templates run under Prefix Consistency;
//! 3. a template that reads a key written by some other template, while
//!    sharing no written key with it, is exposed to write skew and runs
//!    under Serializability;
//! 4. everything else runs under Parallel Snapshot Isolation.
//!
//! Allocation never consults the critical-cycle detector. Use
//! [`find_critical_cycle`](crate::analysis::critical_cycle::find_critical_cycle)
//! on the result to audit it.

use alloc::vec::Vec;

use crate::template::types::{IsolationLevel, TemplateId, TemplateSet};

/// Returns a new template set with the same names and operations, each
/// template tagged with its allocated isolation level. Any level already
/// present on the input is ignored.
#[must_use]
pub fn allocate(templates: &TemplateSet) -> TemplateSet {
    let allocated: TemplateSet = templates
        .iter()
        .map(|(id, template)| template.with_isolation_level(choose_level(templates, id)))
        .collect();

    tracing::debug!(templates = allocated.len(), "allocated isolation levels");

    allocated
}

/// Allocated levels in template order.
#[must_use]
pub fn allocated_levels(templates: &TemplateSet) -> Vec<IsolationLevel> {
    templates
        .ids()
        .map(|id| choose_level(templates, id))
        .collect()
}

fn choose_level(templates: &TemplateSet, id: TemplateId) -> IsolationLevel {
    let template = &templates[id];

    if template.is_write_only() || template.is_single_read() {
        return IsolationLevel::ReadAtomic;
    }

    if template.is_read_only() {
        return IsolationLevel::PrefixConsistency;
    }

    // With disjoint write sets, every key `template` shares with `other`'s
    // writes is accessed by a plain read, so `wr_conflict` sees all of them.
    let write_skew_partner = templates
        .iter()
        .filter(|(other_id, _)| *other_id != id)
        .find(|(_, other)| other.wr_conflict(template) && !template.ww_conflict(other));

    if let Some((partner, _)) = write_skew_partner {
        tracing::trace!(template = %id, %partner, "write skew exposure");
        IsolationLevel::Serializable
    } else {
        IsolationLevel::ParallelSnapshotIsolation
    }
}
