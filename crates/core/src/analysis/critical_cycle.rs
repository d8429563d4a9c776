//! Critical-cycle detection over a [`StaticDependencyGraph`].
//!
//! Every read-write edge `p2 -RW-> p3` on a variable `v23` is a candidate
//! middle of an anomaly. Whether a closing edge `p1 -> p2` together with a
//! path `p3 ~> p1` turns it into a critical cycle depends on the isolation
//! level `p2` runs under:
//!
//! | level of `p2` | `W(p2) ∩ W(p3) = ∅` required | closing edge `p1 -> p2`                                         |
//! |---------------|------------------------------|-----------------------------------------------------------------|
//! | SI            | yes                          | RW, on a variable other than `v23`, with `W(p1) ∩ W(p2) = ∅`    |
//! | PC            | no                           | WW or RW, on a variable other than `v23`                        |
//! | PSI           | yes                          | any                                                             |
//! | CC, RA        | no                           | any                                                             |
//! | SER           | --                           | none                                                            |
//!
//! Candidates whose `p2` is write-only or a single read are skipped.

use alloc::vec::Vec;

use crate::analysis::error::Error;
use crate::analysis::witness::CriticalCycle;
use crate::graph::dependency::{Edge, StaticDependencyGraph};
use crate::template::types::{IsolationLevel, TemplateId};

/// Returns `true` if the isolation levels assigned in `graph`'s template set
/// admit a critical cycle.
///
/// # Errors
///
/// Returns [`Error::MissingIsolationLevel`] if any template has no isolation
/// level.
pub fn has_critical_cycle(graph: &StaticDependencyGraph<'_>) -> Result<bool, Error> {
    find_critical_cycle(graph).map(|cycle| cycle.is_some())
}

/// Returns the first critical cycle found, scanning read-write edges in
/// graph order, or `None` if there is none.
///
/// # Errors
///
/// Returns [`Error::MissingIsolationLevel`] if any template has no isolation
/// level. The check covers the whole set up front, so the outcome never
/// depends on which edges happen to be inspected.
pub fn find_critical_cycle(
    graph: &StaticDependencyGraph<'_>,
) -> Result<Option<CriticalCycle>, Error> {
    let levels = graph
        .templates()
        .iter()
        .map(|(id, template)| {
            template
                .isolation_level()
                .ok_or_else(|| Error::MissingIsolationLevel {
                    template: id,
                    name: template.name().into(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for rw23 in graph.rw_edges() {
        let p2 = graph.footprint(rw23.from);
        if p2.is_single_read() || p2.is_write_only() {
            continue;
        }

        let level = levels[rw23.from.0];
        let closing = match level {
            IsolationLevel::SnapshotIsolation => close_snapshot_isolation(graph, rw23),
            IsolationLevel::PrefixConsistency => close_prefix_consistency(graph, rw23),
            IsolationLevel::ParallelSnapshotIsolation => {
                close_parallel_snapshot_isolation(graph, rw23)
            }
            IsolationLevel::CausalConsistency | IsolationLevel::ReadAtomic => {
                close_any_direct_edge(graph, rw23)
            }
            IsolationLevel::Serializable => None,
        };

        if let Some(p1) = closing {
            let cycle = CriticalCycle {
                p1,
                p2: rw23.from,
                p3: rw23.to,
                level,
            };
            tracing::debug!(
                p1 = graph.template(p1).name(),
                p2 = graph.template(rw23.from).name(),
                p3 = graph.template(rw23.to).name(),
                variable = rw23.variable,
                %level,
                "critical cycle found"
            );
            return Ok(Some(cycle));
        }
    }

    tracing::debug!(rw_edges = graph.rw_edges().len(), "no critical cycle");
    Ok(None)
}

fn close_snapshot_isolation(
    graph: &StaticDependencyGraph<'_>,
    rw23: &Edge<'_>,
) -> Option<TemplateId> {
    let p2 = graph.footprint(rw23.from);
    if !p2.writes_disjoint_from(graph.footprint(rw23.to)) {
        return None;
    }

    graph
        .rw_edges()
        .iter()
        .filter(|rw12| rw12.to == rw23.from && rw12.variable != rw23.variable)
        .find(|rw12| {
            graph.footprint(rw12.from).writes_disjoint_from(p2)
                && graph.reachable(rw23.to, rw12.from)
        })
        .map(|rw12| rw12.from)
}

fn close_prefix_consistency(
    graph: &StaticDependencyGraph<'_>,
    rw23: &Edge<'_>,
) -> Option<TemplateId> {
    graph
        .ww_edges()
        .iter()
        .chain(graph.rw_edges())
        .filter(|edge12| edge12.to == rw23.from && edge12.variable != rw23.variable)
        .find(|edge12| graph.reachable(rw23.to, edge12.from))
        .map(|edge12| edge12.from)
}

fn close_parallel_snapshot_isolation(
    graph: &StaticDependencyGraph<'_>,
    rw23: &Edge<'_>,
) -> Option<TemplateId> {
    if !graph
        .footprint(rw23.from)
        .writes_disjoint_from(graph.footprint(rw23.to))
    {
        return None;
    }
    close_any_direct_edge(graph, rw23)
}

fn close_any_direct_edge(
    graph: &StaticDependencyGraph<'_>,
    rw23: &Edge<'_>,
) -> Option<TemplateId> {
    graph.templates().ids().find(|&p1| {
        graph.has_direct_edge(p1, rw23.from) && graph.reachable(rw23.to, p1)
    })
}
