use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::template::types::{Footprint, ProgramInstance, TemplateId, TemplateSet};

/// Category of a conflict edge, named after the operation kinds on its two
/// endpoints.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `from` writes a key that `to` reads.
    WriteRead,
    /// Both endpoints write the key.
    WriteWrite,
    /// `from` reads a key that `to` writes.
    ReadWrite,
}

/// A directed conflict between two templates on one key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Edge<'a> {
    pub from: TemplateId,
    pub to: TemplateId,
    pub variable: &'a str,
}

/// Tuning knobs for [`StaticDependencyGraph`].
///
/// The default configuration reproduces the reference reachability
/// semantics exactly.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Treat read-only templates as dead ends during reachability: a query
    /// whose source or target is read-only fails, and paths never pass
    /// through a read-only template.
    pub prune_read_only: bool,
}

/// Static conflict graph over a [`TemplateSet`].
///
/// Holds one edge list per [`EdgeKind`], computed once at construction from
/// the templates' read/write sets. Conflict existence does not depend on
/// isolation levels, only cycle criticality does.
///
/// The graph borrows the template set; every edge refers to templates by
/// [`TemplateId`].
#[derive(Debug, Clone)]
pub struct StaticDependencyGraph<'a> {
    templates: &'a TemplateSet,
    footprints: Vec<Footprint<'a>>,
    config: GraphConfig,
    wr_edges: Vec<Edge<'a>>,
    ww_edges: Vec<Edge<'a>>,
    rw_edges: Vec<Edge<'a>>,
}

impl<'a> StaticDependencyGraph<'a> {
    #[must_use]
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self::with_config(templates, GraphConfig::default())
    }

    /// Builds every WR, WW and RW edge between distinct templates.
    ///
    /// One edge is inserted per ordered pair, shared key and category, so two
    /// templates conflicting on several keys are joined by several edges.
    #[must_use]
    pub fn with_config(templates: &'a TemplateSet, config: GraphConfig) -> Self {
        let footprints = templates.footprints();
        let mut wr_edges = Vec::new();
        let mut ww_edges = Vec::new();
        let mut rw_edges = Vec::new();

        for (i, fp1) in footprints.iter().enumerate() {
            for (j, fp2) in footprints.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (from, to) = (TemplateId(i), TemplateId(j));

                for &variable in fp1.writes.intersection(&fp2.reads) {
                    wr_edges.push(Edge { from, to, variable });
                }
                for &variable in fp1.writes.intersection(&fp2.writes) {
                    ww_edges.push(Edge { from, to, variable });
                }
                for &variable in fp1.reads.intersection(&fp2.writes) {
                    rw_edges.push(Edge { from, to, variable });
                }
            }
        }

        tracing::debug!(
            templates = templates.len(),
            wr = wr_edges.len(),
            ww = ww_edges.len(),
            rw = rw_edges.len(),
            "built static dependency graph"
        );

        Self {
            templates,
            footprints,
            config,
            wr_edges,
            ww_edges,
            rw_edges,
        }
    }

    #[must_use]
    pub const fn templates(&self) -> &'a TemplateSet {
        self.templates
    }

    #[must_use]
    pub const fn config(&self) -> GraphConfig {
        self.config
    }

    #[must_use]
    pub(crate) fn template(&self, id: TemplateId) -> &'a ProgramInstance {
        &self.templates[id]
    }

    #[must_use]
    pub(crate) fn footprint(&self, id: TemplateId) -> &Footprint<'a> {
        &self.footprints[id.0]
    }

    #[must_use]
    pub fn edges(&self, kind: EdgeKind) -> &[Edge<'a>] {
        match kind {
            EdgeKind::WriteRead => &self.wr_edges,
            EdgeKind::WriteWrite => &self.ww_edges,
            EdgeKind::ReadWrite => &self.rw_edges,
        }
    }

    #[must_use]
    pub fn wr_edges(&self) -> &[Edge<'a>] {
        &self.wr_edges
    }

    #[must_use]
    pub fn ww_edges(&self) -> &[Edge<'a>] {
        &self.ww_edges
    }

    #[must_use]
    pub fn rw_edges(&self) -> &[Edge<'a>] {
        &self.rw_edges
    }

    /// All edges of every category, WR then WW then RW.
    ///
    /// A fresh chained view on each call; the stored lists are never merged.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge<'a>> {
        self.wr_edges
            .iter()
            .chain(self.ww_edges.iter())
            .chain(self.rw_edges.iter())
    }

    /// `true` if some edge of any category goes from `from` to `to`.
    #[must_use]
    pub fn has_direct_edge(&self, from: TemplateId, to: TemplateId) -> bool {
        self.all_edges()
            .any(|edge| edge.from == from && edge.to == to)
    }

    /// Returns `true` if `target` is `source` or can be reached from it by
    /// following edges of any category in their stored direction.
    ///
    /// Breadth-first search recomputed from scratch on every call. Returns as
    /// soon as `target` is discovered.
    #[must_use]
    pub fn reachable(&self, source: TemplateId, target: TemplateId) -> bool {
        let prune = self.config.prune_read_only;
        if prune && (self.footprint(source).is_read_only() || self.footprint(target).is_read_only())
        {
            return false;
        }

        if source == target {
            return true;
        }

        let mut visited: HashSet<TemplateId> = HashSet::new();
        let mut queue: VecDeque<TemplateId> = VecDeque::new();
        visited.insert(source);
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            if prune && self.footprint(node).is_read_only() {
                continue;
            }
            for edge in self.all_edges().filter(|edge| edge.from == node) {
                if visited.insert(edge.to) {
                    if edge.to == target {
                        return true;
                    }
                    queue.push_back(edge.to);
                }
            }
        }

        false
    }
}
