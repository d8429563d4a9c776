use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;

use derive_more::{Display, From};

/// The kind of access a static operation performs on its key.
///
/// An `Update` is a read followed by a write of the same key and counts as
/// both for conflict purposes.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    Read,
    Write,
    Update,
}

/// Isolation levels a transaction template may be assigned.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolationLevel {
    /// Serializability.
    #[display("SER")]
    Serializable,
    /// Snapshot Isolation.
    #[display("SI")]
    SnapshotIsolation,
    /// Prefix Consistency.
    #[display("PC")]
    PrefixConsistency,
    /// Parallel Snapshot Isolation.
    #[display("PSI")]
    ParallelSnapshotIsolation,
    /// Causal Consistency.
    #[display("CC")]
    CausalConsistency,
    /// Read Atomic.
    #[display("RA")]
    ReadAtomic,
}

/// A single declared access of a template. Carries no value payload.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticOperation {
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: OperationKind,
    pub key: String,
}

impl StaticOperation {
    #[must_use]
    pub fn new(id: u64, kind: OperationKind, key: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn read(id: u64, key: impl Into<String>) -> Self {
        Self::new(id, OperationKind::Read, key)
    }

    #[must_use]
    pub fn write(id: u64, key: impl Into<String>) -> Self {
        Self::new(id, OperationKind::Write, key)
    }

    #[must_use]
    pub fn update(id: u64, key: impl Into<String>) -> Self {
        Self::new(id, OperationKind::Update, key)
    }

    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self.kind, OperationKind::Write | OperationKind::Update)
    }

    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self.kind, OperationKind::Read | OperationKind::Update)
    }
}

/// A transaction template: a named, ordered list of static operations,
/// optionally tagged with the isolation level it runs under.
///
/// The operation list is fixed at construction; every derived set and
/// predicate is a function of it.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInstance {
    name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    isolation_level: Option<IsolationLevel>,
    operations: Vec<StaticOperation>,
}

impl ProgramInstance {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        isolation_level: Option<IsolationLevel>,
        operations: Vec<StaticOperation>,
    ) -> Self {
        Self {
            name: name.into(),
            isolation_level,
            operations,
        }
    }

    /// A template with no isolation level assigned yet.
    #[must_use]
    pub fn unallocated(name: impl Into<String>, operations: Vec<StaticOperation>) -> Self {
        Self::new(name, None, operations)
    }

    /// Returns a copy of this template running under `level`.
    #[must_use]
    pub fn with_isolation_level(&self, level: IsolationLevel) -> Self {
        Self::new(self.name.clone(), Some(level), self.operations.clone())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn isolation_level(&self) -> Option<IsolationLevel> {
        self.isolation_level
    }

    #[must_use]
    pub fn operations(&self) -> &[StaticOperation] {
        &self.operations
    }

    /// Keys written by a `Write` or `Update` operation.
    #[must_use]
    pub fn write_set(&self) -> BTreeSet<&str> {
        self.operations
            .iter()
            .filter(|op| op.is_write())
            .map(|op| op.key.as_str())
            .collect()
    }

    /// Keys read by a `Read` or `Update` operation.
    #[must_use]
    pub fn read_set(&self) -> BTreeSet<&str> {
        self.operations
            .iter()
            .filter(|op| op.is_read())
            .map(|op| op.key.as_str())
            .collect()
    }

    #[must_use]
    pub fn footprint(&self) -> Footprint<'_> {
        Footprint {
            reads: self.read_set(),
            writes: self.write_set(),
        }
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        !self.operations.iter().any(StaticOperation::is_write)
    }

    #[must_use]
    pub fn is_write_only(&self) -> bool {
        !self.operations.iter().any(StaticOperation::is_read)
    }

    #[must_use]
    pub fn is_single_read(&self) -> bool {
        self.footprint().is_single_read()
    }

    /// `true` if some key is written by both templates.
    #[must_use]
    pub fn ww_conflict(&self, other: &Self) -> bool {
        self.operations.iter().any(|op1| {
            op1.is_write()
                && other
                    .operations
                    .iter()
                    .any(|op2| op2.is_write() && op1.key == op2.key)
        })
    }

    /// `true` if some key written by `self` is accessed by a non-writing
    /// operation of `other`.
    #[must_use]
    pub fn wr_conflict(&self, other: &Self) -> bool {
        self.operations.iter().any(|op1| {
            op1.is_write()
                && other
                    .operations
                    .iter()
                    .any(|op2| !op2.is_write() && op1.key == op2.key)
        })
    }

    #[must_use]
    pub fn is_ser(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::Serializable)
    }

    #[must_use]
    pub fn is_si(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::SnapshotIsolation)
    }

    #[must_use]
    pub fn is_pc(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::PrefixConsistency)
    }

    #[must_use]
    pub fn is_psi(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::ParallelSnapshotIsolation)
    }

    #[must_use]
    pub fn is_cc(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::CausalConsistency)
    }

    #[must_use]
    pub fn is_ra(&self) -> bool {
        self.isolation_level == Some(IsolationLevel::ReadAtomic)
    }
}

/// Read and write sets of a template, borrowed from its operations.
///
/// Analyses compute footprints once per call and index them by
/// [`TemplateId`] instead of re-deriving the sets on every comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint<'a> {
    pub reads: BTreeSet<&'a str>,
    pub writes: BTreeSet<&'a str>,
}

impl Footprint<'_> {
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn is_write_only(&self) -> bool {
        self.reads.is_empty()
    }

    #[must_use]
    pub fn is_single_read(&self) -> bool {
        self.writes.is_empty() && self.reads.len() == 1
    }

    /// `true` if the write sets are disjoint.
    #[must_use]
    pub fn writes_disjoint_from(&self, other: &Footprint<'_>) -> bool {
        self.writes.is_disjoint(&other.writes)
    }
}

/// Stable handle of a template within a [`TemplateSet`]: its position.
///
/// Edges and visited sets key on this handle, never on template names, so
/// two distinct templates sharing a name are still told apart.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("#{_0}")]
pub struct TemplateId(pub usize);

/// An ordered collection of transaction templates: the unit of analysis.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: Vec<ProgramInstance>,
}

impl TemplateSet {
    #[must_use]
    pub const fn new(templates: Vec<ProgramInstance>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn templates(&self) -> &[ProgramInstance] {
        &self.templates
    }

    #[must_use]
    pub fn into_templates(self) -> Vec<ProgramInstance> {
        self.templates
    }

    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&ProgramInstance> {
        self.templates.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TemplateId> {
        (0..self.templates.len()).map(TemplateId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &ProgramInstance)> {
        self.templates
            .iter()
            .enumerate()
            .map(|(index, template)| (TemplateId(index), template))
    }

    /// Footprints of all templates, indexed by [`TemplateId`].
    #[must_use]
    pub fn footprints(&self) -> Vec<Footprint<'_>> {
        self.templates
            .iter()
            .map(ProgramInstance::footprint)
            .collect()
    }
}

impl Index<TemplateId> for TemplateSet {
    type Output = ProgramInstance;

    fn index(&self, id: TemplateId) -> &Self::Output {
        &self.templates[id.0]
    }
}

impl From<Vec<ProgramInstance>> for TemplateSet {
    fn from(templates: Vec<ProgramInstance>) -> Self {
        Self::new(templates)
    }
}

impl FromIterator<ProgramInstance> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = ProgramInstance>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
