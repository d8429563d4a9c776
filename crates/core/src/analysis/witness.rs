use crate::template::types::{IsolationLevel, TemplateId};

/// Evidence that an isolation-level assignment admits an anomaly.
///
/// The cycle runs `p1 -> p2 -RW-> p3 ~> p1`: a read-write edge out of `p2`,
/// a closing edge into `p2` from `p1`, and a path from `p3` back to `p1`.
/// Which closing edges count depends on the isolation level of `p2`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalCycle {
    pub p1: TemplateId,
    pub p2: TemplateId,
    pub p3: TemplateId,
    /// Isolation level of `p2`, which selected the closing pattern.
    pub level: IsolationLevel,
}
