use crate::graph::dependency::StaticDependencyGraph;
use crate::template::types::TemplateSet;

use self::error::Error;

pub mod allocator;
pub mod critical_cycle;
pub mod error;
pub mod witness;

pub use allocator::allocate;
pub use critical_cycle::{find_critical_cycle, has_critical_cycle};
pub use witness::CriticalCycle;

/// Allocates isolation levels for `templates` and audits the result with the
/// critical-cycle detector.
///
/// Returns the allocated set together with the first critical cycle found in
/// it, if any.
///
/// # Errors
///
/// Propagates [`find_critical_cycle`]'s error, which cannot occur on an
/// allocated set.
pub fn allocate_and_verify(
    templates: &TemplateSet,
) -> Result<(TemplateSet, Option<CriticalCycle>), Error> {
    let allocated = allocate(templates);
    let cycle = find_critical_cycle(&StaticDependencyGraph::new(&allocated))?;
    Ok((allocated, cycle))
}
