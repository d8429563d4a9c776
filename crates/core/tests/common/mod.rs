/// DSL macros for building test workloads.
///
/// Produces `TemplateSet` values of `ProgramInstance`s.
///
/// # Syntax
///
/// ```ignore
/// templates! {
///     Transfer @ SnapshotIsolation { r(a), w(b) },   // tagged template
///     Audit { r(a), r(b) },                          // unallocated template
///     Deposit @ ReadAtomic { u(a) },                 // u(key) is an update
/// }
/// ```
///
/// - `r(key)` → `StaticOperation::read`
/// - `w(key)` → `StaticOperation::write`
/// - `u(key)` → `StaticOperation::update`
///
/// Operation ids are assigned `1, 2, ...` in order.
///
/// Build the operation list of one template.
#[macro_export]
macro_rules! ops {
    ($($kind:ident($key:ident)),* $(,)?) => {{
        let accesses: Vec<(&str, &str)> = vec![$((stringify!($kind), stringify!($key))),*];
        accesses
            .into_iter()
            .zip(1u64..)
            .map(|((kind, key), id)| match kind {
                "r" => isoalloc_core::StaticOperation::read(id, key),
                "w" => isoalloc_core::StaticOperation::write(id, key),
                "u" => isoalloc_core::StaticOperation::update(id, key),
                other => panic!("unknown operation kind `{other}`"),
            })
            .collect::<Vec<_>>()
    }};
}

/// Build one template, optionally tagged with an isolation level.
#[macro_export]
macro_rules! template {
    ($name:ident @ $level:ident { $($body:tt)* }) => {
        isoalloc_core::ProgramInstance::new(
            stringify!($name),
            Some(isoalloc_core::IsolationLevel::$level),
            $crate::ops!($($body)*),
        )
    };
    ($name:ident { $($body:tt)* }) => {
        isoalloc_core::ProgramInstance::unallocated(stringify!($name), $crate::ops!($($body)*))
    };
}

/// Build a full template set.
#[macro_export]
macro_rules! templates {
    ($( $name:ident $(@ $level:ident)? { $($body:tt)* } ),* $(,)?) => {
        isoalloc_core::TemplateSet::new(vec![
            $($crate::template!($name $(@ $level)? { $($body)* })),*
        ])
    };
}
