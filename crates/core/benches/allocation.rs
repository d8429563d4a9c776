use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use isoalloc_core::{
    allocate, has_critical_cycle, ProgramInstance, StaticDependencyGraph, StaticOperation,
    TemplateSet,
};

/// Build a workload with given dimensions.
/// `templates`: number of templates
/// `ops_per_template`: operations per template
/// `keys`: size of the key space
///
/// Every fifth template is read-only; the others alternate reads and writes
/// over a sliding window of keys.
fn build_workload(templates: usize, ops_per_template: usize, keys: usize) -> TemplateSet {
    (0..templates)
        .map(|t| {
            let operations = (0..ops_per_template)
                .map(|o| {
                    let key = format!("key_{}", (t * 7 + o * 3) % keys);
                    let id = o as u64 + 1;
                    if t % 5 == 0 || o % 2 == 0 {
                        StaticOperation::read(id, key)
                    } else {
                        StaticOperation::write(id, key)
                    }
                })
                .collect();
            ProgramInstance::unallocated(format!("Txn_{t}"), operations)
        })
        .collect()
}

fn bench_allocation(c: &mut Criterion) {
    let small = build_workload(10, 4, 20);
    let medium = build_workload(100, 6, 200);
    let large = build_workload(1000, 8, 2000);

    let mut group = c.benchmark_group("allocate");
    for (name, workload) in [("small", &small), ("medium", &medium), ("large", &large)] {
        group.bench_function(name, |b| {
            b.iter(|| allocate(black_box(workload)));
        });
    }
    group.finish();

    let allocated_small = allocate(&small);
    let allocated_medium = allocate(&medium);

    let mut group = c.benchmark_group("critical_cycle");
    for (name, workload) in [("small", &allocated_small), ("medium", &allocated_medium)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let graph = StaticDependencyGraph::new(black_box(workload));
                let _ = has_critical_cycle(&graph);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocation);
criterion_main!(benches);
