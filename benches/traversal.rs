//! Benchmarks for catalog traversals
//!
//! Builds layered synthetic catalogs where every module depends on a few
//! modules of the next layer, then measures graph, tree and promotion
//! traversals over them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modcatalog::filter::FilterSet;
use modcatalog::graph::{dependency_graph, dependency_tree, Granularity};
use modcatalog::model::{Artifact, ArtifactKey, Module};
use modcatalog::promotion::promotion_report;
use modcatalog::store::{MemoryStore, RepositoryStore};

fn gavc(layer: usize, index: usize) -> String {
    format!("org.bench:mod-{}-{}:1.0.0", layer, index)
}

/// Create a catalog with `layers` layers of `width` modules each.
fn create_catalog(layers: usize, width: usize, fan_out: usize) -> MemoryStore {
    let store = MemoryStore::new();

    for layer in 0..layers {
        for index in 0..width {
            let owned = gavc(layer, index);
            let key = ArtifactKey::parse(&owned).expect("valid GAVC");
            store.store_artifact(Artifact::new(key)).expect("store artifact");

            let mut module = Module::new(format!("mod-{}-{}", layer, index), "1.0.0");
            module.add_artifact(owned);
            if layer + 1 < layers {
                for offset in 0..fan_out {
                    module.add_dependency(gavc(layer + 1, (index + offset) % width), "compile");
                }
            }
            store.store_module(module).expect("store module");
        }
    }

    store
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_graph");
    let filters = FilterSet::new().with_full_recursion(true);

    for width in [10, 50, 100].iter() {
        let store = create_catalog(8, *width, 3);

        group.bench_with_input(BenchmarkId::new("artifact", width), width, |b, _| {
            b.iter(|| {
                black_box(dependency_graph(&store, "mod-0-0:1.0.0", &filters, Granularity::Artifact))
            });
        });
        group.bench_with_input(BenchmarkId::new("module", width), width, |b, _| {
            b.iter(|| {
                black_box(dependency_graph(&store, "mod-0-0:1.0.0", &filters, Granularity::Module))
            });
        });
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_tree");
    let filters = FilterSet::new().with_full_recursion(true);

    for width in [10, 50, 100].iter() {
        let store = create_catalog(8, *width, 3);

        group.bench_with_input(BenchmarkId::new("build", width), width, |b, _| {
            b.iter(|| black_box(dependency_tree(&store, "mod-0-0:1.0.0", &filters)));
        });

        let tree = dependency_tree(&store, "mod-0-0:1.0.0", &filters).expect("tree");
        group.bench_with_input(BenchmarkId::new("flatten_render", width), &tree, |b, tree| {
            b.iter(|| {
                for node in tree.flatten() {
                    black_box(node.render());
                }
            });
        });
    }

    group.finish();
}

fn bench_promotion(c: &mut Criterion) {
    let mut group = c.benchmark_group("promotion_report");

    for width in [10, 50].iter() {
        let store = create_catalog(6, *width, 2);
        let direct = FilterSet::new();
        let full = FilterSet::new().with_full_recursion(true);

        group.bench_with_input(BenchmarkId::new("direct", width), width, |b, _| {
            b.iter(|| black_box(promotion_report(&store, "mod-0-0:1.0.0", &direct)));
        });
        group.bench_with_input(BenchmarkId::new("full_recursion", width), width, |b, _| {
            b.iter(|| black_box(promotion_report(&store, "mod-0-0:1.0.0", &full)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph, bench_tree, bench_promotion);
criterion_main!(benches);
