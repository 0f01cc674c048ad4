//! Benchmarks for reference listing parsing and version ordering.
//!
//! Large repositories list tens of thousands of tags, and every
//! `versions` / `max-satisfying` call parses and sorts all of them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use repo_mirror::references::parse_references;
use repo_mirror::version::{max_satisfying, parse_range, sort_versions, VersionMode};

/// Generate an `ls-remote` style listing with `num_tags` annotated tags.
///
/// Every tag is followed by its peeled entry, as `ls-remote` prints them.
fn generate_listing(num_tags: usize) -> String {
    let mut listing = String::from("fb86d51f293e8baa553a46e94a37bb0aa7584304\tHEAD\n");
    listing.push_str("fb86d51f293e8baa553a46e94a37bb0aa7584304\trefs/heads/master\n");
    for i in 0..num_tags {
        let sha = format!("{:040x}", i + 1);
        let name = format!("v{}.{}.{}", i / 100, (i / 10) % 10, i % 10);
        listing.push_str(&format!("{}\trefs/tags/{}\n", sha, name));
        listing.push_str(&format!("{}\trefs/tags/{}^{{}}\n", sha, name));
    }
    listing
}

fn bench_parse_references(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_references");

    for num_tags in [10, 100, 1000, 10000] {
        let listing = generate_listing(num_tags);
        group.bench_with_input(
            BenchmarkId::new("tags", num_tags),
            &listing,
            |b, listing| b.iter(|| parse_references(black_box(listing))),
        );
    }

    group.finish();
}

fn bench_version_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_ordering");

    for num_tags in [100, 1000, 10000] {
        let tags = parse_references(&generate_listing(num_tags)).tags;

        group.bench_with_input(BenchmarkId::new("strict", num_tags), &tags, |b, tags| {
            b.iter(|| sort_versions(black_box(tags.clone()), VersionMode::Strict))
        });
        group.bench_with_input(BenchmarkId::new("loose", num_tags), &tags, |b, tags| {
            b.iter(|| sort_versions(black_box(tags.clone()), VersionMode::Loose))
        });
    }

    group.finish();
}

fn bench_max_satisfying(c: &mut Criterion) {
    let tags = parse_references(&generate_listing(1000)).tags;
    let versions = sort_versions(tags, VersionMode::Strict);
    let mut group = c.benchmark_group("max_satisfying");

    for range in ["*", "^5", "~0.1.3", ">=9.9.9"] {
        let Ok(requirement) = parse_range(range) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("range", range), &requirement, |b, req| {
            b.iter(|| max_satisfying(black_box(&versions), black_box(req)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_references,
    bench_version_ordering,
    bench_max_satisfying
);
criterion_main!(benches);
