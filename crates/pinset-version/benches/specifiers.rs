use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pinset_version::{ParsedRequirement, SpecifierSet, Version};

fn bench_parse_versions(c: &mut Criterion) {
    let versions = [
        "v1.2.3",
        "1.2.3b1",
        "2.4.0.post5",
        "1.2.dev3",
        "2020.4.20",
        "1.2.3rc1",
        "1!1.2.3",
        "1.2.3-alpha2",
    ];

    c.bench_function("parse_versions", |b| {
        b.iter(|| {
            for version in versions {
                black_box(Version::parse(black_box(version)).ok());
            }
        })
    });
}

fn bench_parse_specifier_sets(c: &mut Criterion) {
    let sets = [
        ">=1.2.3,<2.0.0",
        "~=1.4.2",
        "==1.2.*",
        "!=1.3,!=1.4,>=1.0",
        "===1.0",
    ];

    c.bench_function("parse_specifier_sets", |b| {
        b.iter(|| {
            for set in sets {
                black_box(SpecifierSet::parse(black_box(set)).ok());
            }
        })
    });
}

fn bench_contains(c: &mut Criterion) {
    let set = SpecifierSet::parse(">=1.0,<3.0,!=1.5.*,!=2.2").unwrap();
    let versions: Vec<Version> = ["0.9", "1.0", "1.5.3", "2.0rc1", "2.2", "2.9.9", "3.0"]
        .iter()
        .map(|v| Version::parse(v).unwrap())
        .collect();

    c.bench_function("specifier_set_contains", |b| {
        b.iter(|| {
            for version in &versions {
                black_box(set.contains(black_box(version), false));
            }
        })
    });
}

fn bench_parse_requirements(c: &mut Criterion) {
    let requirements = [
        "requests[security,socks]>=2.8.1,==2.8.*",
        "pkg @ https://example.com/pkg-1.0.tar.gz",
        "numpy",
    ];

    c.bench_function("parse_requirements", |b| {
        b.iter(|| {
            for req in requirements {
                black_box(ParsedRequirement::parse(black_box(req)).ok());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_parse_versions,
    bench_parse_specifier_sets,
    bench_contains,
    bench_parse_requirements
);
criterion_main!(benches);
