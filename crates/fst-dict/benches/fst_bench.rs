// Criterion benchmarks: transducer construction and the three search
// operations over a generated word list.
//
// Run:
//   cargo bench -p fst-dict

use criterion::{criterion_group, criterion_main, Criterion};
use fst_dict::{build, Fst, Pair};

// ---------------------------------------------------------------------------
// Input generation
// ---------------------------------------------------------------------------

/// A deterministic word list with realistic prefix/suffix sharing: number
/// names in a mixed radix, tagged with their index.
fn word_list(n: usize) -> Vec<Pair> {
    let digits = ["zero", "one", "two", "three", "four", "five", "six"];
    (0..n)
        .map(|i| {
            let key = format!(
                "{}-{}-{}#{}",
                digits[i % 7],
                digits[(i / 7) % 7],
                digits[(i / 49) % 7],
                i
            );
            Pair::new(key, i as i32 + 1)
        })
        .collect()
}

fn built(n: usize) -> (Fst, Vec<Pair>) {
    let input = word_list(n);
    (build(input.clone()).unwrap(), input)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_build(c: &mut Criterion) {
    let input = word_list(10_000);
    c.bench_function("build_10k", |b| {
        b.iter(|| build(std::hint::black_box(input.clone())).unwrap())
    });
}

fn bench_search_hit(c: &mut Criterion) {
    let (fst, input) = built(10_000);
    c.bench_function("search_hit", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = &input[i % input.len()].input;
            i += 1;
            std::hint::black_box(fst.search(key))
        })
    });
}

fn bench_search_miss(c: &mut Criterion) {
    let (fst, input) = built(10_000);
    c.bench_function("search_miss", |b| {
        let mut i = 0;
        b.iter(|| {
            let mut key = input[i % input.len()].input.clone();
            key.push(b'!');
            i += 1;
            std::hint::black_box(fst.search(&key))
        })
    });
}

fn bench_common_prefix_search(c: &mut Criterion) {
    let (fst, input) = built(10_000);
    c.bench_function("common_prefix_search", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = &input[i % input.len()].input;
            i += 1;
            std::hint::black_box(fst.common_prefix_search(key))
        })
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let (fst, _) = built(10_000);
    let bytes = fst.to_bytes().unwrap();
    c.bench_function("read_10k", |b| {
        b.iter(|| Fst::from_bytes(std::hint::black_box(&bytes)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_search_hit,
    bench_search_miss,
    bench_common_prefix_search,
    bench_round_trip
);
criterion_main!(benches);
