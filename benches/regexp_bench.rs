// Criterion benchmark suite: compile and match throughput of the NFA engine.
//
// Run: cargo bench
// Specific group: cargo bench -- prefix_scan
// HTML report: target/criterion/report/index.html

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use regexp_nfa::api::Regex;
use regexp_nfa::regcomp::compile;
use regexp_nfa::regexec::execute;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_log_line(i: usize) -> String {
    format!(
        "2025-06-{:02} {:02}:{:02}:{:02} INFO server[{}] request path=/api/v1/users/{} status=200 duration={}ms\n",
        (i % 28) + 1,
        i % 24,
        i % 60,
        (i * 7) % 60,
        1000 + (i % 50),
        i * 3,
        (i * 13) % 500,
    )
}

fn make_log_text(num_lines: usize) -> Vec<u8> {
    let mut text = String::new();
    for i in 0..num_lines {
        text.push_str(&make_log_line(i));
    }
    text.into_bytes()
}

// ---------------------------------------------------------------------------
// 1. compile -- parse, no-op elimination, prefix extraction
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    let patterns: &[(&str, &str)] = &[
        ("literal", "hello world"),
        ("dot_star", "foo.*bar"),
        ("alternation", "alpha|beta|gamma|delta"),
        ("char_class", "[a-zA-Z0-9_]+"),
        ("quantifier", "aa?a?a?b+c?d*"),
        ("group", "(abc)+(def)*"),
        ("date", "([0-9][0-9][0-9][0-9])-([0-9][0-9])-([0-9][0-9])"),
    ];

    let mut group = c.benchmark_group("compile");
    for (name, pat) in patterns {
        group.bench_with_input(BenchmarkId::from_parameter(name), pat, |b, pat| {
            b.iter(|| {
                let prog = compile(black_box(pat)).expect("compile failed");
                black_box(&prog);
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. prefix_scan -- memmem pre-filter on and off
// ---------------------------------------------------------------------------

fn bench_prefix_scan(c: &mut Criterion) {
    let text = make_log_text(100);
    let cases: &[(&str, &str)] = &[
        ("complete_literal", "duration=499ms"),
        ("prefix_then_class", "users/2[0-9]+"),
        ("no_match", "CRITICAL_ERROR"),
    ];

    let mut group = c.benchmark_group("prefix_scan");
    for (name, pat) in cases {
        let with = Regex::new(pat).expect("compile failed");
        let without = Regex::builder(pat)
            .literal_prefix_scan(false)
            .build()
            .expect("compile failed");
        debug_assert_eq!(
            with.find_submatch_index(&text),
            without.find_submatch_index(&text)
        );

        group.bench_function(BenchmarkId::new("scan", name), |b| {
            b.iter(|| black_box(with.find_bytes(black_box(&text))));
        });
        group.bench_function(BenchmarkId::new("no_scan", name), |b| {
            b.iter(|| black_box(without.find_bytes(black_box(&text))));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 3. submatch -- arena churn from alternation and closures
// ---------------------------------------------------------------------------

fn bench_submatch(c: &mut Criterion) {
    let text = b"Event on 2025-12-31 at venue, next on 2026-01-15.";
    let cases: &[(&str, &str)] = &[
        ("date", "([0-9]+)-([0-9]+)-([0-9]+)"),
        ("alt_loop", "(a|e|n|t|v| )+"),
        ("nested", "((([a-z]+) )+)"),
    ];

    let mut group = c.benchmark_group("submatch");
    for (name, pat) in cases {
        let prog = compile(pat).expect("compile failed");
        group.bench_function(*name, |b| {
            b.iter(|| black_box(execute(&prog, black_box(text), 0)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 4. pathological -- a?^n a^n, exponential for backtrackers
// ---------------------------------------------------------------------------

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    for n in [8usize, 16, 32] {
        let pattern = format!("{}{}", "a?".repeat(n), "a".repeat(n));
        let text = "a".repeat(n);
        let re = Regex::new(&pattern).expect("compile failed");
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| black_box(re.is_match(black_box(text))));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 5. all_matches -- driving loop over a large text
// ---------------------------------------------------------------------------

fn bench_all_matches(c: &mut Criterion) {
    let text_10k = make_log_text(100); // ~10KB
    let text_50k = make_log_text(500); // ~50KB

    let cases: &[(&str, &str)] = &[
        ("literal_INFO", "INFO"),
        ("field_extract", "duration=([0-9]+)ms"),
        ("empty", ""),
    ];

    let mut group = c.benchmark_group("all_matches");
    for (name, pat) in cases {
        let re = Regex::new(pat).expect("compile failed");
        group.bench_function(BenchmarkId::new("10k", name), |b| {
            b.iter(|| black_box(re.find_iter_bytes(black_box(&text_10k)).count()));
        });
        group.bench_function(BenchmarkId::new("50k", name), |b| {
            b.iter(|| black_box(re.find_iter_bytes(black_box(&text_50k)).count()));
        });
    }
    group.finish();
}

fn bench_replace(c: &mut Criterion) {
    let text = String::from_utf8(make_log_text(100)).expect("log text is ASCII");
    let re = Regex::new("status=[0-9]+").expect("compile failed");
    c.bench_function("replace_all", |b| {
        b.iter(|| black_box(re.replace_all(black_box(&text), "status=XXX")));
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_prefix_scan,
    bench_submatch,
    bench_pathological,
    bench_all_matches,
    bench_replace,
);
criterion_main!(benches);
