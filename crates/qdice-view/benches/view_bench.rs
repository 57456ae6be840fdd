//! Benchmarks for index mapping, sample aggregation and diagram layout
//!
//! Run with: cargo bench -p qdice-view

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use qdice_view::basis::{canonical_order, to_display_bitstring};
use qdice_view::distribution::{Counts, Probabilities, merge, recompute};
use qdice_view::{
    CircuitLayoutEngine, CircuitStep, CircuitTrace, LayoutConfig, StepTimeline, ViewMode,
};

fn bench_basis(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis");

    for num_qubits in &[3_u32, 5, 10, 16] {
        group.bench_with_input(
            BenchmarkId::new("canonical_order", num_qubits),
            num_qubits,
            |b, &n| b.iter(|| canonical_order(black_box(n))),
        );
    }

    group.bench_function("bitstring_5q", |b| {
        b.iter(|| {
            for i in 0..32 {
                black_box(to_display_bitstring(black_box(i), 5));
            }
        });
    });

    group.finish();
}

fn bench_distribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribution");

    let existing: Counts = (0..32).map(|i| (i, u64::from(i) * 7)).collect();
    let delta: Counts = (0..32).step_by(2).map(|i| (i, 100)).collect();
    let theoretical: Probabilities = (0..20).map(|i| (i, 0.05)).collect();

    group.bench_function("merge_32", |b| {
        b.iter(|| merge(black_box(&existing), black_box(&delta)));
    });

    group.bench_function("recompute_32", |b| {
        b.iter(|| recompute(black_box(&existing), black_box(&theoretical), 32, 20));
    });

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let engine = CircuitLayoutEngine::new(LayoutConfig::default());

    for num_steps in &[5_usize, 20, 100] {
        let num_qubits = 5;
        let states = 1usize << num_qubits;
        let steps = (0..*num_steps)
            .map(|i| CircuitStep {
                gate_id: if i % 3 == 0 { "cry" } else { "ry" }.to_string(),
                params: vec![0.5],
                qubits: if i % 3 == 0 { vec![0, 4] } else { vec![(i % 5) as u32] },
                description: String::new(),
                amplitudes: vec![Complex64::new(0.0, 0.0); states],
                probabilities: vec![1.0 / states as f64; states],
            })
            .collect();

        let mut timeline = StepTimeline::new(ViewMode::Interactive);
        if timeline.load(CircuitTrace::new(num_qubits, steps)).is_err() {
            continue;
        }

        group.bench_with_input(
            BenchmarkId::new("diagram", num_steps),
            &timeline,
            |b, timeline| b.iter(|| engine.layout_diagram(black_box(timeline))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_basis, bench_distribution, bench_layout);
criterion_main!(benches);
