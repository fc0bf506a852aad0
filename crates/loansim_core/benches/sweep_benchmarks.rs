//! Criterion benchmarks for loansim_core
//!
//! Run with: cargo bench -p loansim_core

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use loansim_core::rules::RuleSet;
use loansim_core::{SimulationConfig, Simulator, StepOptions, YearSweep};

fn bench_aggregate_blend(c: &mut Criterion) {
    let rules = RuleSet::parse("<=100000=0.3;>=100000=0.21").unwrap();
    c.bench_function("aggregate_two_brackets", |b| {
        b.iter(|| black_box(rules.evaluate_aggregate(black_box(200_000.0), 0.0)))
    });
}

fn bench_stepping_loop(c: &mut Criterion) {
    let sim = Simulator::new(SimulationConfig::default());
    c.bench_function("steps_default_run", |b| {
        b.iter(|| {
            let points: Vec<_> = sim.steps(StepOptions::default()).flatten().collect();
            black_box(points)
        })
    });
}

fn bench_payment_sweep(c: &mut Criterion) {
    let sim = Simulator::new(SimulationConfig::default());
    c.bench_function("simulate_years_default", |b| {
        b.iter(|| black_box(sim.simulate_years(YearSweep::default())))
    });
}

criterion_group!(
    benches,
    bench_aggregate_blend,
    bench_stepping_loop,
    bench_payment_sweep
);
criterion_main!(benches);
