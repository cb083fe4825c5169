use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skelegen::emit::{emit_code, render_preview};
use skelegen::{ElementInfo, SkeletonPlan};

fn leaves(n: usize) -> Vec<ElementInfo> {
    (0..n)
        .map(|i| ElementInfo {
            kind: if i % 5 == 0 { "circle".into() } else { "p".into() },
            x: 16.0 + (i % 4) as f64 * 150.0,
            y: 16.0 + (i / 4) as f64 * 40.0 + (i % 3) as f64,
            width: 40.0 + (i * 37 % 500) as f64,
            height: 16.0 + (i * 13 % 100) as f64,
            class_name: String::new(),
        })
        .collect()
}

fn bench_plan_and_emit(c: &mut Criterion) {
    let els = leaves(400);
    c.bench_function("plan_400_leaves", |b| b.iter(|| SkeletonPlan::from_elements(black_box(&els), 10.0)));

    let plan = SkeletonPlan::from_elements(&els, 10.0);
    c.bench_function("emit_code", |b| b.iter(|| emit_code(black_box(&plan))));
    c.bench_function("render_preview_svg", |b| b.iter(|| render_preview(black_box(&plan), 800.0).to_svg()));
}

#[cfg(feature = "builtin")]
fn bench_builtin_analyze(c: &mut Criterion) {
    use skelegen::rendering::BuiltinRenderer;
    use skelegen::{analyze_with, AnalyzerConfig};

    let config = AnalyzerConfig { settle_delay_ms: 0, ..Default::default() };
    let row = r#"<div class="flex items-center gap-4"><img class="w-12 h-12 rounded-full"><div><h3>Title</h3><p>Some body text that wraps a little.</p></div></div>"#;
    let page = row.repeat(50);
    let renderer = BuiltinRenderer::new();
    c.bench_function("builtin_analyze_50_rows", |b| b.iter(|| analyze_with(&renderer, black_box(&page), &config)));
}

#[cfg(not(feature = "builtin"))]
fn bench_builtin_analyze(_c: &mut Criterion) {}

criterion_group!(benches, bench_plan_and_emit, bench_builtin_analyze);
criterion_main!(benches);
