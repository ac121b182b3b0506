use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fsm_graph_viz::config::{Config, PhaseArrangement};
use fsm_graph_viz::document::GraphDocument;
use fsm_graph_viz::graph::StateGraph;
use fsm_graph_viz::html::render_html;
use fsm_graph_viz::layout::compute_layout;
use fsm_graph_viz::render::render_svg;
use std::hint::black_box;

/// Builds a document with `phases` phases of `nodes` states each. Every phase
/// is a cycle with one chord per state, and phases are chained back to front.
fn generated_source(phases: usize, nodes: usize) -> String {
    let mut out = String::from("{\"phases\":[");
    for p in 0..phases {
        if p > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            "{{\"id\":\"phase{p}\",\"initial_state\":\"s0\",\"nodes\":["
        ));
        for n in 0..nodes {
            if n > 0 {
                out.push(',');
            }
            out.push_str(&format!(
                "{{\"id\":\"s{n}\",\"params\":{{\"desc\":\"state {n} of phase {p}\"}},\"vars\":{{\"count\":{n}}}}}"
            ));
        }
        out.push_str("],\"edges\":[");
        for n in 0..nodes {
            if n > 0 {
                out.push(',');
            }
            let next = (n + 1) % nodes;
            let chord = (n + nodes / 2) % nodes;
            out.push_str(&format!(
                "{{\"from\":\"s{n}\",\"to\":\"s{next}\",\"condition\":\"step_{n}_complete_and_ready\",\"actions\":{{\"count\":{next}}}}},\
                 {{\"from\":\"s{n}\",\"to\":\"s{chord}\"}}"
            ));
        }
        out.push_str("]}");
    }
    out.push_str("],\"phase_edges\":[");
    for p in 0..phases {
        if p > 0 {
            out.push(',');
        }
        let next = (p + 1) % phases;
        out.push_str(&format!(
            "{{\"from\":\"phase{p}\",\"to\":\"phase{next}\",\"condition\":\"advance\"}}"
        ));
    }
    out.push_str("]}");
    out
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.render.fast_text_metrics = true;
    config
}

const SIZES: [(usize, usize); 4] = [(2, 4), (3, 8), (5, 12), (8, 20)];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for (phases, nodes) in SIZES {
        let source = generated_source(phases, nodes);
        let document = GraphDocument::from_json_str(&source).expect("parse failed");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{phases}x{nodes}")),
            &document,
            |b, document| {
                b.iter(|| {
                    let graph = StateGraph::build(black_box(document));
                    black_box(graph.edge_count());
                });
            },
        );
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let ring = fast_config();
    let mut row = fast_config();
    row.layout.arrangement = PhaseArrangement::Row;
    for (phases, nodes) in SIZES {
        let source = generated_source(phases, nodes);
        let document = GraphDocument::from_json_str(&source).expect("parse failed");
        let graph = StateGraph::build(&document);
        let name = format!("{phases}x{nodes}");
        group.bench_with_input(BenchmarkId::new("ring", &name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &ring.layout);
                black_box(layout.positions.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("row", &name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &row.layout);
                black_box(layout.positions.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let config = fast_config();
    for (phases, nodes) in SIZES {
        let source = generated_source(phases, nodes);
        let document = GraphDocument::from_json_str(&source).expect("parse failed");
        let graph = StateGraph::build(&document);
        let layout = compute_layout(&graph, &config.layout);
        let name = format!("{phases}x{nodes}");
        group.bench_with_input(
            BenchmarkId::new("svg", &name),
            &(&graph, &layout),
            |b, (graph, layout)| {
                b.iter(|| {
                    let svg = render_svg(black_box(graph), black_box(layout), &config);
                    black_box(svg.len());
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("html", &name),
            &(&graph, &layout),
            |b, (graph, layout)| {
                b.iter(|| {
                    let html = render_html(black_box(graph), black_box(layout), &config);
                    black_box(html.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = fast_config();
    for (phases, nodes) in SIZES {
        let source = generated_source(phases, nodes);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{phases}x{nodes}")),
            &source,
            |b, source| {
                b.iter(|| {
                    let document =
                        GraphDocument::from_json_str(black_box(source)).expect("parse failed");
                    let graph = StateGraph::build(&document);
                    let layout = compute_layout(&graph, &config.layout);
                    let svg = render_svg(&graph, &layout, &config);
                    black_box(svg.len());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_layout,
    bench_render,
    bench_end_to_end
);
criterion_main!(benches);
