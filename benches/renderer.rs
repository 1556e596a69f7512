use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use placepix::config::DefaultsConfig;
use placepix::params::{FontChoice, RawParams, RenderRequest, resolve_request};
use placepix::parser::parse_dimensions;
use placepix::pipeline;
use placepix::raster::render_raster;
use placepix::svg::render_svg;
use std::hint::black_box;

const SIZES: [&str; 4] = ["100x50", "300x150", "800x600@2x", "4000x4000"];

fn request_for(dimensions: &str, text: &str) -> RenderRequest {
    RenderRequest {
        spec: parse_dimensions(dimensions).expect("bench dimensions parse"),
        bg_color: "dddddd".to_string(),
        text_color: "999999".to_string(),
        text: text.to_string(),
        font: FontChoice::SansSerif,
    }
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for token in ["300", "300x150", "800x600@2x", "4000x4000@3x"] {
        group.bench_with_input(BenchmarkId::from_parameter(token), token, |b, data| {
            b.iter(|| {
                let spec = parse_dimensions(black_box(data)).expect("parse failed");
                black_box(spec.pixel_width());
            });
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let defaults = DefaultsConfig::default();
    let raw = RawParams {
        dimensions: "800x600@2x",
        bg_color: Some("cornflowerblue"),
        text_color: Some("red"),
        text: Some("Hello+there\\nsecond%20line"),
        font: Some("monospace"),
        format: Some("webp"),
    };
    c.bench_function("validate", |b| {
        b.iter(|| {
            let resolved = resolve_request(black_box(&raw), &defaults).expect("resolve failed");
            black_box(resolved.0.text.len());
        });
    });
}

fn bench_render_svg(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    for dimensions in SIZES {
        let request = request_for(dimensions, "Hello\nWorld");
        group.bench_with_input(
            BenchmarkId::from_parameter(dimensions),
            &request,
            |b, data| {
                b.iter(|| {
                    let svg = render_svg(black_box(data));
                    black_box(svg.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_render_raster(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_raster_png");
    // The largest canvas dominates encode time; keep it out of the default sweep.
    for dimensions in ["100x50", "300x150", "800x600@2x"] {
        let request = request_for(dimensions, "Hello\nWorld");
        group.bench_with_input(
            BenchmarkId::from_parameter(dimensions),
            &request,
            |b, data| {
                b.iter(|| {
                    let bytes = render_raster(black_box(data), image::ImageFormat::Png)
                        .expect("raster render failed");
                    black_box(bytes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let defaults = DefaultsConfig::default();
    let mut group = c.benchmark_group("end_to_end");
    for (name, raw) in [
        (
            "png_default",
            RawParams {
                dimensions: "300x150",
                ..RawParams::default()
            },
        ),
        (
            "svg_multiline",
            RawParams {
                dimensions: "640x480",
                text: Some("First+line\\nSecond+line"),
                format: Some("svg"),
                ..RawParams::default()
            },
        ),
        (
            "jpeg_retina",
            RawParams {
                dimensions: "300x150@2x",
                bg_color: Some("blue"),
                text_color: Some("white"),
                format: Some("jpg"),
                ..RawParams::default()
            },
        ),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &raw, |b, data| {
            b.iter(|| {
                let rendered = pipeline::rich(black_box(data), &defaults).expect("render failed");
                black_box(rendered.bytes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_validate, bench_render_svg, bench_render_raster, bench_end_to_end
);
criterion_main!(benches);
