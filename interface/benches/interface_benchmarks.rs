use criterion::{Criterion, black_box, criterion_group, criterion_main};

use glam::{Mat4, Vec3};
use prism_interface::{
    DirectionalLight, HeaderDocument, HeaderWriter, PbrMatrices, PbrMaterial, ShaderInterface,
    verify_header,
};

// ---------------------------------------------------------------------------
// Interface tables
// ---------------------------------------------------------------------------

fn bench_build_pbr_table(c: &mut Criterion) {
    c.bench_function("interface_build_pbr", |b| {
        b.iter(|| black_box(ShaderInterface::pbr()));
    });
}

fn bench_validate(c: &mut Criterion) {
    let base = ShaderInterface::base();
    let pbr = ShaderInterface::pbr();

    c.bench_function("interface_validate_base", |b| {
        b.iter(|| black_box(base.validate()).unwrap());
    });
    c.bench_function("interface_validate_pbr", |b| {
        b.iter(|| black_box(pbr.validate()).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Header text
// ---------------------------------------------------------------------------

fn bench_write_header(c: &mut Criterion) {
    let pbr = ShaderInterface::pbr();
    c.bench_function("header_write_pbr", |b| {
        b.iter(|| black_box(HeaderWriter::new(&pbr).write()));
    });
}

fn bench_parse_header(c: &mut Criterion) {
    let pbr = ShaderInterface::pbr();
    let text = HeaderWriter::new(&pbr).write();

    c.bench_function("header_parse_pbr", |b| {
        b.iter(|| black_box(HeaderDocument::parse(black_box(&text)).unwrap()));
    });
    c.bench_function("header_to_interface_pbr", |b| {
        let doc = HeaderDocument::parse(&text).unwrap();
        b.iter(|| black_box(doc.to_interface("pbr", "v450/gltf", &[]).unwrap()));
    });
}

fn bench_verify_header(c: &mut Criterion) {
    let pbr = ShaderInterface::pbr();
    let text = HeaderWriter::new(&pbr).write();
    c.bench_function("header_verify_pbr", |b| {
        b.iter(|| verify_header(black_box(&text), &pbr, &[]).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Uniform uploads
// ---------------------------------------------------------------------------

fn bench_fill_pbr_matrices(c: &mut Criterion) {
    let material = PbrMaterial::default();
    let light = DirectionalLight::default();
    let camera = Mat4::from_translation(Vec3::new(0.0, 1.0, 5.0));

    c.bench_function("pbr_matrices_fill", |b| {
        b.iter(|| {
            let mut block = PbrMatrices::default();
            block.set_material(black_box(&material));
            block.set_light(black_box(&light));
            block.set_view_from_camera(&camera);
            block.set_model_matrix(0, Mat4::IDENTITY).unwrap();
            black_box(block.as_bytes().len());
        });
    });
}

criterion_group!(
    benches,
    bench_build_pbr_table,
    bench_validate,
    bench_write_header,
    bench_parse_header,
    bench_verify_header,
    bench_fill_pbr_matrices,
);
criterion_main!(benches);
