//! Whole-frame scenarios against the shipped WGSL programs, recorded on a
//! `Canvas` so no GPU or window is needed.

use std::path::{Path, PathBuf};

use iris_engine::coords::{Mat4, NormPoint};
use iris_engine::input::InputTracker;
use iris_engine::render::shader::{ShaderError, StageKind};
use iris_engine::render::{Canvas, LayoutId, ShaderProgram, TextureError, Topology};

fn shader_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shaders")
}

fn load(vertex: &str, fragment: &str) -> ShaderProgram {
    let dir = shader_dir();
    ShaderProgram::from_files(dir.join(vertex), dir.join(fragment))
        .unwrap_or_else(|e| panic!("{vertex} + {fragment}: {e}"))
}

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas::new(
        width,
        height,
        load("vertex.wgsl", "fragment.wgsl"),
        load("textured_vertex.wgsl", "textured_fragment.wgsl"),
    )
}

#[test]
fn shipped_programs_link_with_the_expected_interfaces() {
    let c = canvas(800, 600);

    let flat = c.program(c.flat_program()).unwrap();
    let block = flat.uniform_block().unwrap();
    assert!(block.member("model").is_some());
    assert!(block.member("color").is_some());
    assert!(!flat.samples_texture());

    let textured = c.program(c.textured_program()).unwrap();
    assert!(textured.uniform_block().unwrap().member("model").is_some());
    assert!(textured.samples_texture());
    assert_eq!(textured.vertex_inputs().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn camera_frame_then_cursor_circle() {
    let mut c = canvas(800, 600);
    let tex = c.create_texture();

    let red: Vec<u8> = [255u8, 0, 0].repeat(4);
    c.update_texture(tex, &red, 2, 2).unwrap();

    // Pointer at the window center.
    let pointer = InputTracker::new((400.0, 300.0), 800, 600).position();
    assert_eq!(pointer, NormPoint::ORIGIN);

    c.begin_frame();
    c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
    c.draw_circle(pointer.x, pointer.y, 0.02, 1.0, 1.0, 0.0, 1.0);
    c.end_frame();

    let [quad, circle] = c.draws() else { panic!("expected two draws") };

    assert_eq!((quad.layout, quad.topology, quad.vertex_count), (LayoutId::QUAD, Topology::TriangleList, 6));
    assert_eq!(quad.texture.map(|t| t.id), Some(tex));
    assert_eq!(c.draw_texture(quad).and_then(|img| img.pixel(1, 1)), Some([255, 0, 0, 255]));
    assert_eq!(c.texture(tex).unwrap().pixel(1, 1), Some([255, 0, 0, 255]));

    assert_eq!(
        (circle.layout, circle.topology, circle.vertex_count),
        (LayoutId::CIRCLE, Topology::TriangleFan, 102)
    );
    let block = c.program(circle.program).unwrap().uniform_block().unwrap();
    assert_eq!(circle.uniform::<[f32; 4]>(block, "color"), Some([1.0, 1.0, 0.0, 1.0]));
    assert_eq!(
        circle.uniform::<Mat4>(block, "model"),
        Some(Mat4::IDENTITY.translate(0.0, 0.0, 0.0).scale(0.02 / (800.0 / 600.0), 0.02, 1.0))
    );
}

#[test]
fn texture_update_is_visible_to_the_next_frame() {
    let mut c = canvas(640, 480);
    let tex = c.create_texture();

    c.update_texture(tex, &[0, 0, 255], 1, 1).unwrap();
    c.begin_frame();
    c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
    c.end_frame();
    let first = c.texture(tex).unwrap().generation();

    c.update_texture(tex, &[0, 255, 0, 0, 255, 0], 2, 1).unwrap();
    c.begin_frame();
    c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
    c.end_frame();

    let img = c.texture(tex).unwrap();
    assert!(img.generation() > first);
    assert_eq!((img.width(), img.height()), (2, 1));
    assert_eq!(img.pixel(0, 0), Some([0, 255, 0, 255]));
}

#[test]
fn bad_texture_upload_is_rejected() {
    let mut c = canvas(800, 600);
    let tex = c.create_texture();
    assert!(matches!(
        c.update_texture(tex, &[0; 10], 2, 2),
        Err(TextureError::LengthMismatch { expected: 12, actual: 10 })
    ));
    assert!(matches!(c.update_texture(tex, &[], 0, 0), Err(TextureError::ZeroSize { .. })));
}

#[test]
fn missing_shader_file_is_an_error() {
    let dir = shader_dir();
    let err = ShaderProgram::from_files(dir.join("vertex.wgsl"), dir.join("no_such_fragment.wgsl"))
        .unwrap_err();
    assert!(matches!(err, ShaderError::Read { stage: StageKind::Fragment, .. }));
}

#[test]
fn double_destroy_is_a_no_op() {
    let mut c = canvas(800, 600);
    c.destroy();
    c.destroy();
    c.begin_frame();
    c.draw_circle(0.0, 0.0, 0.02, 1.0, 1.0, 0.0, 1.0);
    assert!(!c.end_frame());
    assert!(c.draws().is_empty());
}
